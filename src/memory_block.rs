//! The permission-tagged, bounds-checked view over one allocation returned
//! by [`Process::allocate`](crate::process::Process::allocate).

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::permissions::Permissions;
use crate::raw_process::RawProcess;
use std::rc::Rc;

/// A unique owner of the address range `[addr, addr + layout.size)` inside
/// one process's address space.
///
/// `perms` never exceeds what the backing mapping was created with — this
/// type has no way to raise or lower the kernel's own protection on the
/// mapping, only to check against the permissions it was given at
/// allocation time. See `SPEC_FULL.md` §9 for why upgrade/downgrade stays
/// out of the core.
pub struct MemoryBlock {
    process: Rc<dyn RawProcess>,
    addr: usize,
    layout: Layout,
    perms: Permissions,
    freed: bool,
}

impl MemoryBlock {
    pub(crate) fn new(
        process: Rc<dyn RawProcess>,
        addr: usize,
        layout: Layout,
        perms: Permissions,
    ) -> MemoryBlock {
        MemoryBlock {
            process,
            addr,
            layout,
            perms,
            freed: false,
        }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn len(&self) -> usize {
        self.layout.size
    }

    pub fn is_empty(&self) -> bool {
        self.layout.size == 0
    }

    pub fn align(&self) -> usize {
        self.layout.align
    }

    pub fn permissions(&self) -> Permissions {
        self.perms
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.freed {
            Err(Error::BlockFreed)
        } else {
            Ok(())
        }
    }

    /// `true` iff the sub-range `[addr, addr + size)` lies wholly within
    /// this block.
    fn is_in_bounds(&self, addr: usize, size: usize) -> bool {
        self.addr <= addr && addr + size <= self.addr + self.layout.size
    }

    fn check_in_bounds(&self, addr: usize, size: usize) -> Result<()> {
        if self.is_in_bounds(addr, size) {
            Ok(())
        } else {
            Err(Error::OutOfBounds)
        }
    }

    /// Reads `size` bytes starting at the block's own address. Requires
    /// `READ`; fails with `OutOfBounds` if `size` exceeds the block.
    pub fn read(&self, size: usize) -> Result<Vec<u8>> {
        self.ensure_alive()?;
        if !self.perms.contains(Permissions::READ) {
            return Err(Error::PermissionDenied);
        }
        self.check_in_bounds(self.addr, size)?;
        self.process.read_memory(self.addr, size)
    }

    /// Writes `buf` starting at the block's own address. Requires `WRITE`;
    /// fails with `OutOfBounds`, writing nothing, if `buf` would cross the
    /// block's end.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        self.ensure_alive()?;
        if !self.perms.contains(Permissions::WRITE) {
            return Err(Error::PermissionDenied);
        }
        self.check_in_bounds(self.addr, buf.len())?;
        let n = self.process.write_memory(self.addr, buf)?;
        if n != buf.len() {
            return Err(Error::PartialTransfer);
        }
        Ok(())
    }

    /// Writes `byte & 0xFF` across the whole block.
    pub fn fill(&self, byte: i64) -> Result<()> {
        let b = (byte & 0xFF) as u8;
        let buf = vec![b; self.layout.size];
        self.write(&buf)
    }

    /// Equivalent to `fill(0)`.
    pub fn clear(&self) -> Result<()> {
        self.fill(0)
    }

    /// Reads this block in full and writes it to `other`. The two blocks
    /// may belong to different processes; this is the crate's only
    /// cross-address-space copy primitive. Requires `READ` on `self` and
    /// `WRITE` on `other`.
    pub fn copy_to(&self, other: &MemoryBlock) -> Result<()> {
        let data = self.read(self.layout.size)?;
        other.write(&data)
    }

    /// Interprets this block's address as a function pointer of type `F`
    /// and returns it, after checking `EXECUTE` and that the backing
    /// process is local. Executing code inside a foreign address space
    /// from the caller is ill-defined and rejected.
    ///
    /// `F` should be an `unsafe extern "C" fn(...) -> _` matching the
    /// calling convention and signature of the code actually written into
    /// this block; the caller invokes the returned pointer themselves.
    ///
    /// # Safety
    /// The caller must guarantee `F` accurately describes the code at this
    /// address, and that calling it is sound given whatever arguments they
    /// pass when they invoke it.
    pub unsafe fn execute<F: Copy>(&self) -> Result<F> {
        self.ensure_alive()?;
        if !self.perms.contains(Permissions::EXECUTE) {
            return Err(Error::PermissionDenied);
        }
        if !self.process.is_local() {
            return Err(Error::Unsupported(
                "executing code in a foreign address space",
            ));
        }
        Ok(std::mem::transmute_copy::<usize, F>(&self.addr))
    }

    /// Frees the backing mapping. Idempotent: a second call is a no-op.
    /// Every operation after this fails with `BlockFreed`.
    pub fn deallocate(&mut self) -> Result<()> {
        if self.freed {
            return Ok(());
        }
        self.process.free_memory(self.addr, self.layout.size)?;
        self.freed = true;
        Ok(())
    }
}

impl Drop for MemoryBlock {
    fn drop(&mut self) {
        if !self.freed {
            if let Err(e) = self.process.free_memory(self.addr, self.layout.size) {
                log::warn!(
                    "MemoryBlock::drop: failed to free block at {:#x}: {}",
                    self.addr,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_process::open_raw_process;

    fn local_block(size: usize, perms: Permissions) -> MemoryBlock {
        let process: Rc<dyn RawProcess> =
            Rc::from(open_raw_process(nix::unistd::getpid()).unwrap());
        let layout = Layout::new(size, 16);
        let addr = process.allocate_memory(size, perms).unwrap();
        MemoryBlock::new(process, addr, layout, perms)
    }

    #[test]
    fn write_then_read_round_trips() {
        let block = local_block(64, Permissions::READ | Permissions::WRITE);
        block.write(b"hello").unwrap();
        assert_eq!(&block.read(5).unwrap(), b"hello");
    }

    #[test]
    fn clear_zeroes_the_whole_block() {
        let block = local_block(16, Permissions::READ | Permissions::WRITE);
        block.write(&[0xAAu8; 16]).unwrap();
        block.clear().unwrap();
        assert_eq!(block.read(16).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn fill_masks_to_low_byte() {
        let block = local_block(4, Permissions::READ | Permissions::WRITE);
        block.fill(0x1FF).unwrap();
        assert_eq!(block.read(4).unwrap(), vec![0xFFu8; 4]);
    }

    #[test]
    fn write_past_end_is_out_of_bounds_and_writes_nothing() {
        let block = local_block(16, Permissions::READ | Permissions::WRITE);
        block.write(&[1u8; 16]).unwrap();
        let err = block.write(&[2u8; 17]).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds));
        assert_eq!(block.read(16).unwrap(), vec![1u8; 16]);
    }

    #[test]
    fn write_without_write_permission_is_denied() {
        let block = local_block(16, Permissions::READ);
        let err = block.write(&[1u8; 4]).unwrap_err();
        assert!(matches!(err, Error::PermissionDenied));
    }

    #[test]
    fn copy_to_moves_bytes_between_blocks() {
        let src = local_block(32, Permissions::READ | Permissions::WRITE);
        let dst = local_block(32, Permissions::READ | Permissions::WRITE);
        let mut payload = b"hello".to_vec();
        payload.resize(32, 0);
        src.write(&payload).unwrap();
        src.copy_to(&dst).unwrap();
        assert_eq!(dst.read(32).unwrap(), payload);
    }

    #[test]
    fn operations_after_deallocate_fail() {
        let mut block = local_block(16, Permissions::READ | Permissions::WRITE);
        block.deallocate().unwrap();
        let err = block.read(4).unwrap_err();
        assert!(matches!(err, Error::BlockFreed));
    }

    #[test]
    fn deallocate_is_idempotent() {
        let mut block = local_block(16, Permissions::READ | Permissions::WRITE);
        block.deallocate().unwrap();
        block.deallocate().unwrap();
    }

    #[test]
    fn execute_against_a_foreign_block_is_unsupported() {
        use crate::raw_process::open_raw_process;
        use nix::unistd::Pid;
        use std::process::{Command, Stdio};

        let mut child = Command::new("sleep")
            .arg("5")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .expect("failed to spawn sleep");
        let pid = Pid::from_raw(child.id() as i32);

        let process: Rc<dyn RawProcess> = Rc::from(open_raw_process(pid).unwrap());
        let perms = Permissions::READ | Permissions::WRITE | Permissions::EXECUTE;
        let layout = Layout::new(16, 16);
        let addr = process.allocate_memory(16, perms).unwrap();
        let block = MemoryBlock::new(process, addr, layout, perms);

        let err = unsafe { block.execute::<unsafe extern "C" fn() -> i32>() }.unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));

        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn local_execute_runs_injected_machine_code() {
        // `mov eax, 42; ret` on x86-64.
        const RETURN_42: [u8; 6] = [0xB8, 0x2A, 0x00, 0x00, 0x00, 0xC3];

        let block = local_block(16, Permissions::READ | Permissions::WRITE | Permissions::EXECUTE);
        block.write(&RETURN_42).unwrap();

        let f: unsafe extern "C" fn() -> i32 = unsafe { block.execute().unwrap() };
        assert_eq!(unsafe { f() }, 42);
    }
}
