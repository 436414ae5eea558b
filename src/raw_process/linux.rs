//! The Linux `RawProcess` backend: `process_vm_readv`/`process_vm_writev`
//! for data transfer, direct `mmap`/`munmap` for local allocation, and the
//! [`crate::trampoline`] for remote allocation.

use super::RawProcess;
use crate::error::{Error, Result};
use crate::permissions::Permissions;
use crate::tracer::Tracer;
use crate::trampoline;
use nix::sys::mman::{self, MapFlags};
use nix::sys::signal;
use nix::sys::uio::{process_vm_readv, process_vm_writev, IoVec, RemoteIoVec};
use nix::unistd::Pid;
use std::ptr;

pub struct LinuxProcess {
    pid: Pid,
    is_local: bool,
    tracer: Tracer,
}

impl LinuxProcess {
    /// Opens `pid`. A PID of `0` is rejected outright: on Linux it addresses
    /// the caller's whole process group rather than a single process, which
    /// is not a meaningful target for this crate.
    pub fn open(pid: Pid) -> Result<LinuxProcess> {
        let is_local = pid == nix::unistd::getpid();
        if !is_local {
            if pid.as_raw() == 0 {
                return Err(Error::NoSuchProcess);
            }
            signal::kill(pid, None)?;
        }
        Ok(LinuxProcess {
            pid,
            is_local,
            tracer: Tracer::new(),
        })
    }
}

impl RawProcess for LinuxProcess {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn is_local(&self) -> bool {
        self.is_local
    }

    fn read_memory(&self, addr: usize, size: usize) -> Result<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; size];
        let local = [IoVec::from_mut_slice(&mut buf)];
        let remote = [RemoteIoVec { base: addr, len: size }];
        let n = process_vm_readv(self.pid, &local, &remote)?;
        if n != size {
            return Err(Error::PartialTransfer);
        }
        Ok(buf)
    }

    fn write_memory(&self, addr: usize, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let local = [IoVec::from_slice(buf)];
        let remote = [RemoteIoVec {
            base: addr,
            len: buf.len(),
        }];
        let n = process_vm_writev(self.pid, &local, &remote)?;
        if n != buf.len() {
            return Err(Error::PartialTransfer);
        }
        Ok(n)
    }

    fn allocate_memory(&self, size: usize, perms: Permissions) -> Result<usize> {
        if self.is_local {
            let prot = perms.to_prot_flags();
            let flags = MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS;
            let addr = unsafe { mman::mmap(ptr::null_mut(), size, prot, flags, -1, 0) }?;
            Ok(addr as usize)
        } else {
            let prot = perms.to_prot_raw() as i64;
            let flags = (libc::MAP_PRIVATE | libc::MAP_ANONYMOUS) as i64;
            let ret = trampoline::foreign_syscall(
                &self.tracer,
                self.pid,
                libc::SYS_mmap,
                [0, size as i64, prot, flags, -1, 0],
            )?;
            if trampoline::is_remote_error(ret) {
                return Err(Error::RemoteAllocationFailed(ret));
            }
            Ok(ret as usize)
        }
    }

    fn free_memory(&self, addr: usize, size: usize) -> Result<()> {
        if self.is_local {
            unsafe { mman::munmap(addr as *mut libc::c_void, size) }.map_err(Error::from)
        } else {
            let ret = trampoline::foreign_syscall(
                &self.tracer,
                self.pid,
                libc::SYS_munmap,
                [addr as i64, size as i64, 0, 0, 0, 0],
            )?;
            if trampoline::is_remote_error(ret) {
                return Err(Error::RemoteFreeFailed(ret));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_self_is_local() {
        let p = LinuxProcess::open(nix::unistd::getpid()).unwrap();
        assert!(p.is_local());
    }

    #[test]
    fn open_pid_zero_is_rejected() {
        let err = LinuxProcess::open(Pid::from_raw(0)).unwrap_err();
        assert!(matches!(err, Error::NoSuchProcess));
    }

    #[test]
    fn open_nonexistent_pid_fails() {
        // A PID this large is vanishingly unlikely to be live; /proc/sys
        // caps pid_max well below it on every mainstream Linux config.
        let err = LinuxProcess::open(Pid::from_raw(i32::MAX - 1)).unwrap_err();
        assert!(matches!(err, Error::NoSuchProcess));
    }

    #[test]
    fn local_round_trip_read_write() {
        let p = LinuxProcess::open(nix::unistd::getpid()).unwrap();
        let perms = Permissions::READ | Permissions::WRITE;
        let addr = p.allocate_memory(4096, perms).unwrap();
        p.write_memory(addr, b"hello").unwrap();
        let back = p.read_memory(addr, 5).unwrap();
        assert_eq!(&back, b"hello");
        p.free_memory(addr, 4096).unwrap();
    }

    #[test]
    fn zero_length_read_and_write_are_no_ops() {
        let p = LinuxProcess::open(nix::unistd::getpid()).unwrap();
        assert_eq!(p.read_memory(0, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(p.write_memory(0, &[]).unwrap(), 0);
    }
}
