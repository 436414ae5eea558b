//! The public façade: open a process by PID, then allocate memory blocks
//! against it.

use crate::error::Result;
use crate::layout::Layout;
use crate::memory_block::MemoryBlock;
use crate::permissions::Permissions;
use crate::raw_process::{self, RawProcess};
use nix::unistd::Pid;
use std::rc::Rc;

/// A handle onto one process, local or foreign, obtained from
/// [`open_process`].
///
/// Cheap to clone: internally this is just an `Rc` around the platform
/// backend, shared with every `MemoryBlock` it allocates so blocks outlive
/// a dropped `Process` value without dangling.
#[derive(Clone)]
pub struct Process {
    raw: Rc<dyn RawProcess>,
}

impl Process {
    fn new(raw: Box<dyn RawProcess>) -> Process {
        Process { raw: Rc::from(raw) }
    }

    pub fn pid(&self) -> Pid {
        self.raw.pid()
    }

    /// `true` if this handle refers to the calling process itself.
    pub fn is_local(&self) -> bool {
        self.raw.is_local()
    }

    /// `true` if this handle refers to some other process.
    pub fn is_foreign(&self) -> bool {
        !self.is_local()
    }

    /// Allocates a region sized and aligned per `layout`, with `perms`
    /// protection. Routes through a direct `mmap` if this process is
    /// local, or through the foreign-syscall trampoline if it is not.
    pub fn allocate(&self, layout: Layout, perms: Permissions) -> Result<MemoryBlock> {
        let addr = self.raw.allocate_memory(layout.size, perms)?;
        Ok(MemoryBlock::new(Rc::clone(&self.raw), addr, layout, perms))
    }
}

/// Opens a handle to the process identified by `pid`. `pid` equal to the
/// calling process's own PID yields a local handle; any other live PID
/// yields a foreign one. Fails with
/// [`Error::NoSuchProcess`](crate::error::Error::NoSuchProcess) if `pid`
/// does not name a live process.
pub fn open_process(pid: Pid) -> Result<Process> {
    let raw = raw_process::open_raw_process(pid)?;
    Ok(Process::new(raw))
}
