//! Interface-only Windows backend.
//!
//! `SPEC_FULL.md` §4.3 describes the Windows-side semantics this would
//! need (`ReadProcessMemory`/`WriteProcessMemory` for transfer,
//! `VirtualAllocEx`/`VirtualFreeEx` for remote allocation, no ptrace-style
//! trampoline since Windows has no equivalent foreign-syscall primitive)
//! but implementing them is out of scope here. Every method fails with
//! [`Error::Unsupported`] so callers on this platform get a clear error
//! instead of a missing symbol.

use super::RawProcess;
use crate::error::{Error, Result};
use crate::permissions::Permissions;
use nix::unistd::Pid;

pub struct WindowsProcess {
    pid: Pid,
}

impl WindowsProcess {
    pub fn open(_pid: Pid) -> Result<WindowsProcess> {
        Err(Error::Unsupported("Windows backend is not implemented"))
    }
}

impl RawProcess for WindowsProcess {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn is_local(&self) -> bool {
        false
    }

    fn read_memory(&self, _addr: usize, _size: usize) -> Result<Vec<u8>> {
        Err(Error::Unsupported("read_memory on Windows"))
    }

    fn write_memory(&self, _addr: usize, _buf: &[u8]) -> Result<usize> {
        Err(Error::Unsupported("write_memory on Windows"))
    }

    fn allocate_memory(&self, _size: usize, _perms: Permissions) -> Result<usize> {
        Err(Error::Unsupported("allocate_memory on Windows"))
    }

    fn free_memory(&self, _addr: usize, _size: usize) -> Result<()> {
        Err(Error::Unsupported("free_memory on Windows"))
    }
}
