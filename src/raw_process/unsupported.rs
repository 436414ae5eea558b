//! Fallback backend for any target that is neither Linux nor Windows.
//! `open` always fails; there is nothing this crate can do on such a
//! platform, but the crate still compiles.

use super::RawProcess;
use crate::error::{Error, Result};
use crate::permissions::Permissions;
use nix::unistd::Pid;

pub struct UnsupportedProcess {
    pid: Pid,
}

impl UnsupportedProcess {
    pub fn open(_pid: Pid) -> Result<UnsupportedProcess> {
        Err(Error::Unsupported(
            "this platform has no RawProcess backend",
        ))
    }
}

impl RawProcess for UnsupportedProcess {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn is_local(&self) -> bool {
        false
    }

    fn read_memory(&self, _addr: usize, _size: usize) -> Result<Vec<u8>> {
        Err(Error::Unsupported("read_memory"))
    }

    fn write_memory(&self, _addr: usize, _buf: &[u8]) -> Result<usize> {
        Err(Error::Unsupported("write_memory"))
    }

    fn allocate_memory(&self, _size: usize, _perms: Permissions) -> Result<usize> {
        Err(Error::Unsupported("allocate_memory"))
    }

    fn free_memory(&self, _addr: usize, _size: usize) -> Result<()> {
        Err(Error::Unsupported("free_memory"))
    }
}
