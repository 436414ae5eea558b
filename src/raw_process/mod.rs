//! The `RawProcess` contract: read/write/allocate/free memory, local or
//! remote, presented uniformly so [`crate::memory_block::MemoryBlock`]
//! never needs to know which backend it is talking to.

use crate::error::Result;
use crate::permissions::Permissions;
use nix::unistd::Pid;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxProcess;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsProcess;

#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported;
#[cfg(not(any(target_os = "linux", windows)))]
pub use unsupported::UnsupportedProcess;

/// Implemented once per OS backend. `MemoryBlock` and `Process` only ever
/// see this trait, never a concrete backend type.
pub trait RawProcess {
    fn pid(&self) -> Pid;
    fn is_local(&self) -> bool;

    /// Reads exactly `size` bytes starting at `addr`. Never returns a short
    /// read: either all of `size` came back, or an `Err`.
    fn read_memory(&self, addr: usize, size: usize) -> Result<Vec<u8>>;

    /// Writes all of `buf` starting at `addr`. Never partially writes:
    /// either all of `buf` went through, or an `Err`.
    fn write_memory(&self, addr: usize, buf: &[u8]) -> Result<usize>;

    /// Allocates `size` bytes with the given protection and returns the
    /// base address of the new mapping.
    fn allocate_memory(&self, size: usize, perms: Permissions) -> Result<usize>;

    /// Frees a mapping previously returned by `allocate_memory`. `size`
    /// must be the exact size that was allocated.
    fn free_memory(&self, addr: usize, size: usize) -> Result<()>;
}

/// Opens a handle to the process identified by `pid`, picking the backend
/// for the current target OS at compile time. Fails with
/// [`crate::error::Error::NoSuchProcess`] if no such process exists.
pub fn open_raw_process(pid: Pid) -> Result<Box<dyn RawProcess>> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(LinuxProcess::open(pid)?))
    }

    #[cfg(windows)]
    {
        Ok(Box::new(WindowsProcess::open(pid)?))
    }

    #[cfg(not(any(target_os = "linux", windows)))]
    {
        Ok(Box::new(UnsupportedProcess::open(pid)?))
    }
}
