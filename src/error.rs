use std::fmt;

/// Errors that can arise from any operation in this crate.
///
/// Every fallible public operation returns one of these kinds rather than
/// a generic I/O error, so callers can match on the specific failure
/// instead of string-sniffing a message.
#[derive(Debug)]
pub enum Error {
    /// The PID does not name a process that exists (or existed at open time).
    NoSuchProcess,
    /// Missing read/write/execute permission on a block, or a kernel-level
    /// privilege failure on trace/map.
    PermissionDenied,
    /// The requested read or write would cross a block's boundary.
    OutOfBounds,
    /// A scatter/gather transfer returned fewer bytes than requested.
    PartialTransfer,
    /// A trampolined `mmap` returned a value in the syscall error window.
    RemoteAllocationFailed(i64),
    /// A trampolined `munmap` returned a value in the syscall error window.
    RemoteFreeFailed(i64),
    /// The remote thread stopped with a signal other than `SIGTRAP`/`SIGSTOP`
    /// while a trampoline call was in flight.
    UnexpectedStop(nix::sys::signal::Signal),
    /// The remote thread exited or was killed while a trampoline call was
    /// in flight.
    UnexpectedTermination,
    /// An operation is ill-defined on this backend, e.g. executing code in
    /// a foreign address space, or any operation at all on the Windows stub.
    Unsupported(&'static str),
    /// The block was already deallocated, explicitly or by its owner being
    /// dropped; every operation after that point fails with this.
    BlockFreed,
    /// A kernel call failed for a reason not covered by a more specific
    /// variant above; the original errno is preserved.
    Kernel(nix::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoSuchProcess => write!(f, "no such process"),
            Error::PermissionDenied => write!(f, "permission denied"),
            Error::OutOfBounds => write!(f, "operation out of block bounds"),
            Error::PartialTransfer => write!(f, "partial transfer to/from process memory"),
            Error::RemoteAllocationFailed(ret) => {
                write!(f, "remote allocation failed, syscall returned {}", ret)
            }
            Error::RemoteFreeFailed(ret) => {
                write!(f, "remote free failed, syscall returned {}", ret)
            }
            Error::UnexpectedStop(sig) => {
                write!(f, "remote thread stopped unexpectedly with {:?}", sig)
            }
            Error::UnexpectedTermination => {
                write!(f, "remote thread terminated unexpectedly during injection")
            }
            Error::Unsupported(what) => write!(f, "unsupported: {}", what),
            Error::BlockFreed => write!(f, "operation on a freed memory block"),
            Error::Kernel(e) => write!(f, "kernel error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Kernel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Self {
        match e {
            nix::Error::Sys(nix::errno::Errno::ESRCH) => Error::NoSuchProcess,
            nix::Error::Sys(nix::errno::Errno::EPERM) => Error::PermissionDenied,
            nix::Error::Sys(nix::errno::Errno::EACCES) => Error::PermissionDenied,
            other => Error::Kernel(other),
        }
    }
}

/// Syscalls invoked through the trampoline report errors inline, in the
/// window conventionally used by the Linux x86-64 syscall ABI: a return
/// value in `[-4096, -1)` encodes `-errno`. Other negative values (e.g. a
/// high mmap address) are valid results and must not be mistaken for
/// errors.
pub fn is_syscall_error(ret: i64) -> bool {
    ret >= -4096 && ret < -1
}
