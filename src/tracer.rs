//! The narrow set of debug-tracing operations the foreign-syscall
//! trampoline needs: attach, detach, register get/set, one-word text
//! peek/poke, and single-step/continue. Nothing here knows about syscalls
//! or shellcode; that lives in [`crate::trampoline`].

use crate::error::Result;
use crate::ffi::ptrace;
use nix::unistd::Pid;

/// A zero-sized handle onto the `ptrace` typed bindings.
///
/// `Tracer` holds no state of its own — every operation takes the `pid` it
/// applies to. Concurrent callers driving the same `pid` are not
/// serialized by this type; see `SPEC_FULL.md` §5.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tracer;

impl Tracer {
    pub fn new() -> Tracer {
        Tracer
    }

    /// Requests tracing control over `pid`. Fails with `PermissionDenied`
    /// (policy or missing privilege) or `NoSuchProcess`.
    pub fn attach(&self, pid: Pid) -> Result<()> {
        ptrace::attach(pid)
    }

    /// Releases tracing control over `pid`. Best-effort: callers in cleanup
    /// paths should log rather than propagate a failure here.
    pub fn detach(&self, pid: Pid) -> Result<()> {
        ptrace::detach(pid)
    }

    /// Snapshots the full general-purpose register file of `pid`.
    pub fn get_regs(&self, pid: Pid) -> Result<libc::user_regs_struct> {
        ptrace::get_regs(pid)
    }

    /// Restores the full general-purpose register file of `pid`.
    pub fn set_regs(&self, pid: Pid, regs: &libc::user_regs_struct) -> Result<()> {
        ptrace::set_regs(pid, regs)
    }

    /// Reads one machine word at `addr` in `pid`'s text region.
    pub fn peek_text(&self, pid: Pid, addr: u64) -> Result<u64> {
        ptrace::peek_text(pid, addr)
    }

    /// Writes one machine word at `addr` in `pid`'s text region.
    pub fn poke_text(&self, pid: Pid, addr: u64, word: u64) -> Result<()> {
        ptrace::poke_text(pid, addr, word)
    }

    /// Resumes `pid` for exactly one instruction.
    pub fn single_step(&self, pid: Pid) -> Result<()> {
        ptrace::single_step(pid)
    }

    /// Resumes `pid` until its next stop.
    pub fn continue_(&self, pid: Pid) -> Result<()> {
        ptrace::cont(pid)
    }
}
