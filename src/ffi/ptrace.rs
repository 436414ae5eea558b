//! The eight `ptrace(2)` requests the [`Tracer`](crate::tracer::Tracer)
//! needs, each given its own typed signature instead of the raw,
//! variadic `libc::ptrace` entry point.

use crate::error::{Error, Result};
use nix::errno::Errno;
use nix::unistd::Pid;
use std::ptr;

fn checked(ret: libc::c_long) -> Result<libc::c_long> {
    if ret == -1 {
        let errno = Errno::last();
        if errno != Errno::UnknownErrno {
            return Err(Error::from(nix::Error::Sys(errno)));
        }
    }
    Ok(ret)
}

/// `PTRACE_ATTACH`: request tracing control over `pid`.
pub fn attach(pid: Pid) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_ATTACH,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            ptr::null_mut::<libc::c_void>(),
        )
    };
    checked(ret).map(drop)
}

/// `PTRACE_DETACH`: release tracing control over `pid`, letting it run free.
pub fn detach(pid: Pid) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_DETACH,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            ptr::null_mut::<libc::c_void>(),
        )
    };
    checked(ret).map(drop)
}

/// `PTRACE_GETREGS`: snapshot the full general-purpose register file.
pub fn get_regs(pid: Pid) -> Result<libc::user_regs_struct> {
    let mut regs = std::mem::MaybeUninit::<libc::user_regs_struct>::uninit();
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_GETREGS,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            regs.as_mut_ptr() as *mut libc::c_void,
        )
    };
    checked(ret)?;
    Ok(unsafe { regs.assume_init() })
}

/// `PTRACE_SETREGS`: restore the full general-purpose register file.
pub fn set_regs(pid: Pid, regs: &libc::user_regs_struct) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_SETREGS,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            regs as *const libc::user_regs_struct as *mut libc::c_void,
        )
    };
    checked(ret).map(drop)
}

/// `PTRACE_PEEKTEXT`: read one machine word at `addr` in `pid`'s address
/// space. `-1` is a legitimate word value, so the error channel is only
/// consulted when the raw return equals `-1`.
pub fn peek_text(pid: Pid, addr: u64) -> Result<u64> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_PEEKTEXT,
            pid.as_raw(),
            addr as *mut libc::c_void,
            ptr::null_mut::<libc::c_void>(),
        )
    };
    let ret = checked(ret)?;
    Ok(ret as u64)
}

/// `PTRACE_POKETEXT`: write one machine word at `addr` in `pid`'s address
/// space.
pub fn poke_text(pid: Pid, addr: u64, word: u64) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_POKETEXT,
            pid.as_raw(),
            addr as *mut libc::c_void,
            word as *mut libc::c_void,
        )
    };
    checked(ret).map(drop)
}

/// `PTRACE_SINGLESTEP`: resume the traced thread for exactly one instruction.
pub fn single_step(pid: Pid) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_SINGLESTEP,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            ptr::null_mut::<libc::c_void>(),
        )
    };
    checked(ret).map(drop)
}

/// `PTRACE_CONT`: resume the traced thread until its next stop.
pub fn cont(pid: Pid) -> Result<()> {
    Errno::clear();
    let ret = unsafe {
        libc::ptrace(
            libc::PTRACE_CONT,
            pid.as_raw(),
            ptr::null_mut::<libc::c_void>(),
            ptr::null_mut::<libc::c_void>(),
        )
    };
    checked(ret).map(drop)
}
