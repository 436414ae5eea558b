//! Read, write, allocate and execute memory in local and foreign processes.
//!
//! The entry point is [`open_process`], which yields a [`Process`] handle.
//! A `Process` allocates [`MemoryBlock`]s, each a permission-tagged,
//! bounds-checked view over one mapping that supports read, write, fill,
//! clear, cross-process copy, and — for local blocks — execute.
//!
//! Foreign-process operations are built on a ptrace-based trampoline
//! (`trampoline`) that injects and single-steps one system call at a time
//! inside the target; see that module for the algorithm. Everything above
//! it is oblivious to whether it is talking to the calling process or
//! another one — that distinction is resolved once, in
//! [`raw_process::open_raw_process`], and hidden behind the `RawProcess`
//! trait from then on.

pub mod error;
mod ffi;
pub mod layout;
pub mod memory_block;
pub mod permissions;
mod raw_process;
pub mod process;
mod tracer;
mod trampoline;

pub use error::{Error, Result};
pub use layout::Layout;
pub use memory_block::MemoryBlock;
pub use permissions::Permissions;
pub use process::{open_process, Process};
