//! Typed bindings to the host kernel's process-memory, mapping and tracing
//! primitives, plus the injected shellcode blob.
//!
//! `libc` already declares `ptrace`, `process_vm_readv`/`writev` and the
//! `mmap`/`munmap` family with loose `c_long`/`c_void` signatures; this
//! module is the one place that calls them and converts their return
//! convention into [`crate::error::Error`]. No other module in this crate
//! calls these functions directly.

pub mod ptrace;
pub mod shellcode;
