//! The fixed machine-code word injected at a traced thread's instruction
//! pointer to make it perform one arbitrary syscall.

use static_assertions::const_assert;

/// `syscall; int3; nop; nop; nop; nop; nop`, little-endian, as a single
/// 8-byte word ready to `PTRACE_POKETEXT` at `rip`.
///
/// `syscall` (`0f 05`) executes whatever is in `rax`/`rdi`/`rsi`/`rdx`/`r10`/
/// `r8`/`r9`. `int3` (`cc`) traps deterministically right after, so the
/// single-step loop in [`crate::trampoline`] always lands on a known
/// `SIGTRAP` rather than racing ahead into whatever instruction used to
/// live at this address. The five `nop`s pad the word out and are never
/// executed.
pub const SYSCALL_SHELLCODE: u64 = 0x9090_9090_90CC_050F;

const_assert!(std::mem::size_of::<u64>() == 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_to_syscall_int3_and_five_nops() {
        assert_eq!(
            SYSCALL_SHELLCODE.to_le_bytes(),
            [0x0f, 0x05, 0xcc, 0x90, 0x90, 0x90, 0x90, 0x90]
        );
    }
}
