use bitflags::bitflags;
use nix::sys::mman::ProtFlags;

bitflags! {
    /// Access permissions associated with a [`MemoryBlock`](crate::memory_block::MemoryBlock).
    ///
    /// Permissions are checked before every read, write or execute against
    /// a block to prevent invalid interfacing with foreign memory; they do
    /// not themselves enforce anything the kernel wouldn't already reject,
    /// they just let callers fail fast with a specific [`Error`](crate::error::Error).
    pub struct Permissions: u32 {
        /// Memory can be read from the block.
        const READ = 1 << 0;
        /// Memory can be written to the block.
        const WRITE = 1 << 1;
        /// Memory at the block is executable.
        const EXECUTE = 1 << 2;
        /// All permissions that can be granted.
        const ALL = Self::READ.bits | Self::WRITE.bits | Self::EXECUTE.bits;
    }
}

impl Permissions {
    /// Maps this permission set to the matching `mmap`/`mprotect` protection
    /// flags. Upgrading or downgrading an existing mapping's protection is
    /// not part of this crate (see `SPEC_FULL.md` open questions); this is
    /// purely the one-way translation used at allocation time.
    pub fn to_prot_flags(self) -> ProtFlags {
        let mut prot = ProtFlags::PROT_NONE;
        if self.contains(Permissions::READ) {
            prot |= ProtFlags::PROT_READ;
        }
        if self.contains(Permissions::WRITE) {
            prot |= ProtFlags::PROT_WRITE;
        }
        if self.contains(Permissions::EXECUTE) {
            prot |= ProtFlags::PROT_EXEC;
        }
        prot
    }

    /// Same mapping, represented as the raw `c_int` the trampoline passes
    /// as the `prot` argument of a remote `mmap` syscall.
    pub fn to_prot_raw(self) -> libc::c_int {
        self.to_prot_flags().bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_union_of_the_three_bits() {
        assert_eq!(Permissions::ALL, Permissions::READ | Permissions::WRITE | Permissions::EXECUTE);
    }

    #[test]
    fn empty_maps_to_prot_none() {
        assert_eq!(Permissions::empty().to_prot_flags(), ProtFlags::PROT_NONE);
    }

    #[test]
    fn read_write_maps_bit_for_bit() {
        let perms = Permissions::READ | Permissions::WRITE;
        let prot = perms.to_prot_flags();
        assert!(prot.contains(ProtFlags::PROT_READ));
        assert!(prot.contains(ProtFlags::PROT_WRITE));
        assert!(!prot.contains(ProtFlags::PROT_EXEC));
    }

    #[test]
    fn execute_maps_to_prot_exec() {
        let prot = Permissions::EXECUTE.to_prot_flags();
        assert!(prot.contains(ProtFlags::PROT_EXEC));
        assert!(!prot.contains(ProtFlags::PROT_READ));
    }
}
