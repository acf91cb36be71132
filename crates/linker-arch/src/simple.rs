//! A small example architecture, useful for tests and as a template for real ones.
//!
//! Its relocation semantics follow the same `Absolute`/`Relative` split used
//! by hand-written bytecode relocations elsewhere in this ecosystem: absolute
//! relocations write the target address directly, relative ones write the
//! displacement from the relocation site to the target.

use linker_object::RelocKind;

use crate::registry::{ArchitectureBuilder, StaticArchitecture};

/// 8-bit absolute patch: writes the low byte of `sym_value`.
pub const ABS8: RelocKind = RelocKind(0);
/// 16-bit little-endian absolute patch.
pub const ABS16: RelocKind = RelocKind(1);
/// 32-bit little-endian absolute patch.
pub const ABS32: RelocKind = RelocKind(2);
/// 32-bit little-endian relative patch: `target - site_address`.
pub const REL32: RelocKind = RelocKind(3);

fn patch_abs8(sym_value: u64, data: &mut [u8], _site_address: u64) {
    data[0] = sym_value as u8;
}

fn patch_abs16(sym_value: u64, data: &mut [u8], _site_address: u64) {
    data[..2].copy_from_slice(&(sym_value as u16).to_le_bytes());
}

fn patch_abs32(sym_value: u64, data: &mut [u8], _site_address: u64) {
    data[..4].copy_from_slice(&(sym_value as u32).to_le_bytes());
}

fn patch_rel32(sym_value: u64, data: &mut [u8], site_address: u64) {
    let displacement = (sym_value as i64).wrapping_sub(site_address as i64) as i32;
    data[..4].copy_from_slice(&displacement.to_le_bytes());
}

/// Builds the example `"simple32"` architecture used by this crate's tests
/// and by the worked scenarios in the `linker` crate.
pub fn simple32() -> StaticArchitecture {
    ArchitectureBuilder::new("simple32")
        .with_reloc(ABS8, patch_abs8)
        .with_reloc(ABS16, patch_abs16)
        .with_reloc(ABS32, patch_abs32)
        .with_reloc(REL32, patch_rel32)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Architecture;

    #[test]
    fn absolute32_writes_little_endian() {
        let arch = simple32();
        let patch = arch.get_reloc(ABS32).unwrap();
        let mut data = [0u8; 4];
        patch(0x0800_1004, &mut data, 0);
        assert_eq!(data, [0x04, 0x10, 0x00, 0x08]);
    }

    #[test]
    fn relative32_subtracts_site_address() {
        let arch = simple32();
        let patch = arch.get_reloc(REL32).unwrap();
        let mut data = [0u8; 4];
        patch(0x2000_0010, &mut data, 0x2000_0000);
        assert_eq!(i32::from_le_bytes(data), 0x10);
    }

    #[test]
    fn relative32_handles_backward_targets() {
        let arch = simple32();
        let patch = arch.get_reloc(REL32).unwrap();
        let mut data = [0u8; 4];
        patch(0x2000_0000, &mut data, 0x2000_0010);
        assert_eq!(i32::from_le_bytes(data), -0x10);
    }
}
