//! C5: resolves every relocation left on a laid-out destination object by
//! dispatching to the architecture adapter.

use linker_arch::Architecture;
use linker_object::Object;

use crate::error::LinkError;

/// Applies every relocation in `dst` (which must be [`linker_object::LinkStage::LaidOut`]),
/// in emission order. Does not touch `dst`'s link stage; the caller polishes
/// or marks it partially linked afterwards.
pub fn relocate(dst: &mut Object, arch: &dyn Architecture) -> Result<(), LinkError> {
    for index in 0..dst.relocations().len() {
        let relocation = dst.relocations()[index].clone();

        let sym_value = dst
            .get_symbol_value(relocation.sym())
            .ok_or_else(|| LinkError::UndefinedReference(relocation.sym().to_string()))?;

        let section_address = dst
            .get_section(relocation.section())
            .and_then(|section| section.address())
            .ok_or_else(|| LinkError::MalformedInput {
                section: relocation.section().to_string(),
                referrer: format!("relocation against {:?}", relocation.sym()),
            })?;
        let site_address = section_address + relocation.offset();

        let patch = arch.get_reloc(relocation.typ())?;

        let section = dst
            .get_section_mut(relocation.section())
            .expect("section address resolved above");
        let offset = relocation.offset() as usize;
        patch(sym_value, &mut section.data_mut()[offset..], site_address);

        log::trace!(
            "relocated {:?} at {section:?}+{offset} -> 0x{sym_value:X}",
            relocation.sym(),
            section = relocation.section()
        );
    }
    Ok(())
}
