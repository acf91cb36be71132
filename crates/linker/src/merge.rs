//! C3: concatenates same-named sections across inputs and rewrites the
//! offsets carried by symbols, relocations and (optionally) debug records.

use std::collections::HashMap;

use linker_object::{DebugFunction, DebugLocation, DebugVariable, LinkStage, Object};

use crate::error::LinkError;

/// Merges `inputs` into `dst`, in order. `dst` must be freshly created
/// ([`LinkStage::Empty`]); on success it is advanced to [`LinkStage::Merged`].
pub fn merge_objects(inputs: &[Object], dst: &mut Object, debug: bool) -> Result<(), LinkError> {
    for input in inputs {
        // Scoped to this one input object; discarded once it is fully merged.
        let mut offsets: HashMap<String, u64> = HashMap::new();

        for section in input.sections() {
            let dst_section = dst.get_or_create_section(section.name());

            // Pre-pad so the incoming content starts on an aligned boundary.
            let remainder = dst_section.size() % section.alignment();
            if remainder != 0 {
                dst_section.pad(section.alignment() - remainder);
            }
            dst_section.raise_alignment(section.alignment());

            let offset = dst_section.size();
            offsets.insert(section.name().to_string(), offset);
            dst_section.extend(section.data());

            log::debug!(
                "{offset} {name:?} ({size} bytes)",
                name = section.name(),
                size = section.size()
            );
        }

        for symbol in input.symbols() {
            let offset = *offsets.get(symbol.section()).ok_or_else(|| LinkError::MalformedInput {
                section: symbol.section().to_string(),
                referrer: format!("symbol {:?}", symbol.name()),
            })?;
            let symbol = symbol.clone().with_added_offset(offset);
            dst.add_symbol(symbol.name(), symbol.value(), symbol.section())?;
        }

        for reloc in input.relocations() {
            let offset = *offsets.get(reloc.section()).ok_or_else(|| LinkError::MalformedInput {
                section: reloc.section().to_string(),
                referrer: format!("relocation against {:?}", reloc.sym()),
            })?;
            dst.add_relocation(reloc.clone().with_added_offset(offset));
        }

        if debug {
            merge_debug_info(input, dst, &offsets)?;
        }
    }

    dst.advance_stage(LinkStage::Merged);
    Ok(())
}

fn merge_debug_info(
    input: &Object,
    dst: &mut Object,
    offsets: &HashMap<String, u64>,
) -> Result<(), LinkError> {
    let adjust = |address: &(String, u64)| -> Result<(String, u64), LinkError> {
        let (section, off) = address;
        let base = *offsets.get(section).ok_or_else(|| LinkError::MalformedInput {
            section: section.clone(),
            referrer: "debug record".to_string(),
        })?;
        Ok((section.clone(), base + off))
    };

    let debug = input.debug_info();
    for location in &debug.locations {
        dst.debug_info_mut().locations.push(DebugLocation {
            loc: location.loc.clone(),
            address: adjust(&location.address)?,
        });
    }
    for function in &debug.functions {
        dst.debug_info_mut().functions.push(DebugFunction {
            name: function.name.clone(),
            loc: function.loc.clone(),
            begin: adjust(&function.begin)?,
            end: adjust(&function.end)?,
        });
    }
    // Types carry no address and are not retargeted.
    for typ in &debug.types {
        dst.debug_info_mut().types.push(typ.clone());
    }
    for variable in &debug.variables {
        dst.debug_info_mut().variables.push(DebugVariable {
            name: variable.name.clone(),
            typ: variable.typ.clone(),
            loc: variable.loc.clone(),
            address: adjust(&variable.address)?,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linker_object::{RelocKind, Relocation};

    fn section_with(object: &mut Object, name: &str, alignment: u64, data: &[u8]) {
        let section = object.get_or_create_section(name);
        section.raise_alignment(alignment);
        section.extend(data);
    }

    #[test]
    fn s1_merge_and_align() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 4, &[0x01, 0x02, 0x03]);
        let mut b = Object::new("arch");
        section_with(&mut b, ".text", 8, &[0xAA, 0xBB]);

        let mut dst = Object::new("arch");
        merge_objects(&[a, b], &mut dst, false).unwrap();

        let text = dst.get_section(".text").unwrap();
        assert_eq!(text.alignment(), 8);
        assert_eq!(
            text.data(),
            &[0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xAA, 0xBB]
        );
    }

    #[test]
    fn s2_symbol_rewrite() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 1, &[0; 16]);
        a.add_symbol("foo", 4, ".text").unwrap();

        let mut b = Object::new("arch");
        section_with(&mut b, ".text", 1, &[0; 8]);
        b.add_symbol("bar", 2, ".text").unwrap();

        let mut dst = Object::new("arch");
        merge_objects(&[a, b], &mut dst, false).unwrap();

        assert_eq!(dst.get_symbol("foo").unwrap().value(), 4);
        assert_eq!(dst.get_symbol("bar").unwrap().value(), 18);
    }

    #[test]
    fn duplicate_symbol_across_inputs_is_an_error() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 1, &[0; 4]);
        a.add_symbol("foo", 0, ".text").unwrap();

        let mut b = Object::new("arch");
        section_with(&mut b, ".text", 1, &[0; 4]);
        b.add_symbol("foo", 0, ".text").unwrap();

        let mut dst = Object::new("arch");
        let err = merge_objects(&[a, b], &mut dst, false).unwrap_err();
        assert_eq!(err, LinkError::DuplicateSymbol("foo".to_string()));
    }

    #[test]
    fn relocation_against_unknown_section_is_malformed() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 1, &[0; 4]);
        a.add_relocation(Relocation::new("missing_section_target", 0, RelocKind(0), ".bogus"));

        let mut dst = Object::new("arch");
        let err = merge_objects(&[a], &mut dst, false).unwrap_err();
        assert!(matches!(err, LinkError::MalformedInput { .. }));
    }

    #[test]
    fn debug_locations_are_rewritten_when_requested() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 1, &[0; 4]);
        let mut b = Object::new("arch");
        section_with(&mut b, ".text", 1, &[0; 4]);
        b.debug_info_mut().locations.push(DebugLocation {
            loc: linker_object::SourceLoc {
                file: "main.c".to_string(),
                line: 10,
            },
            address: (".text".to_string(), 1),
        });

        let mut dst = Object::new("arch");
        merge_objects(&[a, b], &mut dst, true).unwrap();

        let location = &dst.debug_info().locations[0];
        assert_eq!(location.address, (".text".to_string(), 5));
    }

    #[test]
    fn debug_info_not_merged_without_flag() {
        let mut a = Object::new("arch");
        section_with(&mut a, ".text", 1, &[0; 4]);
        a.debug_info_mut().locations.push(DebugLocation {
            loc: linker_object::SourceLoc {
                file: "main.c".to_string(),
                line: 1,
            },
            address: (".text".to_string(), 0),
        });

        let mut dst = Object::new("arch");
        merge_objects(&[a], &mut dst, false).unwrap();
        assert!(dst.debug_info().locations.is_empty());
    }
}
