//! C4: interprets a [`LayoutDescription`], assigning absolute addresses to
//! sections, synthesizing boundary symbols, and building [`Image`]s.

use linker_object::{Image, LinkStage, Object};

use crate::error::LinkError;

/// One entry in a [`MemoryRegion`]'s input list.
///
/// A closed, tagged enum rather than a trait object: the set of input kinds
/// is fixed by this crate, and an exhaustive `match` on it is a compile-time
/// check that a new kind was wired up everywhere it needs to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutInput {
    /// Places an existing destination section at the current cursor.
    Section(String),
    /// Synthesizes a zero-sized boundary symbol at the current cursor.
    SymbolDefinition(String),
    /// Advances the cursor to the next multiple of `n` without placing anything.
    Align(u64),
}

/// A single memory region: a base address, a size budget, and an ordered
/// placement program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    name: String,
    location: u64,
    size: u64,
    inputs: Vec<LayoutInput>,
}

/// The full layout description: an ordered list of memory regions.
///
/// Produced by [`LayoutBuilder`]; this crate never parses a textual layout
/// format itself (see §6 of the design this mirrors).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutDescription {
    regions: Vec<MemoryRegion>,
}

impl LayoutDescription {
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}

/// Builds a [`LayoutDescription`] one region at a time, in the same
/// chained-builder style as `RelocatableBuffer::builder()`.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    regions: Vec<MemoryRegion>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a region. Call [`RegionBuilder::end`] to return here.
    pub fn region(self, name: impl Into<String>, location: u64, size: u64) -> RegionBuilder {
        RegionBuilder {
            layout: self,
            region: MemoryRegion {
                name: name.into(),
                location,
                size,
                inputs: Vec::new(),
            },
        }
    }

    pub fn build(self) -> LayoutDescription {
        LayoutDescription {
            regions: self.regions,
        }
    }
}

/// Accumulates one [`MemoryRegion`]'s placement inputs.
#[derive(Debug)]
pub struct RegionBuilder {
    layout: LayoutBuilder,
    region: MemoryRegion,
}

impl RegionBuilder {
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.region.inputs.push(LayoutInput::Section(name.into()));
        self
    }

    pub fn symbol(mut self, name: impl Into<String>) -> Self {
        self.region
            .inputs
            .push(LayoutInput::SymbolDefinition(name.into()));
        self
    }

    pub fn align(mut self, n: u64) -> Self {
        self.region.inputs.push(LayoutInput::Align(n));
        self
    }

    /// Closes this region and returns to the enclosing [`LayoutBuilder`].
    pub fn end(mut self) -> LayoutBuilder {
        self.layout.regions.push(self.region);
        self.layout
    }
}

fn ceil_to(cursor: u64, align: u64) -> u64 {
    cursor.div_ceil(align) * align
}

/// Lays `layout` out over `dst`, which must be [`LinkStage::Merged`]; on
/// success `dst` is advanced to [`LinkStage::LaidOut`].
pub fn layout_objects(dst: &mut Object, layout: &LayoutDescription) -> Result<(), LinkError> {
    for region in &layout.regions {
        let mut cursor = region.location;
        let mut image = Image::new(region.name.clone(), region.location);

        for input in &region.inputs {
            match input {
                LayoutInput::Section(name) => {
                    if !dst.has_section(name) {
                        return Err(LinkError::MalformedInput {
                            section: name.clone(),
                            referrer: format!("layout region {:?}", region.name),
                        });
                    }
                    let section = dst.get_section_mut(name).expect("checked above");
                    cursor = ceil_to(cursor, section.alignment());
                    section.set_address(cursor);
                    log::debug!("{name:?} placed at 0x{cursor:X}");
                    cursor += section.size();
                    image.add_section(name.clone());
                }
                LayoutInput::SymbolDefinition(name) => {
                    let synthetic = format!("_${name}_");
                    if dst.has_section(&synthetic) {
                        return Err(LinkError::DuplicateSection(synthetic));
                    }
                    let section = dst.get_or_create_section(&synthetic);
                    section.set_address(cursor);
                    image.add_section(synthetic.clone());
                    dst.add_symbol(name.clone(), 0, synthetic)?;
                    log::debug!("{name:?} defined at 0x{cursor:X}");
                }
                LayoutInput::Align(n) => {
                    cursor = ceil_to(cursor, *n);
                }
            }
        }

        let actual = dst.image_size(&image);
        if actual > region.size {
            return Err(LinkError::MemoryOverflow {
                region: region.name.clone(),
                actual,
                limit: region.size,
            });
        }
        dst.add_image(image);
    }

    dst.advance_stage(LinkStage::LaidOut);
    Ok(())
}
