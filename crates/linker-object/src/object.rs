//! The aggregate object: sections, symbols, relocations, images and debug info.

use std::collections::BTreeMap;

use crate::debug_info::DebugInfo;
use crate::error::ObjectError;
use crate::image::Image;
use crate::relocation::Relocation;
use crate::section::Section;
use crate::symbol::Symbol;

/// Tracks how far a destination object has progressed through linking.
///
/// Transitions are one-way: `Empty -> Merged -> LaidOut -> { Polished | PartiallyLinked }`.
/// The stage exists for introspection and as a defensive check in
/// [`Object::get_symbol_value`]; it is advanced by the `linker` crate's
/// orchestrator as each stage completes, not by the object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    /// Freshly constructed, nothing merged in yet.
    Empty,
    /// The merger has concatenated all input sections, symbols and relocations.
    Merged,
    /// The layout engine has assigned every placed section an address.
    LaidOut,
    /// A final (non-partial) link: relocations have been applied and cleared.
    Polished,
    /// A partial link: relocations remain, to be resolved by a later link.
    PartiallyLinked,
}

impl LinkStage {
    fn is_laid_out_or_later(self) -> bool {
        matches!(
            self,
            LinkStage::LaidOut | LinkStage::Polished | LinkStage::PartiallyLinked
        )
    }
}

/// The linker's in-memory object: sections, symbols, relocations, images and
/// debug info, plus the invariants that tie them together.
///
/// The same type represents both an immutable input object and the object
/// under construction by a link: the merger, layout engine and relocator
/// mutate a destination `Object` exclusively through the methods below.
#[derive(Debug, Clone)]
pub struct Object {
    architecture: String,
    sections: Vec<Section>,
    symbols: BTreeMap<String, Symbol>,
    relocations: Vec<Relocation>,
    images: Vec<Image>,
    debug_info: DebugInfo,
    stage: LinkStage,
}

impl Object {
    /// Creates a fresh, empty object for the given architecture identity.
    pub fn new(architecture: impl Into<String>) -> Self {
        Self {
            architecture: architecture.into(),
            sections: Vec::new(),
            symbols: BTreeMap::new(),
            relocations: Vec::new(),
            images: Vec::new(),
            debug_info: DebugInfo::new(),
            stage: LinkStage::Empty,
        }
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn stage(&self) -> LinkStage {
        self.stage
    }

    /// Advances the object's recorded link stage.
    ///
    /// Called by the orchestrator in the `linker` crate as the merger, layout
    /// engine and relocator each finish their pass. Intentionally public: the
    /// object model does not itself perform merging, layout or relocation, so
    /// the component that does must be able to record that it has.
    ///
    /// # Panics
    ///
    /// Panics if `next` is not a valid successor of the current stage; this
    /// indicates a bug in the orchestrator, not malformed input.
    pub fn advance_stage(&mut self, next: LinkStage) {
        let valid = matches!(
            (self.stage, next),
            (LinkStage::Empty, LinkStage::Merged)
                | (LinkStage::Merged, LinkStage::LaidOut)
                | (LinkStage::LaidOut, LinkStage::Polished)
                | (LinkStage::LaidOut, LinkStage::PartiallyLinked)
        );
        assert!(
            valid,
            "invalid link stage transition: {:?} -> {:?}",
            self.stage, next
        );
        self.stage = next;
    }

    // --- Sections ---------------------------------------------------------

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name() == name)
    }

    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn get_section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name() == name)
    }

    /// Returns the existing section of this name, or creates an empty one
    /// (alignment 1) and returns that.
    pub fn get_or_create_section(&mut self, name: &str) -> &mut Section {
        if let Some(index) = self.sections.iter().position(|s| s.name() == name) {
            &mut self.sections[index]
        } else {
            self.sections.push(Section::new(name));
            self.sections.last_mut().expect("just pushed")
        }
    }

    // --- Symbols ------------------------------------------------------------

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Adds a symbol, failing with [`ObjectError::DuplicateSymbol`] if one of
    /// this name already exists.
    pub fn add_symbol(
        &mut self,
        name: impl Into<String>,
        value: u64,
        section: impl Into<String>,
    ) -> Result<(), ObjectError> {
        let name = name.into();
        if self.symbols.contains_key(&name) {
            return Err(ObjectError::DuplicateSymbol(name));
        }
        self.symbols
            .insert(name.clone(), Symbol::new(name, value, section));
        Ok(())
    }

    /// Returns the absolute address of a resolved symbol: `section.address() + value`.
    ///
    /// Requires the object to have reached [`LinkStage::LaidOut`] or later;
    /// before that the referenced section has no address yet.
    pub fn get_symbol_value(&self, name: &str) -> Option<u64> {
        if !self.stage.is_laid_out_or_later() {
            return None;
        }
        let symbol = self.symbols.get(name)?;
        let section = self.get_section(symbol.section())?;
        Some(section.address()? + symbol.value())
    }

    // --- Relocations ----------------------------------------------------

    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    pub fn relocations_mut(&mut self) -> &mut Vec<Relocation> {
        &mut self.relocations
    }

    /// Appends a relocation. Always succeeds; order is preserved.
    pub fn add_relocation(&mut self, relocation: Relocation) {
        self.relocations.push(relocation);
    }

    /// Removes all relocations that have been applied. Idempotent: calling
    /// this on an already-polished object is a no-op.
    pub fn polish(&mut self) {
        self.relocations.clear();
    }

    // --- Images -----------------------------------------------------------

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn add_image(&mut self, image: Image) {
        self.images.push(image);
    }

    /// The size of `image`: `max(section.address + section.size) - location`
    /// over its member sections, or zero if it holds none.
    pub fn image_size(&self, image: &Image) -> u64 {
        image
            .sections()
            .iter()
            .filter_map(|name| self.get_section(name))
            .filter_map(|section| Some(section.address()? + section.size()))
            .max()
            .map_or(0, |end| end.saturating_sub(image.location()))
    }

    // --- Debug info -------------------------------------------------------

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    pub fn debug_info_mut(&mut self) -> &mut DebugInfo {
        &mut self.debug_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_section_creates_once() {
        let mut object = Object::new("test-arch");
        object.get_or_create_section(".text").extend(&[1, 2, 3]);
        object.get_or_create_section(".text").extend(&[4]);
        let section = object.get_section(".text").unwrap();
        assert_eq!(section.data(), &[1, 2, 3, 4]);
        assert_eq!(object.sections().count(), 1);
    }

    #[test]
    fn add_symbol_rejects_duplicates() {
        let mut object = Object::new("test-arch");
        object.add_symbol("foo", 0, ".text").unwrap();
        let err = object.add_symbol("foo", 4, ".text").unwrap_err();
        assert_eq!(err, ObjectError::DuplicateSymbol("foo".to_string()));
    }

    #[test]
    fn get_symbol_value_requires_layout() {
        let mut object = Object::new("test-arch");
        object.get_or_create_section(".text").extend(&[0; 8]);
        object.add_symbol("foo", 4, ".text").unwrap();
        assert_eq!(object.get_symbol_value("foo"), None);

        object.advance_stage(LinkStage::Merged);
        object.advance_stage(LinkStage::LaidOut);
        object.get_section_mut(".text").unwrap().set_address(0x1000);
        assert_eq!(object.get_symbol_value("foo"), Some(0x1004));
    }

    #[test]
    fn polish_is_idempotent() {
        let mut object = Object::new("test-arch");
        object.add_relocation(Relocation::new(
            "foo",
            0,
            crate::relocation::RelocKind(0),
            ".text",
        ));
        object.polish();
        assert!(object.relocations().is_empty());
        object.polish();
        assert!(object.relocations().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid link stage transition")]
    fn advance_stage_rejects_backwards_transition() {
        let mut object = Object::new("test-arch");
        object.advance_stage(LinkStage::Merged);
        object.advance_stage(LinkStage::Empty);
    }
}
