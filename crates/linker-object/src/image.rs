//! A placed memory region: an ordered sequence of sections at known addresses.

/// A memory region populated by the layout engine.
///
/// `sections` holds section names in placement order; each section named here
/// has already had [`crate::section::Section::address`] set. The size of the
/// image is derived from the sections it holds (see
/// [`crate::object::Object::image_size`]) rather than stored redundantly,
/// since the underlying sections are the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    name: String,
    location: u64,
    sections: Vec<String>,
}

impl Image {
    pub fn new(name: impl Into<String>, location: u64) -> Self {
        Self {
            name: name.into(),
            location,
            sections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u64 {
        self.location
    }

    /// Section names, in the order they were placed into this image.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Records that `name` has been placed into this image.
    ///
    /// Callers (the layout engine) are trusted to only call this once the
    /// named section has already had its address set; this type does not
    /// re-check that itself.
    pub fn add_section(&mut self, name: impl Into<String>) {
        self.sections.push(name.into());
    }
}
