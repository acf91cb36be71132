//! Errors raised while mutating an [`crate::object::Object`] directly.
//!
//! These are the errors the object model itself can detect. The merger and
//! layout engine in the `linker` crate wrap these (see `linker::error::LinkError`)
//! alongside errors of their own.

/// A failure raised by an [`crate::object::Object`] operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// Two symbols with the same name were added to one object.
    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    /// A synthesized boundary section collided with an existing section name.
    #[error("duplicate section: {0}")]
    DuplicateSection(String),

    /// A symbol or relocation referenced a section absent from its source object.
    #[error("malformed input: section {section:?} referenced by {referrer} does not exist")]
    MalformedInput {
        /// The section name that was referenced but not found.
        section: String,
        /// What referenced the missing section (a symbol or relocation name/description).
        referrer: String,
    },
}
