//! The single structured failure type returned by [`crate::Linker::link`].

use linker_arch::ArchError;
use linker_object::{ObjectError, RelocKind};

/// Every way a link can fail. There is no partial-recovery or best-effort
/// path: the first error encountered aborts the link.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// An input object's architecture differs from the linker's.
    #[error("architecture mismatch: linker is {expected:?}, input object is {found:?}")]
    ArchitectureMismatch { expected: String, found: String },

    /// Two symbols of the same name, across inputs or synthesized by layout.
    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    /// Layout tried to synthesize a boundary section whose name collides
    /// with an existing section.
    #[error("duplicate section: {0}")]
    DuplicateSection(String),

    /// A symbol or relocation referenced a section absent from its own input object.
    #[error("malformed input: section {section:?} referenced by {referrer} does not exist")]
    MalformedInput { section: String, referrer: String },

    /// A relocation's target symbol was never defined, during a non-partial link.
    #[error("undefined reference: {0}")]
    UndefinedReference(String),

    /// The architecture adapter has no patch function for this relocation kind.
    #[error("unknown relocation type: {0}")]
    UnknownRelocation(RelocKind),

    /// A region's placed contents exceeded its declared size.
    #[error("memory exceeds size in region {region:?}: {actual} > {limit}")]
    MemoryOverflow {
        region: String,
        actual: u64,
        limit: u64,
    },
}

impl From<ObjectError> for LinkError {
    fn from(err: ObjectError) -> Self {
        match err {
            ObjectError::DuplicateSymbol(name) => LinkError::DuplicateSymbol(name),
            ObjectError::DuplicateSection(name) => LinkError::DuplicateSection(name),
            ObjectError::MalformedInput { section, referrer } => {
                LinkError::MalformedInput { section, referrer }
            }
        }
    }
}

impl From<ArchError> for LinkError {
    fn from(err: ArchError) -> Self {
        match err {
            ArchError::UnknownRelocation(kind) => LinkError::UnknownRelocation(kind),
        }
    }
}
