use linker_object::RelocKind;

/// A failure raised while consulting an [`crate::Architecture`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchError {
    /// No patch function is registered for this relocation kind.
    #[error("unknown relocation type: {0}")]
    UnknownRelocation(RelocKind),
}
