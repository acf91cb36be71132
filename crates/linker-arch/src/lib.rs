//! The architecture adapter: a pure, reentrant mapping from relocation kind
//! to the byte-patching function that kind means on a given ISA.
//!
//! This crate owns only the narrow interface the core linker consumes
//! (§4.2/§6 of the design); real per-ISA knowledge belongs to whoever builds
//! an [`Architecture`] instance. [`simple`] provides one worked example used
//! by this crate's own tests and by the `linker` crate's scenario tests.

pub mod error;
pub mod registry;
pub mod simple;

pub use error::ArchError;
pub use registry::{ArchitectureBuilder, StaticArchitecture};

use linker_object::RelocKind;

/// Patches `data` (the bytes at the relocation site, at least as wide as the
/// relocation kind requires) in place, given the resolved symbol value and
/// the absolute address of the relocation site itself.
///
/// A plain function pointer, not a `Box<dyn Fn>`: the set of relocation kinds
/// for a given architecture is closed and known at the point the adapter is
/// built, and a bare `fn` is automatically `Send + Sync + 'static`, which is
/// what lets one `Architecture` be shared across concurrent link invocations.
pub type RelocFn = fn(sym_value: u64, data: &mut [u8], site_address: u64);

/// A registry of relocation kinds for one instruction set architecture.
///
/// Implementations must be pure and reentrant: `get_reloc` and the functions
/// it returns must not read or write any shared state, so that a host can use
/// one `Architecture` across multiple concurrent link invocations.
pub trait Architecture: Send + Sync {
    /// This architecture's identity, used for the `ArchitectureMismatch` check.
    fn name(&self) -> &str;

    /// Looks up the patch function for `kind`.
    fn get_reloc(&self, kind: RelocKind) -> Result<RelocFn, ArchError>;
}
