//! The in-memory object model shared by every stage of the linker: sections,
//! symbols, relocations, images and debug records, along with the invariants
//! that keep them consistent.
//!
//! This crate has no opinion on architectures or on how objects are merged,
//! laid out or relocated — see the `linker-arch` and `linker` crates for that.
//! It only owns the data shape and the handful of operations (§4.1 of the
//! design) that every other component builds on.

pub mod debug_info;
pub mod error;
pub mod image;
pub mod object;
pub mod relocation;
pub mod section;
pub mod symbol;

pub use debug_info::{Address, DebugFunction, DebugInfo, DebugLocation, DebugType, DebugVariable, SourceLoc};
pub use error::ObjectError;
pub use image::Image;
pub use object::{LinkStage, Object};
pub use relocation::{RelocKind, Relocation};
pub use section::Section;
pub use symbol::Symbol;
