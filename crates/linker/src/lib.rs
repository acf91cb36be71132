//! The link and layout core: merges relocatable objects, places their
//! sections into memory regions, and (for a final link) applies relocations.
//!
//! This crate owns orchestration only. The object model lives in
//! `linker-object`, per-ISA relocation semantics live in `linker-arch`; this
//! crate wires the two together the way ppci's `binutils/linker.py` wires its
//! own object, architecture and layout modules together behind one `Linker`.

pub mod error;
pub mod layout;
pub mod merge;
pub mod relocate;
pub mod reporter;

pub use error::LinkError;
pub use layout::{LayoutBuilder, LayoutDescription, LayoutInput, MemoryRegion, RegionBuilder};
pub use reporter::{LoggingReporter, NullReporter, Reporter};

use linker_arch::Architecture;
use linker_object::{LinkStage, Object};

/// Links objects against one architecture, narrating progress through one reporter.
///
/// Mirrors ppci's `Linker(arch, reporter)`: both collaborators are injected,
/// and a `Linker` holds no state across calls to [`Linker::link`].
pub struct Linker<A, R> {
    arch: A,
    reporter: R,
}

impl<A: Architecture, R: Reporter> Linker<A, R> {
    pub fn new(arch: A, reporter: R) -> Self {
        Self { arch, reporter }
    }

    pub fn arch(&self) -> &A {
        &self.arch
    }

    /// Links `inputs` against `layout`.
    ///
    /// If `partial_link`, unresolved relocations are carried into the result
    /// rather than resolved, and `UndefinedReference` is never raised. If
    /// `debug`, debug records are merged and their addresses rewritten.
    pub fn link(
        &mut self,
        inputs: &[Object],
        layout: &LayoutDescription,
        partial_link: bool,
        debug: bool,
    ) -> Result<Object, LinkError> {
        for input in inputs {
            if input.architecture() != self.arch.name() {
                return Err(LinkError::ArchitectureMismatch {
                    expected: self.arch.name().to_string(),
                    found: input.architecture().to_string(),
                });
            }
        }

        self.reporter.heading(1, "Linking");

        let mut dst = Object::new(self.arch.name());
        merge::merge_objects(inputs, &mut dst, debug)?;
        layout::layout_objects(&mut dst, layout)?;

        for section in dst.sections() {
            if let Some(address) = section.address() {
                self.reporter
                    .message(&format!("{} at 0x{:X}", section.name(), address));
            }
        }
        for image in dst.images() {
            self.reporter.message(&format!(
                "{} at 0x{:X}, size {}",
                image.name(),
                image.location(),
                dst.image_size(image)
            ));
        }

        if partial_link {
            dst.advance_stage(LinkStage::PartiallyLinked);
        } else {
            relocate::relocate(&mut dst, &self.arch)?;
            dst.polish();
            dst.advance_stage(LinkStage::Polished);
        }

        Ok(dst)
    }
}
