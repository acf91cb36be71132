//! A passive sink for human-readable linking progress.
//!
//! Message text is not part of any contract here and must never be parsed by
//! a caller; it exists for humans watching a build, the same way ppci's
//! `Linker` takes a `reporter` and calls `reporter.heading(...)` /
//! `reporter.message(...)` purely for narration.

/// Receives progress narration from a [`crate::Linker`].
pub trait Reporter {
    /// A section heading at the given nesting level (e.g. `"Linking"`).
    fn heading(&mut self, level: u8, text: &str);

    /// A single line of progress detail under the current heading.
    fn message(&mut self, text: &str);
}

/// A [`Reporter`] that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn heading(&mut self, _level: u8, _text: &str) {}
    fn message(&mut self, _text: &str) {}
}

/// A [`Reporter`] that forwards everything to the `log` facade at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReporter;

impl Reporter for LoggingReporter {
    fn heading(&mut self, level: u8, text: &str) {
        log::info!("{:=<width$} {text} {:=<width$}", "", "", width = level as usize);
    }

    fn message(&mut self, text: &str) {
        log::info!("{text}");
    }
}
