//! Output sinks and the indenting logger.
//!
//! All user-facing text (summaries, warnings, reports) flows through a
//! [`Logger`]. The logger owns an indentation level and writes into a
//! [`SharedOutput`], which is either a [`StdoutSink`] for the CLI or an
//! [`OutputBuffer`] when output must be captured.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;

// ============================================================================
// SINKS
// ============================================================================

/// Destination for rendered text. Implementations receive text verbatim,
/// newlines included.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Collects output into a String for capture and tests.
#[derive(Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Writes output to stdout as it arrives.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Discards everything.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// Shared, mutable handle to an output sink.
#[derive(Clone)]
pub struct SharedOutput(pub Rc<RefCell<dyn OutputSink>>);

impl SharedOutput {
    pub fn new<T: OutputSink + 'static>(sink: T) -> Self {
        SharedOutput(Rc::new(RefCell::new(sink)))
    }

    pub fn emit(&self, text: &str) {
        self.0.borrow_mut().emit(text);
    }
}

/// Read side of a capturing logger.
#[derive(Clone)]
pub struct Capture(Rc<RefCell<OutputBuffer>>);

impl Capture {
    pub fn contents(&self) -> String {
        self.0.borrow().as_str().to_string()
    }

    /// Returns everything captured so far and empties the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut self.0.borrow_mut().buffer)
    }
}

// ============================================================================
// LOGGER
// ============================================================================

const TAB: &str = "    ";

/// Indents every line of `text` by `level` tabs of four spaces. A trailing
/// newline does not open an indented empty line.
pub fn indent(text: &str, level: usize) -> String {
    if level == 0 {
        return text.to_string();
    }
    let shift = TAB.repeat(level);
    let mut out = String::with_capacity(text.len() + shift.len());
    out.push_str(&shift);
    out.push_str(&text.replace('\n', &format!("\n{shift}")));
    if text.ends_with('\n') {
        out.truncate(out.len() - shift.len());
    }
    out
}

pub struct Logger {
    output: SharedOutput,
    level: Cell<usize>,
}

impl Logger {
    pub fn new(output: SharedOutput) -> Self {
        Self {
            output,
            level: Cell::new(0),
        }
    }

    pub fn stdout() -> Self {
        Self::new(SharedOutput::new(StdoutSink))
    }

    pub fn null() -> Self {
        Self::new(SharedOutput::new(NullSink))
    }

    /// A logger writing into a buffer, plus the handle to read it back.
    pub fn capture() -> (Self, Capture) {
        let buffer = Rc::new(RefCell::new(OutputBuffer::new()));
        let sink: Rc<RefCell<dyn OutputSink>> = buffer.clone();
        (Self::new(SharedOutput(sink)), Capture(buffer))
    }

    pub fn level(&self) -> usize {
        self.level.get()
    }

    pub fn inc_level(&self) {
        self.level.set(self.level.get() + 1);
    }

    pub fn dec_level(&self) {
        self.level.set(self.level.get().saturating_sub(1));
    }

    /// Writes `text` at the current level.
    pub fn write(&self, text: &str) {
        self.write_at(text, 0);
    }

    /// Writes `text` at the current level plus `relative`.
    pub fn write_at(&self, text: &str, relative: usize) {
        self.output.emit(&indent(text, self.level.get() + relative));
    }

    pub fn line(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }
}
