//! Error types for the tk harness.
//!
//! Every fallible library operation returns [`TkResult`]. Compilation and
//! execution failures are carried as variants so the toolchain can report
//! them; inside `execute_solver` they become solver states instead. A wrong
//! answer is never an error.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::io;
use thiserror::Error;

pub type TkResult<T> = Result<T, TkError>;

#[derive(Error, Diagnostic, Debug)]
pub enum TkError {
    #[error("fail: {message}")]
    #[diagnostic(
        code(tk::pattern::invalid),
        help("a pattern pair looks like `@.in @.sol`, with `@` at most once in each side")
    )]
    Pattern { message: String },

    #[error("warning: unable to find: {path}")]
    #[diagnostic(code(tk::source::not_found))]
    NotFound { path: String },

    #[error("failure: none source found")]
    #[diagnostic(code(tk::source::none_found))]
    NoSourceFound,

    #[error("Parse error: unrecognized case block in {origin}")]
    #[diagnostic(
        code(tk::parse::vpl),
        help("a case block needs `case=`, `input=` and `output=` lines, optionally `grade reduction=N%`")
    )]
    Parse {
        origin: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this block matches neither case grammar")]
        span: SourceSpan,
    },

    #[error("compilation error\n{output}")]
    #[diagnostic(code(tk::solver::compilation))]
    Compilation { output: String },

    #[error("execution error: {output}")]
    #[diagnostic(code(tk::solver::execution))]
    Execution { output: String },

    #[error("Index Number out of bounds: {index}")]
    #[diagnostic(code(tk::filter::index), help("the working set has {len} cases"))]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("{mark} {path}\n{message}")]
    #[diagnostic(code(tk::solver::reference))]
    ReferenceSolver {
        mark: String,
        path: String,
        message: String,
    },

    #[error("fail: target {path} do not supported for build operation")]
    #[diagnostic(code(tk::writer::target))]
    UnsupportedTarget { path: String },

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(code(tk::io))]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl TkError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        TkError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(origin: &str, text: &str, start: usize, len: usize) -> Self {
        TkError::Parse {
            origin: origin.to_string(),
            src: NamedSource::new(origin, text.to_string()),
            span: (start, len).into(),
        }
    }
}
