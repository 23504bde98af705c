//! Run parameters and the session context threaded through every action.

use crate::errors::TkResult;
use crate::loader::{PatternLoader, DEFAULT_PATTERN};
use crate::output::{Capture, Logger};
use crate::report::Report;
use crate::runner::ExecOptions;
use crate::symbols::Symbols;

/// Which failing cases get a diff after a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    #[default]
    First,
    None,
    All,
}

/// Selection and presentation options for `list` and `run`.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub index: Option<usize>,
    pub raw: bool,
    pub display: bool,
    pub vertical: bool,
    pub diff_mode: DiffMode,
}

impl RunParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }
}

/// Rewrites applied to a case list before it is written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manip {
    pub unlabel: bool,
    pub sort: bool,
    pub number: bool,
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Input/output pairing for folder sources, e.g. `@.in @.sol`.
    pub pattern: String,
    pub exec: ExecOptions,
    /// Report width; detected from the terminal when unset.
    pub width: Option<usize>,
    pub ascii: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            pattern: DEFAULT_PATTERN.to_string(),
            exec: ExecOptions::default(),
            width: None,
            ascii: false,
        }
    }
}

/// Everything an action needs besides its arguments: where text goes, how
/// it is laid out, and the harness settings.
pub struct Session {
    pub log: Logger,
    pub report: Report,
    pub config: HarnessConfig,
}

impl Session {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_logger(config, Logger::stdout())
    }

    /// A session whose output is captured instead of printed.
    pub fn capture(config: HarnessConfig) -> (Self, Capture) {
        let (log, capture) = Logger::capture();
        (Self::with_logger(config, log), capture)
    }

    pub fn with_logger(config: HarnessConfig, log: Logger) -> Self {
        let symbols = if config.ascii {
            Symbols::ascii()
        } else {
            Symbols::unicode()
        };
        let report = match config.width {
            Some(width) => Report::with_width(width, symbols),
            None => Report::new(symbols),
        };
        Session {
            log,
            report,
            config,
        }
    }

    pub fn pattern(&self) -> TkResult<PatternLoader> {
        PatternLoader::parse(&self.config.pattern)
    }

    pub fn symbols(&self) -> &Symbols {
        &self.report.symbols
    }
}
