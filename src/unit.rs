//! The test-case record shared by every loader, writer and report.

use serde::Serialize;

/// One test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// File or folder the case came from.
    pub source: String,
    /// Human label, may be empty.
    pub case: String,
    pub input: String,
    pub output: String,
    /// Explicit weight in `[0, 100]`; `None` takes a proportional share.
    pub grade: Option<u32>,
    /// Deduction applied when this case fails, resolved per working set.
    pub grade_reduction: u32,
    /// Position in the flattened case list of the working set.
    pub index: usize,
    /// Index of an earlier case with byte-identical input.
    pub duplicated_of: Option<usize>,
}

impl Unit {
    pub fn new(
        case: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        grade: Option<u32>,
        source: impl Into<String>,
    ) -> Self {
        Unit {
            source: source.into(),
            case: case.into(),
            input: input.into(),
            output: output.into(),
            grade: grade.map(|g| g.min(100)),
            ..Default::default()
        }
    }

    pub fn is_duplicated(&self) -> bool {
        self.duplicated_of.is_some()
    }
}

/// Appends a newline unless `text` already ends with one.
pub fn ensure_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Normalizes case labels: collapses runs of spaces, drops a leading numeric
/// token left by a previous numbering, and optionally prefixes a fresh
/// two-digit index.
pub struct LabelFactory {
    label: String,
    index: Option<usize>,
}

impl LabelFactory {
    pub fn new() -> Self {
        LabelFactory {
            label: String::new(),
            index: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn generate(&self) -> String {
        let label = remove_old_index(&trim_spaces(&self.label));
        match self.index {
            None => label,
            Some(index) if label.is_empty() => format!("{index:02}"),
            Some(index) => format!("{index:02} {label}"),
        }
    }
}

impl Default for LabelFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_spaces(text: &str) -> String {
    text.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn remove_old_index(label: &str) -> String {
    let mut parts = label.splitn(2, ' ');
    match parts.next() {
        Some(first) if first.parse::<i64>().is_ok() => parts.next().unwrap_or("").to_string(),
        _ => label.to_string(),
    }
}
