//! Test-case loading.
//!
//! [`parse_source`] turns one path into a list of [`Unit`]s, dispatching on
//! what the path is:
//!
//! - a folder: input/output file pairs matched by a [`PatternLoader`]
//! - `.tio`: delimited blocks ([`tio`])
//! - `.vpl`: key=value blocks ([`vpl`])
//! - `.md`: delimited blocks followed by legacy transcripts ([`cio`])

pub mod cio;
pub mod pattern;
pub mod tio;
pub mod vpl;

use crate::errors::{TkError, TkResult};
use crate::output::Logger;
use crate::unit::{ensure_newline, Unit};
pub use pattern::{FileSource, PatternLoader, DEFAULT_PATTERN};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Folder,
    Tio,
    Vpl,
    Markdown,
    Unsupported,
}

impl SourceFormat {
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            return SourceFormat::Folder;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tio") => SourceFormat::Tio,
            Some("vpl") => SourceFormat::Vpl,
            Some("md") => SourceFormat::Markdown,
            _ => SourceFormat::Unsupported,
        }
    }
}

/// Loads every case of `source`.
///
/// A folder may carry its own pattern pair after the path, as in
/// `"tests in.@ out.@"`; otherwise `pattern` is used.
pub fn parse_source(source: &str, pattern: &PatternLoader, log: &Logger) -> TkResult<Vec<Unit>> {
    let path = Path::new(source);
    if !path.exists() {
        if let Some((folder, own_pattern)) = source.split_once(' ') {
            if Path::new(folder).is_dir() {
                let own = PatternLoader::parse(own_pattern)?;
                return parse_dir(folder, &own, log);
            }
        }
        return Err(TkError::NotFound {
            path: source.to_string(),
        });
    }

    match SourceFormat::of(path) {
        SourceFormat::Folder => parse_dir(source, pattern, log),
        SourceFormat::Tio => Ok(tio::parse(&read_text(path)?, source)),
        SourceFormat::Vpl => vpl::parse(&read_text(path)?, source),
        SourceFormat::Markdown => {
            let text = read_text(path)?;
            let mut units = tio::parse(&text, source);
            units.extend(cio::parse(&text, source));
            Ok(units)
        }
        SourceFormat::Unsupported => {
            log.line(&format!("warning: target format do not supported: {source}"));
            Ok(Vec::new())
        }
    }
}

/// Loads the input/output pairs of a folder. Units are named after the
/// folder and the pair label and take the proportional grade.
pub fn parse_dir(folder: &str, pattern: &PatternLoader, log: &Logger) -> TkResult<Vec<Unit>> {
    let filenames = list_files(Path::new(folder))?;
    tracing::debug!(
        folder,
        files = filenames.len(),
        unmatched = ?pattern.unmatched_files(&filenames),
        "pairing folder files"
    );
    let mut units = Vec::new();
    for fs in pattern.file_sources(&filenames, log) {
        let base = Path::new(folder);
        let input = read_text(&base.join(&fs.input_file))?;
        let output = read_text(&base.join(&fs.output_file))?;
        units.push(Unit::new(
            "",
            ensure_newline(&input),
            ensure_newline(&output),
            None,
            base.join(&fs.label).display().to_string(),
        ));
    }
    Ok(units)
}

/// Names of the regular files directly inside `folder`, sorted.
pub fn list_files(folder: &Path) -> TkResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = folder.display().to_string();
            TkError::io(path, e.into())
        })?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Reads a test file, folding `\r\n` line endings into `\n`.
pub fn read_text(path: &Path) -> TkResult<String> {
    fs::read_to_string(path)
        .map(|text| text.replace("\r\n", "\n"))
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TkError::NotFound {
                path: path.display().to_string(),
            },
            _ => TkError::io(path.display().to_string(), e),
        })
}
