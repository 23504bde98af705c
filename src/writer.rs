//! Serialization of units back to disk.

use crate::errors::{TkError, TkResult};
use crate::loader::{tio, PatternLoader, SourceFormat};
use crate::output::Logger;
use crate::unit::{ensure_newline, Unit};
use difference::{Changeset, Difference};
use std::fs;
use std::path::Path;

pub fn to_tio(unit: &Unit) -> String {
    let mut text = String::from(">>>>>>>>");
    if !unit.case.is_empty() {
        text.push(' ');
        text.push_str(&unit.case);
    }
    match unit.grade {
        Some(grade) => text.push_str(&format!(" {grade}%")),
        // A trailing `N%` or `!` in the label would be read back as a grade.
        None if case_ends_like_a_grade(&unit.case) => text.push_str(&format!(" {}%", tio::UNGRADED)),
        None => {}
    }
    text.push('\n');
    text.push_str(&ensure_newline(&unit.input));
    text.push_str("========\n");
    text.push_str(&ensure_newline(&unit.output));
    text.push_str("<<<<<<<<\n");
    text
}

fn case_ends_like_a_grade(case: &str) -> bool {
    case.split_whitespace()
        .last()
        .is_some_and(|last| last.ends_with('%') || last == tio::UNGRADED)
}

pub fn to_vpl(unit: &Unit) -> String {
    let mut text = format!("case={}\n", unit.case);
    text.push_str("input=");
    text.push_str(&ensure_newline(&unit.input));
    text.push_str("output=\"");
    text.push_str(&ensure_newline(&unit.output));
    text.push_str("\"\n");
    match unit.grade {
        Some(grade) => text.push_str(&format!("grade reduction={grade:03}%\n")),
        None => text.push('\n'),
    }
    text
}

pub fn tio_text(units: &[Unit]) -> String {
    units.iter().map(to_tio).collect::<Vec<_>>().join("\n")
}

pub fn vpl_text(units: &[Unit]) -> String {
    units.iter().map(to_vpl).collect::<Vec<_>>().join("\n")
}

/// Writes `units` to `target`: a folder receives numbered file pairs, a
/// `.tio` or `.vpl` file receives the whole list. Returns whether the target
/// now holds the units.
pub fn save_target(
    target: &str,
    units: &[Unit],
    pattern: &PatternLoader,
    force: bool,
    log: &Logger,
) -> TkResult<bool> {
    let path = Path::new(target);
    match SourceFormat::of(path) {
        SourceFormat::Folder => {
            save_dir(path, units, pattern)?;
            Ok(true)
        }
        SourceFormat::Tio => save_file(path, &tio_text(units), force, log),
        SourceFormat::Vpl => save_file(path, &vpl_text(units), force, log),
        SourceFormat::Markdown | SourceFormat::Unsupported => Err(TkError::UnsupportedTarget {
            path: target.to_string(),
        }),
    }
}

/// Writes one input/output pair per unit, labeled `00`, `01`, ...
pub fn save_dir(folder: &Path, units: &[Unit], pattern: &PatternLoader) -> TkResult<()> {
    for (i, unit) in units.iter().enumerate() {
        let fs_pair = pattern.make_file_source(&format!("{i:02}"));
        write(&folder.join(&fs_pair.input_file), &unit.input)?;
        write(&folder.join(&fs_pair.output_file), &unit.output)?;
    }
    Ok(())
}

/// Writes `content` unless the file already holds it. An existing file with
/// other content is only replaced when `force` is set.
pub fn save_file(path: &Path, content: &str, force: bool, log: &Logger) -> TkResult<bool> {
    let name = path.display().to_string();
    if path.exists() {
        let old = fs::read_to_string(path).map_err(|e| TkError::io(&name, e))?;
        if old == content {
            log.line("no changes in test file");
            return Ok(true);
        }
        if !force {
            let (added, removed) = change_summary(&old, content);
            log.line(&format!(
                "fail: file {name} exists (+{added} -{removed} lines), use force to overwrite"
            ));
            return Ok(false);
        }
    }
    write(path, content)?;
    if !force {
        log.line(&format!("file {name} wrote"));
    }
    Ok(true)
}

/// Replaces the delimited blocks of a Markdown document, in order, with
/// `tests`. Surplus tests go after the last block; surplus blocks are removed.
pub fn insert_tests(text: &str, tests: &[String]) -> String {
    let spans = tio::block_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (i, span) in spans.iter().enumerate() {
        out.push_str(&text[cursor..span.start]);
        if let Some(test) = tests.get(i) {
            out.push_str(test);
        }
        if i + 1 == spans.len() {
            tests.iter().skip(spans.len()).for_each(|test| out.push_str(test));
        }
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    if spans.is_empty() && !tests.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        tests.iter().for_each(|test| out.push_str(test));
    }
    out
}

fn change_summary(old: &str, new: &str) -> (usize, usize) {
    let changeset = Changeset::new(old, new, "\n");
    changeset
        .diffs
        .iter()
        .fold((0, 0), |(added, removed), diff| match diff {
            Difference::Add(x) => (added + x.split('\n').count(), removed),
            Difference::Rem(x) => (added, removed + x.split('\n').count()),
            Difference::Same(_) => (added, removed),
        })
}

fn write(path: &Path, content: &str) -> TkResult<()> {
    fs::write(path, content).map_err(|e| TkError::io(path.display().to_string(), e))
}
