//! Wildcard pairing of input/output files inside a test folder.
//!
//! A pattern pair such as `@.in @.sol` claims `07.in` as an input file with
//! label `07` and expects `07.sol` next to it.

use crate::errors::{TkError, TkResult};
use crate::output::Logger;
use regex::Regex;

pub const DEFAULT_PATTERN: &str = "@.in @.sol";
const WILDCARD: char = '@';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    pub label: String,
    pub input_file: String,
    pub output_file: String,
}

#[derive(Debug, Clone)]
pub struct PatternLoader {
    input_pattern: String,
    output_pattern: String,
    input_re: Regex,
}

impl PatternLoader {
    pub fn new(input_pattern: &str, output_pattern: &str) -> TkResult<Self> {
        check_double_wildcard(input_pattern, output_pattern)?;
        check_missing_wildcard(input_pattern, output_pattern)?;
        Ok(PatternLoader {
            input_pattern: input_pattern.to_string(),
            output_pattern: output_pattern.to_string(),
            input_re: input_regex(input_pattern)?,
        })
    }

    /// Builds a loader from `"<input> <output>"`. A missing output side is
    /// empty.
    pub fn parse(pattern: &str) -> TkResult<Self> {
        let mut parts = pattern.split_whitespace();
        let input = parts.next().unwrap_or("");
        let output = parts.next().unwrap_or("");
        Self::new(input, output)
    }

    pub fn input_pattern(&self) -> &str {
        &self.input_pattern
    }

    pub fn output_pattern(&self) -> &str {
        &self.output_pattern
    }

    pub fn make_file_source(&self, label: &str) -> FileSource {
        FileSource {
            label: label.to_string(),
            input_file: self.input_pattern.replace(WILDCARD, label),
            output_file: self.output_pattern.replace(WILDCARD, label),
        }
    }

    /// Pairs the candidates in order. A matching input whose output file is
    /// missing is reported on `log` and dropped.
    pub fn file_sources(&self, filenames: &[String], log: &Logger) -> Vec<FileSource> {
        let (found, missing) = self.pair(filenames);
        for name in missing {
            log.line(&format!("fail: file {name} not found"));
        }
        found
    }

    /// Candidates claimed by no accepted pair.
    pub fn unmatched_files(&self, filenames: &[String]) -> Vec<String> {
        let (found, _) = self.pair(filenames);
        filenames
            .iter()
            .filter(|name| {
                !found
                    .iter()
                    .any(|fs| &fs.input_file == *name || &fs.output_file == *name)
            })
            .cloned()
            .collect()
    }

    fn pair(&self, filenames: &[String]) -> (Vec<FileSource>, Vec<String>) {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for filename in filenames {
            let Some(caps) = self.input_re.captures(filename) else {
                continue;
            };
            let label = caps.get(1).or_else(|| caps.get(0)).map_or("", |m| m.as_str());
            let source = self.make_file_source(label);
            if filenames.contains(&source.output_file) {
                found.push(source);
            } else {
                missing.push(source.output_file);
            }
        }
        (found, missing)
    }
}

fn check_double_wildcard(input: &str, output: &str) -> TkResult<()> {
    if input.matches(WILDCARD).count() > 1 || output.matches(WILDCARD).count() > 1 {
        return Err(TkError::Pattern {
            message: "the wildcard @ should be used only once per pattern".into(),
        });
    }
    Ok(())
}

fn check_missing_wildcard(input: &str, output: &str) -> TkResult<()> {
    match (input.contains(WILDCARD), output.contains(WILDCARD)) {
        (true, false) => Err(TkError::Pattern {
            message: "the input pattern has the wildcard @, the output pattern should have too"
                .into(),
        }),
        (false, true) => Err(TkError::Pattern {
            message: "the output pattern has the wildcard @, the input pattern should have too"
                .into(),
        }),
        _ => Ok(()),
    }
}

fn input_regex(pattern: &str) -> TkResult<Regex> {
    let body = pattern
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.*)");
    Regex::new(&format!("^{body}$")).map_err(|e| TkError::Pattern {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn suffix_wildcard_pairs_files() {
        let loader = PatternLoader::new("@.in", "@.out").unwrap();
        let files = names(&["00.in", "00.out", "01.in", "01.out", "notes.txt"]);
        let (log, _) = Logger::capture();
        let sources = loader.file_sources(&files, &log);
        assert_eq!(
            sources,
            vec![
                FileSource {
                    label: "00".into(),
                    input_file: "00.in".into(),
                    output_file: "00.out".into()
                },
                FileSource {
                    label: "01".into(),
                    input_file: "01.in".into(),
                    output_file: "01.out".into()
                },
            ]
        );
        assert_eq!(loader.unmatched_files(&files), names(&["notes.txt"]));
    }

    #[test]
    fn prefix_wildcard_pairs_files() {
        let loader = PatternLoader::parse("in.@ out.@").unwrap();
        let files = names(&["in.5", "out.5", "in.x"]);
        let (log, capture) = Logger::capture();
        let sources = loader.file_sources(&files, &log);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label, "5");
        assert_eq!(capture.contents(), "fail: file out.x not found\n");
    }

    #[test]
    fn dots_are_literal() {
        let loader = PatternLoader::parse("@.in @.sol").unwrap();
        let files = names(&["1xin", "1xin.sol"]);
        let (log, _) = Logger::capture();
        assert!(loader.file_sources(&files, &log).is_empty());
    }

    #[test]
    fn plain_pattern_uses_filename_as_label() {
        let loader = PatternLoader::parse("t.in t.sol").unwrap();
        let files = names(&["t.in", "t.sol"]);
        let (log, _) = Logger::capture();
        let sources = loader.file_sources(&files, &log);
        assert_eq!(sources[0].label, "t.in");
        assert_eq!(sources[0].output_file, "t.sol");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(matches!(
            PatternLoader::parse("@@.in @.sol"),
            Err(TkError::Pattern { .. })
        ));
        assert!(matches!(
            PatternLoader::parse("@.in out.sol"),
            Err(TkError::Pattern { .. })
        ));
        assert!(matches!(
            PatternLoader::parse("in.txt @.sol"),
            Err(TkError::Pattern { .. })
        ));
    }
}
