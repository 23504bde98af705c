//! Key=value block format (`.vpl`).
//!
//! ```text
//! case=soma
//! input=1 2
//! output="3"
//! grade reduction=40%
//! ```
//!
//! The `grade reduction` line is optional. Blocks begin at every line that
//! opens with `case=` (any capitalization of the first letter, spaces allowed
//! around the `=`).

use crate::errors::{TkError, TkResult};
use crate::unit::{ensure_newline, Unit};
use once_cell::sync::Lazy;
use regex::Regex;

static CASE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^ *[Cc]ase *=").expect("vpl case regex"));

static EXTENDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ms)\Acase= *([ \S]*) *\n *input *=(.*?)^ *output *=(.*?)^ *grade *reduction *= *(\S*)% *\n?",
    )
    .expect("vpl extended regex")
});

static BASIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)\Acase= *([ \S]*) *\n *input *=(.*?)^ *output *=(.*)").expect("vpl basic regex")
});

/// Outcome of matching one block against the two grammars.
#[derive(Debug, PartialEq, Eq)]
pub enum VplMatch {
    Extended {
        case: String,
        input: String,
        output: String,
        grade: Option<u32>,
    },
    Basic {
        case: String,
        input: String,
        output: String,
    },
    NoMatch,
}

impl VplMatch {
    pub fn classify(block: &str) -> Self {
        if let Some(caps) = EXTENDED.captures(block) {
            return VplMatch::Extended {
                case: caps[1].trim().to_string(),
                input: caps[2].to_string(),
                output: caps[3].to_string(),
                grade: caps[4].parse::<u32>().ok(),
            };
        }
        if let Some(caps) = BASIC.captures(block) {
            return VplMatch::Basic {
                case: caps[1].trim().to_string(),
                input: caps[2].to_string(),
                output: caps[3].to_string(),
            };
        }
        VplMatch::NoMatch
    }

    fn into_unit(self, origin: &str) -> Option<Unit> {
        let (case, input, output, grade) = match self {
            VplMatch::Extended {
                case,
                input,
                output,
                grade,
            } => (case, input, output, grade),
            VplMatch::Basic {
                case,
                input,
                output,
            } => (case, input, output, None),
            VplMatch::NoMatch => return None,
        };
        Some(Unit::new(
            case,
            ensure_newline(&input),
            unquote(&output),
            grade,
            origin,
        ))
    }
}

/// Parses every block. A block matching neither grammar aborts the load.
pub fn parse(text: &str, origin: &str) -> TkResult<Vec<Unit>> {
    let starts: Vec<_> = CASE_START.find_iter(text).collect();
    let mut units = Vec::with_capacity(starts.len());
    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(text.len(), |next| next.start());
        let block = format!("case={}", &text[start.end()..end]);
        match VplMatch::classify(&block).into_unit(origin) {
            Some(unit) => units.push(unit),
            None => {
                return Err(TkError::parse(
                    origin,
                    text,
                    start.start(),
                    end - start.start(),
                ))
            }
        }
    }
    Ok(units)
}

/// Drops trailing newlines and one pair of surrounding double quotes.
fn unquote(text: &str) -> String {
    let trimmed = text.trim_end_matches('\n');
    let inner = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    ensure_newline(inner)
}
