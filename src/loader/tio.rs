//! Delimited-block format (`.tio`, also embedded in Markdown).
//!
//! ```text
//! >>>>>>>> sum of two 50%
//! 1
//! 2
//! ========
//! 3
//! <<<<<<<<
//! ```

use crate::unit::{ensure_newline, Unit};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

pub static TIO_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^ *>>>>>>>> *(.*?)\n(.*?)^ *======== *\n(.*?)^ *<<<<<<<< *\n?")
        .expect("tio block regex")
});

/// Marker for a case that explicitly takes the proportional share.
pub const UNGRADED: &str = "!";

pub fn parse(text: &str, origin: &str) -> Vec<Unit> {
    TIO_BLOCK
        .captures_iter(text)
        .map(|caps| {
            let (case, grade) = split_header(&caps[1]);
            Unit::new(
                case,
                ensure_newline(&caps[2]),
                ensure_newline(&caps[3]),
                grade,
                origin,
            )
        })
        .collect()
}

/// Byte ranges of every block, in order.
pub fn block_spans(text: &str) -> Vec<Range<usize>> {
    TIO_BLOCK.find_iter(text).map(|m| m.range()).collect()
}

/// Splits a block header into the case label and the optional grade carried
/// by a trailing `N%` token.
pub fn split_header(header: &str) -> (String, Option<u32>) {
    let header = header.trim();
    let mut words: Vec<&str> = header.split_whitespace().collect();
    match words.last().copied() {
        Some(last) if last.ends_with('%') => {
            words.pop();
            let value = last.trim_end_matches('%');
            let grade = if value == UNGRADED {
                None
            } else {
                value.parse::<u32>().ok()
            };
            (words.join(" "), grade)
        }
        Some(UNGRADED) => {
            words.pop();
            (words.join(" "), None)
        }
        _ => (header.to_string(), None),
    }
}
