//! Legacy session transcripts embedded in Markdown.
//!
//! A case opens with a `#__case <name> [N%]` line and runs until a line
//! starting with `$end`. Lines starting with `$` are typed by the user: their
//! text (without the `$`) is the input, and the whole transcript, commands
//! included, is the expected output. Lines starting with `#` are comments.
//!
//! A case without `$end` is a prefix of the session that continues in the
//! next case. It is closed on its own and its lines are prepended to the
//! next case, so chains of open cases accumulate.

use crate::unit::{ensure_newline, Unit};

const CASE_MARKER: &str = "\n#__case";
const END_MARKER: &str = "$end";

#[derive(Debug)]
struct Fragment {
    case: String,
    grade: Option<u32>,
    body: String,
    closed: bool,
}

pub fn parse(text: &str, origin: &str) -> Vec<Unit> {
    let text = format!("\n{text}");
    let mut fragments: Vec<Fragment> = text.split(CASE_MARKER).skip(1).map(cut_fragment).collect();

    for i in 0..fragments.len().saturating_sub(1) {
        if fragments[i].closed {
            continue;
        }
        let carried = fragments[i].body.clone();
        let next = &mut fragments[i + 1];
        next.body = format!("{carried}\n{}", next.body);
        let current = &mut fragments[i];
        current.body.push('\n');
        current.body.push_str(END_MARKER);
        current.body.push('\n');
        current.closed = true;
    }

    fragments
        .into_iter()
        .map(|fragment| {
            let (input, output) = transcript(&fragment.body);
            Unit::new(
                fragment.case,
                ensure_newline(&input),
                ensure_newline(&output),
                fragment.grade,
                origin,
            )
        })
        .collect()
}

/// Reads the header of a raw fragment and cuts its body after the first
/// `$end` line.
fn cut_fragment(raw: &str) -> Fragment {
    let mut lines = raw.split('\n');
    let header = lines.next().unwrap_or("");
    let mut body = Vec::new();
    let mut closed = false;
    for line in lines {
        if line.starts_with(END_MARKER) {
            body.push(END_MARKER);
            closed = true;
            break;
        }
        body.push(line);
    }

    let mut tags: Vec<&str> = header.split_whitespace().collect();
    let mut grade = None;
    if let Some(last) = tags.last() {
        if last.ends_with('%') {
            grade = last.trim_end_matches('%').parse::<u32>().ok();
            tags.pop();
        }
    }

    Fragment {
        case: tags.join(" "),
        grade,
        body: body.join("\n"),
        closed,
    }
}

/// Splits a transcript into (input, expected output).
fn transcript(body: &str) -> (String, String) {
    let mut input = String::new();
    let mut output = String::new();
    for line in body.split('\n') {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        output.push_str(line);
        output.push('\n');
        if let Some(command) = line.strip_prefix('$') {
            input.push_str(command);
            input.push('\n');
        }
    }
    (input, output)
}
