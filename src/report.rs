//! Width-bounded text reports: case headers, working-set summaries and the
//! vertical and side-by-side diff views.
//!
//! Every line produced here is exactly [`Report::width`] columns wide when it
//! is a rule, caption or grid row. The width is odd so a diff grid has a true
//! center column.

use crate::symbols::Symbols;
use crate::unit::Unit;
use once_cell::unsync::OnceCell;
use unicode_width::UnicodeWidthStr;

const DEFAULT_WIDTH: usize = 80;

pub struct Report {
    width: OnceCell<usize>,
    pub symbols: Symbols,
}

impl Report {
    /// The width is detected on first use.
    pub fn new(symbols: Symbols) -> Self {
        Report {
            width: OnceCell::new(),
            symbols,
        }
    }

    pub fn with_width(width: usize, symbols: Symbols) -> Self {
        Report {
            width: OnceCell::with_value(make_odd(width)),
            symbols,
        }
    }

    pub fn width(&self) -> usize {
        *self.width.get_or_init(detect_width)
    }

    // ========================================================================
    // LINE LAYOUT
    // ========================================================================

    /// Centers `text` on a full line filled with `sep`, with `sep` borders.
    pub fn centralize(&self, text: &str, sep: &str) -> String {
        self.centralize_with(text, sep, sep, sep)
    }

    pub fn centralize_with(&self, text: &str, sep: &str, left: &str, right: &str) -> String {
        let len = text_width(text);
        let pad = if len % 2 == 0 { sep } else { "" };
        let inner = self.width().saturating_sub(2);
        let filler = sep.repeat(inner.saturating_sub(len) / 2);
        format!("{left}{pad}{filler}{text}{filler}{right}")
    }

    /// Two captions side by side, each centered in half the line.
    fn mount_side_by_side(&self, left: &str, right: &str, filler: &str, middle: &str) -> String {
        let half = self.width() / 2;
        let side = |text: &str| {
            let cell = format!(" {} ", center(text, half.saturating_sub(2), filler));
            truncate_width(&cell, half)
        };
        format!("{}{middle}{}", side(left), side(right))
    }

    /// Makes spaces and line ends visible.
    pub fn render_white(&self, text: &str) -> String {
        text.replace(' ', self.symbols.whitespace)
            .replace('\n', &format!("{}\n", self.symbols.newline))
    }

    // ========================================================================
    // HEADERS AND SUMMARIES
    // ========================================================================

    /// `(mark)[II] GR:RRR <source> (<case>)` plus the duplicate reference.
    pub fn format_header(
        &self,
        user: Option<&str>,
        unit: &Unit,
        source_fill: usize,
        case_fill: usize,
    ) -> String {
        let mark = match user {
            None => self.symbols.neutral,
            Some(user) if user == unit.output => self.symbols.success,
            Some(_) => self.symbols.failure,
        };
        format!(
            "({mark})[{:02}] {}",
            unit.index,
            self.format_title(unit, source_fill, case_fill)
        )
    }

    fn format_title(&self, unit: &Unit, source_fill: usize, case_fill: usize) -> String {
        let duplicated = match unit.duplicated_of {
            None => "      ".to_string(),
            Some(original) => format!(" [{original:02}] "),
        };
        format!(
            "GR:{:03} {} ({}){duplicated}",
            unit.grade_reduction,
            ljust(&unit.source, source_fill, " "),
            ljust(&unit.case, case_fill, " "),
        )
    }

    /// One header per unit, joined by newlines.
    pub fn format_header_list(
        &self,
        units: &[Unit],
        user_outputs: Option<&[Option<String>]>,
        fill: (usize, usize),
    ) -> String {
        units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let user = user_outputs.and_then(|outputs| outputs.get(i)).and_then(|u| u.as_deref());
                self.format_header(user, unit, fill.0, fill.1)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `=>folder (NN) [sources] [solvers]`, each column padded to `sizes`
    /// with the fill glyph.
    pub fn format_resume(&self, resume: &[String; 4], sizes: &[usize; 4]) -> String {
        let fill = self.symbols.cfill;
        let mut out = format!(
            "{}{} ({}) [{}]",
            self.symbols.opening,
            ljust(&resume[0], sizes[0], fill),
            center(&resume[1], sizes[1], fill),
            center(&resume[2], sizes[2], fill),
        );
        if !resume[3].is_empty() {
            out.push_str(&format!(" [{}]", center(&resume[3], sizes[3], fill)));
        }
        out
    }

    // ========================================================================
    // DIFF VIEWS
    // ========================================================================

    /// Renders two texts on a `rows x width` grid. The left text fills the
    /// columns before the center, the right text the columns after it, and
    /// the center column tells whether the two lines are equal.
    pub fn side_by_side(&self, text_a: &str, text_b: &str) -> String {
        let width = self.width();
        let middle = width / 2;
        let ta: Vec<Vec<char>> = text_a.split('\n').map(|l| l.chars().collect()).collect();
        let tb: Vec<Vec<char>> = text_b.split('\n').map(|l| l.chars().collect()).collect();
        let mut rows = ta.len().max(tb.len());
        if ends_clean(text_a) && ends_clean(text_b) {
            rows -= 1;
        }

        let equal = glyph(self.symbols.equalbar);
        let unequal = glyph(self.symbols.unequal);
        let mut grid = vec![vec![' '; width]; rows];
        for (row, line) in grid.iter_mut().enumerate() {
            let same = matches!((ta.get(row), tb.get(row)), (Some(a), Some(b)) if a == b);
            line[middle] = if same { equal } else { unequal };
        }
        for (row, line) in ta.iter().enumerate().take(rows) {
            for (col, ch) in line.iter().enumerate() {
                if *ch != ' ' && col + 1 < middle {
                    grid[row][col + 1] = *ch;
                }
            }
        }
        for (row, line) in tb.iter().enumerate().take(rows) {
            for (col, ch) in line.iter().enumerate() {
                if *ch != ' ' && col + 1 < middle {
                    grid[row][col + middle + 2] = *ch;
                }
            }
        }
        grid.iter()
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Line-prefixed expected and received texts for the vertical view. The
    /// received side ends with a block showing the first mismatching line
    /// with visible whitespace.
    pub fn render_down_diff(&self, expected: &str, received: &str) -> (String, String) {
        let char_error = format!("{} ", self.symbols.unequal);
        let char_equal = format!("{} ", self.symbols.equalbar);
        let a_lines: Vec<&str> = expected.split_terminator('\n').collect();
        let b_lines: Vec<&str> = received.split_terminator('\n').collect();
        let a_white = self.render_white(expected);
        let b_white = self.render_white(received);
        let a_render: Vec<&str> = a_white.split_terminator('\n').collect();
        let b_render: Vec<&str> = b_white.split_terminator('\n').collect();

        let mut a_out = String::new();
        let mut b_out = String::new();
        let mut first_failure = None;
        for i in 0..a_lines.len().max(b_lines.len()) {
            let differs = i >= a_lines.len() || i >= b_lines.len() || a_render.get(i) != b_render.get(i);
            let prefix = if differs {
                first_failure.get_or_insert(i);
                &char_error
            } else {
                &char_equal
            };
            a_out.push_str(&format!("{prefix}{}\n", get(&a_lines, i)));
            b_out.push_str(&format!("{prefix}{}\n", get(&b_lines, i)));
        }

        if let Some(i) = first_failure {
            let first_a = get(&a_render, i);
            let first_b = get(&b_render, i);
            let greater = text_width(&first_a).max(text_width(&first_b));
            b_out.push_str("--------------------------------------\n");
            b_out.push_str("First line mismatch showing withspaces\n");
            b_out.push_str(&format!("{} (expected)\n", ljust(&first_a, greater, " ")));
            b_out.push_str(&format!("{} (received)\n", ljust(&first_b, greater, " ")));
        }
        (a_out, b_out)
    }

    /// Renders each unit with its captured output, then a closing rule.
    /// Without outputs the units are listed vertically.
    pub fn show_unit_list(
        &self,
        units: &[Unit],
        user_outputs: Option<&[Option<String>]>,
        raw: bool,
        vertical: bool,
    ) -> String {
        let mut out = String::new();
        for (i, unit) in units.iter().enumerate() {
            let user = user_outputs.and_then(|outputs| outputs.get(i)).and_then(|u| u.as_deref());
            out.push_str(&self.show_unit(user, unit, raw, vertical));
        }
        if raw || user_outputs.is_none() || vertical {
            out.push_str(&self.centralize(self.symbols.hbar, self.symbols.hbar));
        } else {
            out.push_str(&self.centralize_with("   ", self.symbols.hbar, " ", " "));
        }
        out.push('\n');
        out
    }

    fn show_unit(&self, user: Option<&str>, unit: &Unit, raw: bool, vertical: bool) -> String {
        let (input, expected, received) = match (raw, vertical, user) {
            (false, true, Some(user)) => {
                let (expected, received) = self.render_down_diff(&unit.output, user);
                (unit.input.clone(), expected, Some(received))
            }
            (true, _, _) => (unit.input.clone(), unit.output.clone(), user.map(String::from)),
            (false, _, _) => (
                self.render_white(&unit.input),
                self.render_white(&unit.output),
                user.map(|u| self.render_white(u)),
            ),
        };
        let title = self.format_title(unit, 0, 0);
        let hbar = self.symbols.hbar;
        let vbar = self.symbols.vbar;
        let mut out = String::new();

        match received {
            Some(received) if !vertical => {
                out.push_str(&self.centralize_with("   ", hbar, " ", " "));
                out.push('\n');
                for line in [
                    self.mount_side_by_side(&title, &title, " ", vbar),
                    self.mount_side_by_side(" INPUT ", " INPUT ", "-", vbar),
                    self.side_by_side(&input, &input),
                    self.mount_side_by_side(" EXPECTED OUTPUT ", " USER OUTPUT ", "-", vbar),
                    self.side_by_side(&expected, &received),
                ] {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            received => {
                out.push_str(&format!("{}\n", self.centralize(hbar, hbar)));
                out.push_str(&format!("{}\n", self.centralize(&title, " ")));
                out.push_str(&format!("{}\n", self.centralize("PROGRAM INPUT", "-")));
                out.push_str(&input);
                out.push_str(&format!("{}\n", self.centralize("EXPECTED OUTPUT", "-")));
                out.push_str(&expected);
                if let Some(received) = received {
                    out.push_str(&format!("{}\n", self.centralize("USER OUTPUT", "-")));
                    out.push_str(&received);
                    if !received.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Column widths of the source and case labels over `units`.
pub fn calc_filler(units: &[Unit]) -> (usize, usize) {
    units.iter().fold((0, 0), |(source, case), unit| {
        (
            source.max(text_width(&unit.source)),
            case.max(text_width(&unit.case)),
        )
    })
}

/// Widest entry of every column.
pub fn max_just(rows: &[[String; 4]]) -> [usize; 4] {
    let mut sizes = [0; 4];
    for row in rows {
        for (size, cell) in sizes.iter_mut().zip(row) {
            *size = (*size).max(text_width(cell));
        }
    }
    sizes
}

/// Centers like Python's `str.center`: with an odd margin on an odd width
/// the extra fill goes left, otherwise right.
pub fn center(text: &str, width: usize, fill: &str) -> String {
    let len = text_width(text);
    if width <= len {
        return text.to_string();
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    format!("{}{text}{}", fill.repeat(left), fill.repeat(margin - left))
}

pub fn ljust(text: &str, width: usize, fill: &str) -> String {
    let len = text_width(text);
    format!("{text}{}", fill.repeat(width.saturating_sub(len)))
}

pub fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn truncate_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

fn get(lines: &[&str], i: usize) -> String {
    lines.get(i).copied().unwrap_or("").to_string()
}

fn ends_clean(text: &str) -> bool {
    text.is_empty() || text.ends_with('\n')
}

fn glyph(symbol: &str) -> char {
    symbol.chars().next().unwrap_or(' ')
}

fn make_odd(width: usize) -> usize {
    if width % 2 == 0 {
        width.saturating_sub(1).max(1)
    } else {
        width
    }
}

/// Terminal width from `COLUMNS`, else the default, made odd.
fn detect_width() -> usize {
    let width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH);
    make_odd(width)
}
