//! Glyph set used by listings and reports.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    pub opening: &'static str,
    pub neutral: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
    pub wrong: &'static str,
    pub compilation: &'static str,
    pub execution: &'static str,
    pub unequal: &'static str,
    pub equalbar: &'static str,
    pub hbar: &'static str,
    pub vbar: &'static str,
    pub whitespace: &'static str,
    pub newline: &'static str,
    pub cfill: &'static str,
}

impl Symbols {
    pub const fn unicode() -> Self {
        Symbols {
            opening: "=>",
            neutral: "»",
            success: "✓",
            failure: "✗",
            wrong: "ω",
            compilation: "ϲ",
            execution: "ϵ",
            unequal: "≠",
            equalbar: "│",
            hbar: "─",
            vbar: "│",
            whitespace: "\u{2E31}",
            newline: "\u{21B5}",
            cfill: "_",
        }
    }

    /// ASCII alternates for the status marks and comparison bars. Rules and
    /// whitespace glyphs keep their unicode form.
    pub const fn ascii() -> Self {
        Symbols {
            opening: "=>",
            neutral: ".",
            success: "S",
            failure: "X",
            wrong: "W",
            compilation: "C",
            execution: "E",
            unequal: "#",
            equalbar: "|",
            hbar: "─",
            vbar: "│",
            whitespace: "\u{2E31}",
            newline: "\u{21B5}",
            cfill: "_",
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Symbols::unicode()
    }
}
