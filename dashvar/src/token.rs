//! The variable-token grammar.
//!
//! One shared regular expression recognises every way a dashboard string can
//! reference a template variable:
//!
//! | Syntax              | Example              | Notes                                     |
//! |---------------------|----------------------|-------------------------------------------|
//! | `$name`             | `$region`            | bare form; name is `\w+`                  |
//! | `[[name]]`          | `[[region]]`         | legacy bracket form; `[[name:fmt]]` is recognised too |
//! | `${name}`           | `${region}`          | brace form                                |
//! | `${name.field}`     | `${server.host}`     | brace form with a field path              |
//! | `${name:format}`    | `${region:csv}`      | brace form with a format request          |
//!
//! The three syntaxes contribute the variable name to capture groups 1, 2
//! and 3 respectively; the name of a match is the first non-empty of those
//! groups.  The field path and format of the brace form land in groups 4
//! and 5.  The bracket form's `:fmt` suffix is consumed but not captured so
//! the name groups keep their positions.
//!
//! Matching uses the [`regex`] crate's stateless iteration; there is no
//! shared cursor to reset between scans.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// The shared token pattern.  See the module table for the grammar.
const VARIABLE_PATTERN: &str =
    r"\$(\w+)|\[\[(\w+?)(?::\w+)?\]\]|\$\{(\w+)(?:\.([^:}]+))?(?::([^}]+))?\}";

static VARIABLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    // The pattern is a compile-time constant; an invalid pattern is a bug
    // caught by the tests below, not a runtime condition.
    Regex::new(VARIABLE_PATTERN).expect("variable token pattern is valid")
});

/// The shared variable-reference matcher.
///
/// Exposed so collaborators that need raw regex access (e.g. splitting on
/// tokens) use the same grammar as [`find_variables`].
pub fn token_regex() -> &'static Regex {
    &VARIABLE_TOKEN
}

/// Returns `true` if `text` contains at least one variable token.
pub fn contains_variable(text: &str) -> bool {
    token_regex().is_match(text)
}

// ── VariableMatch ─────────────────────────────────────────────────────────────

/// Which of the reference syntaxes a token was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `$name`
    Dollar,
    /// `[[name]]`
    Brackets,
    /// `${name}`, `${name.field}`, `${name:format}`
    Braces,
}

/// One variable token found in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableMatch<'t> {
    text: &'t str,
    start: usize,
    end: usize,
    syntax: Syntax,
    name: &'t str,
    field_path: Option<&'t str>,
    format: Option<&'t str>,
}

impl<'t> VariableMatch<'t> {
    /// Build a match from the shared matcher's captures.
    ///
    /// The variable name is the first non-empty of capture groups 1, 2, 3.
    /// Returns `None` if no name group participated (unreachable for the
    /// grammar above, but the matcher is treated as data, not trusted).
    pub(crate) fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let whole = caps.get(0)?;
        let (name, syntax) = if let Some(m) = caps.get(1) {
            (m, Syntax::Dollar)
        } else if let Some(m) = caps.get(2) {
            (m, Syntax::Brackets)
        } else if let Some(m) = caps.get(3) {
            (m, Syntax::Braces)
        } else {
            return None;
        };
        Some(Self {
            text: whole.as_str(),
            start: whole.start(),
            end: whole.end(),
            syntax,
            name: name.as_str(),
            field_path: caps.get(4).map(|m| m.as_str()),
            format: caps.get(5).map(|m| m.as_str()),
        })
    }

    /// The full token text, e.g. `"${region:csv}"`.
    pub fn as_str(&self) -> &'t str {
        self.text
    }

    /// The referenced variable's name.
    pub fn name(&self) -> &'t str {
        self.name
    }

    /// The field path of a `${name.field}` token.
    pub fn field_path(&self) -> Option<&'t str> {
        self.field_path
    }

    /// The requested format of a `${name:format}` token.
    pub fn format(&self) -> Option<&'t str> {
        self.format
    }

    /// Which syntax the token used.
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Byte offset of the token's first byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the token's last byte.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range of the token within the scanned text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterate over every variable token in `text`, left to right.
///
/// Matches never overlap; adjacent tokens (`"${a}${b}"`) each yield their
/// own match.
pub fn find_variables(text: &str) -> impl Iterator<Item = VariableMatch<'_>> {
    token_regex()
        .captures_iter(text)
        .filter_map(|caps| VariableMatch::from_captures(&caps))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
