//! Token replacement against a variable store.
//!
//! Rewrites query strings, legends, and titles by substituting every
//! variable token with the variable's current value:
//!
//! | Token           | Replaced with                                       |
//! |-----------------|-----------------------------------------------------|
//! | `$name`         | the value under the interpolator's default format   |
//! | `[[name]]`      | same (legacy form; a `:fmt` suffix is consumed)     |
//! | `${name}`       | same                                                |
//! | `${name:fmt}`   | the value rendered by the named format              |
//! | `${name.field}` | the value; the field path is not indexed into       |
//!
//! Tokens naming a variable that is not defined anywhere are left in the
//! output byte-for-byte, so partially resolvable text degrades visibly
//! instead of silently losing pieces.  Replacement is infallible.

use indexmap::IndexMap;
use regex::Captures;

use crate::format::{format_value, Format};
use crate::store::{VariableStore, VariableValue};
use crate::token::{contains_variable, token_regex, VariableMatch};

/// Ad-hoc variable bindings consulted before the store, used for
/// request-local values that never live in the dashboard model.
#[derive(Debug, Clone, Default)]
pub struct ScopedVars {
    vars: IndexMap<String, VariableValue>,
}

impl ScopedVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or overwrite) a scoped variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Replaces variable tokens in text with values from a [`VariableStore`],
/// optionally overlaid with [`ScopedVars`].
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    store: &'a VariableStore,
    scoped: Option<&'a ScopedVars>,
    default_format: Format,
}

impl<'a> Interpolator<'a> {
    pub fn new(store: &'a VariableStore) -> Self {
        Self { store, scoped: None, default_format: Format::Default }
    }

    /// Consult `scoped` before the store for every lookup.
    pub fn with_scoped(mut self, scoped: &'a ScopedVars) -> Self {
        self.scoped = Some(scoped);
        self
    }

    /// Format applied to tokens that carry no `:fmt` suffix of their own.
    pub fn with_default_format(mut self, format: Format) -> Self {
        self.default_format = format;
        self
    }

    /// Replace every resolvable token in `text`.
    pub fn replace(&self, text: &str) -> String {
        if !contains_variable(text) {
            return text.to_owned();
        }
        token_regex()
            .replace_all(text, |caps: &Captures<'_>| {
                VariableMatch::from_captures(caps)
                    .and_then(|token| self.render(&token))
                    .unwrap_or_else(|| caps[0].to_owned())
            })
            .into_owned()
    }

    /// Render one token, or `None` when its variable is undefined.
    fn render(&self, token: &VariableMatch<'_>) -> Option<String> {
        let format = match token.format() {
            Some(name) => Format::parse_or_default(name),
            None => self.default_format,
        };

        // Scoped bindings shadow the store but carry no display text.
        if let Some(value) = self.scoped.and_then(|scoped| scoped.get(token.name())) {
            return Some(format_value(value, format));
        }

        let var = self.store.get(token.name())?;
        if format == Format::Text {
            return Some(var.text().to_owned());
        }
        Some(format_value(var.value(), format))
    }
}

/// Replace tokens using only a lookup closure, for callers with no store.
/// Tokens the closure cannot resolve stay in place.
pub fn replace_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !contains_variable(text) {
        return text.to_owned();
    }
    token_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            VariableMatch::from_captures(caps)
                .and_then(|token| lookup(token.name()))
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
