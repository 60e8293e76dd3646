//! Dashboard templating model parser.
//!
//! The JSON shape dashboards use to declare their template variables:
//!
//! ```json
//! { "list": [
//!     { "name": "env", "label": "Environment", "type": "custom",
//!       "current": { "text": "Production", "value": "prod" } },
//!     { "name": "host", "type": "query",
//!       "current": { "value": ["web-1", "web-2"] } },
//!     { "name": "region", "type": "constant", "query": "eu-west-1" } ] }
//! ```
//!
//! Parsing is forgiving: entries with local problems (no name, duplicate
//! name) produce a [`ModelError`] and are skipped so one bad entry cannot
//! sink the whole dashboard.  Only malformed JSON fails the load outright.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::store::{Variable, VariableStore, VariableValue};

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal problem with one templating entry.
#[derive(Debug)]
pub struct ModelError {
    pub index: usize,
    pub name: String,
    pub message: String,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "entry {}: {}", self.index, self.message)
        } else {
            write!(f, "entry {} ({}): {}", self.index, self.name, self.message)
        }
    }
}

impl std::error::Error for ModelError {}

/// A templating document that could not be loaded at all.
#[derive(Debug)]
pub enum LoadError {
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Json(err) => write!(f, "invalid templating JSON: {err}"),
            LoadError::Io(err) => write!(f, "cannot read templating file: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Json(err) => Some(err),
            LoadError::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Json(err)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

/// Parse a templating document into a variable store.
///
/// Returns the store and a list of per-entry problems for entries that
/// were skipped.
pub fn parse_templating(json: &str) -> Result<(VariableStore, Vec<ModelError>), LoadError> {
    let model: TemplatingModel = serde_json::from_str(json)?;
    let mut store = VariableStore::new();
    let mut errors = Vec::new();

    for (index, entry) in model.list.into_iter().enumerate() {
        if entry.name.is_empty() {
            errors.push(ModelError {
                index,
                name: String::new(),
                message: "variable has no name".into(),
            });
            continue;
        }
        if store.contains(&entry.name) {
            errors.push(ModelError {
                index,
                name: entry.name.clone(),
                message: "duplicate variable name".into(),
            });
            continue;
        }

        let value = entry.value();
        let text = entry.text(&value);
        let mut var = Variable::new(entry.name, text, value);
        if let Some(label) = entry.label {
            var = var.with_label(label);
        }
        store.define(var);
    }

    debug!(
        variables = store.len(),
        skipped = errors.len(),
        "parsed dashboard templating model"
    );
    Ok((store, errors))
}

/// Read and parse a templating document from disk.
pub fn load_templating_file(path: &Path) -> Result<(VariableStore, Vec<ModelError>), LoadError> {
    let json = std::fs::read_to_string(path)?;
    parse_templating(&json)
}

// ── JSON shape ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TemplatingModel {
    #[serde(default)]
    list: Vec<VariableModel>,
}

#[derive(Debug, Deserialize)]
struct VariableModel {
    #[serde(default)]
    name: String,
    label: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
    current: Option<CurrentSelection>,
    /// Left loose: query variables carry datasource-specific objects here.
    query: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CurrentSelection {
    text: Option<OneOrMany>,
    value: Option<OneOrMany>,
}

/// `current.text` and `current.value` may be a string or a string array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn to_value(&self) -> VariableValue {
        match self {
            OneOrMany::One(v) => VariableValue::Single(v.clone()),
            OneOrMany::Many(vs) => VariableValue::Multi(vs.clone()),
        }
    }

    fn join_text(&self) -> String {
        match self {
            OneOrMany::One(v) => v.clone(),
            OneOrMany::Many(vs) => vs.join(" + "),
        }
    }
}

impl VariableModel {
    fn value(&self) -> VariableValue {
        if let Some(value) = self.current.as_ref().and_then(|c| c.value.as_ref()) {
            return value.to_value();
        }
        // No current selection: constants carry their value in `query`.
        if self.kind == "constant" {
            if let Some(query) = self.query.as_ref().and_then(Value::as_str) {
                return VariableValue::Single(query.to_owned());
            }
        }
        VariableValue::Single(String::new())
    }

    fn text(&self, value: &VariableValue) -> String {
        if let Some(text) = self.current.as_ref().and_then(|c| c.text.as_ref()) {
            return text.join_text();
        }
        match value {
            VariableValue::Single(v) => v.clone(),
            VariableValue::Multi(vs) => vs.join(" + "),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
