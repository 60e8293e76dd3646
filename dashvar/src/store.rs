//! Dashboard variable store.
//!
//! Holds the current selection of every template variable by name.  Entries
//! come from the dashboard templating model (see [`crate::model`]) or are set
//! programmatically; [`crate::interp`] reads them during token replacement.

use indexmap::IndexMap;

/// Current value of a variable: a single selection or a multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableValue {
    Single(String),
    Multi(Vec<String>),
}

impl VariableValue {
    /// The selected values as a slice; a single selection is a slice of one.
    pub fn values(&self) -> &[String] {
        match self {
            VariableValue::Single(v) => std::slice::from_ref(v),
            VariableValue::Multi(vs) => vs,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, VariableValue::Multi(_))
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Single(value.to_owned())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        VariableValue::Multi(values)
    }
}

impl From<Vec<&str>> for VariableValue {
    fn from(values: Vec<&str>) -> Self {
        VariableValue::Multi(values.into_iter().map(str::to_owned).collect())
    }
}

/// A template variable with its current selection.
///
/// `text` is the human-readable form of the selection (shown in pickers and
/// used by the `text` format); `value` is what queries interpolate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    label: Option<String>,
    text: String,
    value: VariableValue,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        value: impl Into<VariableValue>,
    ) -> Self {
        Self {
            name: name.into(),
            label: None,
            text: text.into(),
            value: value.into(),
        }
    }

    /// Attach a display label (the dashboard's `label` field).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &VariableValue {
        &self.value
    }
}

/// Name-keyed variable store, iterated in definition order.
#[derive(Debug, Default)]
pub struct VariableStore {
    vars: IndexMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable, deriving its display text from the
    /// value.  Multi-select text joins the values with `" + "`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<VariableValue>) {
        let name = name.into();
        let value = value.into();
        let text = match &value {
            VariableValue::Single(v) => v.clone(),
            VariableValue::Multi(vs) => vs.join(" + "),
        };
        self.define(Variable::new(name, text, value));
    }

    /// Insert a fully described variable, overwriting any existing entry
    /// with the same name.
    pub fn define(&mut self, var: Variable) {
        self.vars.insert(var.name.clone(), var);
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Get just the current value of a variable.
    pub fn value(&self, name: &str) -> Option<&VariableValue> {
        self.vars.get(name).map(Variable::value)
    }

    /// Remove a variable.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.shift_remove(name).is_some()
    }

    /// Returns `true` if the variable is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over all variables in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }

    /// Iterate over defined names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
