//! Tracked values and state snapshots.
//!
//! Change detection in this crate is by *identity*, not structure: a value
//! is "the same" when it is literally the same allocation.  [`PathValue`]
//! makes that explicit.  Cloning one is a reference-count bump that
//! preserves identity, and building a new value (even with equal contents)
//! produces a distinct identity.
//!
//! The contract callers must uphold is the immutable-update discipline:
//! when state evolves, changed fields get new values and unchanged fields
//! keep their old ones.  [`StateSnapshot::with`] derives snapshots that
//! share every untouched value, making the discipline the default.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

// ── StructuredValue ───────────────────────────────────────────────────────────

/// A non-string value that can be rendered as JSON for token scanning.
///
/// Blanket-implemented for every [`Serialize`] type, so any serde-friendly
/// structure can sit at a tracked path.
pub trait StructuredValue: Send + Sync {
    /// Render the value as a JSON string.
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

impl<T: Serialize + Send + Sync> StructuredValue for T {
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── PathValue ─────────────────────────────────────────────────────────────────

/// The value held at a tracked path of a state snapshot.
#[derive(Clone)]
pub enum PathValue {
    /// A plain string value, scanned directly.
    Text(Arc<str>),
    /// A structured value, scanned through its JSON rendering.
    Structured(Arc<dyn StructuredValue>),
}

impl PathValue {
    /// A text value.
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        PathValue::Text(value.into())
    }

    /// A structured value.
    pub fn structured<T: StructuredValue + 'static>(value: T) -> Self {
        PathValue::Structured(Arc::new(value))
    }

    /// Identity comparison: `true` only when both sides are the same
    /// allocation.  Equal contents in different allocations are *not* the
    /// same instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (PathValue::Text(a), PathValue::Text(b)) => Arc::ptr_eq(a, b),
            (PathValue::Structured(a), PathValue::Structured(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The string form used for token scanning.
    ///
    /// Empty text contributes nothing.  Structured values are rendered as
    /// JSON; a failed rendering is logged and likewise contributes nothing,
    /// so scanning never fails, it only skips.
    pub fn as_scan_text(&self) -> Option<Cow<'_, str>> {
        match self {
            PathValue::Text(s) if s.is_empty() => None,
            PathValue::Text(s) => Some(Cow::Borrowed(s)),
            PathValue::Structured(value) => match value.to_json() {
                Ok(json) => Some(Cow::Owned(json)),
                Err(error) => {
                    warn!(%error, "tracked value failed to render as JSON; treated as empty");
                    None
                }
            },
        }
    }
}

impl fmt::Debug for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PathValue::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

impl From<&str> for PathValue {
    fn from(value: &str) -> Self {
        PathValue::text(value)
    }
}

impl From<String> for PathValue {
    fn from(value: String) -> Self {
        PathValue::text(value)
    }
}

impl From<serde_json::Value> for PathValue {
    fn from(value: serde_json::Value) -> Self {
        PathValue::structured(value)
    }
}

// ── TrackedState ──────────────────────────────────────────────────────────────

/// Read access to the tracked paths of a state type.
///
/// Implementations are typically a `match` over the paths the type knows
/// about; unknown paths return `None` (absent, never an error).
pub trait TrackedState {
    /// The value at `path`, or `None` when the path is absent.
    fn path_value(&self, path: &str) -> Option<&PathValue>;
}

// ── StateSnapshot ─────────────────────────────────────────────────────────────

/// A ready-made string-keyed state snapshot.
///
/// Paths keep insertion order.  Snapshots are built once and then evolved
/// with [`with`](Self::with) / [`without`](Self::without), which derive a
/// new snapshot sharing every untouched value with its parent.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    fields: IndexMap<String, PathValue>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a path, consuming and returning the snapshot (builder style).
    pub fn set(mut self, path: impl Into<String>, value: impl Into<PathValue>) -> Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    /// Derive a snapshot with `path` replaced; all other values are shared.
    pub fn with(&self, path: impl Into<String>, value: impl Into<PathValue>) -> Self {
        let mut next = self.clone();
        next.fields.insert(path.into(), value.into());
        next
    }

    /// Derive a snapshot with `path` removed; all other values are shared.
    pub fn without(&self, path: &str) -> Self {
        let mut next = self.clone();
        next.fields.shift_remove(path);
        next
    }

    /// The value at `path`, if any.
    pub fn value(&self, path: &str) -> Option<&PathValue> {
        self.fields.get(path)
    }

    /// Iterate over the snapshot's paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wrap the snapshot for handing to a dependency tracker.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl TrackedState for StateSnapshot {
    fn path_value(&self, path: &str) -> Option<&PathValue> {
        self.fields.get(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;
    use serde_json::json;

    /// A value whose JSON rendering always fails.
    struct Unrenderable;

    impl Serialize for Unrenderable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no JSON form"))
        }
    }

    // -- identity -------------------------------------------------------------

    #[test]
    fn clone_preserves_identity() {
        let value = PathValue::text("rate($metric)");
        assert!(value.clone().same_instance(&value));
    }

    #[test]
    fn equal_contents_are_distinct_instances() {
        let a = PathValue::text("same");
        let b = PathValue::text("same");
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn variants_never_compare_same() {
        let text = PathValue::text("x");
        let structured = PathValue::structured(json!({ "x": 1 }));
        assert!(!text.same_instance(&structured));
        assert!(!structured.same_instance(&text));
    }

    #[test]
    fn structured_clone_preserves_identity() {
        let value = PathValue::structured(json!({ "query": "$a" }));
        assert!(value.clone().same_instance(&value));
    }

    // -- scan text ------------------------------------------------------------

    #[test]
    fn text_scans_borrowed() {
        let value = PathValue::text("hello $world");
        assert_eq!(value.as_scan_text().as_deref(), Some("hello $world"));
    }

    #[test]
    fn empty_text_scans_as_absent() {
        assert!(PathValue::text("").as_scan_text().is_none());
    }

    #[test]
    fn structured_scans_through_json() {
        let value = PathValue::structured(json!({ "expr": "up{job=\"$job\"}" }));
        let text = value.as_scan_text().unwrap();
        assert!(text.contains("$job"));
    }

    #[test]
    fn failed_rendering_scans_as_absent() {
        let value = PathValue::structured(Unrenderable);
        assert!(value.as_scan_text().is_none());
    }

    // -- snapshots ------------------------------------------------------------

    #[test]
    fn with_shares_untouched_values() {
        let first = StateSnapshot::new()
            .set("query", "rate($metric[5m])")
            .set("legend", "${host}");
        let second = first.with("query", "sum($metric)");

        let untouched = (first.value("legend").unwrap(), second.value("legend").unwrap());
        assert!(untouched.0.same_instance(untouched.1));

        let touched = (first.value("query").unwrap(), second.value("query").unwrap());
        assert!(!touched.0.same_instance(touched.1));
    }

    #[test]
    fn without_removes_only_the_named_path() {
        let first = StateSnapshot::new().set("a", "$x").set("b", "$y");
        let second = first.without("a");
        assert!(second.value("a").is_none());
        assert!(second.value("b").unwrap().same_instance(first.value("b").unwrap()));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn paths_keep_insertion_order() {
        let snap = StateSnapshot::new().set("z", "1").set("a", "2").set("m", "3");
        let paths: Vec<_> = snap.paths().collect();
        assert_eq!(paths, ["z", "a", "m"]);
    }

    #[test]
    fn empty_snapshot() {
        let snap = StateSnapshot::new();
        assert!(snap.is_empty());
        assert!(snap.value("anything").is_none());
    }
}
