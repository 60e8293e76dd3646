//! Incremental variable-dependency tracking.
//!
//! A [`VariableDependencySet`] watches a fixed list of *tracked paths* on a
//! state snapshot and answers "which variables does this object depend on?"
//! without rescanning on every call.
//!
//! ## Caching contract
//!
//! A rescan happens exactly when:
//!
//! 1. no snapshot has been seen yet (the first call), or
//! 2. the snapshot is a different instance than the last one seen **and**
//!    at least one tracked path's value differs by identity.
//!
//! Handing in the same snapshot instance never rescans.  Handing in a new
//! snapshot whose tracked values are all shared with the old one records
//! the new snapshot but keeps the cached set, so callers following the
//! derive-a-new-snapshot update style (see
//! [`StateSnapshot::with`](crate::state::StateSnapshot::with)) pay for a
//! scan only when a tracked value was actually replaced.
//!
//! The set always reflects exactly the most recent scan, never a union of
//! history.  Trackers are independent, synchronous, and meant for a single
//! logical owner calling sequentially.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::state::TrackedState;
use crate::token::find_variables;

/// Tracks which variables a state object references through its tracked
/// paths, rescanning only when a tracked value actually changed.
#[derive(Debug)]
pub struct VariableDependencySet<S> {
    /// Tracked paths, in construction order; immutable for the tracker's
    /// lifetime.
    paths: Vec<String>,
    /// Variable names found by the most recent scan, in insertion order.
    dependencies: IndexSet<String>,
    /// The last snapshot seen, held for identity comparison only.
    prev_state: Option<Arc<S>>,
    scan_count: u64,
}

impl<S: TrackedState> VariableDependencySet<S> {
    /// Create a tracker over the given tracked paths.
    pub fn new<I>(paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            dependencies: IndexSet::new(),
            prev_state: None,
            scan_count: 0,
        }
    }

    /// The set of variable names the snapshot currently depends on.
    ///
    /// Scans on the first call; afterwards rescans only per the caching
    /// contract above.  Always returns a well-formed set: unreadable
    /// values skip their path rather than failing the call.
    pub fn names(&mut self, state: &Arc<S>) -> &IndexSet<String> {
        let rescan = match self.prev_state.as_ref() {
            None => true,
            // Same snapshot instance: nothing can have changed.
            Some(prev) if Arc::ptr_eq(prev, state) => return &self.dependencies,
            Some(prev) => self.paths_changed(prev, state),
        };

        self.prev_state = Some(Arc::clone(state));
        if rescan {
            self.scan(state);
        }
        &self.dependencies
    }

    /// How many scans have run.  Increases by exactly one per rescan and
    /// never otherwise.
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    /// Returns `true` if the most recent scan found a reference to `name`.
    pub fn has_dependency_on(&self, name: &str) -> bool {
        self.dependencies.contains(name)
    }

    /// The tracked paths, in construction order.
    pub fn tracked_paths(&self) -> &[String] {
        &self.paths
    }

    /// `true` when any tracked path's value differs by identity between the
    /// two snapshots.  A path absent from both counts as unchanged.
    fn paths_changed(&self, prev: &S, next: &S) -> bool {
        self.paths.iter().any(|path| {
            match (prev.path_value(path), next.path_value(path)) {
                (None, None) => false,
                (Some(old), Some(new)) => !old.same_instance(new),
                _ => true,
            }
        })
    }

    /// Full rescan: rebuild the set from every tracked path in list order.
    fn scan(&mut self, state: &S) {
        self.scan_count += 1;
        debug!(scan = self.scan_count, "scanning tracked paths for variable references");

        let Self { paths, dependencies, .. } = self;
        dependencies.clear();
        for path in paths.iter() {
            let Some(value) = state.path_value(path) else { continue };
            let Some(text) = value.as_scan_text() else { continue };
            for token in find_variables(&text) {
                dependencies.insert(token.name().to_owned());
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
