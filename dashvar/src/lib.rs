//! Dashboard template-variable engine.
//!
//! Dashboards reference template variables from queries, legends, and
//! titles using three token syntaxes:
//!
//! | Syntax         | Example         |
//! |----------------|-----------------|
//! | dollar         | `$region`       |
//! | double bracket | `[[region]]`    |
//! | dollar brace   | `${region:csv}` |
//!
//! The crate owns everything from the token grammar up to interpolated
//! output: [`token`] finds references, [`deps`] tracks which variables a
//! panel depends on without rescanning unchanged state, [`store`] holds
//! current selections, [`format`] and [`interp`] render them back into
//! text, and [`model`] loads the dashboard templating JSON.
//!
//! ```
//! use dashvar::{StateSnapshot, VariableDependencySet};
//!
//! let mut deps = VariableDependencySet::new(["query"]);
//! let snap = StateSnapshot::new()
//!     .set("query", "rate(http_requests{env=\"$env\"}[$__interval])")
//!     .shared();
//! assert!(deps.names(&snap).contains("env"));
//! assert!(deps.names(&snap).contains("__interval"));
//! assert_eq!(deps.scan_count(), 1);
//! ```

pub mod deps;
pub mod format;
pub mod interp;
pub mod model;
pub mod state;
pub mod store;
pub mod token;

pub use deps::VariableDependencySet;
pub use format::{format_value, Format};
pub use interp::{replace_with, Interpolator, ScopedVars};
pub use model::{load_templating_file, parse_templating};
pub use state::{PathValue, StateSnapshot, TrackedState};
pub use store::{Variable, VariableStore, VariableValue};
pub use token::{contains_variable, find_variables, VariableMatch};
