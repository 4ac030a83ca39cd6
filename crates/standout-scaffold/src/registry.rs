//! Filter registration and name-conflict handling.
//!
//! The registrar walks the ordered filter catalog and binds every entry into a
//! [`FilterTable`]. A name that is already bound is reported with a `tracing`
//! warning and then resolved according to the [`ConflictPolicy`]. The policy step
//! does not depend on MiniJinja: any mapping that can answer "is this name bound?"
//! and accept a new binding can be populated.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use minijinja::Value;
//! use standout_scaffold::register_filters;
//!
//! let mut table: BTreeMap<String, Value> = BTreeMap::new();
//! table.insert("hash".into(), Value::from("host implementation"));
//!
//! let overwritten = register_filters(&mut table);
//! assert_eq!(overwritten, vec!["hash"]);
//! assert!(table.contains_key("to_nice_yaml"));
//! ```

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Deserialize;

use crate::filters;

/// A mutable name → filter mapping owned by the host environment.
pub trait FilterTable {
    /// Whether `name` is currently bound to a filter.
    fn has_filter(&self, name: &str) -> bool;

    /// Binds `name` to `filter`, replacing any previous binding.
    ///
    /// `filter` is a callable value created with [`Value::from_function`].
    fn insert_filter(&mut self, name: &'static str, filter: Value);
}

impl FilterTable for BTreeMap<String, Value> {
    fn has_filter(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn insert_filter(&mut self, name: &'static str, filter: Value) {
        self.insert(name.to_string(), filter);
    }
}

/// What to do when a filter name is already bound in the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Replace the host's binding with the scaffold implementation.
    #[default]
    Overwrite,
    /// Leave the host's binding in place.
    KeepExisting,
}

impl ConflictPolicy {
    fn describe(self) -> &'static str {
        match self {
            ConflictPolicy::Overwrite => "overwritten",
            ConflictPolicy::KeepExisting => "kept",
        }
    }
}

/// Registers the full scaffold filter set, overwriting colliding names.
///
/// Returns the names that were already bound, in registration order.
pub fn register_filters<T: FilterTable + ?Sized>(table: &mut T) -> Vec<&'static str> {
    register_filters_with(table, ConflictPolicy::Overwrite)
}

/// Registers the full scaffold filter set using `policy` for collisions.
///
/// Each collision emits one warning naming the filter. Returns the colliding
/// names in registration order.
pub fn register_filters_with<T: FilterTable + ?Sized>(
    table: &mut T,
    policy: ConflictPolicy,
) -> Vec<&'static str> {
    let catalog = filters::catalog();
    let total = catalog.len();
    let mut collisions = Vec::new();

    for (name, filter) in catalog {
        if table.has_filter(name) {
            tracing::warn!(
                filter = name,
                "A filter named \"{}\" already exists in the template environment and will be {}",
                name,
                policy.describe()
            );
            collisions.push(name);
            if policy == ConflictPolicy::KeepExisting {
                continue;
            }
        }
        table.insert_filter(name, filter);
    }

    tracing::debug!(
        installed = total - skipped(policy, &collisions),
        collisions = collisions.len(),
        "registered scaffold filters"
    );
    collisions
}

fn skipped(policy: ConflictPolicy, collisions: &[&'static str]) -> usize {
    match policy {
        ConflictPolicy::Overwrite => 0,
        ConflictPolicy::KeepExisting => collisions.len(),
    }
}

/// Public names of every filter in the scaffold set, in registration order.
pub fn filter_names() -> Vec<&'static str> {
    filters::catalog().into_iter().map(|(name, _)| name).collect()
}
