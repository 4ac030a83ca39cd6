//! # Standout Scaffold - Scaffolding Filters for MiniJinja
//!
//! `standout-scaffold` adds the filter set project-scaffolding templates expect on
//! top of MiniJinja: hashing and checksums, Base64, JSON and YAML (de)serialization,
//! path manipulation, regular expressions, shell quoting, boolean coercion, date/time
//! formatting, UUIDs, container helpers, and seeded random sampling that reproduces
//! the sequences of the reference scaffolding runtime.
//!
//! ## Core Concepts
//!
//! - [`register_filters`]: Install every filter into any [`FilterTable`]
//! - [`ConflictPolicy`]: What happens when a filter name is already bound
//! - [`ScaffoldEnvironment`]: A MiniJinja environment with the filters installed
//! - [`EnvConfig`]: YAML-loadable environment settings (delimiters, undefined mode)
//! - [`Lookup`]: Explicit undefined results for lookups that may not resolve
//!
//! ## Quick Start
//!
//! ```rust
//! use standout_scaffold::ScaffoldEnvironment;
//! use minijinja::context;
//!
//! let env = ScaffoldEnvironment::new();
//! let out = env.render_str(
//!     "{{ name | to_uuid }} {{ 100 | ans_random(seed='123') }}",
//!     context! { name => "foo" },
//! ).unwrap();
//! assert_eq!(out, "faf9357a-ee2a-58ed-94fd-cc8661984561 93");
//! ```
//!
//! ## Copier-Style Templates
//!
//! ```rust
//! use standout_scaffold::{EnvConfig, ScaffoldEnvironment};
//! use minijinja::context;
//!
//! let env = ScaffoldEnvironment::from_config(&EnvConfig::copier()).unwrap();
//! let out = env.render_str(
//!     "[[ settings | to_nice_yaml ]]",
//!     context! { settings => context! { x => context! { y => vec![1, 2] }, k => "v" } },
//! ).unwrap();
//! assert_eq!(out, "k: v\nx:\n    y:\n    - 1\n    - 2\n");
//! ```
//!
//! ## Name Collisions
//!
//! Registration never fails. When a name is already bound, a `tracing` warning names
//! the filter and the [`ConflictPolicy`] decides whether the scaffold implementation
//! replaces it. The colliding names are returned so callers can act on them without
//! capturing logs.

pub mod config;
pub mod environment;
pub mod error;
pub mod filters;
pub mod lookup;
pub mod registry;

pub use config::EnvConfig;
pub use environment::ScaffoldEnvironment;
pub use error::{FilterError, Result};
pub use lookup::Lookup;
pub use registry::{
    filter_names, register_filters, register_filters_with, ConflictPolicy, FilterTable,
};
