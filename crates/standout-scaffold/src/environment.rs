//! A MiniJinja environment with the scaffold filters installed.

use std::collections::BTreeSet;

use minijinja::value::Rest;
use minijinja::{path_loader, Environment, State, Value};
use serde::Serialize;

use crate::config::EnvConfig;
use crate::error::Result;
use crate::registry::{register_filters_with, ConflictPolicy, FilterTable};

/// Filters MiniJinja's default environment already defines.
///
/// MiniJinja cannot be asked whether a filter exists, so collisions with its
/// built-ins are detected against this list. Filters gated behind MiniJinja
/// features this crate does not enable (`tojson`, `urlencode`) are left out.
pub const BUILTIN_FILTERS: &[&str] = &[
    "abs",
    "attr",
    "batch",
    "bool",
    "capitalize",
    "count",
    "d",
    "default",
    "dictsort",
    "e",
    "escape",
    "first",
    "float",
    "groupby",
    "indent",
    "int",
    "items",
    "join",
    "last",
    "length",
    "lines",
    "list",
    "lower",
    "map",
    "max",
    "min",
    "pprint",
    "reject",
    "rejectattr",
    "replace",
    "reverse",
    "round",
    "safe",
    "select",
    "selectattr",
    "slice",
    "sort",
    "split",
    "string",
    "sum",
    "title",
    "trim",
    "unique",
    "upper",
];

/// Wraps a MiniJinja [`Environment`] and tracks which filter names are bound.
///
/// ```rust
/// use standout_scaffold::ScaffoldEnvironment;
///
/// let env = ScaffoldEnvironment::new();
/// let out = env.render_str("{{ 'test2' | hash('md5') }}", ()).unwrap();
/// assert_eq!(out, "ad0234829205b9033196ba818f7a872b");
/// ```
pub struct ScaffoldEnvironment {
    env: Environment<'static>,
    bound: BTreeSet<String>,
    collisions: Vec<&'static str>,
}

impl ScaffoldEnvironment {
    /// Default environment with the scaffold filters installed.
    ///
    /// MiniJinja's own `bool` filter is replaced by the scaffold one.
    pub fn new() -> Self {
        let mut env = Self::with_builtins();
        env.install(ConflictPolicy::Overwrite);
        env
    }

    /// Default MiniJinja environment without the scaffold filters.
    pub fn with_builtins() -> Self {
        Self {
            env: Environment::new(),
            bound: BUILTIN_FILTERS.iter().map(|name| name.to_string()).collect(),
            collisions: Vec::new(),
        }
    }

    /// Environment with no filters, tests or globals at all.
    pub fn empty() -> Self {
        Self {
            env: Environment::empty(),
            bound: BTreeSet::new(),
            collisions: Vec::new(),
        }
    }

    /// Builds an environment from `config` and installs the scaffold filters.
    pub fn from_config(config: &EnvConfig) -> Result<Self> {
        let mut env = if config.builtins {
            Self::with_builtins()
        } else {
            Self::empty()
        };

        if config.has_custom_syntax() {
            env.env.set_syntax(config.syntax.to_syntax_config()?);
        }
        env.env.set_undefined_behavior(config.undefined.into());
        env.env.set_keep_trailing_newline(config.keep_trailing_newline);
        if let Some(dir) = &config.template_dir {
            env.env.set_loader(path_loader(dir));
        }

        env.install(config.on_conflict);
        Ok(env)
    }

    /// Registers the scaffold filters, resolving collisions with `policy`.
    pub fn install(&mut self, policy: ConflictPolicy) -> &[&'static str] {
        self.collisions = register_filters_with(self, policy);
        &self.collisions
    }

    /// Names that collided during the last [`install`](Self::install).
    pub fn collisions(&self) -> &[&'static str] {
        &self.collisions
    }

    /// Binds `name` to a callable filter value, replacing any previous binding.
    ///
    /// ```rust
    /// use minijinja::Value;
    /// use standout_scaffold::ScaffoldEnvironment;
    ///
    /// let mut env = ScaffoldEnvironment::empty();
    /// env.add_filter("shout", Value::from_function(|s: String| s.to_uppercase()));
    /// assert!(env.has_filter("shout"));
    /// ```
    pub fn add_filter(&mut self, name: impl Into<String>, filter: Value) {
        let name = name.into();
        self.bound.insert(name.clone());
        self.env
            .add_filter(name, move |state: &State, args: Rest<Value>| {
                filter.call(state, &args.0)
            });
    }

    /// Whether `name` is bound, counting MiniJinja built-ins.
    pub fn has_filter(&self, name: &str) -> bool {
        self.bound.contains(name)
    }

    /// Every bound filter name, sorted.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.bound.iter().map(String::as_str)
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Filters added directly through this reference are not tracked for
    /// collision detection; use [`add_filter`](Self::add_filter) for that.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Renders a template string.
    pub fn render_str<S: Serialize>(
        &self,
        source: &str,
        ctx: S,
    ) -> std::result::Result<String, minijinja::Error> {
        self.env.render_str(source, ctx)
    }

    /// Renders a template by name, from added templates or the configured loader.
    pub fn render_named<S: Serialize>(
        &self,
        name: &str,
        ctx: S,
    ) -> std::result::Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Adds a named template from source.
    pub fn add_template(
        &mut self,
        name: &str,
        source: &str,
    ) -> std::result::Result<(), minijinja::Error> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }
}

impl Default for ScaffoldEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTable for ScaffoldEnvironment {
    fn has_filter(&self, name: &str) -> bool {
        ScaffoldEnvironment::has_filter(self, name)
    }

    fn insert_filter(&mut self, name: &'static str, filter: Value) {
        self.add_filter(name, filter);
    }
}
