//! Explicit "undefined" results for lookups that may not resolve.
//!
//! Container filters such as `extract` do not fail when a key is missing. They
//! produce [`Lookup::Undefined`], which becomes MiniJinja's undefined value inside a
//! template. The failure only surfaces when something forces a concrete value, either
//! the host's undefined behavior or an explicit [`Lookup::require`].

use minijinja::Value;

use crate::error::FilterError;

/// Outcome of resolving a value that may be missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The value was found.
    Found(Value),
    /// Nothing resolved at `path`.
    Undefined { path: String },
}

impl Lookup {
    /// Wraps a template value, treating MiniJinja's undefined as missing.
    pub fn from_value(value: Value, path: impl Into<String>) -> Self {
        if value.is_undefined() {
            Lookup::Undefined { path: path.into() }
        } else {
            Lookup::Found(value)
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Forces the value, failing with an undefined error.
    ///
    /// `msg` replaces the default message when given.
    pub fn require(self, msg: Option<&str>) -> Result<Value, FilterError> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::Undefined { path } => Err(FilterError::Undefined(match msg {
                Some(msg) => msg.to_string(),
                None if path.is_empty() => "Mandatory variable is undefined".to_string(),
                None => format!("Mandatory variable `{}` is undefined", path),
            })),
        }
    }

    /// Converts into a template value; missing values become undefined.
    pub fn into_value(self) -> Value {
        match self {
            Lookup::Found(value) => value,
            Lookup::Undefined { .. } => Value::UNDEFINED,
        }
    }
}

impl From<Lookup> for Value {
    fn from(lookup: Lookup) -> Self {
        lookup.into_value()
    }
}
