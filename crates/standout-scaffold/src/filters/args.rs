//! Argument helpers shared by the filters.
//!
//! Scaffold filters accept most parameters either positionally or as keyword
//! arguments (`hash('md5')` and `hash(algorithm='md5')` are equivalent). A `none`
//! argument counts as "not given".

use minijinja::value::Kwargs;
use minijinja::{Error, ErrorKind, Value};

use crate::error::FilterError;

fn given(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_none() && !v.is_undefined())
}

/// Resolves a parameter passed positionally or by keyword.
pub(crate) fn param(
    positional: Option<Value>,
    kwargs: &Kwargs,
    name: &str,
) -> Result<Option<Value>, Error> {
    let keyword: Option<Value> = kwargs.get(name)?;
    match (given(positional), given(keyword)) {
        (Some(_), Some(_)) => Err(Error::new(
            ErrorKind::TooManyArguments,
            format!("got multiple values for argument \"{}\"", name),
        )),
        (positional, keyword) => Ok(positional.or(keyword)),
    }
}

/// Keyword-only parameter.
pub(crate) fn keyword(kwargs: &Kwargs, name: &str) -> Result<Option<Value>, Error> {
    let value: Option<Value> = kwargs.get(name)?;
    Ok(given(value))
}

pub(crate) fn string_param(
    positional: Option<Value>,
    kwargs: &Kwargs,
    name: &str,
) -> Result<Option<String>, Error> {
    Ok(param(positional, kwargs, name)?.map(|v| v.to_string()))
}

pub(crate) fn int_param(
    positional: Option<Value>,
    kwargs: &Kwargs,
    name: &str,
) -> Result<Option<i64>, Error> {
    param(positional, kwargs, name)?
        .map(|v| as_int(&v, name))
        .transpose()
}

/// Keyword-only boolean flag.
pub(crate) fn flag(kwargs: &Kwargs, name: &str, default: bool) -> Result<bool, Error> {
    Ok(keyword(kwargs, name)?.map_or(default, |v| v.is_true()))
}

pub(crate) fn as_int(value: &Value, name: &str) -> Result<i64, Error> {
    value.as_i64().ok_or_else(|| {
        FilterError::invalid(format!(
            "argument \"{}\" must be an integer, got {}",
            name,
            value.kind()
        ))
        .into()
    })
}

/// Whether the value is a list-like container (strings and maps are not).
pub(crate) fn is_sequence(value: &Value) -> bool {
    matches!(
        value.kind(),
        minijinja::value::ValueKind::Seq | minijinja::value::ValueKind::Iterable
    )
}
