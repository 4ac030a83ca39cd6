//! Name-based UUIDs.

use minijinja::value::Kwargs;
use minijinja::{Error, Value};
use uuid::Uuid;

use super::args;
use crate::error::FilterError;

/// Default namespace for `to_uuid`, the one Copier uses.
pub const COPIER_NAMESPACE: Uuid = Uuid::from_u128(0xf334e762_7445_5060_8931_a3472a1db5f3);

/// `to_uuid(value, namespace=COPIER_NAMESPACE)`: name-based (v5) UUID.
pub fn to_uuid(value: Value, namespace: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let namespace = args::string_param(namespace, &kwargs, "namespace")?;
    kwargs.assert_all_used()?;

    let namespace = match namespace {
        Some(text) => Uuid::parse_str(&text).map_err(FilterError::from)?,
        None => COPIER_NAMESPACE,
    };
    Ok(Uuid::new_v5(&namespace, value.to_string().as_bytes()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace() {
        assert_eq!(
            COPIER_NAMESPACE.to_string(),
            "f334e762-7445-5060-8931-a3472a1db5f3"
        );
    }

    #[test]
    fn test_name_based_uuid() {
        let id = Uuid::new_v5(&COPIER_NAMESPACE, b"foo");
        assert_eq!(id.to_string(), "faf9357a-ee2a-58ed-94fd-cc8661984561");
    }
}
