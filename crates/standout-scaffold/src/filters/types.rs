//! Type coercion and inspection: `bool`, `type_debug`.

use minijinja::value::ValueKind;
use minijinja::Value;

const TRUTHY: &[&str] = &["y", "yes", "t", "true", "on"];
const FALSY: &[&str] = &["n", "no", "f", "false", "off", "~", "null", "none"];

/// `bool(value)`: YAML-style boolean coercion.
///
/// Recognised words are matched case-insensitively. Anything else falls back to
/// template truthiness, so `"maybe"` is true and `0.0` is false.
pub fn to_bool(value: Value) -> bool {
    if value.is_none() || value.is_undefined() {
        return false;
    }
    if let Some(text) = value.as_str() {
        let lowered = text.trim().to_lowercase();
        if TRUTHY.contains(&lowered.as_str()) {
            return true;
        }
        if FALSY.contains(&lowered.as_str()) {
            return false;
        }
    }
    value.is_true()
}

/// `type_debug(value)`: the conventional type name of a value.
pub fn type_debug(value: Value) -> &'static str {
    match value.kind() {
        ValueKind::Undefined => "Undefined",
        ValueKind::None => "NoneType",
        ValueKind::Bool => "bool",
        ValueKind::Number if value.is_integer() => "int",
        ValueKind::Number => "float",
        ValueKind::String => "str",
        ValueKind::Bytes => "bytes",
        ValueKind::Seq => "list",
        ValueKind::Map => "dict",
        ValueKind::Iterable => "generator",
        _ => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_vocabulary_is_case_insensitive() {
        for word in ["y", "Y", "yes", "YES", "yEs", "t", "T", "true", "tRuE", "on", "oN"] {
            assert!(to_bool(Value::from(word)), "{word}");
        }
        for word in [
            "n", "N", "no", "nO", "f", "F", "false", "fAlSe", "off", "oFf", "~", "null", "NULL",
            "none", "nOnE",
        ] {
            assert!(!to_bool(Value::from(word)), "{word}");
        }
    }

    #[test]
    fn test_bool_falls_back_to_truthiness() {
        assert!(to_bool(Value::from("maybe")));
        assert!(!to_bool(Value::from("")));
        assert!(to_bool(Value::from(2)));
        assert!(!to_bool(Value::from(0)));
        assert!(!to_bool(Value::from(0.0)));
        assert!(to_bool(Value::from(-1.1)));
        assert!(!to_bool(Value::from(())));
        assert!(!to_bool(Value::UNDEFINED));
        assert!(to_bool(Value::from(true)));
    }

    #[test]
    fn test_type_debug_names() {
        assert_eq!(type_debug(Value::from("foo")), "str");
        assert_eq!(type_debug(Value::from(123)), "int");
        assert_eq!(type_debug(Value::from(1.5)), "float");
        assert_eq!(type_debug(Value::from(false)), "bool");
        assert_eq!(type_debug(Value::from(())), "NoneType");
        assert_eq!(type_debug(Value::from(vec![1, 2])), "list");
        assert_eq!(
            type_debug(Value::from_serialize(std::collections::BTreeMap::from([("a", 1)]))),
            "dict"
        );
    }
}
