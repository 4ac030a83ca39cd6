//! Container and control filters: `extract`, `flatten`, `ans_groupby`,
//! `mandatory`, `ternary`.

use std::sync::Arc;

use minijinja::value::{Enumerator, Kwargs, Object, ObjectRepr};
use minijinja::{Error, Value};

use super::args;
use crate::error::FilterError;
use crate::lookup::Lookup;

fn path_key(part: &str) -> Value {
    match part.parse::<i64>() {
        Ok(index) => Value::from(index),
        Err(_) => Value::from(part),
    }
}

/// Walks `keys` into `container`; any missing step makes the result undefined.
pub fn lookup_keys(container: &Value, keys: &[Value]) -> Lookup {
    let path = keys
        .iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(".");

    let mut current = container.clone();
    for key in keys {
        if current.is_undefined() {
            break;
        }
        current = current.get_item(key).unwrap_or(Value::UNDEFINED);
    }
    Lookup::from_value(current, path)
}

/// Resolves a dotted attribute path such as `owner.name` or `items.0`.
pub fn lookup_path(container: &Value, path: &str) -> Lookup {
    let keys: Vec<Value> = path.split('.').map(path_key).collect();
    lookup_keys(container, &keys)
}

/// `extract(key, container, morekeys=None)`: `container[key][morekeys…]`.
pub fn extract(
    key: Value,
    container: Value,
    morekeys: Option<Value>,
    kwargs: Kwargs,
) -> Result<Value, Error> {
    let morekeys = args::param(morekeys, &kwargs, "morekeys")?;
    kwargs.assert_all_used()?;

    let mut keys = vec![key];
    match morekeys {
        Some(more) if args::is_sequence(&more) => keys.extend(more.try_iter()?),
        Some(more) => keys.push(more),
        None => {}
    }
    Ok(lookup_keys(&container, &keys).into_value())
}

/// Flattens nested sequences; `levels` of `None` means fully.
pub fn flatten_values(
    items: &Value,
    levels: Option<i64>,
    skip_nulls: bool,
) -> Result<Vec<Value>, Error> {
    let mut out = Vec::new();
    for item in items.try_iter()? {
        if skip_nulls && item.is_none() {
            continue;
        }
        match levels {
            _ if !args::is_sequence(&item) => out.push(item),
            None => out.extend(flatten_values(&item, None, skip_nulls)?),
            Some(depth) if depth >= 1 => {
                out.extend(flatten_values(&item, Some(depth - 1), skip_nulls)?)
            }
            Some(_) => out.push(item),
        }
    }
    Ok(out)
}

/// `flatten(seq, levels=None, skip_nulls=True)`
pub fn flatten(seq: Value, levels: Option<Value>, kwargs: Kwargs) -> Result<Value, Error> {
    let levels = args::int_param(levels, &kwargs, "levels")?;
    let skip_nulls = args::flag(&kwargs, "skip_nulls", true)?;
    kwargs.assert_all_used()?;
    Ok(Value::from(flatten_values(&seq, levels, skip_nulls)?))
}

/// One `(grouper, list)` pair produced by `ans_groupby`.
///
/// Behaves as a two-item sequence and exposes `grouper` / `list` attributes.
#[derive(Debug, Clone)]
pub struct Group {
    pub grouper: Value,
    pub list: Vec<Value>,
}

impl Object for Group {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Seq
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        if let Some(name) = key.as_str() {
            return match name {
                "grouper" => Some(self.grouper.clone()),
                "list" => Some(Value::from(self.list.clone())),
                _ => None,
            };
        }
        match key.as_i64()? {
            0 => Some(self.grouper.clone()),
            1 => Some(Value::from(self.list.clone())),
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Seq(2)
    }
}

fn fold_case(value: Value, case_sensitive: bool) -> Value {
    if case_sensitive {
        return value;
    }
    match value.as_str().map(str::to_lowercase) {
        Some(folded) => Value::from(folded),
        None => value,
    }
}

/// Groups `items` by the value at `attribute`, ordered by that value.
///
/// String keys compare case-insensitively unless `case_sensitive`; the grouper
/// shown is the first member's original value.
pub fn group_by(
    items: &Value,
    attribute: &str,
    default: Option<&Value>,
    case_sensitive: bool,
) -> Result<Vec<Group>, Error> {
    let mut keyed = Vec::new();
    for item in items.try_iter()? {
        let key = match (lookup_path(&item, attribute), default) {
            (Lookup::Found(value), _) => value,
            (Lookup::Undefined { .. }, Some(default)) => default.clone(),
            (Lookup::Undefined { path }, None) => {
                return Err(FilterError::Undefined(format!(
                    "item {} has no attribute `{}`",
                    item, path
                ))
                .into())
            }
        };
        keyed.push((fold_case(key.clone(), case_sensitive), key, item));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut groups: Vec<(Value, Group)> = Vec::new();
    for (sort_key, original, item) in keyed {
        match groups.last_mut() {
            Some((last, group)) if *last == sort_key => group.list.push(item),
            _ => groups.push((
                sort_key,
                Group {
                    grouper: original,
                    list: vec![item],
                },
            )),
        }
    }
    Ok(groups.into_iter().map(|(_, group)| group).collect())
}

/// `ans_groupby(seq, attribute, default=None, case_sensitive=False)`
pub fn ans_groupby(
    seq: Value,
    attribute: Option<Value>,
    default: Option<Value>,
    kwargs: Kwargs,
) -> Result<Value, Error> {
    let attribute = args::string_param(attribute, &kwargs, "attribute")?
        .ok_or_else(|| FilterError::invalid("ans_groupby requires an attribute"))?;
    let default = args::param(default, &kwargs, "default")?;
    let case_sensitive = args::flag(&kwargs, "case_sensitive", false)?;
    kwargs.assert_all_used()?;

    let groups = group_by(&seq, &attribute, default.as_ref(), case_sensitive)?;
    Ok(Value::from(
        groups
            .into_iter()
            .map(Value::from_object)
            .collect::<Vec<_>>(),
    ))
}

/// `mandatory(value, msg=None)`
pub fn mandatory(value: Value, msg: Option<Value>, kwargs: Kwargs) -> Result<Value, Error> {
    let msg = args::string_param(msg, &kwargs, "msg")?;
    kwargs.assert_all_used()?;
    Ok(Lookup::from_value(value, "").require(msg.as_deref())?)
}

/// `ternary(value, true_val, false_val, none_val=None)`
pub fn ternary(
    value: Value,
    true_val: Value,
    false_val: Value,
    none_val: Option<Value>,
    kwargs: Kwargs,
) -> Result<Value, Error> {
    let none_val = args::param(none_val, &kwargs, "none_val")?;
    kwargs.assert_all_used()?;

    Ok(match none_val {
        Some(none_val) if value.is_none() => none_val,
        _ if value.is_true() => true_val,
        _ => false_val,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from_serialize(&json)
    }

    #[test]
    fn test_lookup_keys_walks_containers() {
        let container = v(json!({"k": ["a", {"x": "y"}]}));
        let keys = [Value::from("k"), Value::from(1), Value::from("x")];
        assert_eq!(lookup_keys(&container, &keys), Lookup::Found(Value::from("y")));
    }

    #[test]
    fn test_lookup_keys_reports_missing_path() {
        let container = v(json!({"k": "v"}));
        let lookup = lookup_keys(&container, &[Value::from("k"), Value::from("missing")]);
        assert_eq!(
            lookup,
            Lookup::Undefined {
                path: "k.missing".into()
            }
        );

        let lookup = lookup_keys(&container, &[Value::from("missing"), Value::from("deeper")]);
        assert!(!lookup.is_defined());
    }

    #[test]
    fn test_lookup_path_indexes_numeric_parts() {
        let item = v(json!({"owner": {"names": ["ann", "bo"]}}));
        assert_eq!(
            lookup_path(&item, "owner.names.1"),
            Lookup::Found(Value::from("bo"))
        );
    }

    #[test]
    fn test_flatten_fully_and_drops_nulls() {
        let nested = v(json!([1, [null, [2, null, [3]]]]));
        assert_eq!(
            flatten_values(&nested, None, true).unwrap(),
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );

        let with_nulls = flatten_values(&v(json!([1, null])), None, false).unwrap();
        assert_eq!(with_nulls.len(), 2);
    }

    #[test]
    fn test_flatten_by_levels() {
        let nested = v(json!([1, 2, [3, [4, 5]]]));
        assert_eq!(
            Value::from(flatten_values(&nested, Some(0), true).unwrap()),
            nested
        );
        assert_eq!(
            Value::from(flatten_values(&nested, Some(1), true).unwrap()),
            v(json!([1, 2, 3, [4, 5]]))
        );
        assert_eq!(
            Value::from(flatten_values(&nested, Some(2), true).unwrap()),
            v(json!([1, 2, 3, 4, 5]))
        );
    }

    #[test]
    fn test_group_by_sorts_by_key() {
        let people = v(json!([
            {"name": "Jane", "age": 30},
            {"name": "Alice", "age": 30},
            {"name": "John", "age": 20},
        ]));
        let groups = group_by(&people, "age", None, false).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].grouper, Value::from(20));
        assert_eq!(groups[0].list.len(), 1);
        assert_eq!(groups[1].grouper, Value::from(30));
        let names: Vec<String> = groups[1]
            .list
            .iter()
            .map(|p| p.get_attr("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Jane", "Alice"]);
    }

    #[test]
    fn test_group_by_folds_case_unless_sensitive() {
        let items = v(json!([{"c": "b"}, {"c": "A"}, {"c": "a"}]));

        let folded = group_by(&items, "c", None, false).unwrap();
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].grouper, Value::from("A"));
        assert_eq!(folded[0].list.len(), 2);

        let exact = group_by(&items, "c", None, true).unwrap();
        let keys: Vec<Value> = exact.iter().map(|g| g.grouper.clone()).collect();
        assert_eq!(keys, vec![Value::from("A"), Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_group_by_missing_attribute() {
        let items = v(json!([{"a": 1}, {"b": 2}]));
        let err = group_by(&items, "a", None, false).unwrap_err();
        assert_eq!(err.kind(), minijinja::ErrorKind::UndefinedError);

        let fallback = Value::from(0);
        let groups = group_by(&items, "a", Some(&fallback), false).unwrap();
        assert_eq!(groups[0].grouper, Value::from(0));
        assert_eq!(groups[1].grouper, Value::from(1));
    }

    #[test]
    fn test_group_object_is_a_pair() {
        let group = Value::from_object(Group {
            grouper: Value::from("k"),
            list: vec![Value::from(1)],
        });
        assert_eq!(group.len(), Some(2));
        assert_eq!(group.get_item(&Value::from(0)).unwrap(), Value::from("k"));
        assert_eq!(group.get_attr("list").unwrap(), Value::from(vec![1]));
    }
}
