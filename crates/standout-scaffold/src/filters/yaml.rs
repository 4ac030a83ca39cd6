//! YAML filters: `from_yaml`, `from_yaml_all`, `to_yaml`, `to_nice_yaml`.
//!
//! Parsing goes through `serde_yaml`. Emission uses a small block-style writer so
//! the layout matches what scaffolding templates expect:
//!
//! ```yaml
//! k: v
//! x:
//!     y:
//!     - 1
//!     - 2
//! ```
//!
//! Nested mappings indent by `indent` columns, sequences under a key stay at the
//! key's column, and a sequence item holding a collection starts that collection on
//! the dash line.

use minijinja::value::Kwargs;
use minijinja::{Error, Value};
use serde::Deserialize;
use serde_yaml::{Mapping, Value as Yaml};

use super::args;
use crate::error::{FilterError, Result};

const DEFAULT_INDENT: usize = 2;

/// Block-style YAML writer.
#[derive(Debug)]
pub struct BlockEmitter {
    indent: usize,
    sort_keys: bool,
    out: String,
}

impl BlockEmitter {
    /// Indents outside `2..=9` fall back to 2.
    pub fn new(indent: i64, sort_keys: bool) -> Self {
        let indent = match usize::try_from(indent) {
            Ok(n @ 2..=9) => n,
            _ => DEFAULT_INDENT,
        };
        Self {
            indent,
            sort_keys,
            out: String::new(),
        }
    }

    /// Renders one document.
    pub fn emit(mut self, value: &Yaml) -> Result<String> {
        match value {
            Yaml::Mapping(map) if !map.is_empty() => self.write_mapping(map, 0, false)?,
            Yaml::Sequence(seq) if !seq.is_empty() => self.write_seq(seq, 0, false)?,
            Yaml::Tagged(tagged) => return self.emit(&tagged.value),
            other => {
                let text = scalar(other)?;
                let plain = !text.starts_with(['\'', '"', '{', '[']);
                self.out.push_str(&text);
                self.out.push('\n');
                if plain {
                    self.out.push_str("...\n");
                }
            }
        }
        Ok(self.out)
    }

    fn pad(&mut self, width: usize) {
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    fn entries<'a>(&self, map: &'a Mapping) -> Vec<(&'a Yaml, &'a Yaml)> {
        let mut entries: Vec<_> = map.iter().collect();
        if self.sort_keys {
            entries.sort_by(|a, b| a.0.partial_cmp(b.0).unwrap_or(std::cmp::Ordering::Equal));
        }
        entries
    }

    fn write_mapping(&mut self, map: &Mapping, column: usize, inline_first: bool) -> Result<()> {
        for (i, (key, value)) in self.entries(map).into_iter().enumerate() {
            if i > 0 || !inline_first {
                self.pad(column);
            }
            let key = key_text(key)?;
            self.out.push_str(&key);
            self.out.push(':');
            self.write_child(value, column + self.indent, column)?;
        }
        Ok(())
    }

    fn write_seq(&mut self, seq: &[Yaml], column: usize, inline_first: bool) -> Result<()> {
        for (i, item) in seq.iter().enumerate() {
            if i > 0 || !inline_first {
                self.pad(column);
            }
            self.out.push('-');
            match untagged(item) {
                Yaml::Mapping(map) if !map.is_empty() => {
                    self.pad(self.indent - 1);
                    self.write_mapping(map, column + self.indent, true)?;
                }
                Yaml::Sequence(inner) if !inner.is_empty() => {
                    self.pad(self.indent - 1);
                    self.write_seq(inner, column + self.indent, true)?;
                }
                other => self.write_scalar_line(other)?,
            }
        }
        Ok(())
    }

    /// Value after `key:`; mappings nest at `nested`, sequences stay at `column`.
    fn write_child(&mut self, value: &Yaml, nested: usize, column: usize) -> Result<()> {
        match untagged(value) {
            Yaml::Mapping(map) if !map.is_empty() => {
                self.out.push('\n');
                self.write_mapping(map, nested, false)
            }
            Yaml::Sequence(seq) if !seq.is_empty() => {
                self.out.push('\n');
                self.write_seq(seq, column, false)
            }
            other => self.write_scalar_line(other),
        }
    }

    fn write_scalar_line(&mut self, value: &Yaml) -> Result<()> {
        let text = scalar(value)?;
        self.out.push(' ');
        self.out.push_str(&text);
        self.out.push('\n');
        Ok(())
    }
}

fn untagged(value: &Yaml) -> &Yaml {
    match value {
        Yaml::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

/// Inline text of a scalar or empty collection.
fn scalar(value: &Yaml) -> Result<String> {
    match untagged(value) {
        Yaml::Mapping(_) => Ok("{}".into()),
        Yaml::Sequence(_) => Ok("[]".into()),
        Yaml::String(text) if text.contains(['\n', '\r']) => Ok(serde_json::to_string(text)?),
        other => Ok(serde_yaml::to_string(other)?.trim_end_matches('\n').to_string()),
    }
}

fn key_text(key: &Yaml) -> Result<String> {
    match untagged(key) {
        Yaml::Mapping(map) if !map.is_empty() => {
            Err(FilterError::invalid("YAML mapping keys must be scalars"))
        }
        Yaml::Sequence(seq) if !seq.is_empty() => {
            Err(FilterError::invalid("YAML mapping keys must be scalars"))
        }
        other => scalar(other),
    }
}

/// Serializes a template value as block-style YAML.
pub fn dump(value: &Value, indent: i64, sort_keys: bool) -> Result<String> {
    let tree = serde_yaml::to_value(value)?;
    BlockEmitter::new(indent, sort_keys).emit(&tree)
}

/// `from_yaml(text)`: the first YAML document.
pub fn from_yaml(text: &str) -> std::result::Result<Value, Error> {
    let parsed: Yaml = serde_yaml::from_str(text).map_err(FilterError::from)?;
    Ok(Value::from_serialize(&parsed))
}

/// `from_yaml_all(text)`: every document, as a list.
pub fn from_yaml_all(text: &str) -> std::result::Result<Value, Error> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let parsed = Yaml::deserialize(document).map_err(FilterError::from)?;
        documents.push(Value::from_serialize(&parsed));
    }
    Ok(Value::from(documents))
}

fn dump_filter(
    value: Value,
    indent: Option<Value>,
    kwargs: Kwargs,
    default_indent: i64,
) -> std::result::Result<String, Error> {
    let indent = args::int_param(indent, &kwargs, "indent")?.unwrap_or(default_indent);
    let sort_keys = args::flag(&kwargs, "sort_keys", true)?;
    kwargs.assert_all_used()?;
    Ok(dump(&value, indent, sort_keys)?)
}

/// `to_yaml(value, indent=2, sort_keys=True)`
pub fn to_yaml(
    value: Value,
    indent: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    dump_filter(value, indent, kwargs, 2)
}

/// `to_nice_yaml(value, indent=4, sort_keys=True)`
pub fn to_nice_yaml(
    value: Value,
    indent: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    dump_filter(value, indent, kwargs, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        from_yaml(text).unwrap()
    }

    #[test]
    fn test_nested_layout_with_indent_four() {
        let value = yaml("x: {y: [1, 2]}\nk: v");
        assert_eq!(
            dump(&value, 4, true).unwrap(),
            "k: v\nx:\n    y:\n    - 1\n    - 2\n"
        );
        assert_eq!(
            dump(&value, 2, true).unwrap(),
            "k: v\nx:\n  y:\n  - 1\n  - 2\n"
        );
    }

    #[test]
    fn test_sequence_items_holding_collections() {
        let value = yaml("[{a: 1, b: [x]}, [1, 2]]");
        assert_eq!(
            dump(&value, 2, true).unwrap(),
            "- a: 1\n  b:\n  - x\n- - 1\n  - 2\n"
        );
        assert_eq!(
            dump(&value, 4, true).unwrap(),
            "-   a: 1\n    b:\n    - x\n-   - 1\n    - 2\n"
        );
    }

    #[test]
    fn test_empty_collections_are_inline() {
        let value = yaml("a: {}\nb: []");
        assert_eq!(dump(&value, 2, true).unwrap(), "a: {}\nb: []\n");
        assert_eq!(dump(&yaml("{}"), 2, true).unwrap(), "{}\n");
    }

    #[test]
    fn test_top_level_scalars() {
        assert_eq!(dump(&Value::from("foo"), 2, true).unwrap(), "foo\n...\n");
        assert_eq!(dump(&Value::from(1), 2, true).unwrap(), "1\n...\n");
        assert_eq!(dump(&Value::from("true"), 2, true).unwrap(), "'true'\n");
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        let value = yaml("a: 'true'\nb: '1'\nc: ''");
        assert_eq!(dump(&value, 2, true).unwrap(), "a: 'true'\nb: '1'\nc: ''\n");
    }

    #[test]
    fn test_multiline_strings_are_double_quoted() {
        let value = yaml("text: \"one\\ntwo\"");
        assert_eq!(dump(&value, 2, true).unwrap(), "text: \"one\\ntwo\"\n");
    }

    #[test]
    fn test_sort_keys_can_be_disabled() {
        let value = yaml("b: 1\na: 2");
        assert_eq!(dump(&value, 2, false).unwrap(), "b: 1\na: 2\n");
        assert_eq!(dump(&value, 2, true).unwrap(), "a: 2\nb: 1\n");
    }

    #[test]
    fn test_out_of_range_indent_falls_back() {
        let value = yaml("x: {y: 1}");
        assert_eq!(dump(&value, 1, true).unwrap(), "x:\n  y: 1\n");
        assert_eq!(dump(&value, 12, true).unwrap(), "x:\n  y: 1\n");
    }

    #[test]
    fn test_from_yaml_all_collects_documents() {
        let docs = from_yaml_all("k1: v1\n---\nk2: v2").unwrap();
        assert_eq!(docs.len(), Some(2));
        assert_eq!(
            docs.get_item(&Value::from(1)).unwrap().get_attr("k2").unwrap(),
            Value::from("v2")
        );
    }

    #[test]
    fn test_from_yaml_reports_syntax_errors() {
        let err = from_yaml("a: [1, 2").unwrap_err();
        assert_eq!(err.kind(), minijinja::ErrorKind::BadSerialization);
    }
}
