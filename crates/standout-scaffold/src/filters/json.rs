//! JSON filters: `from_json`, `to_json`, `to_nice_json`.
//!
//! Output mirrors the conventional scaffolding layout: compact JSON separates items
//! with `", "` and keys with `": "`, indented JSON puts every item on its own line,
//! and non-ASCII text is escaped as `\uXXXX` unless `ensure_ascii=false`.

use std::io;

use minijinja::value::Kwargs;
use minijinja::{Error, Value};
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter};

use super::args;
use crate::error::FilterError;

/// Serializer layout for [`dumps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStyle {
    /// Spaces per nesting level; `None` is single-line output.
    pub indent: Option<usize>,
    pub sort_keys: bool,
    pub ensure_ascii: bool,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self {
            indent: None,
            sort_keys: false,
            ensure_ascii: true,
        }
    }
}

impl JsonStyle {
    fn nice() -> Self {
        Self {
            indent: Some(4),
            sort_keys: true,
            ensure_ascii: true,
        }
    }

    fn apply(mut self, indent: Option<Value>, kwargs: &Kwargs) -> Result<Self, Error> {
        if let Some(indent) = args::int_param(indent, kwargs, "indent")? {
            self.indent = Some(usize::try_from(indent).unwrap_or(0));
        }
        self.sort_keys = args::flag(kwargs, "sort_keys", self.sort_keys)?;
        self.ensure_ascii = args::flag(kwargs, "ensure_ascii", self.ensure_ascii)?;
        kwargs.assert_all_used()?;
        Ok(self)
    }
}

struct SpacedFormatter {
    indent: Option<Vec<u8>>,
    depth: usize,
    has_value: bool,
    ensure_ascii: bool,
}

impl SpacedFormatter {
    fn new(style: &JsonStyle) -> Self {
        Self {
            indent: style.indent.map(|n| vec![b' '; n]),
            depth: 0,
            has_value: false,
            ensure_ascii: style.ensure_ascii,
        }
    }

    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(indent) = &self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.depth {
                writer.write_all(indent)?;
            }
        }
        Ok(())
    }

    fn separator<W: ?Sized + io::Write>(&self, writer: &mut W, first: bool) -> io::Result<()> {
        match (&self.indent, first) {
            (Some(_), true) => self.newline(writer),
            (Some(_), false) => {
                writer.write_all(b",")?;
                self.newline(writer)
            }
            (None, true) => Ok(()),
            (None, false) => writer.write_all(b", "),
        }
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(bracket)
    }
}

impl Formatter for SpacedFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.separator(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.separator(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.ensure_ascii {
            return writer.write_all(fragment.as_bytes());
        }
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        let escaped: &[u8] = match char_escape {
            CharEscape::Quote => b"\\\"",
            CharEscape::ReverseSolidus => b"\\\\",
            CharEscape::Solidus => b"\\/",
            CharEscape::Backspace => b"\\b",
            CharEscape::FormFeed => b"\\f",
            CharEscape::LineFeed => b"\\n",
            CharEscape::CarriageReturn => b"\\r",
            CharEscape::Tab => b"\\t",
            CharEscape::AsciiControl(byte) => {
                return write!(writer, "\\u{:04x}", byte);
            }
        };
        writer.write_all(escaped)
    }
}

/// Recursively orders object keys.
pub(crate) fn sorted(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sorted(value)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sorted).collect())
        }
        other => other,
    }
}

/// Serializes `value` as JSON text in the given style.
pub fn dumps<T: Serialize + ?Sized>(value: &T, style: &JsonStyle) -> Result<String, FilterError> {
    let mut tree = serde_json::to_value(value)?;
    if style.sort_keys {
        tree = sorted(tree);
    }

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, SpacedFormatter::new(style));
    tree.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| FilterError::Decode(e.to_string()))
}

/// `from_json(text)`
pub fn from_json(text: &str) -> Result<Value, Error> {
    let parsed: serde_json::Value = serde_json::from_str(text).map_err(FilterError::from)?;
    Ok(Value::from_serialize(&parsed))
}

/// `to_json(value, indent=None, sort_keys=False, ensure_ascii=True)`
pub fn to_json(value: Value, indent: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let style = JsonStyle::default().apply(indent, &kwargs)?;
    Ok(dumps(&value, &style)?)
}

/// `to_nice_json(value, indent=4, sort_keys=True, ensure_ascii=True)`
pub fn to_nice_json(value: Value, indent: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let style = JsonStyle::nice().apply(indent, &kwargs)?;
    Ok(dumps(&value, &style)?)
}
