//! Base64 filters with a selectable text encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use minijinja::value::Kwargs;
use minijinja::{Error, Value};

use super::args;
use crate::error::FilterError;

/// Text encodings understood by `b64encode` / `b64decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Le,
    Utf16Be,
    /// UTF-16 with a byte order mark, little-endian when writing.
    Utf16,
}

impl TextEncoding {
    pub fn parse(name: &str) -> Result<Self, FilterError> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Ok(match normalized.as_str() {
            "utf-8" | "utf8" => TextEncoding::Utf8,
            "ascii" | "us-ascii" => TextEncoding::Ascii,
            "latin-1" | "latin1" | "iso-8859-1" => TextEncoding::Latin1,
            "utf-16-le" | "utf-16le" => TextEncoding::Utf16Le,
            "utf-16-be" | "utf-16be" => TextEncoding::Utf16Be,
            "utf-16" | "utf16" => TextEncoding::Utf16,
            _ => return Err(FilterError::UnsupportedEncoding(name.to_string())),
        })
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, FilterError> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => narrow(text, 0x7f, "ascii"),
            TextEncoding::Latin1 => narrow(text, 0xff, "latin-1"),
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            TextEncoding::Utf16 => {
                let mut out = vec![0xff, 0xfe];
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                Ok(out)
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, FilterError> {
        match self {
            TextEncoding::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|e| FilterError::Decode(e.to_string()))
            }
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(FilterError::Decode(format!(
                    "byte 0x{:02x} in position {} is not ascii",
                    bytes[pos], pos
                ))),
                None => Ok(bytes.iter().map(|b| char::from(*b)).collect()),
            },
            TextEncoding::Latin1 => Ok(bytes.iter().map(|b| char::from(*b)).collect()),
            TextEncoding::Utf16Le => utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => utf16(bytes, u16::from_be_bytes),
            TextEncoding::Utf16 => match bytes {
                [0xfe, 0xff, rest @ ..] => utf16(rest, u16::from_be_bytes),
                [0xff, 0xfe, rest @ ..] => utf16(rest, u16::from_le_bytes),
                _ => utf16(bytes, u16::from_le_bytes),
            },
        }
    }
}

fn narrow(text: &str, max: u32, name: &str) -> Result<Vec<u8>, FilterError> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .ok()
                .filter(|b| u32::from(*b) <= max)
                .ok_or_else(|| {
                    FilterError::Decode(format!("'{}' codec can't encode {:?}", name, c))
                })
        })
        .collect()
}

fn utf16(bytes: &[u8], word: fn([u8; 2]) -> u16) -> Result<String, FilterError> {
    if bytes.len() % 2 != 0 {
        return Err(FilterError::Decode("truncated UTF-16 data".into()));
    }
    let units = bytes.chunks_exact(2).map(|pair| word([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| FilterError::Decode(e.to_string()))
}

fn encoding_param(encoding: Option<Value>, kwargs: &Kwargs) -> Result<TextEncoding, Error> {
    let name = args::string_param(encoding, kwargs, "encoding")?;
    Ok(TextEncoding::parse(name.as_deref().unwrap_or("utf-8"))?)
}

/// `b64encode(value, encoding="utf-8")`
pub fn b64encode(value: Value, encoding: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let encoding = encoding_param(encoding, &kwargs)?;
    kwargs.assert_all_used()?;

    let bytes = match value.as_str() {
        Some(text) => encoding.encode(text)?,
        None => match value.as_bytes() {
            Some(bytes) => bytes.to_vec(),
            None => encoding.encode(&value.to_string())?,
        },
    };
    Ok(STANDARD.encode(bytes))
}

/// `b64decode(value, encoding="utf-8")`
pub fn b64decode(value: Value, encoding: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let encoding = encoding_param(encoding, &kwargs)?;
    kwargs.assert_all_used()?;

    let text = value.to_string();
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(FilterError::from)?;
    Ok(encoding.decode(&bytes)?)
}
