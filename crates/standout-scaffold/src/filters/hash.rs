//! Digest filters: `hash`, `md5`, `sha1`, `checksum`.
//!
//! Input is the value's string form encoded as UTF-8; output is a lowercase hex
//! digest.

use minijinja::value::Kwargs;
use minijinja::{Error, Value};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::args;
use crate::error::FilterError;

/// Hex digest of `data` with the named algorithm.
pub fn hex_digest(algorithm: &str, data: &[u8]) -> Result<String, FilterError> {
    Ok(match algorithm.to_ascii_lowercase().as_str() {
        "md5" => format!("{:x}", md5::compute(data)),
        "sha1" => hex::encode(Sha1::digest(data)),
        "sha224" => hex::encode(Sha224::digest(data)),
        "sha256" => hex::encode(Sha256::digest(data)),
        "sha384" => hex::encode(Sha384::digest(data)),
        "sha512" => hex::encode(Sha512::digest(data)),
        _ => return Err(FilterError::UnsupportedAlgorithm(algorithm.to_string())),
    })
}

fn bytes_of(value: &Value) -> Vec<u8> {
    match value.as_str() {
        Some(text) => text.as_bytes().to_vec(),
        None => match value.as_bytes() {
            Some(bytes) => bytes.to_vec(),
            None => value.to_string().into_bytes(),
        },
    }
}

/// `hash(value, algorithm="sha1")`
pub fn hash(value: Value, algorithm: Option<Value>, kwargs: Kwargs) -> Result<String, Error> {
    let algorithm = args::string_param(algorithm, &kwargs, "algorithm")?;
    kwargs.assert_all_used()?;
    Ok(hex_digest(algorithm.as_deref().unwrap_or("sha1"), &bytes_of(&value))?)
}

pub fn md5(value: Value) -> String {
    format!("{:x}", md5::compute(bytes_of(&value)))
}

pub fn sha1(value: Value) -> String {
    hex::encode(Sha1::digest(bytes_of(&value)))
}

/// Same digest as `sha1`, kept under the name templates historically use.
pub fn checksum(value: Value) -> String {
    sha1(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            sha1(Value::from("test2")),
            "109f4b3c50d7b0df729d299bc6f8e9ef9066971f"
        );
        assert_eq!(md5(Value::from("test2")), "ad0234829205b9033196ba818f7a872b");
        assert_eq!(checksum(Value::from("test2")), sha1(Value::from("test2")));
    }

    #[test]
    fn test_digest_lengths() {
        for (algorithm, len) in [
            ("md5", 32),
            ("sha1", 40),
            ("sha224", 56),
            ("sha256", 64),
            ("sha384", 96),
            ("SHA512", 128),
        ] {
            assert_eq!(hex_digest(algorithm, b"x").unwrap().len(), len, "{algorithm}");
        }
    }

    #[test]
    fn test_sha256_of_empty_input() {
        assert_eq!(
            hex_digest("sha256", b"").unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = hex_digest("whirlpool", b"x").unwrap_err();
        assert_eq!(err.to_string(), "unsupported hash algorithm: whirlpool");
    }

    #[test]
    fn test_non_string_values_hash_their_display_form() {
        assert_eq!(sha1(Value::from(42)), sha1(Value::from("42")));
    }
}
