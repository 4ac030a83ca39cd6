//! Error types for scaffold filters.
//!
//! Every filter reports failures through [`FilterError`]. Inside a template the
//! error is converted into a [`minijinja::Error`], so a failing filter aborts the
//! render with a message naming the offending argument.

use thiserror::Error;

/// Errors raised by scaffold filters and environment setup.
#[derive(Debug, Error)]
pub enum FilterError {
    /// `start`/`step` were passed to `ans_random` together with a non-integer bound.
    #[error("\"{param}\" can only be used when \"stop\" is an integer")]
    IncompatibleArgument { param: &'static str },

    /// An octet of a MAC address prefix is not a two-digit hexadecimal byte.
    #[error("Invalid MAC address prefix \"{prefix}\": \"{part}\" is not a hexadecimal byte")]
    InvalidMacByte { prefix: String, part: String },

    /// A MAC address prefix has six or more octets.
    #[error("Invalid MAC address prefix \"{prefix}\": too many parts")]
    TooManyMacParts { prefix: String },

    /// A backreference token passed to `regex_search` is not `\N` or `\g<name>`.
    #[error("Invalid backref format: {0}")]
    InvalidBackref(String),

    /// A backreference names a group that the pattern does not define.
    #[error("no such group: {0}")]
    UnknownGroup(String),

    /// Requested digest algorithm is not supported.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Requested text encoding is not supported.
    #[error("unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    /// Requested regex escaping dialect is not supported.
    #[error("invalid regex type \"{0}\": expected \"python\" or \"posix_basic\"")]
    InvalidRegexType(String),

    /// The integer range to sample from contains no values.
    #[error("empty range for randrange({start}, {stop}, {step})")]
    EmptyRange { start: i64, stop: i64, step: i64 },

    /// `step` was zero.
    #[error("zero step for randrange()")]
    ZeroStep,

    /// Choice from an empty sequence.
    #[error("cannot choose from an empty sequence")]
    EmptySequence,

    /// A mandatory value was undefined.
    #[error("{0}")]
    Undefined(String),

    /// An argument has the wrong type or an out-of-range value.
    #[error("{0}")]
    InvalidArgument(String),

    /// Decoded bytes are not valid in the requested text encoding.
    #[error("cannot decode text: {0}")]
    Decode(String),

    /// A date/time string or format could not be processed.
    #[error("date/time error: {0}")]
    DateTime(String),

    /// Environment configuration could not be applied.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Invalid Base64 input.
    #[error("invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Invalid UUID namespace.
    #[error("invalid UUID: {0}")]
    Uuid(#[from] uuid::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the template engine itself.
    #[error(transparent)]
    Template(#[from] minijinja::Error),
}

impl FilterError {
    /// Create an invalid-argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<chrono::ParseError> for FilterError {
    fn from(err: chrono::ParseError) -> Self {
        FilterError::DateTime(err.to_string())
    }
}

impl From<FilterError> for minijinja::Error {
    fn from(err: FilterError) -> Self {
        use minijinja::ErrorKind;

        let kind = match err {
            FilterError::Template(inner) => return inner,
            FilterError::Undefined(_) => ErrorKind::UndefinedError,
            FilterError::Json(_) | FilterError::Yaml(_) => ErrorKind::BadSerialization,
            _ => ErrorKind::InvalidOperation,
        };
        minijinja::Error::new(kind, err.to_string())
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
