//! Regular expression filters.
//!
//! Patterns use the `regex` crate syntax, which covers the common scaffolding
//! idioms including `(?P<name>…)` groups. Replacement strings and backreference
//! arguments use the `\1` / `\g<name>` notation templates are written with; they
//! are translated before reaching the regex engine.

use minijinja::value::{Kwargs, Rest};
use minijinja::{Error, Value};
use regex::{Captures, Regex, RegexBuilder};

use super::args;
use crate::error::{FilterError, Result};

const DEFAULT_SPECIAL: &str = "()[]{}?*+-|^$\\.&~# \t\n\r\u{b}\u{c}";
const POSIX_BASIC_SPECIAL: &str = "[].^$*\\";

/// Escapes `text` for use inside a pattern of the given dialect.
pub fn escape(text: &str, re_type: &str) -> Result<String> {
    let special = match re_type {
        "python" => DEFAULT_SPECIAL,
        "posix_basic" => POSIX_BASIC_SPECIAL,
        other => return Err(FilterError::InvalidRegexType(other.to_string())),
    };
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    Ok(out)
}

fn compile(pattern: &str, ignorecase: bool, multiline: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(ignorecase)
        .multi_line(multiline)
        .build()?)
}

/// A capture group reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GroupRef {
    Index(usize),
    Name(String),
}

impl GroupRef {
    /// Parses `\N` or `\g<name>` / `\g<N>`.
    fn parse_backref(token: &str) -> Result<Self> {
        let invalid = || FilterError::InvalidBackref(token.to_string());
        if let Some(inner) = token
            .strip_prefix("\\g<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            if inner.is_empty() || inner.chars().any(char::is_whitespace) {
                return Err(invalid());
            }
            return Ok(Self::from_name(inner));
        }
        match token.strip_prefix('\\') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.parse().map(GroupRef::Index).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }

    fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(index) => GroupRef::Index(index),
            Err(_) => GroupRef::Name(name.to_string()),
        }
    }

    fn check(&self, regex: &Regex) -> Result<()> {
        let known = match self {
            GroupRef::Index(index) => *index < regex.captures_len(),
            GroupRef::Name(name) => regex.capture_names().flatten().any(|n| n == name),
        };
        if known {
            Ok(())
        } else {
            Err(FilterError::UnknownGroup(self.to_string()))
        }
    }

    fn get<'t>(&self, caps: &Captures<'t>) -> Option<&'t str> {
        let found = match self {
            GroupRef::Index(index) => caps.get(*index),
            GroupRef::Name(name) => caps.name(name),
        };
        found.map(|m| m.as_str())
    }
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupRef::Index(index) => write!(f, "{}", index),
            GroupRef::Name(name) => f.write_str(name),
        }
    }
}

/// Translates a `\1` / `\g<name>` replacement into `regex` crate syntax.
fn translate_replacement(replacement: &str, regex: &Regex) -> Result<String> {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push('\\');
                    break;
                };
                match next {
                    '1'..='9' => {
                        let mut digits = next.to_string();
                        if let Some(second) = chars.next_if(char::is_ascii_digit) {
                            digits.push(second);
                        }
                        let group = GroupRef::from_name(&digits);
                        group.check(regex)?;
                        out.push_str(&format!("${{{}}}", group));
                    }
                    'g' if chars.peek() == Some(&'<') => {
                        chars.next();
                        let name: String = chars.by_ref().take_while(|c| *c != '>').collect();
                        let group = GroupRef::from_name(&name);
                        group.check(regex)?;
                        out.push_str(&format!("${{{}}}", group));
                    }
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'f' => out.push('\u{c}'),
                    'v' => out.push('\u{b}'),
                    'a' => out.push('\u{7}'),
                    'b' => out.push('\u{8}'),
                    '0' => out.push('\0'),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Replaces up to `count` matches (`0` = all).
pub fn replace(
    text: &str,
    pattern: &str,
    replacement: &str,
    ignorecase: bool,
    multiline: bool,
    count: usize,
) -> Result<String> {
    let regex = compile(pattern, ignorecase, multiline)?;
    let replacement = translate_replacement(replacement, &regex)?;
    Ok(regex.replacen(text, count, replacement.as_str()).into_owned())
}

/// All matches: whole match text, the single group, or a list of all groups.
pub fn findall(text: &str, pattern: &str, ignorecase: bool, multiline: bool) -> Result<Value> {
    let regex = compile(pattern, ignorecase, multiline)?;
    let groups = regex.captures_len() - 1;

    let items: Vec<Value> = regex
        .captures_iter(text)
        .map(|caps| {
            let group = |i: usize| Value::from(caps.get(i).map_or("", |m| m.as_str()));
            match groups {
                0 => group(0),
                1 => group(1),
                n => Value::from((1..=n).map(group).collect::<Vec<_>>()),
            }
        })
        .collect();
    Ok(Value::from(items))
}

/// First match, or the listed backreferences of it; none when nothing matches.
pub fn search(
    text: &str,
    pattern: &str,
    backrefs: &[String],
    ignorecase: bool,
    multiline: bool,
) -> Result<Value> {
    let groups = backrefs
        .iter()
        .map(|token| GroupRef::parse_backref(token))
        .collect::<Result<Vec<_>>>()?;

    let regex = compile(pattern, ignorecase, multiline)?;
    for group in &groups {
        group.check(&regex)?;
    }

    let Some(caps) = regex.captures(text) else {
        return Ok(Value::from(()));
    };
    if groups.is_empty() {
        return Ok(Value::from(caps.get(0).map_or("", |m| m.as_str())));
    }
    Ok(Value::from(
        groups
            .iter()
            .map(|group| group.get(&caps).map_or_else(|| Value::from(()), Value::from))
            .collect::<Vec<_>>(),
    ))
}

/// `regex_escape(value, re_type="python")`
pub fn regex_escape(
    value: Value,
    re_type: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    let re_type = args::string_param(re_type, &kwargs, "re_type")?;
    kwargs.assert_all_used()?;
    Ok(escape(&value.to_string(), re_type.as_deref().unwrap_or("python"))?)
}

/// `regex_findall(value, regex, multiline=False, ignorecase=False)`
pub fn regex_findall(
    value: Value,
    regex: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<Value, Error> {
    let pattern = args::string_param(regex, &kwargs, "regex")?.unwrap_or_default();
    let multiline = args::flag(&kwargs, "multiline", false)?;
    let ignorecase = args::flag(&kwargs, "ignorecase", false)?;
    kwargs.assert_all_used()?;
    Ok(findall(&value.to_string(), &pattern, ignorecase, multiline)?)
}

/// `regex_replace(value, pattern="", replacement="", ignorecase=False, multiline=False, count=0)`
pub fn regex_replace(
    value: Value,
    pattern: Option<Value>,
    replacement: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    let pattern = args::string_param(pattern, &kwargs, "pattern")?.unwrap_or_default();
    let replacement = args::string_param(replacement, &kwargs, "replacement")?.unwrap_or_default();
    let ignorecase = args::flag(&kwargs, "ignorecase", false)?;
    let multiline = args::flag(&kwargs, "multiline", false)?;
    let count = args::keyword(&kwargs, "count")?
        .map(|v| args::as_int(&v, "count"))
        .transpose()?
        .unwrap_or(0);
    kwargs.assert_all_used()?;

    let count = usize::try_from(count).unwrap_or(0);
    Ok(replace(
        &value.to_string(),
        &pattern,
        &replacement,
        ignorecase,
        multiline,
        count,
    )?)
}

/// `regex_search(value, regex, *backrefs, ignorecase=False, multiline=False)`
pub fn regex_search(
    value: Value,
    regex: Option<Value>,
    backrefs: Rest<String>,
    kwargs: Kwargs,
) -> std::result::Result<Value, Error> {
    let pattern = args::string_param(regex, &kwargs, "regex")?.unwrap_or_default();
    let ignorecase = args::flag(&kwargs, "ignorecase", false)?;
    let multiline = args::flag(&kwargs, "multiline", false)?;
    kwargs.assert_all_used()?;
    Ok(search(&value.to_string(), &pattern, &backrefs.0, ignorecase, multiline)?)
}
