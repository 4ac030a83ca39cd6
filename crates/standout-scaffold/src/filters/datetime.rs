//! Date/time filters: `strftime` and `to_datetime`.

use std::fmt::{self, Write};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use minijinja::value::{Enumerator, Kwargs, Object, ObjectRepr};
use minijinja::{Error, ErrorKind, State, Value};

use super::args;
use crate::error::{FilterError, Result};

pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn check_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(FilterError::DateTime(format!("invalid format string {:?}", format)));
    }
    Ok(())
}

fn render_format<Tz: TimeZone>(value: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz::Offset: fmt::Display,
{
    check_format(format)?;
    let mut out = String::new();
    write!(out, "{}", value.format(format))
        .map_err(|_| FilterError::DateTime(format!("cannot format with {:?}", format)))?;
    Ok(out)
}

/// Formats `seconds` since the epoch (or now), in local time or UTC.
pub fn format_time(format: &str, seconds: Option<f64>, utc: bool) -> Result<String> {
    let instant = match seconds {
        Some(seconds) => {
            let whole = seconds.floor();
            DateTime::from_timestamp(whole as i64, 0).ok_or_else(|| {
                FilterError::DateTime(format!("timestamp out of range: {}", seconds))
            })?
        }
        None => Utc::now(),
    };
    if utc {
        render_format(&instant, format)
    } else {
        render_format(&instant.with_timezone(&Local), format)
    }
}

fn as_seconds(value: &Value) -> Result<f64> {
    if let Some(text) = value.as_str() {
        return text.trim().parse().map_err(|_| {
            FilterError::invalid(format!("\"second\" must be a number, got {:?}", text))
        });
    }
    f64::try_from(value.clone()).map_err(|_| {
        FilterError::invalid(format!("\"second\" must be a number, got {}", value.kind()))
    })
}

/// `strftime(format, second=None, utc=False)`
pub fn strftime(
    format: &str,
    second: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    let second = args::param(second, &kwargs, "second")?;
    let utc = args::flag(&kwargs, "utc", false)?;
    kwargs.assert_all_used()?;

    let seconds = second.as_ref().map(as_seconds).transpose()?;
    Ok(format_time(format, seconds, utc)?)
}

/// Parses `text` with a strftime-style format.
///
/// Formats without time fields yield midnight; formats without date fields yield
/// 1900-01-01.
pub fn parse_datetime(text: &str, format: &str) -> Result<NaiveDateTime> {
    check_format(format)?;
    match NaiveDateTime::parse_from_str(text, format) {
        Ok(parsed) => Ok(parsed),
        Err(full) => {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Ok(date.and_time(NaiveTime::default()));
            }
            if let Ok(time) = NaiveTime::parse_from_str(text, format) {
                if let Some(date) = NaiveDate::from_ymd_opt(1900, 1, 1) {
                    return Ok(date.and_time(time));
                }
            }
            Err(FilterError::DateTime(format!(
                "time data {:?} does not match format {:?}: {}",
                text, format, full
            )))
        }
    }
}

/// A parsed date-time exposed to templates.
///
/// Attributes: `year`, `month`, `day`, `hour`, `minute`, `second`, `microsecond`.
/// Methods: `strftime(format)`, `timestamp()`, `isoformat()`, `toordinal()`,
/// `weekday()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTimeValue(pub NaiveDateTime);

impl DateTimeValue {
    fn microsecond(&self) -> u32 {
        self.0.nanosecond() % 1_000_000_000 / 1_000
    }

    pub fn isoformat(&self, sep: char) -> String {
        let mut out = format!(
            "{}{}{}",
            self.0.format("%Y-%m-%d"),
            sep,
            self.0.format("%H:%M:%S")
        );
        if self.microsecond() != 0 {
            out.push_str(&format!(".{:06}", self.microsecond()));
        }
        out
    }

    /// Seconds since the epoch, reading the value as local time.
    pub fn timestamp(&self) -> Result<f64> {
        let local = Local
            .from_local_datetime(&self.0)
            .earliest()
            .ok_or_else(|| {
                FilterError::DateTime(format!("{} does not exist in local time", self.0))
            })?;
        Ok(local.timestamp() as f64 + f64::from(self.microsecond()) / 1e6)
    }

    /// Days since 0001-01-01, which is day 1.
    pub fn toordinal(&self) -> i32 {
        self.0.date().num_days_from_ce()
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.isoformat(' '))
    }
}

fn no_args(method: &str, args: &[Value]) -> std::result::Result<(), Error> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::TooManyArguments,
            format!("{}() takes no arguments", method),
        ))
    }
}

impl Object for DateTimeValue {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let value = match key.as_str()? {
            "year" => i64::from(self.0.year()),
            "month" => i64::from(self.0.month()),
            "day" => i64::from(self.0.day()),
            "hour" => i64::from(self.0.hour()),
            "minute" => i64::from(self.0.minute()),
            "second" => i64::from(self.0.second()),
            "microsecond" => i64::from(self.microsecond()),
            _ => return None,
        };
        Some(Value::from(value))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "year",
            "month",
            "day",
            "hour",
            "minute",
            "second",
            "microsecond",
        ])
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        name: &str,
        args: &[Value],
    ) -> std::result::Result<Value, Error> {
        match name {
            "strftime" => {
                let format = match args {
                    [format] => format.to_string(),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::MissingArgument,
                            "strftime() requires exactly one format argument",
                        ))
                    }
                };
                let value = Utc.from_utc_datetime(&self.0);
                Ok(Value::from(render_format(&value, &format)?))
            }
            "timestamp" => {
                no_args(name, args)?;
                Ok(Value::from(self.timestamp()?))
            }
            "isoformat" => {
                let sep = match args {
                    [] => 'T',
                    [sep] => sep.to_string().chars().next().unwrap_or('T'),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::TooManyArguments,
                            "isoformat() takes at most one argument",
                        ))
                    }
                };
                Ok(Value::from(self.isoformat(sep)))
            }
            "toordinal" => {
                no_args(name, args)?;
                Ok(Value::from(self.toordinal()))
            }
            "weekday" => {
                no_args(name, args)?;
                Ok(Value::from(self.0.weekday().num_days_from_monday()))
            }
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("datetime has no method '{}'", name),
            )),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        fmt::Display::fmt(self.as_ref(), f)
    }
}

/// `to_datetime(text, format="%Y-%m-%d %H:%M:%S")`
pub fn to_datetime(
    text: Value,
    format: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<Value, Error> {
    let format = args::string_param(format, &kwargs, "format")?;
    kwargs.assert_all_used()?;

    let parsed = parse_datetime(&text.to_string(), format.as_deref().unwrap_or(DEFAULT_FORMAT))?;
    Ok(Value::from_object(DateTimeValue(parsed)))
}
