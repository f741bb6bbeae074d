//! Primitive values and their canonical text encodings.
//!
//! Every primitive has exactly one locale-invariant textual form on the wire:
//! floats use the shortest round-trippable representation with `INF`/`-INF`/
//! `NaN` tokens and `E+NN` exponents, time spans use ISO-8601 durations with
//! seconds always present, decimals preserve their exact textual precision,
//! and date-times travel as ISO text derived from 100ns ticks. The codecs
//! here are leaves invoked by both pipelines; nothing in this module touches
//! XML.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use uguid::Guid;

use crate::{contract::XsdPrimitive, Error, Result};

/// Ticks per second (100ns resolution)
const TICKS_PER_SECOND: u64 = 10_000_000;
/// Ticks per minute
const TICKS_PER_MINUTE: u64 = 60 * TICKS_PER_SECOND;
/// Ticks per hour
const TICKS_PER_HOUR: u64 = 60 * TICKS_PER_MINUTE;
/// Ticks per day
const TICKS_PER_DAY: u64 = 24 * TICKS_PER_HOUR;

/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar
const DAYS_TO_UNIX_EPOCH: i64 = 719_162;

/// Kind annotation of a [`DateTime`] value.
///
/// Ticks are wall-clock ticks in all three kinds; the kind only controls the
/// textual suffix (`Z`, a signed offset, or nothing) and round-trips
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeKind {
    /// No timezone annotation
    #[default]
    Unspecified,
    /// Suffixed with `Z`
    Utc,
    /// Suffixed with a signed `HH:MM` offset
    Local {
        /// Offset from UTC in minutes
        offset_minutes: i16,
    },
}

/// A point in time as 100ns ticks since 0001-01-01T00:00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    /// Ticks since 0001-01-01T00:00:00 (wall clock)
    pub ticks: i64,
    /// Timezone annotation
    pub kind: DateTimeKind,
}

impl DateTime {
    /// Creates a date-time from raw ticks and a kind
    #[must_use]
    pub fn new(ticks: i64, kind: DateTimeKind) -> Self {
        DateTime { ticks, kind }
    }
}

/// An exact decimal number, backed by its validated textual form.
///
/// Storing the text is what makes "preserves exact textual precision" hold:
/// `1.50` and `1.5` are different decimals on the wire and stay different
/// through a round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal(String);

impl Decimal {
    /// Validates and wraps a decimal literal.
    ///
    /// Accepted form: optional sign, digits, optional fraction digits. No
    /// exponent - XSD `decimal` has none.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for anything that is not a plain decimal
    /// literal.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let digits = text.strip_prefix(['-', '+']).unwrap_or(&text);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        let valid = !(int_part.is_empty() && frac_part.is_empty())
            && int_part.chars().all(|c| c.is_ascii_digit())
            && frac_part.chars().all(|c| c.is_ascii_digit())
            && (!digits.contains('.') || !frac_part.is_empty() || !int_part.is_empty());
        if !valid {
            return Err(malformed_error!("invalid decimal literal '{}'", text));
        }
        Ok(Decimal(text))
    }

    /// The exact textual form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if every digit is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| !c.is_ascii_digit() || c == '0')
    }
}

/// A primitive value with its canonical wire encoding.
///
/// Variant names follow the CLI element-type vocabulary (`I4` is a 32-bit
/// signed integer, `R8` a 64-bit float, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Boolean value
    Boolean(bool),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// String value
    Str(String),
    /// UTF-16 code unit, serialized as its integer value
    Char(u16),
    /// Point in time
    DateTime(DateTime),
    /// Time span as 100ns ticks
    TimeSpan(i64),
    /// Globally unique identifier
    Guid(Guid),
    /// URI carried as text
    Uri(String),
    /// Binary payload, base64 on the wire
    Base64(Vec<u8>),
}

impl Primitive {
    /// The wire classification of this value
    #[must_use]
    pub fn xsd(&self) -> XsdPrimitive {
        match self {
            Primitive::Boolean(_) => XsdPrimitive::Boolean,
            Primitive::I1(_) => XsdPrimitive::Byte,
            Primitive::U1(_) => XsdPrimitive::UnsignedByte,
            Primitive::I2(_) => XsdPrimitive::Short,
            Primitive::U2(_) => XsdPrimitive::UnsignedShort,
            Primitive::I4(_) => XsdPrimitive::Int,
            Primitive::U4(_) => XsdPrimitive::UnsignedInt,
            Primitive::I8(_) => XsdPrimitive::Long,
            Primitive::U8(_) => XsdPrimitive::UnsignedLong,
            Primitive::R4(_) => XsdPrimitive::Float,
            Primitive::R8(_) => XsdPrimitive::Double,
            Primitive::Decimal(_) => XsdPrimitive::Decimal,
            Primitive::Str(_) => XsdPrimitive::String,
            Primitive::Char(_) => XsdPrimitive::Char,
            Primitive::DateTime(_) => XsdPrimitive::DateTime,
            Primitive::TimeSpan(_) => XsdPrimitive::Duration,
            Primitive::Guid(_) => XsdPrimitive::Guid,
            Primitive::Uri(_) => XsdPrimitive::AnyUri,
            Primitive::Base64(_) => XsdPrimitive::Base64Binary,
        }
    }

    /// True if the value equals its type default
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            Primitive::Boolean(v) => !v,
            Primitive::I1(v) => *v == 0,
            Primitive::U1(v) => *v == 0,
            Primitive::I2(v) => *v == 0,
            Primitive::U2(v) => *v == 0,
            Primitive::I4(v) => *v == 0,
            Primitive::U4(v) => *v == 0,
            Primitive::I8(v) => *v == 0,
            Primitive::U8(v) => *v == 0,
            Primitive::R4(v) => *v == 0.0,
            Primitive::R8(v) => *v == 0.0,
            Primitive::Decimal(v) => v.is_zero(),
            Primitive::Str(v) => v.is_empty(),
            Primitive::Char(v) => *v == 0,
            Primitive::DateTime(v) => v.ticks == 0 && v.kind == DateTimeKind::Unspecified,
            Primitive::TimeSpan(v) => *v == 0,
            Primitive::Guid(v) => *v == Guid::ZERO,
            Primitive::Uri(v) => v.is_empty(),
            Primitive::Base64(v) => v.is_empty(),
        }
    }

    /// The canonical wire text of this value
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Primitive::Boolean(v) => if *v { "true" } else { "false" }.to_string(),
            Primitive::I1(v) => v.to_string(),
            Primitive::U1(v) => v.to_string(),
            Primitive::I2(v) => v.to_string(),
            Primitive::U2(v) => v.to_string(),
            Primitive::I4(v) => v.to_string(),
            Primitive::U4(v) => v.to_string(),
            Primitive::I8(v) => v.to_string(),
            Primitive::U8(v) => v.to_string(),
            Primitive::R4(v) => format_f32(*v),
            Primitive::R8(v) => format_f64(*v),
            Primitive::Decimal(v) => v.as_str().to_string(),
            Primitive::Str(v) => v.clone(),
            Primitive::Char(v) => v.to_string(),
            Primitive::DateTime(v) => format_date_time(v),
            Primitive::TimeSpan(v) => format_duration(*v),
            Primitive::Guid(v) => v.to_string(),
            Primitive::Uri(v) => v.clone(),
            Primitive::Base64(v) => BASE64.encode(v),
        }
    }

    /// Decodes wire text into a value of the given primitive classification.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] when the text is not a valid encoding of
    /// the classification, and for `anyType` which never carries text itself.
    pub fn from_text(kind: XsdPrimitive, text: &str) -> Result<Self> {
        match kind {
            XsdPrimitive::Boolean => match text {
                "true" | "1" => Ok(Primitive::Boolean(true)),
                "false" | "0" => Ok(Primitive::Boolean(false)),
                other => Err(malformed_error!("invalid boolean '{}'", other)),
            },
            XsdPrimitive::Byte => parse_int(text).map(Primitive::I1),
            XsdPrimitive::UnsignedByte => parse_int(text).map(Primitive::U1),
            XsdPrimitive::Short => parse_int(text).map(Primitive::I2),
            XsdPrimitive::UnsignedShort => parse_int(text).map(Primitive::U2),
            XsdPrimitive::Int => parse_int(text).map(Primitive::I4),
            XsdPrimitive::UnsignedInt => parse_int(text).map(Primitive::U4),
            XsdPrimitive::Long => parse_int(text).map(Primitive::I8),
            XsdPrimitive::UnsignedLong => parse_int(text).map(Primitive::U8),
            XsdPrimitive::Float => parse_f32(text).map(Primitive::R4),
            XsdPrimitive::Double => parse_f64(text).map(Primitive::R8),
            XsdPrimitive::Decimal => Decimal::new(text).map(Primitive::Decimal),
            XsdPrimitive::String => Ok(Primitive::Str(text.to_string())),
            XsdPrimitive::Char => parse_int(text).map(Primitive::Char),
            XsdPrimitive::DateTime => parse_date_time(text).map(Primitive::DateTime),
            XsdPrimitive::Duration => parse_duration(text).map(Primitive::TimeSpan),
            XsdPrimitive::Guid => Guid::try_parse(text)
                .map(Primitive::Guid)
                .map_err(|_| malformed_error!("invalid guid '{}'", text)),
            XsdPrimitive::AnyUri => Ok(Primitive::Uri(text.to_string())),
            XsdPrimitive::Base64Binary => BASE64
                .decode(text.trim())
                .map(Primitive::Base64)
                .map_err(|_| malformed_error!("invalid base64 payload")),
            XsdPrimitive::AnyType => {
                Err(malformed_error!("anyType element carries no primitive text"))
            }
        }
    }
}

fn parse_int<T: std::str::FromStr>(text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| malformed_error!("invalid integer literal '{}'", text))
}

fn parse_f64(text: &str) -> Result<f64> {
    match text {
        "INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        other => other
            .parse()
            .map_err(|_| malformed_error!("invalid double literal '{}'", other)),
    }
}

fn parse_f32(text: &str) -> Result<f32> {
    match text {
        "INF" => Ok(f32::INFINITY),
        "-INF" => Ok(f32::NEG_INFINITY),
        "NaN" => Ok(f32::NAN),
        other => other
            .parse()
            .map_err(|_| malformed_error!("invalid float literal '{}'", other)),
    }
}

/// Formats a double in the canonical round-trippable form.
///
/// Shortest digits, switching to `dE+NN` scientific notation when the decimal
/// exponent reaches 15 or drops below -4, with a minimum of two exponent
/// digits. `double::MIN` formats as `-1.7976931348623157E+308`.
#[must_use]
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f64::INFINITY {
        return "INF".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-INF".to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    from_scientific(&format!("{value:e}"), 15)
}

/// Formats a float in the canonical round-trippable form (exponent
/// threshold 7, e.g. `f32::MAX` is `3.4028235E+38`).
#[must_use]
pub fn format_f32(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f32::INFINITY {
        return "INF".to_string();
    }
    if value == f32::NEG_INFINITY {
        return "-INF".to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    from_scientific(&format!("{value:e}"), 7)
}

/// Converts Rust's `{:e}` shortest form (`-d.ddde-NN`) to the wire form.
fn from_scientific(sci: &str, threshold: i32) -> String {
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if exp >= threshold || exp <= -5 {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('E');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exp.unsigned_abs()));
    } else if exp >= 0 {
        let point = (exp + 1) as usize;
        if point >= digits.len() {
            out.push_str(&digits);
            out.push_str(&"0".repeat(point - digits.len()));
        } else {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        }
    } else {
        out.push_str("0.");
        out.push_str(&"0".repeat((-exp - 1) as usize));
        out.push_str(&digits);
    }
    out
}

/// Formats a tick count as an ISO-8601 duration.
///
/// Seconds are always present when no larger unit is (`PT0S`), and
/// `i64::MIN` ticks format without overflow as
/// `-P10675199DT2H48M5.4775808S`.
#[must_use]
pub fn format_duration(ticks: i64) -> String {
    let magnitude = ticks.unsigned_abs();
    let days = magnitude / TICKS_PER_DAY;
    let hours = magnitude % TICKS_PER_DAY / TICKS_PER_HOUR;
    let minutes = magnitude % TICKS_PER_HOUR / TICKS_PER_MINUTE;
    let seconds = magnitude % TICKS_PER_MINUTE / TICKS_PER_SECOND;
    let fraction = magnitude % TICKS_PER_SECOND;

    let mut out = String::new();
    if ticks < 0 {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    let has_time = hours > 0 || minutes > 0 || seconds > 0 || fraction > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if fraction > 0 {
            let frac = format!("{fraction:07}");
            out.push_str(&format!("{seconds}.{}S", frac.trim_end_matches('0')));
        } else if seconds > 0 || !has_time {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}

/// Parses an ISO-8601 duration into ticks.
///
/// Year and month designators are normalized at 365 and 30 days. Fractions
/// beyond 100ns resolution are truncated.
///
/// # Errors
/// Returns [`Error::Malformed`] for syntax errors or values outside the
/// representable tick range.
pub fn parse_duration(text: &str) -> Result<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest
        .strip_prefix('P')
        .ok_or_else(|| malformed_error!("duration '{}' missing 'P' designator", text))?;

    let mut ticks: i128 = 0;
    let mut in_time = false;
    let mut chars = rest.char_indices().peekable();
    let mut seen_any = false;
    let bytes = rest.as_bytes();

    while let Some(&(start, c)) = chars.peek() {
        if c == 'T' {
            in_time = true;
            chars.next();
            continue;
        }
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if end == start || end >= bytes.len() {
            return Err(malformed_error!("invalid duration '{}'", text));
        }
        let number = &rest[start..end];
        let unit = bytes[end] as char;
        while let Some(&(i, _)) = chars.peek() {
            if i > end {
                break;
            }
            chars.next();
        }

        let unit_ticks: i128 = match (in_time, unit) {
            (false, 'Y') => 365 * TICKS_PER_DAY as i128 * parse_whole(number, text)?,
            (false, 'M') => 30 * TICKS_PER_DAY as i128 * parse_whole(number, text)?,
            (false, 'D') => TICKS_PER_DAY as i128 * parse_whole(number, text)?,
            (true, 'H') => TICKS_PER_HOUR as i128 * parse_whole(number, text)?,
            (true, 'M') => TICKS_PER_MINUTE as i128 * parse_whole(number, text)?,
            (true, 'S') => parse_seconds(number, text)?,
            _ => return Err(malformed_error!("invalid duration designator '{}'", unit)),
        };
        ticks += unit_ticks;
        seen_any = true;
    }

    if !seen_any {
        return Err(malformed_error!("duration '{}' has no components", text));
    }
    if negative {
        ticks = -ticks;
    }
    i64::try_from(ticks).map_err(|_| malformed_error!("duration '{}' out of range", text))
}

fn parse_whole(number: &str, whole: &str) -> Result<i128> {
    if number.contains('.') {
        return Err(malformed_error!("fraction only allowed on seconds in '{}'", whole));
    }
    number
        .parse()
        .map_err(|_| malformed_error!("invalid duration component in '{}'", whole))
}

fn parse_seconds(number: &str, whole: &str) -> Result<i128> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    let seconds: i128 = int_part
        .parse()
        .map_err(|_| malformed_error!("invalid seconds in '{}'", whole))?;
    let mut frac_ticks: i128 = 0;
    for (i, c) in frac_part.chars().take(7).enumerate() {
        let digit = c
            .to_digit(10)
            .ok_or_else(|| malformed_error!("invalid seconds fraction in '{}'", whole))?;
        frac_ticks += i128::from(digit) * 10i128.pow(6 - i as u32);
    }
    Ok(seconds * TICKS_PER_SECOND as i128 + frac_ticks)
}

/// Formats ticks + kind as ISO date-time text.
#[must_use]
pub fn format_date_time(value: &DateTime) -> String {
    let ticks = value.ticks.max(0) as u64;
    let days = (ticks / TICKS_PER_DAY) as i64;
    let time = ticks % TICKS_PER_DAY;
    let (year, month, day) = civil_from_days(days - DAYS_TO_UNIX_EPOCH);

    let hours = time / TICKS_PER_HOUR;
    let minutes = time % TICKS_PER_HOUR / TICKS_PER_MINUTE;
    let seconds = time % TICKS_PER_MINUTE / TICKS_PER_SECOND;
    let fraction = time % TICKS_PER_SECOND;

    let mut out = format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}");
    if fraction > 0 {
        let frac = format!("{fraction:07}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    match value.kind {
        DateTimeKind::Unspecified => {}
        DateTimeKind::Utc => out.push('Z'),
        DateTimeKind::Local { offset_minutes } => {
            let sign = if offset_minutes < 0 { '-' } else { '+' };
            let magnitude = offset_minutes.unsigned_abs();
            out.push_str(&format!("{sign}{:02}:{:02}", magnitude / 60, magnitude % 60));
        }
    }
    out
}

/// Parses ISO date-time text into ticks + kind.
///
/// # Errors
/// Returns [`Error::Malformed`] for syntax errors or out-of-range fields.
pub fn parse_date_time(text: &str) -> Result<DateTime> {
    let fail = || malformed_error!("invalid dateTime '{}'", text);

    if text.len() < 19 || text.as_bytes()[10] != b'T' {
        return Err(fail());
    }
    let year: i64 = text[0..4].parse().map_err(|_| fail())?;
    let month: u32 = text[5..7].parse().map_err(|_| fail())?;
    let day: u32 = text[8..10].parse().map_err(|_| fail())?;
    let hours: u64 = text[11..13].parse().map_err(|_| fail())?;
    let minutes: u64 = text[14..16].parse().map_err(|_| fail())?;
    let seconds: u64 = text[17..19].parse().map_err(|_| fail())?;
    if text.as_bytes()[4] != b'-'
        || text.as_bytes()[7] != b'-'
        || text.as_bytes()[13] != b':'
        || text.as_bytes()[16] != b':'
    {
        return Err(fail());
    }
    if !(1..=12).contains(&month)
        || day < 1
        || day > days_in_month(year, month)
        || hours > 23
        || minutes > 59
        || seconds > 59
    {
        return Err(fail());
    }

    let mut rest = &text[19..];
    let mut fraction: u64 = 0;
    if let Some(after_dot) = rest.strip_prefix('.') {
        let digits: String = after_dot.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() || digits.len() > 7 {
            return Err(fail());
        }
        for (i, b) in digits.bytes().enumerate() {
            fraction += u64::from(b - b'0') * 10u64.pow(6 - i as u32);
        }
        rest = &after_dot[digits.len()..];
    }

    let kind = match rest {
        "" => DateTimeKind::Unspecified,
        "Z" => DateTimeKind::Utc,
        offset => {
            let sign = match offset.as_bytes().first() {
                Some(b'+') => 1i16,
                Some(b'-') => -1i16,
                _ => return Err(fail()),
            };
            if offset.len() != 6 || offset.as_bytes()[3] != b':' {
                return Err(fail());
            }
            let oh: i16 = offset[1..3].parse().map_err(|_| fail())?;
            let om: i16 = offset[4..6].parse().map_err(|_| fail())?;
            if oh > 14 || om > 59 {
                return Err(fail());
            }
            DateTimeKind::Local {
                offset_minutes: sign * (oh * 60 + om),
            }
        }
    };

    let days = days_from_civil(year, month, day) + DAYS_TO_UNIX_EPOCH;
    if days < 0 {
        return Err(fail());
    }
    let ticks = days as u64 * TICKS_PER_DAY
        + hours * TICKS_PER_HOUR
        + minutes * TICKS_PER_MINUTE
        + seconds * TICKS_PER_SECOND
        + fraction;
    let ticks = i64::try_from(ticks).map_err(|_| fail())?;
    Ok(DateTime { ticks, kind })
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        _ => 28,
    }
}

/// Civil date from days since 1970-01-01 (proleptic Gregorian).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Days since 1970-01-01 for a civil date (proleptic Gregorian).
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let mp = i64::from(if m > 2 { m - 3 } else { m + 9 });
    let doy = (153 * mp + 2) / 5 + i64::from(d) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}
