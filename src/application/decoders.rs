// Value decoders - one raw line in, one typed value out
use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

use crate::domain::value::{DecodedValue, Measurement};

/// Structural failure of a single line decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no parenthesized value group")]
    MissingGroup,
    #[error("expected at least {expected} value groups, found {found}")]
    GroupCount { expected: usize, found: usize },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("missing unit in {0:?}")]
    MissingUnit(String),
}

/// Numeric reading with an optional unit, e.g. `1-0:1.8.1(002074.842*kWh)`.
pub fn decode_numeric(line: &str) -> Result<DecodedValue, DecodeError> {
    let (head, unit) = match line.split_once('*') {
        Some((head, tail)) => (head, Some(tail.trim_end_matches(')').to_string())),
        None => (line, None),
    };
    let raw = head
        .split_once('(')
        .map(|(_, value)| value)
        .ok_or(DecodeError::MissingGroup)?;
    let value = parse_f64(raw.trim_end_matches(')'))?;
    Ok(DecodedValue::Numeric { value, unit })
}

/// Text value, e.g. `0-0:96.1.1(4530303034303036333935353037)`.
pub fn decode_text(line: &str) -> Result<DecodedValue, DecodeError> {
    Ok(DecodedValue::Text(first_group(line)?.to_string()))
}

/// Meter clock timestamp, e.g. `0-0:1.0.0(200101120000S)`.
pub fn decode_timestamp(line: &str) -> Result<DecodedValue, DecodeError> {
    Ok(DecodedValue::Timestamp(parse_timestamp(first_group(line)?)?))
}

/// Power failure event log entry, e.g.
/// `1-0:99.97.0(1)(0-0:96.7.19)(200101120000S)(0000000240*s)`.
///
/// The first four groups are consumed; trailing groups are ignored.
pub fn decode_power_failure_event_log(line: &str) -> Result<DecodedValue, DecodeError> {
    let groups = value_groups(line);
    if groups.len() < 4 {
        return Err(DecodeError::GroupCount {
            expected: 4,
            found: groups.len(),
        });
    }
    let count = groups[0]
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidNumber(groups[0].to_string()))?;
    Ok(DecodedValue::PowerFailureEvent {
        count,
        obis_code: groups[1].to_string(),
        timestamp: parse_timestamp(groups[2])?,
        duration: parse_measurement(groups[3])?,
    })
}

/// Gas meter 5-minute value, e.g. `0-1:24.2.1(200101120000W)(00521.964*m3)`.
pub fn decode_five_minute_value(line: &str) -> Result<DecodedValue, DecodeError> {
    let groups = value_groups(line);
    if groups.len() < 2 {
        return Err(DecodeError::GroupCount {
            expected: 2,
            found: groups.len(),
        });
    }
    let measurement = parse_measurement(groups[1])?;
    Ok(DecodedValue::FiveMinuteValue {
        timestamp: parse_timestamp(groups[0])?,
        value: measurement.value,
        unit: measurement.unit,
    })
}

/// The content of the first `(...)` group.
fn first_group(line: &str) -> Result<&str, DecodeError> {
    let open = line.find('(').ok_or(DecodeError::MissingGroup)?;
    let rest = &line[open + 1..];
    let close = rest.find(')').ok_or(DecodeError::MissingGroup)?;
    Ok(&rest[..close])
}

/// The contents of every `(...)` group, left to right.
fn value_groups(line: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('(') {
        rest = &rest[open + 1..];
        let Some(close) = rest.find(')') else { break };
        groups.push(&rest[..close]);
        rest = &rest[close + 1..];
    }
    groups
}

fn parse_f64(raw: &str) -> Result<f64, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber(raw.to_string()))
}

/// A `<value>*<unit>` pair as found inside compound groups.
fn parse_measurement(raw: &str) -> Result<Measurement, DecodeError> {
    let (value, unit) = raw
        .split_once('*')
        .ok_or_else(|| DecodeError::MissingUnit(raw.to_string()))?;
    Ok(Measurement {
        value: parse_f64(value)?,
        unit: unit.to_string(),
    })
}

/// A 12-digit `YYMMDDhhmmss` timestamp followed by a DST indicator letter,
/// interpreted in the local timezone. The DST letter is validated but does
/// not adjust the result.
fn parse_timestamp(raw: &str) -> Result<DateTime<Local>, DecodeError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 13
        && bytes[..12].iter().all(u8::is_ascii_digit)
        && bytes[12].is_ascii_uppercase();
    if !well_formed {
        return Err(DecodeError::InvalidTimestamp(raw.to_string()));
    }
    let pair = |i: usize| ((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0')) as u32;
    Local
        .with_ymd_and_hms(
            2000 + pair(0) as i32,
            pair(2),
            pair(4),
            pair(6),
            pair(8),
            pair(10),
        )
        .earliest()
        .ok_or_else(|| DecodeError::InvalidTimestamp(raw.to_string()))
}
