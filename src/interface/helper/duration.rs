//! Human readable durations such as `15s`, `500ms` or `1m30s`.
//!
//! A duration is one or more `<integer><unit>` components, where unit is one of
//! `h`, `m`, `s`, `ms`, `us` (or `µs`) and `ns`. Components are summed.

use std::time::Duration;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res, value},
    multi::many1,
    sequence::pair,
    IResult, Parser,
};

use crate::error::InterfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}
impl Unit {
    fn duration(self, n: u64) -> Option<Duration> {
        match self {
            Unit::Hours => n.checked_mul(60 * 60).map(Duration::from_secs),
            Unit::Minutes => n.checked_mul(60).map(Duration::from_secs),
            Unit::Seconds => Some(Duration::from_secs(n)),
            Unit::Milliseconds => Some(Duration::from_millis(n)),
            Unit::Microseconds => Some(Duration::from_micros(n)),
            Unit::Nanoseconds => Some(Duration::from_nanos(n)),
        }
    }
}

fn unit(input: &str) -> IResult<&str, Unit> {
    // `ms` must be tried before `m`
    alt((
        value(Unit::Hours, tag("h")),
        value(Unit::Milliseconds, tag("ms")),
        value(Unit::Microseconds, alt((tag("us"), tag("µs")))),
        value(Unit::Nanoseconds, tag("ns")),
        value(Unit::Minutes, tag("m")),
        value(Unit::Seconds, tag("s")),
    ))
    .parse(input)
}

fn component(input: &str) -> IResult<&str, Duration> {
    map_res(pair(map_res(digit1, str::parse::<u64>), unit), |(n, u)| u.duration(n).ok_or(())).parse(input)
}

pub fn parse(input: &str) -> Result<Duration, InterfaceError> {
    let (_, components) = all_consuming(many1(component))
        .parse(input.trim())
        .map_err(|_| InterfaceError::InvalidDuration(input.to_string()))?;
    components
        .into_iter()
        .try_fold(Duration::ZERO, |acc, d| acc.checked_add(d))
        .ok_or_else(|| InterfaceError::InvalidDuration(input.to_string()))
}

pub fn format(duration: &Duration) -> String {
    let (secs, nanos) = (duration.as_secs(), duration.subsec_nanos());
    if nanos == 0 {
        format!("{}s", secs)
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", duration.as_millis())
    } else if nanos % 1_000 == 0 {
        format!("{}us", duration.as_micros())
    } else {
        format!("{}ns", duration.as_nanos())
    }
}

/// `#[serde(with = "duration")]`
pub fn serialize<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(duration))
}
/// `#[serde(with = "duration")]`
pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// `#[serde(with = "duration::option")]`
pub mod option {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapped(#[serde(with = "super")] Duration);

    pub fn serialize<S: serde::Serializer>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        duration.map(Wrapped).serialize(serializer)
    }
    pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(d)| d))
    }
}
