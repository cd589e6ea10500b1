use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::CheckError,
    interface::helper::{duration, http_serde_priv},
};

use super::{
    measure::metrics::{MeasuredResponse, RequestResult},
    messages::Messages,
};

/// Named assertion evaluated against every response.
/// ```yaml
/// checks:
///   - name: status was 200
///     status: 200
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Check {
    pub name: String,
    #[serde(flatten)]
    pub predicate: Predicate,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Predicate {
    Status(http_serde_priv::StatusCode),
    StatusIn(Vec<http_serde_priv::StatusCode>),
    BodyContains(String),
    BodyRegex(String),
    MaxLatency(#[serde(with = "duration")] Duration),
}
impl Check {
    pub const STATUS_WAS_200: &'static str = "status was 200";

    pub fn new<N: ToString>(name: N, predicate: Predicate) -> Self {
        Self { name: name.to_string(), predicate }
    }
    pub fn status_was_200() -> Self {
        Self::new(Self::STATUS_WAS_200, Predicate::Status(http::StatusCode::OK.into()))
    }
    pub fn default_checks() -> Vec<Self> {
        vec![Self::status_was_200()]
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckMessage {
    #[error("{0}")]
    RequestFailed(String),
    #[error("status is {actual}, but expected {expected}")]
    UnexpectedStatus { expected: String, actual: http::StatusCode },
    #[error("body does not contain `{0}`")]
    NotContain(String),
    #[error("body does not match regex `{0}`")]
    NotMatch(String),
    #[error("latency {actual:?} exceeds {max:?}")]
    TooSlow { max: Duration, actual: Duration },
}

pub trait Evaluate<Res> {
    type Message;
    fn evaluate(&self, res: &RequestResult<Res>, msg: &mut Messages<Self::Message>) -> bool;
}

#[derive(Debug, Clone)]
enum Matcher {
    Status(http::StatusCode),
    StatusIn(Vec<http::StatusCode>),
    BodyContains(String),
    BodyRegex(Regex),
    MaxLatency(Duration),
}

#[derive(Debug, Clone)]
pub struct CompiledCheck {
    name: String,
    matcher: Matcher,
}
impl CompiledCheck {
    pub fn compile(check: &Check) -> Result<Self, CheckError> {
        let Check { name, predicate } = check;
        let matcher = match predicate {
            Predicate::Status(s) => Matcher::Status(**s),
            Predicate::StatusIn(s) => Matcher::StatusIn(s.iter().map(|s| **s).collect()),
            Predicate::BodyContains(s) => Matcher::BodyContains(s.clone()),
            Predicate::BodyRegex(re) => Matcher::BodyRegex(
                Regex::new(re).map_err(|source| CheckError::InvalidRegex { name: name.clone(), source })?,
            ),
            Predicate::MaxLatency(d) => Matcher::MaxLatency(*d),
        };
        Ok(Self { name: name.clone(), matcher })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn accept<B: AsRef<[u8]>>(&self, res: &MeasuredResponse<http::Response<B>>) -> Result<(), CheckMessage> {
        let (response, metrics) = (res.response(), res.metrics());
        match &self.matcher {
            Matcher::Status(expected) => (response.status() == *expected).then_some(()).ok_or_else(|| {
                CheckMessage::UnexpectedStatus { expected: expected.to_string(), actual: response.status() }
            }),
            Matcher::StatusIn(expected) => expected.contains(&response.status()).then_some(()).ok_or_else(|| {
                let expected = expected.iter().map(|s| s.as_u16().to_string()).collect::<Vec<_>>().join(" or ");
                CheckMessage::UnexpectedStatus { expected, actual: response.status() }
            }),
            Matcher::BodyContains(needle) => String::from_utf8_lossy(response.body().as_ref())
                .contains(needle.as_str())
                .then_some(())
                .ok_or_else(|| CheckMessage::NotContain(needle.clone())),
            Matcher::BodyRegex(re) => re
                .is_match(&String::from_utf8_lossy(response.body().as_ref()))
                .then_some(())
                .ok_or_else(|| CheckMessage::NotMatch(re.to_string())),
            Matcher::MaxLatency(max) => (metrics.latency() <= *max)
                .then_some(())
                .ok_or(CheckMessage::TooSlow { max: *max, actual: metrics.latency() }),
        }
    }
}
impl<B: AsRef<[u8]>> Evaluate<http::Response<B>> for CompiledCheck {
    type Message = CheckMessage;
    fn evaluate(&self, res: &RequestResult<http::Response<B>>, msg: &mut Messages<Self::Message>) -> bool {
        let accepted = match res {
            Ok(measured) => self.accept(measured),
            Err(err) => Err(CheckMessage::RequestFailed(err.to_string())),
        };
        msg.push_unwrap(accepted).is_some()
    }
}

/// Checks compiled once before a run, in declared order.
#[derive(Debug, Clone, Default)]
pub struct Checks(Vec<CompiledCheck>);
impl Checks {
    pub fn compile<'a, I: IntoIterator<Item = &'a Check>>(checks: I) -> Result<Self, CheckError> {
        Ok(Self(checks.into_iter().map(CompiledCheck::compile).collect::<Result<_, _>>()?))
    }
    pub fn iter(&self) -> impl Iterator<Item = &CompiledCheck> {
        self.0.iter()
    }
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }
}
