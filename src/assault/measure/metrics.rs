use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

pub type RequestResult<Res> = Result<MeasuredResponse<Res>, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasuredResponse<Res> {
    response: Res,
    metrics: Metrics,
}
impl<Res> MeasuredResponse<Res> {
    pub fn new(response: Res, latency: Duration, bytes: usize) -> Self {
        Self { response, metrics: Metrics { latency, bytes } }
    }

    pub fn response(&self) -> &Res {
        &self.response
    }
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Metrics {
    latency: Duration,
    bytes: usize,
}
impl Metrics {
    pub fn latency(&self) -> Duration {
        self.latency
    }
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}
