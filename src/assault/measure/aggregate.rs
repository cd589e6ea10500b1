use std::time::Duration;

use hdrhistogram::Histogram;

use crate::assault::{
    check::{CheckMessage, Checks, Evaluate},
    messages::Messages,
};

use super::metrics::RequestResult;

pub trait Aggregator {
    type Add;
    type Aggregate;
    fn add(&mut self, add: &Self::Add);
    fn aggregate(&self) -> Self::Aggregate;
    fn merge(&mut self, other: &Self);
}

/// Everything one virtual user observed. Each virtual user owns one, and they are merged after the run.
#[derive(Debug, Clone)]
pub struct IterationAggregate {
    pub iterations: CountAggregate,
    pub interrupted: CountAggregate,
    pub checks: Vec<CheckAggregate>,
    pub response: ResponseAggregate,
}
impl IterationAggregate {
    pub fn new(checks: &Checks) -> Self {
        Self {
            iterations: CountAggregate::new(),
            interrupted: CountAggregate::new(),
            checks: checks.names().into_iter().map(CheckAggregate::new).collect(),
            response: ResponseAggregate::new(),
        }
    }

    pub fn record<Res>(&mut self, checks: &Checks, result: &RequestResult<Res>)
    where
        crate::assault::check::CompiledCheck: Evaluate<Res, Message = CheckMessage>,
    {
        for (check, aggregate) in checks.iter().zip(self.checks.iter_mut()) {
            let pass = check.evaluate(result, &mut aggregate.messages);
            aggregate.pass.add(&pass);
        }
        match result {
            Ok(measured) => self.response.add(&Some((measured.metrics().latency(), measured.metrics().bytes()))),
            Err(_) => self.response.add(&None),
        }
        self.iterations.add(&());
    }
    pub fn interrupt(&mut self) {
        self.interrupted.add(&());
    }

    pub fn merge(&mut self, other: Self) {
        let Self { iterations, interrupted, checks, response } = other;
        self.iterations.merge(&iterations);
        self.interrupted.merge(&interrupted);
        for (mine, theirs) in self.checks.iter_mut().zip(checks) {
            mine.merge(theirs);
        }
        self.response.merge(&response);
    }

    pub fn pass(&self) -> bool {
        self.checks.iter().all(|c| c.pass.passed() == c.pass.count())
    }
}

#[derive(Debug, Clone)]
pub struct CheckAggregate {
    pub name: String,
    pub pass: PassAggregate,
    pub messages: Messages<CheckMessage>,
}
impl CheckAggregate {
    pub fn new(name: String) -> Self {
        Self { name, pass: PassAggregate::new(), messages: Messages::new() }
    }
    pub fn merge(&mut self, other: Self) {
        self.pass.merge(&other.pass);
        self.messages.merge(other.messages);
    }
}

#[derive(Debug, Clone)]
pub struct ResponseAggregate {
    pub count: CountAggregate,
    pub failed: CountAggregate,
    pub bytes: BytesAggregate,
    pub latency: LatencyAggregate,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSummary {
    pub count: Count,
    pub failed: Count,
    pub bytes: u64,
}
impl Aggregator for ResponseAggregate {
    /// latency and bytes of a response, or `None` if the request failed
    type Add = Option<(Duration, usize)>;
    type Aggregate = ResponseSummary;
    fn add(&mut self, res: &Self::Add) {
        self.count.add(&());
        match res {
            Some((latency, bytes)) => {
                self.latency.add(latency);
                self.bytes.add(bytes);
            }
            None => self.failed.add(&()),
        }
    }
    fn aggregate(&self) -> Self::Aggregate {
        ResponseSummary { count: self.count.aggregate(), failed: self.failed.aggregate(), bytes: self.bytes.aggregate() }
    }
    fn merge(&mut self, other: &Self) {
        self.count.merge(&other.count);
        self.failed.merge(&other.failed);
        self.bytes.merge(&other.bytes);
        self.latency.merge(&other.latency);
    }
}
impl Default for ResponseAggregate {
    fn default() -> Self {
        Self::new()
    }
}
impl ResponseAggregate {
    pub fn new() -> Self {
        Self {
            count: CountAggregate::new(),
            failed: CountAggregate::new(),
            bytes: BytesAggregate::new(),
            latency: LatencyAggregate::new(),
        }
    }
}

pub type Rps = f64;
pub fn rate(count: Count, elapsed: Duration) -> Rps {
    if elapsed.is_zero() {
        0.
    } else {
        count as f64 / elapsed.as_secs_f64()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountAggregate {
    count: Count,
}
pub type Count = u64;
impl Aggregator for CountAggregate {
    type Add = ();
    type Aggregate = Count;
    fn add(&mut self, (): &Self::Add) {
        self.count += 1;
    }
    fn aggregate(&self) -> Self::Aggregate {
        self.count
    }
    fn merge(&mut self, other: &Self) {
        self.count += other.count;
    }
}
impl CountAggregate {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassAggregate {
    pass: CountAggregate,
    count: CountAggregate,
}
pub type Pass = u64;
pub type PassRate = f64;
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSummary {
    pub pass: Pass,
    pub count: Count,
    pub pass_rate: PassRate,
}
impl Aggregator for PassAggregate {
    type Add = bool;
    type Aggregate = PassSummary;
    fn add(&mut self, pass: &Self::Add) {
        if *pass {
            self.pass.add(&());
        }
        self.count.add(&());
    }
    fn aggregate(&self) -> Self::Aggregate {
        PassSummary { pass: self.passed(), count: self.count(), pass_rate: self.ratio() }
    }
    fn merge(&mut self, other: &Self) {
        self.pass.merge(&other.pass);
        self.count.merge(&other.count);
    }
}
impl PassAggregate {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn count(&self) -> Count {
        self.count.aggregate()
    }
    pub fn passed(&self) -> Pass {
        self.pass.aggregate()
    }
    pub fn ratio(&self) -> PassRate {
        if self.count() == 0 {
            0.
        } else {
            self.passed() as f64 / self.count() as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BytesAggregate {
    bytes: u64,
}
impl Aggregator for BytesAggregate {
    type Add = usize;
    type Aggregate = u64;
    fn add(&mut self, bytes: &Self::Add) {
        self.bytes = self.bytes.saturating_add(*bytes as u64);
    }
    fn aggregate(&self) -> Self::Aggregate {
        self.bytes
    }
    fn merge(&mut self, other: &Self) {
        self.bytes = self.bytes.saturating_add(other.bytes);
    }
}
impl BytesAggregate {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, Clone)]
pub struct LatencyAggregate {
    hist: Histogram<u64>,
}
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub min: Duration,
    pub mean: Duration,
    pub percentiles: Vec<(f64, Duration)>,
    pub max: Duration,
}
impl Aggregator for LatencyAggregate {
    type Add = Duration;
    type Aggregate = LatencySummary;
    fn add(&mut self, latency: &Self::Add) {
        self.hist.saturating_record(latency.as_nanos().try_into().unwrap_or(u64::MAX));
    }
    fn aggregate(&self) -> Self::Aggregate {
        self.summary(&[])
    }
    fn merge(&mut self, other: &Self) {
        // auto resized histogram can always add another
        self.hist.add(&other.hist).unwrap_or_else(|_| unreachable!())
    }
}
impl Default for LatencyAggregate {
    fn default() -> Self {
        Self::new()
    }
}
impl LatencyAggregate {
    pub fn new() -> Self {
        let hist = Histogram::new(3).unwrap_or_else(|_| unreachable!("3 significant figures are valid"));
        Self { hist }
    }

    pub fn summary(&self, percentiles: &[f64]) -> LatencySummary {
        LatencySummary {
            min: self.min(),
            mean: self.mean(),
            percentiles: percentiles.iter().map(|p| (*p, self.value_at_percentile(*p))).collect(),
            max: self.max(),
        }
    }

    pub fn len(&self) -> u64 {
        self.hist.len()
    }
    pub fn is_empty(&self) -> bool {
        self.hist.is_empty()
    }
    pub fn min(&self) -> Duration {
        Duration::from_nanos(self.hist.min())
    }
    pub fn mean(&self) -> Duration {
        Duration::from_nanos(self.hist.mean() as u64)
    }
    pub fn value_at_percentile(&self, percentile: f64) -> Duration {
        Duration::from_nanos(self.hist.value_at_percentile(percentile))
    }
    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.hist.max())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::{
        assault::{check::Check, measure::metrics::MeasuredResponse},
        error::RequestError,
    };

    use super::*;

    #[test]
    fn count_aggregate() {
        let mut agg = CountAggregate::new();
        for _ in 0..1000 {
            agg.add(&());
        }
        assert_eq!(agg.aggregate(), 1000);
    }

    #[test]
    fn passed_aggregate() {
        let mut agg = PassAggregate::new();
        for i in 0..1000 {
            agg.add(&(i % 2 == 0));
        }
        assert_eq!(agg.aggregate(), PassSummary { pass: 500, count: 1000, pass_rate: 0.5 });
        assert_eq!(PassAggregate::new().ratio(), 0.);
    }

    #[test]
    fn latency_aggregate() {
        let mut agg = LatencyAggregate::new();
        for i in 1..1000 {
            agg.add(&Duration::from_millis(i));
        }

        let LatencySummary { min, mean, percentiles, max } = agg.summary(&[50., 90., 99.]);
        let tolerance = Duration::from_millis(1);

        assert!(min.abs_diff(Duration::from_millis(1)) < tolerance);
        assert!(mean.abs_diff(Duration::from_millis(500)) < tolerance);
        for ((_, q), p) in percentiles.iter().zip([
            Duration::from_millis(500),
            Duration::from_millis(900),
            Duration::from_millis(990),
        ]) {
            assert!(q.abs_diff(p) < tolerance);
        }
        assert!(max.abs_diff(Duration::from_millis(1000)) < tolerance);
    }

    #[test]
    fn merge_latency_aggregate() {
        let (mut a, mut b) = (LatencyAggregate::new(), LatencyAggregate::new());
        a.add(&Duration::from_millis(10));
        b.add(&Duration::from_millis(30));
        a.merge(&b);
        assert_eq!(a.len(), 2);
        assert!(a.max().abs_diff(Duration::from_millis(30)) < Duration::from_millis(1));
    }

    #[test]
    fn iteration_aggregate_records_each_check() {
        let checks = Checks::compile(&[Check::status_was_200()]).unwrap();
        let ok = |status: u16| -> RequestResult<http::Response<Bytes>> {
            let response = http::Response::builder().status(status).body(Bytes::from_static(b"hello")).unwrap();
            Ok(MeasuredResponse::new(response, Duration::from_millis(5), 5))
        };

        let mut first = IterationAggregate::new(&checks);
        first.record(&checks, &ok(200));
        first.record(&checks, &ok(500));
        let mut second = IterationAggregate::new(&checks);
        second.record::<http::Response<Bytes>>(&checks, &Err(RequestError::Timeout(Duration::from_secs(1))));
        second.interrupt();

        first.merge(second);
        assert_eq!(first.iterations.aggregate(), 3);
        assert_eq!(first.interrupted.aggregate(), 1);
        assert_eq!(first.checks[0].pass.aggregate(), PassSummary { pass: 1, count: 3, pass_rate: 1. / 3. });
        assert_eq!(first.checks[0].messages.total(), 2);
        assert_eq!(first.response.aggregate(), ResponseSummary { count: 3, failed: 1, bytes: 10 });
        assert!(!first.pass());
    }

    #[test]
    fn rate_with_zero_elapsed() {
        assert_eq!(rate(10, Duration::ZERO), 0.);
        assert_eq!(rate(10, Duration::from_secs(2)), 5.);
    }
}
