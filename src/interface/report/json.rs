use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    assault::{
        measure::aggregate::{rate, Aggregator, PassSummary, ResponseSummary},
        reportable::{Report, Reportable, ScenarioReport},
    },
    error::StampedeResult,
    interface::command::Stampede,
};

/// Machine readable end-of-run summary. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JsonSummary {
    pub pass: bool,
    pub scenarios: Vec<ScenarioSummary>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioSummary {
    pub name: String,
    pub target: String,
    pub vus: usize,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
    pub checks: Vec<CheckSummary>,
    pub iterations: IterationSummary,
    pub requests: RequestSummary,
    pub latency: Option<LatencyMsSummary>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckSummary {
    pub name: String,
    pub pass: u64,
    pub count: u64,
    pub pass_rate: f64,
    pub messages: Vec<String>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IterationSummary {
    pub count: u64,
    pub rate: f64,
    pub interrupted: u64,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequestSummary {
    pub count: u64,
    pub rate: f64,
    pub failed: u64,
    pub bytes: u64,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LatencyMsSummary {
    pub min: f64,
    pub mean: f64,
    pub percentiles: Vec<(f64, f64)>,
    pub max: f64,
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.
}

impl JsonSummary {
    pub fn new(report: &Report, percentiles: &[f64]) -> Self {
        let scenarios = report.scenarios().iter().map(|s| ScenarioSummary::new(s, percentiles)).collect();
        Self { pass: report.pass(), scenarios }
    }
}
impl ScenarioSummary {
    pub fn new(report: &ScenarioReport, percentiles: &[f64]) -> Self {
        let (config, aggregate, elapsed) = (report.config(), report.aggregate(), report.elapsed());
        let checks = aggregate
            .checks
            .iter()
            .map(|c| {
                let PassSummary { pass, count, pass_rate } = c.pass.aggregate();
                let messages = c.messages.samples().iter().map(ToString::to_string).collect();
                CheckSummary { name: c.name.clone(), pass, count, pass_rate, messages }
            })
            .collect();
        let iterations = IterationSummary {
            count: aggregate.iterations.aggregate(),
            rate: report.iteration_rate(),
            interrupted: aggregate.interrupted.aggregate(),
        };
        let ResponseSummary { count, failed, bytes } = aggregate.response.aggregate();
        let requests = RequestSummary { count, rate: rate(count, elapsed), failed, bytes };
        let latency = (!aggregate.response.latency.is_empty()).then(|| {
            let summary = aggregate.response.latency.summary(percentiles);
            LatencyMsSummary {
                min: ms(summary.min),
                mean: ms(summary.mean),
                percentiles: summary.percentiles.into_iter().map(|(p, d)| (p, ms(d))).collect(),
                max: ms(summary.max),
            }
        });

        Self {
            name: report.name(),
            target: config.target.to_string(),
            vus: config.options.vus().get(),
            duration_ms: ms(config.options.duration()),
            elapsed_ms: ms(elapsed),
            checks,
            iterations,
            requests,
            latency,
        }
    }
}

pub trait JsonReport: Reportable {
    fn json_report<W: std::io::Write>(&self, cmd: &Stampede, w: W) -> StampedeResult<()>;
}
impl JsonReport for Report {
    fn json_report<W: std::io::Write>(&self, cmd: &Stampede, mut w: W) -> StampedeResult<()> {
        serde_json::to_writer_pretty(&mut w, &JsonSummary::new(self, &cmd.percentile_set()?))?;
        writeln!(w)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assault::{check::Checks, measure::aggregate::IterationAggregate},
        interface::config::Config,
    };

    use super::*;

    #[test]
    fn test_json_summary_without_response() {
        let config = Config::new("http://localhost/".parse::<http::Uri>().unwrap(), Default::default());
        let checks = Checks::compile(&config.checks).unwrap();
        let report = Report::new(vec![ScenarioReport::new(
            config,
            IterationAggregate::new(&checks),
            Duration::from_secs(10),
        )]);

        let mut buf = Vec::new();
        report.json_report(&Stampede::default(), &mut buf).unwrap();
        let summary: JsonSummary = serde_json::from_slice(&buf).unwrap();

        assert!(summary.pass);
        assert_eq!(summary.scenarios[0].name, "http://localhost/");
        assert_eq!(summary.scenarios[0].checks[0].name, "status was 200");
        assert_eq!(summary.scenarios[0].checks[0].count, 0);
        assert_eq!(summary.scenarios[0].latency, None);
        assert_eq!(summary.scenarios[0].duration_ms, 10_000.);
    }
}
