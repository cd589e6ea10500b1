use std::{
    fmt::{Display, Formatter, Write as FmtWrite},
    io::Write as IoWrite,
    process::ExitCode,
    time::Duration,
};

use crate::interface::config::Config;

use super::measure::aggregate::{rate, Aggregator, IterationAggregate, Rps};

/// Result of every scenario in one invocation.
#[derive(Debug, Clone)]
pub struct Report {
    pub report: Vec<ScenarioReport>,
}
impl Report {
    pub fn new(report: Vec<ScenarioReport>) -> Self {
        Self { report }
    }
    pub fn scenarios(&self) -> &[ScenarioReport] {
        &self.report
    }
    /// `1` only when `strict` and some check failed, otherwise `0`.
    pub fn exit_code(&self, strict: bool) -> ExitCode {
        (!self.allow(strict) as u8).into()
    }
}
impl Reportable for Report {
    fn sub_reportable(&self) -> Vec<&dyn Reportable> {
        self.report.iter().map(|r| r as _).collect()
    }
    fn pass(&self) -> bool {
        self.report.iter().all(Reportable::pass)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub config: Config,
    pub aggregate: IterationAggregate,
    pub elapsed: Duration,
}
impl ScenarioReport {
    pub fn new(config: Config, aggregate: IterationAggregate, elapsed: Duration) -> Self {
        Self { config, aggregate, elapsed }
    }

    pub fn name(&self) -> String {
        self.config.name()
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn aggregate(&self) -> &IterationAggregate {
        &self.aggregate
    }
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
    pub fn iteration_rate(&self) -> Rps {
        rate(self.aggregate.iterations.aggregate(), self.elapsed)
    }
}
impl Reportable for ScenarioReport {
    fn sub_reportable(&self) -> Vec<&dyn Reportable> {
        Vec::new()
    }
    fn pass(&self) -> bool {
        self.aggregate.pass()
    }
}

pub trait Reportable {
    fn sub_reportable(&self) -> Vec<&dyn Reportable>;
    fn pass(&self) -> bool {
        self.sub_reportable().iter().all(|r| r.pass())
    }
    /// A failed check only fails the run in strict mode.
    fn allow(&self, strict: bool) -> bool {
        !strict || self.pass()
    }
}

pub struct ReportWriter<W> {
    pub indent: usize,
    pub buf: W,
    pub at_start_line: bool,
}
impl<W> ReportWriter<W> {
    pub fn new(indent: usize, buf: W) -> Self {
        Self { indent, buf, at_start_line: true }
    }
    pub fn indent(&self) -> String {
        "  ".repeat(self.indent)
    }
    pub fn increment(&mut self) {
        self.indent += 1;
    }
    pub fn decrement(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }
    pub fn scope<F, R, E>(&mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
    {
        self.increment();
        let ret = f(self);
        self.decrement();
        ret
    }
    pub fn into_inner(self) -> W {
        self.buf
    }
}
impl<W: IoWrite> FmtWrite for ReportWriter<W> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        for (i, line) in s.split('\n').enumerate() {
            if i > 0 {
                writeln!(self.buf).map_err(|_| std::fmt::Error)?;
                self.at_start_line = true;
            }
            if line.is_empty() {
                continue;
            }
            if self.at_start_line {
                write!(self.buf, "{}", self.indent()).map_err(|_| std::fmt::Error)?;
                self.at_start_line = false;
            }
            write!(self.buf, "{}", line).map_err(|_| std::fmt::Error)?;
        }
        Ok(())
    }
}
impl<W: Display> Display for ReportWriter<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.buf)
    }
}

#[cfg(test)]
mod tests {
    use crate::assault::check::Checks;

    use super::*;

    #[test]
    fn test_writer_indents_every_line() {
        let mut w = ReportWriter::new(0, Vec::new());
        writeln!(w, "scenario").unwrap();
        w.scope(|w| {
            writeln!(w, "first\nsecond")?;
            write!(w, "third")?;
            writeln!(w, " continued")
        })
        .unwrap();
        writeln!(w, "end").unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "scenario\n  first\n  second\n  third continued\nend\n");
    }

    #[test]
    fn test_exit_code_only_fails_in_strict() {
        let config = Config::new("http://localhost".parse::<http::Uri>().unwrap(), Default::default());
        let checks = Checks::compile(&config.checks).unwrap();
        let mut aggregate = IterationAggregate::new(&checks);
        aggregate.record::<http::Response<bytes::Bytes>>(
            &checks,
            &Err(crate::error::RequestError::Timeout(Duration::from_secs(1))),
        );
        let report = Report::new(vec![ScenarioReport::new(config, aggregate, Duration::from_secs(1))]);

        assert!(!report.pass());
        assert!(report.allow(false));
        assert!(!report.allow(true));
        assert_eq!(format!("{:?}", report.exit_code(false)), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(format!("{:?}", report.exit_code(true)), format!("{:?}", ExitCode::from(1)));
    }
}
