use std::{fmt::Write as _, time::Duration};

use crate::{
    assault::{
        measure::{
            aggregate::{rate, Aggregator, CheckAggregate, LatencySummary, PassSummary, ResponseSummary},
            threshold::Classified,
        },
        reportable::{Report, ReportWriter, Reportable, ScenarioReport},
    },
    error::StampedeResult,
    interface::{command::Stampede, helper::duration},
};

pub fn style_classified(class: &Classified) -> console::Style {
    match class {
        Classified::Good => console::Style::new().green(),
        Classified::Allow => console::Style::new().cyan(),
        Classified::Warn => console::Style::new().yellow(),
        Classified::Bad => console::Style::new().red(),
    }
}
pub fn apply_style_classified(duration: &Duration) -> console::StyledObject<Duration> {
    style_classified(&Classified::latency(*duration)).apply_to(*duration)
}

pub trait ConsoleReport: Reportable {
    fn console_report<W: std::io::Write>(&self, cmd: &Stampede, w: &mut ReportWriter<W>) -> StampedeResult<()>;
}

pub enum StampedeConsoleReport {}
impl StampedeConsoleReport {
    pub const SUMMARY_EMOJI: console::Emoji<'_, '_> = console::Emoji("💥", "");
}
impl ConsoleReport for Report {
    fn console_report<W: std::io::Write>(&self, cmd: &Stampede, w: &mut ReportWriter<W>) -> StampedeResult<()> {
        for report in &self.report {
            report.console_report(cmd, w)?;
            writeln!(w)?;
        }

        let (checks, passed) = self
            .report
            .iter()
            .flat_map(|r| &r.aggregate.checks)
            .fold((0, 0), |(c, p), agg| (c + 1, p + usize::from(agg.pass.passed() == agg.pass.count())));
        let style = if self.pass() { console::Style::new().green() } else { console::Style::new().red() };
        writeln!(
            w,
            "{} {} {}",
            StampedeConsoleReport::SUMMARY_EMOJI,
            console::style(format!("{} scenarios finished", self.report.len())).bold(),
            StampedeConsoleReport::SUMMARY_EMOJI,
        )?;
        w.scope(|w| writeln!(w, "checks fully passed: {}", style.apply_to(format!("{}/{}", passed, checks))))?;
        Ok(())
    }
}

pub enum ScenarioConsoleReport {}
impl ScenarioConsoleReport {
    pub const NAME_EMOJI: console::Emoji<'_, '_> = console::Emoji("🚀", "");
    pub const TARGET_EMOJI: console::Emoji<'_, '_> = console::Emoji("🌐", "");
    pub const VUS_EMOJI: console::Emoji<'_, '_> = console::Emoji("👥", "");
    pub const PASS_EMOJI: console::Emoji<'_, '_> = console::Emoji("✅", "PASS");
    pub const FAIL_EMOJI: console::Emoji<'_, '_> = console::Emoji("❌", "FAIL");
    pub const MESSAGE_EMOJI: console::Emoji<'_, '_> = console::Emoji("💬", "");
    pub const ITERATION_EMOJI: console::Emoji<'_, '_> = console::Emoji("🔁", "");
    pub const REQUEST_EMOJI: console::Emoji<'_, '_> = console::Emoji("📨", "");
    pub const LATENCY_EMOJI: console::Emoji<'_, '_> = console::Emoji("⌛", "");
}
impl ConsoleReport for ScenarioReport {
    fn console_report<W: std::io::Write>(&self, cmd: &Stampede, w: &mut ReportWriter<W>) -> StampedeResult<()> {
        let percentile_set = cmd.percentile_set()?;
        let (config, aggregate) = (self.config(), self.aggregate());

        writeln!(w, "{} {} {}", ScenarioConsoleReport::NAME_EMOJI, self.name(), ScenarioConsoleReport::NAME_EMOJI)?;
        w.scope(|w| {
            let method = config.request.method.as_deref().cloned().unwrap_or_default();
            writeln!(w, "{} {} {}", ScenarioConsoleReport::TARGET_EMOJI, method, *config.target)?;
            writeln!(
                w,
                "{} vus: {}    duration: {}    elapsed: {:.2?}",
                ScenarioConsoleReport::VUS_EMOJI,
                config.options.vus(),
                duration::format(&config.options.duration()),
                self.elapsed(),
            )?;

            for check in &aggregate.checks {
                console_check(w, check)?;
            }

            let (iterations, interrupted) = (aggregate.iterations.aggregate(), aggregate.interrupted.aggregate());
            writeln!(
                w,
                "{} iterations: {} ({:.2} iter/s)    interrupted: {}",
                ScenarioConsoleReport::ITERATION_EMOJI,
                iterations,
                self.iteration_rate(),
                style_classified(&Classified::count(interrupted)).apply_to(interrupted),
            )?;

            let ResponseSummary { count, failed, bytes } = aggregate.response.aggregate();
            writeln!(
                w,
                "{} requests: {} ({:.2} req/s)    failed: {}    received: {} bytes",
                ScenarioConsoleReport::REQUEST_EMOJI,
                count,
                rate(count, self.elapsed()),
                style_classified(&Classified::count(failed)).apply_to(failed),
                bytes,
            )?;

            write!(w, "{} latency: ", ScenarioConsoleReport::LATENCY_EMOJI)?;
            if aggregate.response.latency.is_empty() {
                writeln!(w, "{}", console::style("no response").dim())?;
            } else {
                let LatencySummary { min, mean, percentiles, max } = aggregate.response.latency.summary(&percentile_set);
                write!(w, "min={:.3?} mean={:.3?} ", apply_style_classified(&min), apply_style_classified(&mean))?;
                for (p, latency) in &percentiles {
                    write!(w, "p{}={:.3?} ", p, apply_style_classified(latency))?;
                }
                writeln!(w, "max={:.3?}", apply_style_classified(&max))?;
            }
            Ok::<_, std::fmt::Error>(())
        })?;
        Ok(())
    }
}

fn console_check<W: std::io::Write>(w: &mut ReportWriter<W>, check: &CheckAggregate) -> std::fmt::Result {
    let summary @ PassSummary { pass, count, pass_rate } = check.pass.aggregate();
    let passed = pass == count;
    let side = if passed { ScenarioConsoleReport::PASS_EMOJI } else { ScenarioConsoleReport::FAIL_EMOJI };
    let name = console::style(&check.name);
    let style = style_classified(&Classified::pass_rate(&summary));
    writeln!(
        w,
        "{} {}: {}/{}={}{}",
        side,
        if passed { name.green() } else { name.red() },
        pass,
        count,
        style.apply_to(format!("{:.2}", pass_rate * 100.)),
        style.apply_to("%"),
    )?;
    if !check.messages.is_empty() {
        w.scope(|w| writeln!(w, "{} {}", ScenarioConsoleReport::MESSAGE_EMOJI, console::style(&check.messages).dim()))?;
    }
    Ok(())
}
