use std::{io::Write, num::NonZeroUsize, path::PathBuf, process::ExitCode, time::Duration};

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
use http_body::Body;
use tower::Service;

#[cfg(feature = "default-http-client")]
use crate::implement::service_http::client::DefaultHttpClient;
#[cfg(feature = "console-report")]
use crate::{assault::reportable::ReportWriter, interface::report::console::ConsoleReport};
#[cfg(feature = "json")]
use crate::interface::report::json::JsonReport;
use crate::{
    assault::{
        factory::RequestFactory,
        reportable::{Report, Reportable},
        shutdown::Shutdown,
        worker::Control,
    },
    error::{BoxError, ConfigError, InterfaceError, StampedeResult},
    implement::service_http::factory::HttpRequest,
};

#[cfg(feature = "cli")]
use super::helper::duration;
use super::{
    config::{Config, Options},
    helper::coalesce::Coalesce,
};

/// Parse arguments, run every scenario and print the report.
/// Exits with `2` when the run cannot start.
#[cfg(feature = "cli")]
pub async fn execute() -> ExitCode {
    let cmd = Stampede::parse();
    cmd.init_tracing();
    match cmd.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(Stampede::ERROR_EXIT_CODE)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", clap(version, about, arg_required_else_help = true))]
pub struct Stampede {
    /// scenario files, run one after another
    #[cfg_attr(feature = "cli", arg(short, long, num_args=0.., value_delimiter = ' '))]
    pub file: Vec<PathBuf>,

    /// override target, or run a default scenario against it when no file is given
    #[cfg_attr(feature = "cli", arg(short, long))]
    pub target: Option<http::Uri>,

    /// override number of virtual users
    #[cfg_attr(feature = "cli", arg(short = 'u', long))]
    pub vus: Option<NonZeroUsize>,

    /// override duration, such as `15s` or `1m30s`
    #[cfg_attr(feature = "cli", arg(short, long, value_parser = duration::parse))]
    pub duration: Option<Duration>,

    /// override pause after each iteration
    #[cfg_attr(feature = "cli", arg(long, value_parser = duration::parse))]
    pub pause: Option<Duration>,

    /// override timeout of each request
    #[cfg_attr(feature = "cli", arg(long, value_parser = duration::parse))]
    pub timeout: Option<Duration>,

    /// exit with failure when any check failed
    #[cfg_attr(feature = "cli", arg(long))]
    pub strict: bool,

    /// without colorize output
    #[cfg_attr(feature = "cli", arg(long))]
    pub no_color: bool,

    /// format of report
    #[cfg_attr(feature = "cli", arg(short, long), clap(value_enum, default_value_t))]
    pub report_format: ReportFormat,

    /// percentiles of latency to report
    #[cfg_attr(feature = "cli", arg(short, long, num_args=0.., value_delimiter = ' '))]
    pub percentile: Option<Vec<f64>>,
}
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum ReportFormat {
    /// without report
    #[cfg_attr(not(feature = "console-report"), default)]
    NullDevice,

    /// report to console
    #[cfg(feature = "console-report")]
    #[cfg_attr(feature = "console-report", default)]
    Console,

    /// report as json
    #[cfg(feature = "json")]
    Json,
}

impl Stampede {
    pub const ERROR_EXIT_CODE: u8 = 2;
    pub const DEFAULT_PERCENTILES: [f64; 4] = [50., 90., 95., 99.];
    pub const DEFAULT_LOG_FILTER: &'static str = "warn";

    /// Logs go to stderr, so stdout only has the report.
    #[cfg(feature = "cli")]
    pub fn init_tracing(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Self::DEFAULT_LOG_FILTER));
        let subscriber =
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_ansi(!self.no_color);
        if let Err(e) = subscriber.try_init() {
            eprintln!("cannot initialize logger: {}", e);
        }
    }

    #[cfg(feature = "default-http-client")]
    pub async fn run(&self) -> StampedeResult<ExitCode> {
        self.percentile_set()?;
        let report = self.assault().await?;
        self.report(&report)?;
        Ok(self.exit_code(&report))
    }

    pub fn percentile_set(&self) -> Result<Vec<f64>, InterfaceError> {
        let mut v = self.percentile.clone().unwrap_or_else(|| Self::DEFAULT_PERCENTILES.to_vec());
        if v.iter().any(|p| p.is_nan()) {
            return Err(InterfaceError::NanPercentile);
        }
        if let Some(p) = v.iter().find(|p| !(0. ..=100.).contains(*p)) {
            return Err(InterfaceError::PercentileOutOfRange(*p));
        }
        v.sort_by(f64::total_cmp);
        v.dedup();
        Ok(v)
    }

    /// Options given by flags, which take precedence over scenario files.
    pub fn options(&self) -> Options {
        let Self { vus, duration, pause, timeout, .. } = self;
        Options { vus: *vus, duration: *duration, pause: *pause, timeout: *timeout, graceful_stop: None }
    }

    /// Scenarios with flags applied. Validated after the overrides, so a flag can fix a file value.
    pub fn configs(&self) -> StampedeResult<Vec<Config>> {
        let Self { file, target, .. } = self;
        let configs = match (file.is_empty(), target) {
            (true, Some(target)) => vec![(None, Config::new(target.clone(), Options::default()))],
            (true, None) => Err(InterfaceError::NoScenario)?,
            (false, _) => file
                .iter()
                .map(|path| Ok((Some(path), Config::read(path)?)))
                .collect::<Result<Vec<_>, ConfigError>>()?,
        };

        let options = self.options();
        configs
            .into_iter()
            .map(|(path, mut config)| {
                if let Some(target) = target {
                    config.target = target.clone().into();
                }
                config.options = options.clone().coalesce(&config.options);
                config.validate().map_err(|e| match path {
                    Some(path) => e.context(path.display()),
                    None => e,
                })?;
                Ok(config)
            })
            .collect()
    }

    #[cfg(feature = "default-http-client")]
    pub async fn assault(&self) -> StampedeResult<Report> {
        let configs = self.configs()?;
        let client = DefaultHttpClient::<bytes::Bytes, reqwest::Body>::new()?;
        let interrupt = Shutdown::new();
        let ctrl_c = interrupt.listen_ctrl_c();
        let report = self.assault_with_interrupt(configs, client, interrupt).await;
        ctrl_c.abort();
        report
    }
    pub async fn assault_with<S, Req, B>(&self, configs: Vec<Config>, service: S) -> StampedeResult<Report>
    where
        S: Service<Req, Response = http::Response<B>> + Clone + Send + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send + 'static,
        Req: Send + 'static,
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
        HttpRequest: RequestFactory<Req>,
        <HttpRequest as RequestFactory<Req>>::Error: Into<BoxError>,
    {
        self.assault_with_interrupt(configs, service, Shutdown::new()).await
    }
    pub async fn assault_with_interrupt<S, Req, B>(
        &self,
        configs: Vec<Config>,
        service: S,
        interrupt: Shutdown,
    ) -> StampedeResult<Report>
    where
        S: Service<Req, Response = http::Response<B>> + Clone + Send + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send + 'static,
        Req: Send + 'static,
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
        HttpRequest: RequestFactory<Req>,
        <HttpRequest as RequestFactory<Req>>::Error: Into<BoxError>,
    {
        Control::with_interrupt(service, interrupt).assault(configs).await
    }

    pub fn report(&self, report: &Report) -> StampedeResult<()> {
        self.report_with(report, std::io::stdout())
    }
    pub fn report_with<W: Write>(&self, report: &Report, mut write: W) -> StampedeResult<()> {
        #[cfg(feature = "console-report")]
        console::set_colors_enabled(!self.no_color);

        match self.report_format {
            ReportFormat::NullDevice => (),
            #[cfg(feature = "console-report")]
            ReportFormat::Console => report.console_report(self, &mut ReportWriter::new(0, &mut write))?,
            #[cfg(feature = "json")]
            ReportFormat::Json => report.json_report(self, &mut write)?,
        };
        write.flush()?;
        Ok(())
    }

    pub fn pass(&self, report: &Report) -> bool {
        report.pass()
    }
    pub fn allow(&self, report: &Report) -> bool {
        report.allow(self.strict)
    }
    pub fn exit_code(&self, report: &Report) -> ExitCode {
        report.exit_code(self.strict)
    }
}
