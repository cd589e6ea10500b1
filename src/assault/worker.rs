use std::{marker::PhantomData, time::Duration};

use bytes::Bytes;
use http_body::Body;
use tokio::{task::JoinSet, time::Instant};
use tower::{timeout::TimeoutLayer, Service, ServiceBuilder, ServiceExt};

use crate::{
    error::{AssaultError, BoxError, RequestError, StampedeResult},
    implement::service_http::factory::HttpRequest,
    interface::config::Config,
};

use super::{
    check::Checks,
    factory::RequestFactory,
    measure::{
        aggregate::{Aggregator, IterationAggregate},
        metrics::{MeasuredResponse, RequestResult},
    },
    reportable::{Report, ScenarioReport},
    service::measure::MeasureLayer,
    shutdown::{Shutdown, ShutdownListener},
};

/// Runs scenarios one after another against a client service.
#[derive(Debug, Clone)]
pub struct Control<S, Req> {
    client: S,
    interrupt: Shutdown,
    phantom: PhantomData<Req>,
}
impl<S, Req, B> Control<S, Req>
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
    pub fn new(client: S) -> Self {
        Self::with_interrupt(client, Shutdown::new())
    }
    /// Virtual users stop early when `interrupt` fires, e.g. on Ctrl-C.
    pub fn with_interrupt(client: S, interrupt: Shutdown) -> Self {
        Self { client, interrupt, phantom: PhantomData }
    }

    pub async fn assault(&self, configs: Vec<Config>) -> StampedeResult<Report> {
        let mut reports = Vec::new();
        for config in configs {
            if self.interrupt.is_shutdown() {
                tracing::warn!("skip scenario {} because of interruption", config.name());
                continue;
            }
            reports.push(self.scenario(config).await?);
        }
        Ok(Report::new(reports))
    }

    pub async fn scenario(&self, config: Config) -> StampedeResult<ScenarioReport> {
        config.validate()?;
        let checks = Checks::compile(&config.checks)?;
        let (vus, duration, graceful_stop) =
            (config.options.vus(), config.options.duration(), config.options.graceful_stop());
        tracing::info!("start {} virtual users against {} for {:?}", vus, *config.target, duration);

        let start = Instant::now();
        let deadline = far_future_add(start, duration);
        let hard_deadline = far_future_add(deadline, graceful_stop);
        let shutdown = Shutdown::new();
        let timer = {
            let (shutdown, mut interrupt) = (shutdown.clone(), self.interrupt.listener());
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {},
                    _ = interrupt.wait() => {},
                }
                tracing::debug!("notify virtual users to stop");
                shutdown.shutdown();
            })
        };

        let mut set = JoinSet::new();
        for id in 0..vus.get() {
            let vu = VirtualUser {
                id,
                client: self.client.clone(),
                request: config.request.clone(),
                target: (*config.target).clone(),
                checks: checks.clone(),
                pause: config.options.pause(),
                timeout: config.options.timeout(),
                shutdown: shutdown.listener(),
                hard_deadline,
                phantom: PhantomData,
            };
            set.spawn(vu.run());
        }

        let mut aggregate = IterationAggregate::new(&checks);
        let mut aborted = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(vu_aggregate) => aggregate.merge(vu_aggregate),
                Err(e) => aborted = aborted.or(Some(e)),
            }
        }
        let elapsed = start.elapsed();
        timer.abort();
        if let Some(e) = aborted {
            return Err(AssaultError::VirtualUserAborted(vus.get(), e).into());
        }

        tracing::info!("finish {} iterations in {:?}", aggregate.iterations.aggregate(), elapsed);
        Ok(ScenarioReport::new(config, aggregate, elapsed))
    }
}

/// Clamped to about 30 years, the bound tokio uses for an endless sleep, so a huge duration never overflows.
fn far_future_add(instant: Instant, duration: Duration) -> Instant {
    const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);
    instant.checked_add(duration.min(FAR_FUTURE)).unwrap_or(instant)
}

/// One simulated client. Repeats request, check and pause until shutdown.
#[derive(Debug)]
pub struct VirtualUser<S, Req> {
    id: usize,
    client: S,
    request: HttpRequest,
    target: http::Uri,
    checks: Checks,
    pause: Duration,
    timeout: Duration,
    shutdown: ShutdownListener,
    hard_deadline: Instant,
    phantom: PhantomData<Req>,
}
impl<S, Req, B> VirtualUser<S, Req>
where
    S: Service<Req, Response = http::Response<B>> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    Req: Send + 'static,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    HttpRequest: RequestFactory<Req>,
    <HttpRequest as RequestFactory<Req>>::Error: Into<BoxError>,
{
    pub async fn run(self) -> IterationAggregate {
        let Self { id, client, request, target, checks, pause, timeout, mut shutdown, hard_deadline, .. } = self;
        tracing::debug!("virtual user {} start", id);

        let mut aggregate = IterationAggregate::new(&checks);
        let mut client = ServiceBuilder::new().layer(MeasureLayer).layer(TimeoutLayer::new(timeout)).service(client);
        while !shutdown.is_shutdown() {
            match tokio::time::timeout_at(hard_deadline, iterate(&mut client, &request, &target)).await {
                Ok(result) => {
                    if let Err(e) = &result {
                        tracing::debug!("virtual user {} request failed: {}", id, e);
                    }
                    aggregate.record(&checks, &result);
                }
                Err(_) => {
                    tracing::warn!("virtual user {} was interrupted after graceful stop", id);
                    aggregate.interrupt();
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(pause) => {},
                _ = shutdown.wait() => {},
            }
        }

        tracing::debug!("virtual user {} stop after {} iterations", id, aggregate.iterations.aggregate());
        aggregate
    }
}

/// Exactly one request per iteration.
async fn iterate<M, F, Req>(client: &mut M, factory: &F, target: &http::Uri) -> RequestResult<http::Response<Bytes>>
where
    M: Service<Req, Response = MeasuredResponse<http::Response<Bytes>>, Error = RequestError>,
    F: RequestFactory<Req>,
    F::Error: Into<BoxError>,
{
    let request = factory.produce(target).map_err(|e| RequestError::FailToMakeRequest(e.into()))?;
    client.ready().await?.call(request).await
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use axum::body::Body as AxumBody;
    use stampede_dev_server_http::{route, state::AppState};

    use crate::{
        assault::{check::Check, reportable::Reportable},
        interface::config::Options,
    };

    use super::*;

    fn config(target: &str, vus: usize, duration: Duration) -> Config {
        let options = Options {
            vus: NonZeroUsize::new(vus),
            duration: Some(duration),
            pause: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        Config::new(target.parse::<http::Uri>().unwrap(), options)
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_request_per_iteration() {
        let state = AppState::default();
        let control: Control<_, http::Request<AxumBody>> = Control::new(route::app_with(state.clone()));
        let report = control.scenario(config("http://localhost/", 2, Duration::from_millis(4500))).await.unwrap();

        let iterations = report.aggregate().iterations.aggregate();
        assert_eq!(iterations, state.requests() as u64);
        assert_eq!(report.aggregate().response.aggregate().count, iterations);
        // every virtual user runs one iteration per second pause
        assert_eq!(iterations, 2 * 5);
        assert!(report.pass());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_after_graceful_stop() {
        let mut config = config("http://localhost/wait/60/s", 1, Duration::from_secs(1));
        config.options.timeout = Some(Duration::from_secs(120));
        config.options.graceful_stop = Some(Duration::from_secs(2));

        let control: Control<_, http::Request<AxumBody>> = Control::new(route::app_with(Default::default()));
        let report = control.scenario(config).await.unwrap();

        let aggregate = report.aggregate();
        assert_eq!(aggregate.iterations.aggregate(), 0);
        assert_eq!(aggregate.interrupted.aggregate(), 1);
        assert_eq!(aggregate.checks[0].pass.count(), 0);
        assert!(report.elapsed() >= Duration::from_secs(3) && report.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_stops_remaining_scenarios() {
        let interrupt = Shutdown::new();
        let control: Control<_, http::Request<AxumBody>> =
            Control::with_interrupt(route::app_with(Default::default()), interrupt.clone());
        interrupt.shutdown();

        let configs = vec![config("http://localhost/", 1, Duration::from_secs(5))];
        let report = control.assault(configs).await.unwrap();
        assert!(report.scenarios().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_checks_always_pass() {
        let mut config = config("http://localhost/status/500", 1, Duration::from_secs(1));
        config.checks = Vec::<Check>::new();
        config.options.pause = Some(Duration::from_millis(100));

        let control: Control<_, http::Request<AxumBody>> = Control::new(route::app_with(Default::default()));
        let report = control.scenario(config).await.unwrap();
        assert!(report.aggregate().checks.is_empty());
        assert!(report.pass());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_duration_runs_until_interrupt() {
        let config = config("http://localhost/", 1, Duration::from_secs(5_000_000_000_000_000 * 3600));
        let interrupt = Shutdown::new();
        let control: Control<_, http::Request<AxumBody>> =
            Control::with_interrupt(route::app_with(Default::default()), interrupt.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            interrupt.shutdown();
        });

        let report = control.scenario(config).await.unwrap();
        assert_eq!(report.aggregate().iterations.aggregate(), 3);
        assert!(report.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_virtual_user_aborts_scenario() {
        let crash = tower::service_fn(|_: http::Request<AxumBody>| async move {
            if true {
                panic!("virtual user crashed");
            }
            Ok::<_, std::convert::Infallible>(http::Response::new(AxumBody::empty()))
        });
        let control: Control<_, http::Request<AxumBody>> = Control::new(crash);
        let err = control.scenario(config("http://localhost/", 2, Duration::from_secs(1))).await.unwrap_err();

        assert!(matches!(err, crate::error::StampedeError::AssaultError(AssaultError::VirtualUserAborted(2, _))));
        assert!(err.to_string().starts_with("one of 2 virtual users was aborted"));
    }
}
