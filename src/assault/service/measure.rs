use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Collected};
use tokio::time::Instant;
use tower::{timeout::error::Elapsed, Layer, Service};

use crate::{
    assault::measure::metrics::{MeasuredResponse, RequestResult},
    error::{BoxError, RequestError},
};

/// Measures latency and collects the response body, so latency covers the whole response.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct MeasureLayer;

impl<S> Layer<S> for MeasureLayer {
    type Service = MeasureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MeasureService { inner }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct MeasureService<S> {
    inner: S,
}

impl<S, Req, B> Service<Req> for MeasureService<S>
where
    S: Service<Req, Response = http::Response<B>>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = MeasuredResponse<http::Response<Bytes>>;
    type Error = RequestError;
    type Future = Pin<Box<dyn Future<Output = RequestResult<http::Response<Bytes>>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(|e| RequestError::NoReady(e.into()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let start = Instant::now();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let response = fut.await.map_err(|error| {
                let boxed: BoxError = error.into();
                if boxed.is::<Elapsed>() {
                    RequestError::Timeout(start.elapsed())
                } else {
                    RequestError::InnerServiceError(boxed)
                }
            })?;
            let (parts, body) = response.into_parts();
            let bytes = BodyExt::collect(body)
                .await
                .map(Collected::to_bytes)
                .map_err(|e| RequestError::FailToCollectBody(e.into()))?;
            let latency = start.elapsed();

            let size = bytes.len();
            Ok(MeasuredResponse::new(http::Response::from_parts(parts, bytes), latency, size))
        })
    }
}
