use std::time::Duration;

use axum::{extract::Path, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::state::AppState;

pub fn route_wait() -> Router<AppState> {
    Router::new()
        .route("/{duration}/s", get(|Path(d): Path<u64>| DurationUnit::Seconds.handle(d)))
        .route("/{duration}/ms", get(|Path(d): Path<u64>| DurationUnit::Milliseconds.handle(d)))
        .route("/{duration}/ns", get(|Path(d): Path<u64>| DurationUnit::Nanoseconds.handle(d)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitResponse {
    pub duration: u64,
    pub unit: DurationUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationUnit {
    Seconds,
    Milliseconds,
    Nanoseconds,
}
impl DurationUnit {
    pub async fn handle(self, duration: u64) -> Json<WaitResponse> {
        match self {
            DurationUnit::Seconds => sleep(Duration::from_secs(duration)).await,
            DurationUnit::Milliseconds => sleep(Duration::from_millis(duration)).await,
            DurationUnit::Nanoseconds => sleep(Duration::from_nanos(duration)).await,
        };
        Json(WaitResponse { duration, unit: self })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tokio::time::Instant;

    use crate::tests::oneshot;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_call() {
        let now = Instant::now();
        let (status, body) = oneshot::<WaitResponse>("/wait/500/ms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, WaitResponse { duration: 500, unit: DurationUnit::Milliseconds });
        assert!(now.elapsed() >= Duration::from_millis(500));
    }
}
