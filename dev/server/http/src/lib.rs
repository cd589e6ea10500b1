pub mod env;
pub mod route;
pub mod state;

pub async fn serve(env: env::Env) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();
    let listener = tokio::net::TcpListener::bind(&env.bind).await?;
    let app = route::app_with(state::AppState::default());
    tracing::info!("start app on {}", listener.local_addr()?);
    let serve = axum::serve(listener, axum::ServiceExt::<axum::extract::Request>::into_make_service(app))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("cannot listen Ctrl-C: {}", e);
            }
            tracing::info!("stop app");
        });
    Ok(serve.await?)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body, Bytes},
        http::{Request, StatusCode},
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::route;

    pub async fn oneshot_bytes(uri: &str) -> (StatusCode, Bytes) {
        let app = route::app_with(Default::default());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        (res.status(), to_bytes(res.into_body(), usize::MAX).await.unwrap())
    }
    pub async fn oneshot<T: DeserializeOwned>(uri: &str) -> (StatusCode, T) {
        let (status, bytes) = oneshot_bytes(uri).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_call() {
        let (status, body) = oneshot_bytes("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"Hello World");
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let (status, body) = oneshot_bytes("/health/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, _) = oneshot_bytes("/not/found").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
