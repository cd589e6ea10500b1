//! Stampede runs virtual-user HTTP load tests described by declarative scenario files.
//!
//! A scenario names one target, how many virtual users hit it and for how long, and the checks every response
//! should pass. Each virtual user repeats request, check and pause until the duration elapses, and their results
//! are aggregated into one report.
//!
//! ```yaml
//! name: get products
//! target: http://localhost:3000/api/products
//! options:
//!   vus: 100
//!   duration: 15s
//!   pause: 1s
//! checks:
//!   - name: status was 200
//!     status: 200
//! ```
//!
//! # Usage
//! ```sh
//! stampede --file scenarios/get_products.yaml
//! stampede --target http://localhost:3000/api/products --vus 100 --duration 15s
//! ```
//!
//! Any [`tower::Service`] that takes [`http::Request`] and returns [`http::Response`] can be the client, e.g. an
//! in-process axum router.
//! ```
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! use std::time::Duration;
//!
//! use stampede::interface::{command::Stampede, config::{Config, Options}};
//!
//! let options = Options { duration: Some(Duration::from_secs(3)), ..Default::default() };
//! let config = Config::new("http://localhost/".parse::<http::Uri>().unwrap(), options);
//! let router = stampede_dev_server_http::route::app_with(Default::default());
//!
//! let cmd = Stampede::default();
//! let report = cmd.assault_with::<_, http::Request<axum::body::Body>, _>(vec![config], router).await.unwrap();
//! assert!(cmd.pass(&report));
//! # }
//! ```

pub mod assault;
pub mod error;
pub mod implement;
pub mod interface;

pub use error::{StampedeError as Error, StampedeResult as Result};
