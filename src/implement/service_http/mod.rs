#[cfg(feature = "default-http-client")]
pub mod client;
pub mod factory;
