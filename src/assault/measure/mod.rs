pub mod aggregate;
pub mod metrics;
pub mod threshold;
