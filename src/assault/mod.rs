pub mod check;
pub mod factory;
pub mod measure;
pub mod messages;
pub mod reportable;
pub mod service;
pub mod shutdown;
pub mod worker;
