#[cfg(feature = "console-report")]
pub mod console;
#[cfg(feature = "json")]
pub mod json;
