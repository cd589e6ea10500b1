#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    pub bind: String,
}
impl Default for Env {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}
impl Env {
    pub const BIND: &'static str = "BIND";

    /// Values from environment variables, falling back to `default`.
    pub fn environment(default: Self) -> Self {
        Self { bind: std::env::var(Self::BIND).unwrap_or(default.bind) }
    }
}
