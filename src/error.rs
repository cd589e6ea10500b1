use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type StampedeResult<T, E = StampedeError> = Result<T, E>;

#[derive(Error, Debug)]
pub enum StampedeError {
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    CheckError(#[from] CheckError),
    #[error(transparent)]
    InterfaceError(#[from] InterfaceError),
    #[error(transparent)]
    AssaultError(#[from] AssaultError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FmtError(#[from] std::fmt::Error),
    #[cfg(feature = "default-http-client")]
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[cfg(feature = "json")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    BoxError(#[from] BoxError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("[{path}] {source}")]
    CannotReadConfig { path: String, source: Box<ConfigError> },

    #[error("`{0}` is unknown extension format")]
    UnknownFormatExtension(String),
    #[error("cannot specify format")]
    CannotSpecifyFormat,
    #[error("no serde format is enabled for `{0}`")]
    UndefinedSerializeFormat(String),

    #[error("target `{0}` should be an absolute uri with scheme and authority")]
    RelativeTarget(String),
    #[error("duration should be greater than zero")]
    ZeroDuration,

    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "json")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error(transparent)]
    YamlError(#[from] serde_yaml::Error),
    #[cfg(feature = "toml")]
    #[error(transparent)]
    TomlError(#[from] toml::de::Error),
}
impl ConfigError {
    pub fn context<P: ToString>(self, path: P) -> Self {
        Self::CannotReadConfig { path: path.to_string(), source: Box::new(self) }
    }
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("check `{name}` has invalid regex: {source}")]
    InvalidRegex { name: String, source: regex::Error },
}

#[derive(Error, Debug, PartialEq)]
pub enum InterfaceError {
    #[error("either config files or `--target` should be specified")]
    NoScenario,
    #[error("`{0}` is not a duration like `15s`, `500ms` or `1m30s`")]
    InvalidDuration(String),
    #[error("percentile should be in 0..=100, but `{0}`")]
    PercentileOutOfRange(f64),
    #[error("nan is not number")]
    NanPercentile,
}

#[derive(Error, Debug)]
pub enum AssaultError {
    #[error("one of {0} virtual users was aborted: {1}")]
    VirtualUserAborted(usize, tokio::task::JoinError),
}

/// Failure of a single request. Folded into failing checks, never propagated out of a virtual user.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request timeout: {0:?}")]
    Timeout(Duration),

    #[error("fail to make request: {0}")]
    FailToMakeRequest(BoxError),
    #[error("service is not ready: {0}")]
    NoReady(BoxError),
    #[error("{0}")]
    InnerServiceError(BoxError),
    #[error("fail to collect body: {0}")]
    FailToCollectBody(BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        fn f() -> StampedeResult<()> {
            Err(ConfigError::UnknownFormatExtension("ini".to_string()))?
        }
        let err = f().unwrap_err();
        assert!(matches!(err, StampedeError::ConfigError(ConfigError::UnknownFormatExtension(ref s)) if s == "ini"));
        assert_eq!(err.to_string(), "`ini` is unknown extension format");
    }

    #[test]
    fn test_config_error_context() {
        let err = ConfigError::ZeroDuration.context("scenarios/zero.yaml");
        assert_eq!(err.to_string(), "[scenarios/zero.yaml] duration should be greater than zero");
    }

    #[test]
    fn test_box_error_conversion() {
        fn f() -> StampedeResult<()> {
            let boxed: BoxError = std::io::Error::other("test").into();
            Err(boxed)?
        }
        let err = f().unwrap_err();
        assert!(matches!(err, StampedeError::BoxError(_)));
    }
}
