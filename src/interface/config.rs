#[cfg(feature = "toml")]
use std::fs::read_to_string;
#[cfg(any(feature = "json", feature = "yaml"))]
use std::fs::File;
use std::{num::NonZeroUsize, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{assault::check::Check, error::ConfigError, implement::service_http::factory::HttpRequest};

use super::helper::{coalesce::Coalesce, duration, http_serde_priv, is_default::IsDefault};

/// One scenario: who hits which target, how hard, and what counts as success.
/// ```yaml
/// name: get products
/// target: http://localhost:3000/api/products
/// options:
///   vus: 100
///   duration: 15s
/// checks:
///   - name: status was 200
///     status: 200
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub name: Option<String>,
    pub target: http_serde_priv::Uri,
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub request: HttpRequest,
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub options: Options,
    #[serde(default = "Check::default_checks")]
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Options {
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub vus: Option<NonZeroUsize>,
    #[serde(default, skip_serializing_if = "IsDefault::is_default", with = "duration::option")]
    pub duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "IsDefault::is_default", with = "duration::option")]
    pub pause: Option<Duration>,
    #[serde(default, skip_serializing_if = "IsDefault::is_default", with = "duration::option")]
    pub timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "IsDefault::is_default", with = "duration::option")]
    pub graceful_stop: Option<Duration>,
}
impl Options {
    pub const DEFAULT_VUS: NonZeroUsize = NonZeroUsize::MIN;
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(10);
    pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

    pub fn vus(&self) -> NonZeroUsize {
        self.vus.unwrap_or(Self::DEFAULT_VUS)
    }
    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or(Self::DEFAULT_DURATION)
    }
    pub fn pause(&self) -> Duration {
        self.pause.unwrap_or(Self::DEFAULT_PAUSE)
    }
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT)
    }
    pub fn graceful_stop(&self) -> Duration {
        self.graceful_stop.unwrap_or(Self::DEFAULT_GRACEFUL_STOP)
    }
}
impl Coalesce for Options {
    fn coalesce(self, other: &Self) -> Self {
        Self {
            vus: self.vus.coalesce(&other.vus),
            duration: self.duration.coalesce(&other.duration),
            pause: self.pause.coalesce(&other.pause),
            timeout: self.timeout.coalesce(&other.timeout),
            graceful_stop: self.graceful_stop.coalesce(&other.graceful_stop),
        }
    }
}

impl Config {
    pub fn new<U: Into<http_serde_priv::Uri>>(target: U, options: Options) -> Self {
        Self {
            name: None,
            target: target.into(),
            request: Default::default(),
            options,
            checks: Check::default_checks(),
        }
    }

    /// Deserialize only. Call [`Config::validate`] once command line overrides are applied.
    pub fn read<A: AsRef<Path>>(path: A) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Format::from_path(path)
            .and_then(|format| format.deserialize_config(path))
            .map_err(|e| e.context(path.display()))?;
        tracing::debug!("read scenario {} from {}", config.name(), path.display());
        Ok(config)
    }
    pub fn read_str(s: &str, format: Format) -> Result<Self, ConfigError> {
        format.deserialize_config_str(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.scheme().is_none() || self.target.authority().is_none() {
            Err(ConfigError::RelativeTarget(self.target.to_string()))
        } else if self.options.duration().is_zero() {
            Err(ConfigError::ZeroDuration)
        } else {
            Ok(())
        }
    }

    /// Label in the report, the target when no name is given.
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.target.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[cfg(feature = "json")]
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}
impl Format {
    pub fn from_path<A: AsRef<Path>>(path: A) -> Result<Self, ConfigError> {
        let extension = path.as_ref().extension().and_then(|ext| ext.to_str());
        match extension {
            #[cfg(feature = "json")]
            Some("json") => Ok(Format::Json),
            #[cfg(feature = "yaml")]
            Some("yaml" | "yml") => Ok(Format::Yaml),
            #[cfg(feature = "toml")]
            Some("toml") => Ok(Format::Toml),
            Some(ext) => Err(ConfigError::UnknownFormatExtension(ext.to_string())),
            None => Err(ConfigError::CannotSpecifyFormat),
        }
    }

    pub fn deserialize_config<A: AsRef<Path>>(&self, path: A) -> Result<Config, ConfigError> {
        match self {
            #[cfg(feature = "json")]
            Format::Json => Ok(serde_json::from_reader(File::open(path)?)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml::from_reader(File::open(path)?)?),
            #[cfg(feature = "toml")]
            Format::Toml => Ok(toml::from_str(&read_to_string(path)?)?),
            #[cfg(not(any(feature = "json", feature = "yaml", feature = "toml")))]
            _ => Err(ConfigError::UndefinedSerializeFormat(path.as_ref().display().to_string())),
        }
    }

    pub fn deserialize_config_str(&self, content: &str) -> Result<Config, ConfigError> {
        match self {
            #[cfg(feature = "json")]
            Format::Json => Ok(serde_json::from_str(content)?),
            #[cfg(feature = "yaml")]
            Format::Yaml => Ok(serde_yaml::from_str(content)?),
            #[cfg(feature = "toml")]
            Format::Toml => Ok(toml::from_str(content)?),
            #[cfg(not(any(feature = "json", feature = "yaml", feature = "toml")))]
            _ => Err(ConfigError::UndefinedSerializeFormat(content.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::assault::check::Predicate;

    use super::*;

    #[test]
    fn test_options_default() {
        let options = Options::default();
        assert_eq!(options.vus().get(), 1);
        assert_eq!(options.duration(), Duration::from_secs(10));
        assert_eq!(options.pause(), Duration::from_secs(1));
        assert_eq!(options.timeout(), Duration::from_secs(60));
        assert_eq!(options.graceful_stop(), Duration::from_secs(30));
    }

    #[test]
    fn test_options_coalesce() {
        let cli = Options { vus: NonZeroUsize::new(5), ..Default::default() };
        let file = Options {
            vus: NonZeroUsize::new(100),
            duration: Some(Duration::from_secs(15)),
            ..Default::default()
        };
        let options = cli.coalesce(&file);
        assert_eq!(options.vus().get(), 5);
        assert_eq!(options.duration(), Duration::from_secs(15));
        assert_eq!(options.pause(), Options::DEFAULT_PAUSE);
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_read_yaml() {
        let config = Config::read_str(
            indoc::indoc! {"
                target: http://localhost:3000/api/products
                options:
                  vus: 100
                  duration: 15s
            "},
            Format::Yaml,
        )
        .unwrap();
        assert_eq!(config.name(), "http://localhost:3000/api/products");
        assert_eq!(config.options.vus().get(), 100);
        assert_eq!(config.options.duration(), Duration::from_secs(15));
        assert_eq!(config.checks, vec![Check::status_was_200()]);
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_explicit_empty_checks() {
        let config = Config::read_str("target: http://localhost/\nchecks: []\n", Format::Yaml).unwrap();
        assert!(config.checks.is_empty());
    }

    #[test]
    #[cfg(feature = "yaml")]
    fn test_reject_invalid() {
        let relative = Config::read_str("target: /api/products\n", Format::Yaml).unwrap().validate().unwrap_err();
        assert!(matches!(relative, ConfigError::RelativeTarget(ref t) if t == "/api/products"));

        let zero = Config::read_str("target: http://localhost/\noptions:\n  duration: 0s\n", Format::Yaml).unwrap();
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroDuration)));

        let zero_vus = Config::read_str("target: http://localhost/\noptions:\n  vus: 0\n", Format::Yaml);
        assert!(matches!(zero_vus, Err(ConfigError::YamlError(_))));

        let unknown = Config::read_str("target: http://localhost/\nunknown: 1\n", Format::Yaml);
        assert!(matches!(unknown, Err(ConfigError::YamlError(_))));
    }

    #[test]
    #[cfg(feature = "toml")]
    fn test_read_toml() {
        let config = Config::read_str(
            indoc::indoc! {r#"
                name = "slow endpoint"
                target = "http://localhost:3000/wait/100/ms"

                [request]
                method = "HEAD"

                [options]
                pause = "500ms"

                [[checks]]
                name = "fast enough"
                max-latency = "1s"
            "#},
            Format::Toml,
        )
        .unwrap();
        assert_eq!(config.name(), "slow endpoint");
        assert_eq!(config.request.method.as_deref(), Some(&http::Method::HEAD));
        assert_eq!(config.options.pause(), Duration::from_millis(500));
        assert_eq!(config.checks, vec![Check::new("fast enough", Predicate::MaxLatency(Duration::from_secs(1)))]);
    }

    #[test]
    fn test_format_from_path() {
        assert!(matches!(Format::from_path("scenario.ini"), Err(ConfigError::UnknownFormatExtension(ref e)) if e == "ini"));
        assert!(matches!(Format::from_path("scenario"), Err(ConfigError::CannotSpecifyFormat)));
        #[cfg(feature = "yaml")]
        assert_eq!(Format::from_path("scenario.yml").unwrap(), Format::Yaml);
    }

    #[test]
    fn test_read_missing_file_has_path_context() {
        let err = Config::read("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().starts_with("[does/not/exist.yaml]"));
    }
}
