use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported config format for {0}, expected .json, .yaml or .yml")]
    UnsupportedFormat(PathBuf),

    #[error("no rounds source configured, provide an api url or a rounds file")]
    MissingSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Where rounds are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Api { url: Url, timeout: Duration },
    File(PathBuf),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base url of the grants API, rounds are read from `{api_url}/rounds`
    #[serde(default)]
    pub api_url: Option<Url>,
    /// JSON export of the rounds, used instead of the API when set
    #[serde(default)]
    pub rounds_file: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Printed above the rounds listing
    #[serde(default)]
    pub intro: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            rounds_file: None,
            timeout_secs: default_timeout_secs(),
            intro: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = Format::from_path(path)?;
        let file = BufReader::new(File::open(path)?);
        Self::from_reader(file, format)
    }

    pub fn from_reader<R: Read>(reader: R, format: Format) -> Result<Self, ConfigError> {
        Ok(match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A rounds file takes precedence over the API.
    pub fn source(&self) -> Result<SourceConfig, ConfigError> {
        match (&self.rounds_file, &self.api_url) {
            (Some(path), _) => Ok(SourceConfig::File(path.clone())),
            (None, Some(url)) => Ok(SourceConfig::Api {
                url: url.clone(),
                timeout: self.timeout(),
            }),
            (None, None) => Err(ConfigError::MissingSource),
        }
    }
}
