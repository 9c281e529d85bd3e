use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Missing required setting '{name}' (flag {flag} or env {env}).")]
    MissingSetting {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },
    #[error("Invalid base64 in '{name}': {source}")]
    InvalidBase64 {
        name: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' cannot be used as a base URL.")]
    UrlCannotBeBase { url: String },
    #[error("Config '{field}': {message}")]
    InvalidDuration { field: &'static str, message: String },
    #[error("Config '{field}' must be a whole number of seconds >= 1.")]
    WholeSecondsRequired { field: &'static str },
    #[error("Failed to read server CA cert '{path}': {source}")]
    ReadCaCert {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
