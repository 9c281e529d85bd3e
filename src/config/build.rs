use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::args::BridgeArgs;
use crate::error::ConfigError;
use crate::window::{DEFAULT_LOOKBACK, DEFAULT_STEP, WindowGenerator};

use super::settings::{
    BridgeConfig, ClientIdentity, DEFAULT_DATADOG_SITE, DEFAULT_NEWRELIC_TIMEOUT,
    DEFAULT_NEWRELIC_URL, DEFAULT_PAUSE, DatadogConfig, NewRelicConfig, PollingConfig, SinkConfig,
    SinkKind, SourceConfig,
};

impl BridgeConfig {
    /// Resolves CLI/env/config-file values into the runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a required credential or URL is missing
    /// or malformed, or when the window settings are invalid.
    pub fn from_args(args: &BridgeArgs) -> Result<Self, ConfigError> {
        let window = WindowGenerator::new(
            args.lookback.unwrap_or(DEFAULT_LOOKBACK),
            args.step.unwrap_or(DEFAULT_STEP),
        )?;

        let source = SourceConfig {
            base_url: parse_base_url(require(
                args.source_url.as_deref(),
                "source url",
                "--source-url",
                "TEMPORAL_CLOUD_BASE_URL",
            )?)?,
            identity: Some(resolve_identity(args)?),
            server_ca_pem: read_ca_cert(args.server_ca_cert.as_deref())?,
            insecure_skip_verify: args.insecure_skip_verify,
            request_timeout: args.request_timeout,
            step_secs: window.step_secs(),
        };

        let sink = match args.sink.unwrap_or_default() {
            SinkKind::Datadog => {
                let site = args.datadog_site.as_deref().unwrap_or(DEFAULT_DATADOG_SITE);
                SinkConfig::Datadog(DatadogConfig {
                    api_url: parse_base_url(&format!("https://api.{}", site.trim()))?,
                    api_key: require(
                        args.datadog_api_key.as_deref(),
                        "datadog api key",
                        "--datadog-api-key",
                        "DD_API_KEY",
                    )?
                    .to_owned(),
                    request_timeout: args.request_timeout,
                })
            }
            SinkKind::NewRelic => SinkConfig::NewRelic(NewRelicConfig {
                base_url: parse_base_url(
                    args.newrelic_url.as_deref().unwrap_or(DEFAULT_NEWRELIC_URL),
                )?,
                api_key: require(
                    args.newrelic_api_key.as_deref(),
                    "new relic api key",
                    "--newrelic-api-key",
                    "NEW_RELIC_API_KEY",
                )?
                .to_owned(),
                request_timeout: args.request_timeout.unwrap_or(DEFAULT_NEWRELIC_TIMEOUT),
            }),
        };

        let polling = PollingConfig {
            window,
            window_mode: args.window_mode.unwrap_or_default(),
            pause: args.pause.unwrap_or(DEFAULT_PAUSE),
            metric_prefix: args.metric_prefix.clone().unwrap_or_default(),
        };

        Ok(Self {
            source,
            sink,
            polling,
        })
    }
}

fn require<'value>(
    value: Option<&'value str>,
    name: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<&'value str, ConfigError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingSetting { name, flag, env })
}

fn resolve_identity(args: &BridgeArgs) -> Result<ClientIdentity, ConfigError> {
    let cert = require(
        args.client_cert.as_deref(),
        "client cert",
        "--client-cert",
        "TEMPORAL_OBSERVABILITY_CERT",
    )?;
    let key = require(
        args.client_key.as_deref(),
        "client key",
        "--client-key",
        "TEMPORAL_OBSERVABILITY_KEY",
    )?;
    Ok(ClientIdentity {
        cert_pem: decode_base64(cert, "client cert")?,
        key_pem: decode_base64(key, "client key")?,
    })
}

fn decode_base64(value: &str, name: &'static str) -> Result<Vec<u8>, ConfigError> {
    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|err| ConfigError::InvalidBase64 { name, source: err })
}

fn read_ca_cert(path: Option<&str>) -> Result<Option<Vec<u8>>, ConfigError> {
    path.map(|path| {
        std::fs::read(path).map_err(|err| ConfigError::ReadCaCert {
            path: PathBuf::from(path),
            source: err,
        })
    })
    .transpose()
}

/// Parses a URL and guarantees a trailing slash so relative joins append to
/// its path instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        url: trimmed.to_owned(),
        source: err,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::UrlCannotBeBase {
            url: trimmed.to_owned(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
