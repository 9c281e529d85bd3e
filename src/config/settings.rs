use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;
use url::Url;

use crate::window::WindowGenerator;

/// Default pause between the end of one submission and the next tick.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(20);
/// New Relic's metric API rejects slow clients; its client used a 3s budget.
pub const DEFAULT_NEWRELIC_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_DATADOG_SITE: &str = "us5.datadoghq.com";
pub const DEFAULT_NEWRELIC_URL: &str = "https://metric-api.newrelic.com";

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Datadog,
    #[value(name = "newrelic", alias = "new-relic")]
    #[serde(alias = "new-relic")]
    NewRelic,
}

/// How query windows are shared between the subqueries of one tick.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WindowMode {
    /// Every subquery computes its own window from the current time.
    #[default]
    PerQuery,
    /// One window is computed at the start of the tick and shared.
    PerTick,
}

/// Fully resolved, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub polling: PollingConfig,
}

/// Client certificate and PKCS#8 private key, both PEM encoded.
#[derive(Clone)]
pub struct ClientIdentity {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Account host; the client resolves its endpoints below
    /// `prometheus/api/v1/`.
    pub base_url: Url,
    pub identity: Option<ClientIdentity>,
    pub server_ca_pem: Option<Vec<u8>>,
    pub insecure_skip_verify: bool,
    pub request_timeout: Option<Duration>,
    pub step_secs: i64,
}

#[derive(Debug, Clone)]
pub enum SinkConfig {
    Datadog(DatadogConfig),
    NewRelic(NewRelicConfig),
}

#[derive(Clone)]
pub struct DatadogConfig {
    pub api_url: Url,
    pub api_key: String,
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for DatadogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct NewRelicConfig {
    pub base_url: Url,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for NewRelicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRelicConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub window: WindowGenerator,
    pub window_mode: WindowMode,
    pub pause: Duration,
    /// Prepended to every target metric id, e.g. to keep test traffic apart
    /// from production series.
    pub metric_prefix: String,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            window: WindowGenerator::default(),
            window_mode: WindowMode::default(),
            pause: DEFAULT_PAUSE,
            metric_prefix: String::new(),
        }
    }
}
