use clap::Parser;
use std::time::Duration;

use crate::config::{SinkKind, WindowMode};

use super::parsers::{parse_bool_env, parse_duration_arg};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Polls a Prometheus-compatible API for counter and histogram metrics and republishes per-minute rates and latency quantiles to Datadog or New Relic."
)]
pub struct BridgeArgs {
    /// Path to a TOML or JSON config file (defaults to ./promql-bridge.toml or ./promql-bridge.json)
    #[arg(long, short = 'c', env = "BRIDGE_CONFIG")]
    pub config: Option<String>,

    /// Account metrics endpoint, e.g. https://<account>.tmprl.cloud (the API lives under /prometheus/api/v1)
    #[arg(long = "source-url", env = "TEMPORAL_CLOUD_BASE_URL")]
    pub source_url: Option<String>,

    /// Base64-encoded PEM client certificate for the source API
    #[arg(long = "client-cert", env = "TEMPORAL_OBSERVABILITY_CERT", hide_env_values = true)]
    pub client_cert: Option<String>,

    /// Base64-encoded PEM (PKCS#8) client key for the source API
    #[arg(long = "client-key", env = "TEMPORAL_OBSERVABILITY_KEY", hide_env_values = true)]
    pub client_key: Option<String>,

    /// Path to an extra PEM root CA used to verify the source API
    #[arg(long = "server-ca-cert", env = "TEMPORAL_SERVER_CA_CERT")]
    pub server_ca_cert: Option<String>,

    /// Skip verification of the source API certificate and host name
    #[arg(
        long = "insecure-skip-verify",
        env = "TEMPORAL_INSECURE_SKIP_VERIFY",
        value_parser = parse_bool_env
    )]
    pub insecure_skip_verify: bool,

    /// Prefix prepended to every published metric name (keeps test traffic apart)
    #[arg(long = "metric-prefix", env = "TEST_METRIC_PREFIX")]
    pub metric_prefix: Option<String>,

    /// Ingestion API to publish to
    #[arg(long = "sink", env = "BRIDGE_SINK", value_enum)]
    pub sink: Option<SinkKind>,

    /// Datadog API key
    #[arg(long = "datadog-api-key", env = "DD_API_KEY", hide_env_values = true)]
    pub datadog_api_key: Option<String>,

    /// Datadog site (the API host is api.<site>)
    #[arg(long = "datadog-site", env = "DD_SITE")]
    pub datadog_site: Option<String>,

    /// New Relic license/insert key
    #[arg(long = "newrelic-api-key", env = "NEW_RELIC_API_KEY", hide_env_values = true)]
    pub newrelic_api_key: Option<String>,

    /// New Relic metric API base URL
    #[arg(long = "newrelic-url", env = "NEW_RELIC_METRIC_URL")]
    pub newrelic_url: Option<String>,

    /// How far back each range query reaches (supports ms/s/m/h)
    #[arg(long = "lookback", env = "BRIDGE_LOOKBACK", value_parser = parse_duration_arg)]
    pub lookback: Option<Duration>,

    /// Range query resolution (supports ms/s/m/h)
    #[arg(long = "step", env = "BRIDGE_STEP", value_parser = parse_duration_arg)]
    pub step: Option<Duration>,

    /// Pause after each submission before the next tick (supports ms/s/m/h)
    #[arg(long = "pause", env = "BRIDGE_PAUSE", value_parser = parse_duration_arg)]
    pub pause: Option<Duration>,

    /// Per-request timeout for outbound HTTP calls (supports ms/s/m/h)
    #[arg(long = "request-timeout", env = "BRIDGE_REQUEST_TIMEOUT", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Whether subqueries compute their own window or share one per tick
    #[arg(long = "window-mode", env = "BRIDGE_WINDOW_MODE", value_enum)]
    pub window_mode: Option<WindowMode>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Emit log records as JSON lines
    #[arg(long = "log-json", env = "BRIDGE_LOG_JSON", value_parser = parse_bool_env)]
    pub log_json: bool,
}
