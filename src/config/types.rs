use serde::Deserialize;

use super::settings::{SinkKind, WindowMode};

/// On-disk configuration. Every field is optional; values set on the command
/// line or through the environment take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source_url: Option<String>,
    pub server_ca_cert: Option<String>,
    pub insecure_skip_verify: Option<bool>,
    pub metric_prefix: Option<String>,
    pub sink: Option<SinkKind>,
    pub datadog_site: Option<String>,
    pub newrelic_url: Option<String>,
    pub lookback: Option<String>,
    pub step: Option<String>,
    pub pause: Option<String>,
    pub request_timeout: Option<String>,
    pub window_mode: Option<WindowMode>,
}
