//! Configuration loading, layering, and resolution.
mod apply;
mod build;
mod loader;
mod parse;
mod settings;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use settings::{
    BridgeConfig, ClientIdentity, DEFAULT_DATADOG_SITE, DEFAULT_NEWRELIC_TIMEOUT,
    DEFAULT_NEWRELIC_URL, DEFAULT_PAUSE, DatadogConfig, NewRelicConfig, PollingConfig, SinkConfig,
    SinkKind, SourceConfig, WindowMode,
};

#[cfg(test)]
pub(crate) use loader::load_config_file;
pub(crate) use parse::parse_duration_value;
