use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::BridgeArgs;
use crate::error::ConfigError;

use super::parse::parse_duration_value;
use super::types::ConfigFile;

/// Fills every option that was not given on the command line or through the
/// environment from the config file.
///
/// # Errors
///
/// Returns an error when a duration in the config file does not parse.
pub fn apply_config(
    args: &mut BridgeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_explicit(matches, "source_url")
        && let Some(url) = config.source_url.clone()
    {
        args.source_url = Some(url);
    }

    if !is_explicit(matches, "server_ca_cert")
        && let Some(path) = config.server_ca_cert.clone()
    {
        args.server_ca_cert = Some(path);
    }

    if !is_explicit(matches, "insecure_skip_verify")
        && let Some(insecure) = config.insecure_skip_verify
    {
        args.insecure_skip_verify = insecure;
    }

    if !is_explicit(matches, "metric_prefix")
        && let Some(prefix) = config.metric_prefix.clone()
    {
        args.metric_prefix = Some(prefix);
    }

    if !is_explicit(matches, "sink")
        && let Some(sink) = config.sink
    {
        args.sink = Some(sink);
    }

    if !is_explicit(matches, "datadog_site")
        && let Some(site) = config.datadog_site.clone()
    {
        args.datadog_site = Some(site);
    }

    if !is_explicit(matches, "newrelic_url")
        && let Some(url) = config.newrelic_url.clone()
    {
        args.newrelic_url = Some(url);
    }

    if !is_explicit(matches, "window_mode")
        && let Some(mode) = config.window_mode
    {
        args.window_mode = Some(mode);
    }

    apply_duration(
        matches,
        "lookback",
        config.lookback.as_deref(),
        &mut args.lookback,
    )?;
    apply_duration(matches, "step", config.step.as_deref(), &mut args.step)?;
    apply_duration(matches, "pause", config.pause.as_deref(), &mut args.pause)?;
    apply_duration(
        matches,
        "request_timeout",
        config.request_timeout.as_deref(),
        &mut args.request_timeout,
    )?;

    Ok(())
}

fn apply_duration(
    matches: &ArgMatches,
    field: &'static str,
    value: Option<&str>,
    target: &mut Option<Duration>,
) -> Result<(), ConfigError> {
    if is_explicit(matches, field) {
        return Ok(());
    }
    if let Some(value) = value {
        let parsed = parse_duration_value(value)
            .map_err(|message| ConfigError::InvalidDuration { field, message })?;
        *target = Some(parsed);
    }
    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
