use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::args::BridgeArgs;
use crate::config::{BridgeConfig, apply_config, load_config};
use crate::error::{AppError, AppResult};
use crate::logger::{LogOptions, init_logging};
use crate::scheduler::PollScheduler;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};
use crate::sink::build_sink;
use crate::source::PrometheusClient;

/// Parses arguments, resolves configuration, and runs the bridge until a
/// shutdown signal or the first fatal error.
///
/// # Errors
///
/// Returns the configuration, discovery, query, or submission error that
/// stopped the bridge, after logging it as one structured record.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    init_logging(LogOptions {
        verbose: args.verbose,
        no_color: args.no_color,
        json: args.log_json,
    });

    let result = layer_config_file(&mut args, &matches)
        .and_then(|()| BridgeConfig::from_args(&args).map_err(AppError::from))
        .and_then(|config| {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_bridge(config))
        });

    if let Err(err) = result.as_ref() {
        error!(kind = err.kind(), error = %err, "Bridge stopped");
    }
    result
}

fn parse_args() -> AppResult<(BridgeArgs, ArgMatches)> {
    let matches = BridgeArgs::command().get_matches();
    let args = BridgeArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn layer_config_file(args: &mut BridgeArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(args, matches, &config)?;
    }
    Ok(())
}

async fn run_bridge(config: BridgeConfig) -> AppResult<()> {
    let source = PrometheusClient::new(&config.source)?;
    let sink = build_sink(&config.sink)?;
    info!(
        source = %config.source.base_url,
        sink = sink.name(),
        window_mode = ?config.polling.window_mode,
        "Starting bridge"
    );

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut scheduler = PollScheduler::new(source, sink, config.polling);
    let result = scheduler.run(&mut shutdown_rx).await;

    drop(shutdown_tx.send(()));
    signal_handle.await?;
    result
}
