use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log output switches resolved from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub verbose: bool,
    pub no_color: bool,
    pub json: bool,
}

/// `BRIDGE_LOG` wins over `RUST_LOG`; without either, `info` (or `debug`
/// when verbose).
fn env_filter(verbose: bool) -> EnvFilter {
    std::env::var("BRIDGE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| default_filter(verbose),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| default_filter(verbose)),
        )
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

pub fn init_logging(options: LogOptions) {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(options.verbose))
        .with_ansi(!options.no_color)
        .with_target(false);

    let installed = if options.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(err) = installed {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
