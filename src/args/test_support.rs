use clap::{ArgMatches, Command, CommandFactory, FromArgMatches};

use super::BridgeArgs;

/// The bridge command with every `env` fallback removed, so parsing only sees
/// `argv`.
pub(crate) fn command_without_env() -> Command {
    BridgeArgs::command().mut_args(|arg| arg.env(None::<&'static str>))
}

pub(crate) fn parse_isolated(argv: &[&str]) -> Result<(BridgeArgs, ArgMatches), String> {
    let matches = command_without_env()
        .try_get_matches_from(std::iter::once("promql-bridge").chain(argv.iter().copied()))
        .map_err(|err| format!("parse failed: {}", err))?;
    let args = BridgeArgs::from_arg_matches(&matches).map_err(|err| err.to_string())?;
    Ok((args, matches))
}
