//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::BridgeArgs;
