//! Core library for the `promql-bridge` binary.
//!
//! The bridge discovers counter and histogram metrics on a Prometheus-compatible
//! range-query API, derives per-minute rates and latency quantiles from them,
//! and republishes the results to a vendor ingestion API. The pieces are
//! usable on their own: [`source::MetricSource`] and [`sink::Sink`] are the
//! seams, and [`scheduler::PollScheduler`] ties them together.
pub mod args;
pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod logger;
pub mod scheduler;
pub mod shutdown;
pub mod sink;
pub mod source;
pub mod transform;
pub mod window;

mod transport;

#[cfg(test)]
mod test_support;
