//! Range queries against a Prometheus-compatible HTTP API.
mod client;
mod decode;
mod query;


use async_trait::async_trait;

use crate::error::AppResult;
use crate::window::QueryWindow;

pub use client::PrometheusClient;
pub use decode::{Labels, RawMatrix, RawSample, RawSeries, decode_label_values, decode_matrix};
pub use query::{PromQuery, QUANTILE_GROUPING, QUANTILES, Quantile};

/// Read side of the bridge: metric discovery and range queries.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Every known metric name.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the endpoint cannot be reached and a
    /// validation error when the response has an unexpected shape.
    async fn label_values(&self) -> AppResult<Vec<String>>;

    /// Executes `query` over `window` at the configured step.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the endpoint cannot be reached and a
    /// validation error when the response is not a successful matrix.
    async fn query_range(&self, query: &PromQuery, window: QueryWindow) -> AppResult<RawMatrix>;
}
