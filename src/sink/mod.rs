//! Vendor ingestion sinks for target point series.
mod datadog;
mod newrelic;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::config::SinkConfig;
use crate::error::{AppError, AppResult, TransportError};
use crate::transform::PointSeries;

pub use datadog::{DATADOG_API_KEY_HEADER, DatadogSink, TAG_VALUE_MAX_CHARS};
pub use newrelic::{NEWRELIC_API_KEY_HEADER, NewRelicSink};

/// Write side of the bridge. One call submits a whole tick.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Vendor name used in log records and errors.
    fn name(&self) -> &'static str;

    /// Encodes `batch` in the vendor's wire format and submits it in one
    /// request, so a batch is either accepted whole or not at all.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the request fails, the vendor responds
    /// with a non-2xx status, or the vendor reports rejected series.
    async fn submit(&self, batch: &[PointSeries]) -> AppResult<()>;
}

#[async_trait]
impl<T> Sink for Box<T>
where
    T: Sink + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn submit(&self, batch: &[PointSeries]) -> AppResult<()> {
        (**self).submit(batch).await
    }
}

/// Builds the sink selected by the configuration.
///
/// # Errors
///
/// Returns an error when the API key is not a valid header value or the HTTP
/// client cannot be built.
pub fn build_sink(config: &SinkConfig) -> AppResult<Box<dyn Sink>> {
    Ok(match config {
        SinkConfig::Datadog(settings) => Box::new(DatadogSink::new(settings)?),
        SinkConfig::NewRelic(settings) => Box::new(NewRelicSink::new(settings)?),
    })
}

fn build_client(headers: HeaderMap, timeout: Option<Duration>) -> AppResult<Client> {
    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| AppError::transport(TransportError::BuildClientFailed { source: err }))
}
