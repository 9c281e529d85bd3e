use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::error::{AppError, AppResult, TransportError};
use crate::transport::{join, send};
use crate::window::QueryWindow;

use super::MetricSource;
use super::decode::{RawMatrix, decode_label_values, decode_matrix};
use super::query::PromQuery;

/// Prometheus-compatible API root below the account host.
const API_ROOT_PATH: &str = "prometheus/api/v1/";
const LABEL_VALUES_PATH: &str = "label/__name__/values";
const QUERY_RANGE_PATH: &str = "query_range";

/// Range-query client for a Prometheus-compatible HTTP API, authenticated with
/// a client certificate.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    client: Client,
    labels_url: Url,
    query_url: Url,
    step: String,
}

impl PrometheusClient {
    /// Builds the mutual-TLS HTTP client and resolves the API endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity or CA certificate is not valid PEM
    /// or the HTTP client cannot be built.
    pub fn new(config: &SourceConfig) -> AppResult<Self> {
        let mut builder = Client::builder();

        if let Some(identity) = config.identity.as_ref() {
            let identity = reqwest::Identity::from_pkcs8_pem(&identity.cert_pem, &identity.key_pem)
                .map_err(|err| AppError::transport(TransportError::InvalidIdentity { source: err }))?;
            builder = builder.identity(identity);
        }

        if let Some(pem) = config.server_ca_pem.as_ref() {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|err| AppError::transport(TransportError::InvalidCaCert { source: err }))?;
            builder = builder.add_root_certificate(cert);
        }

        if config.insecure_skip_verify {
            warn!("Certificate verification for the source API is disabled.");
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| AppError::transport(TransportError::BuildClientFailed { source: err }))?;

        let api_root = join(&config.base_url, API_ROOT_PATH)?;
        Ok(Self {
            client,
            labels_url: join(&api_root, LABEL_VALUES_PATH)?,
            query_url: join(&api_root, QUERY_RANGE_PATH)?,
            step: config.step_secs.to_string(),
        })
    }
}

#[async_trait]
impl MetricSource for PrometheusClient {
    async fn label_values(&self) -> AppResult<Vec<String>> {
        let request = self.client.get(self.labels_url.clone());
        let body = send(request, &self.labels_url).await?;
        Ok(decode_label_values(&body)?)
    }

    async fn query_range(&self, query: &PromQuery, window: QueryWindow) -> AppResult<RawMatrix> {
        let expression = query.expression();
        debug!(
            query = %expression,
            start = window.start(),
            end = window.end(),
            "Issuing range query"
        );
        let request = self.client.get(self.query_url.clone()).query(&[
            ("query", expression.as_str()),
            ("start", window.start().to_string().as_str()),
            ("end", window.end().to_string().as_str()),
            ("step", self.step.as_str()),
            ("format", "json"),
        ]);
        let body = send(request, &self.query_url).await?;
        Ok(decode_matrix(&body)?)
    }
}
