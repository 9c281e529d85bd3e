use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid client cert/key: {source}")]
    InvalidIdentity {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid server CA cert: {source}")]
    InvalidCaCert {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header value for '{header}': {source}")]
    InvalidHeaderValue {
        header: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to join URL '{base}' with '{path}': {source}")]
    JoinUrlFailed {
        base: String,
        path: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {endpoint} returned HTTP {status}.")]
    UnexpectedStatus {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to read response from {endpoint}: {source}")]
    ReadBody {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{sink} rejected the submission: {details}")]
    SubmissionRejected { sink: &'static str, details: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
