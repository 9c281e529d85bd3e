//! Request plumbing shared by the source client and the sinks.
use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::error::{AppError, AppResult, TransportError};

/// Sends `request` and returns the body of a 2xx response.
///
/// # Errors
///
/// Returns `RequestFailed` when the request cannot be sent, `UnexpectedStatus`
/// for a non-2xx status, and `ReadBody` when the body cannot be read.
pub(crate) async fn send(request: RequestBuilder, endpoint: &Url) -> AppResult<Vec<u8>> {
    let response = request.send().await.map_err(|err| {
        AppError::transport(TransportError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: err,
        })
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::transport(TransportError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status,
        }));
    }

    let body = response.bytes().await.map_err(|err| {
        AppError::transport(TransportError::ReadBody {
            endpoint: endpoint.to_string(),
            source: err,
        })
    })?;
    Ok(body.to_vec())
}

/// Default headers carrying an API key, marked sensitive so it never shows
/// up in debug output.
///
/// # Errors
///
/// Returns `InvalidHeaderValue` when the key contains bytes not allowed in a
/// header.
pub(crate) fn api_key_headers(header: &'static str, key: &str) -> AppResult<HeaderMap> {
    let mut value = HeaderValue::from_str(key).map_err(|err| {
        AppError::transport(TransportError::InvalidHeaderValue {
            header,
            source: err,
        })
    })?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(header, value);
    Ok(headers)
}

/// Resolves `path` against a base URL that ends with `/`.
///
/// # Errors
///
/// Returns `JoinUrlFailed` when the joined URL is invalid.
pub(crate) fn join(base: &Url, path: &'static str) -> AppResult<Url> {
    base.join(path).map_err(|err| {
        AppError::transport(TransportError::JoinUrlFailed {
            base: base.as_str().to_owned(),
            path,
            source: err,
        })
    })
}
