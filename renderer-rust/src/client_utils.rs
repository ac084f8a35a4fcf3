use crate::RenderError;
use reqwest::{header::HeaderMap, Client, Response};
use serde::Serialize;
use std::time::Duration;

/// Send a JSON request and return the raw response.
/// Throws error on non OK status code, maps timeouts to
/// `RenderError::Timeout`.
pub async fn send_json<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
    headers: HeaderMap,
    timeout: Duration,
) -> Result<Response, RenderError> {
    let response = client
        .post(url)
        .headers(headers)
        .timeout(timeout)
        .json(data)
        .send()
        .await
        .map_err(|error| map_transport_error(error, timeout))?;

    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RenderError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ))
    }
}

/// Read the whole body of a response.
pub async fn read_body(response: Response, timeout: Duration) -> Result<Vec<u8>, RenderError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|error| map_transport_error(error, timeout))?;
    Ok(bytes.to_vec())
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout(timeout)
    } else {
        RenderError::Transport(error)
    }
}
