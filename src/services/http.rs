use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, Response, StatusCode};

/// Client with a bounded per-request timeout.
pub fn client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Sends the request, retrying exactly once on timeouts, connection
/// failures, 5xx and 429. Auth and not-found responses are returned as-is.
pub async fn send_with_retry(request: RequestBuilder) -> anyhow::Result<Response> {
    let retry = request.try_clone();

    match request.send().await {
        Ok(resp) if is_transient_status(resp.status()) => match retry {
            Some(retry) => {
                tracing::warn!(status = %resp.status(), "transient HTTP status, retrying once");
                retry.send().await.context("retry after transient status failed")
            }
            None => Ok(resp),
        },
        Ok(resp) => Ok(resp),
        Err(e) if is_transient_error(&e) => match retry {
            Some(retry) => {
                tracing::warn!(error = %e, "transient HTTP failure, retrying once");
                retry.send().await.context("retry after transient failure failed")
            }
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
