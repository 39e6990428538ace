//! Shared HTTP plumbing for the geocoding, POI and language-model clients
//!
//! Every client gets a per-request timeout and a transient-failure retry
//! policy; non-success statuses are mapped onto [`TripError`] here so the
//! individual clients only deal with payloads.

use std::time::{Duration, Instant};

use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, warn};

use crate::TripError;

/// User agent sent with every request; Nominatim rejects anonymous clients
pub const USER_AGENT: &str = concat!("TripPlanner/", env!("CARGO_PKG_VERSION"));

/// Build a client with a request timeout and `max_retries` retries on
/// transient failures (connect errors, timeouts, 5xx, 429)
pub fn build_client(timeout: Duration, max_retries: u32) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TripError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(250), Duration::from_secs(4))
        .build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Send a request and turn transport failures and error statuses into
/// [`TripError::UpstreamUnavailable`] for `service`
pub async fn send(service: &str, request: RequestBuilder) -> crate::Result<Response> {
    let started = Instant::now();
    let response = request.send().await.map_err(|e| {
        warn!("{service} request failed after {:.3}s: {e}", started.elapsed().as_secs_f64());
        TripError::upstream(service, e.to_string())
    })?;

    let status = response.status();
    debug!(
        "{service} answered {status} in {:.3}s",
        started.elapsed().as_secs_f64()
    );

    if status.is_success() {
        return Ok(response);
    }

    let message = match status {
        StatusCode::TOO_MANY_REQUESTS => "rate limit exceeded".to_string(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "request was not authorized".to_string(),
        _ => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        ),
    };
    warn!("{service} error: {message}");
    Err(TripError::upstream(service, message))
}

/// Decode a JSON body, reporting garbage as an upstream failure
pub async fn json<T: serde::de::DeserializeOwned>(service: &str, response: Response) -> crate::Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| TripError::upstream(service, format!("invalid response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local server answering connection `n` with `statuses[n]` (the last
    /// entry repeats); returns its base URL and the connection count
    async fn serve(statuses: &'static [&'static str]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses.get(n).or(statuses.last()).copied().unwrap_or("200 OK");
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("HTTP/1.1 {status}\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{{}}");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (url, hits)
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("TripPlanner/"));
    }

    #[test]
    fn test_client_builds() {
        assert!(build_client(Duration::from_secs(5), 1).is_ok());
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let (url, hits) = serve(&["503 Service Unavailable"]).await;
        let client = build_client(Duration::from_secs(2), 1).unwrap();

        let err = send("overpass", client.get(&url)).await.unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        match err {
            TripError::UpstreamUnavailable { service, message } => {
                assert_eq!(service, "overpass");
                assert_eq!(message, "HTTP 503 Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let (url, hits) = serve(&["503 Service Unavailable", "200 OK"]).await;
        let client = build_client(Duration::from_secs(2), 1).unwrap();

        let response = send("nominatim", client.get(&url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let (url, hits) = serve(&["404 Not Found"]).await;
        let client = build_client(Duration::from_secs(2), 1).unwrap();

        let err = send("nominatim", client.get(&url)).await.unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(matches!(err, TripError::UpstreamUnavailable { .. }));
    }
}
