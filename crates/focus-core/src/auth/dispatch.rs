//! Request dispatch: one JSON POST raced against a fixed timer.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::RawResponse;

/// Standard User-Agent header for Focus requests.
pub const USER_AGENT: &str = concat!("focus/", env!("CARGO_PKG_VERSION"));

/// Upper bound on one request, from send to fully read body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Low-level transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS, unreachable host).
    Connect(String),
    /// Connection broke or the request could not be written or read.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connect(detail) => write!(f, "Connection failed: {detail}"),
            TransportError::Io(detail) => write!(f, "Network error: {detail}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Sends one JSON POST and reads the whole response.
///
/// Implementations must not retry and must not impose their own timeout;
/// [`dispatch`] owns the time bound and drops the future when it expires.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        (**self).post_json(url, body)
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);

        async move {
            let response = request.send().await.map_err(|e| classify_reqwest_error(&e))?;
            let status = response.status().as_u16();
            let headers = header_pairs(response.headers());
            let body = response
                .text()
                .await
                .map_err(|e| classify_reqwest_error(&e))?;
            Ok(RawResponse {
                status,
                body,
                headers,
            })
        }
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Io(e.to_string())
    }
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Why [`dispatch`] produced no response.
#[derive(Debug)]
pub enum DispatchError {
    /// The timer fired first; the request was dropped.
    Timeout(Duration),
    Transport(TransportError),
    /// The payload could not be serialized; nothing was sent.
    Encode(serde_json::Error),
    /// The caller cancelled; the request was dropped.
    Cancelled,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Timeout(after) => {
                write!(f, "Request timed out after {}s", after.as_secs())
            }
            DispatchError::Transport(err) => write!(f, "{err}"),
            DispatchError::Encode(err) => write!(f, "Failed to encode request: {err}"),
            DispatchError::Cancelled => write!(f, "Request cancelled"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Transport(err) => Some(err),
            DispatchError::Encode(err) => Some(err),
            DispatchError::Timeout(_) | DispatchError::Cancelled => None,
        }
    }
}

/// Serializes `payload` and issues exactly one POST to `url`.
///
/// The request races a `timeout` timer and `cancel`. Whichever settles
/// first wins and the others are dropped: the timer when the response
/// arrives, the in-flight request when the timer fires or the caller
/// cancels.
///
/// # Errors
/// See [`DispatchError`].
pub async fn dispatch<T, P>(
    transport: &T,
    url: &str,
    payload: &P,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<RawResponse, DispatchError>
where
    T: Transport + ?Sized,
    P: Serialize,
{
    let body = serde_json::to_vec(payload).map_err(DispatchError::Encode)?;
    info!(url, timeout_secs = timeout.as_secs(), "dispatching request");

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            info!(url, "request cancelled");
            return Err(DispatchError::Cancelled);
        }
        () = tokio::time::sleep(timeout) => {
            warn!(url, timeout_secs = timeout.as_secs(), "request timed out");
            return Err(DispatchError::Timeout(timeout));
        }
        result = transport.post_json(url, body) => result,
    };

    match result {
        Ok(raw) => {
            debug!(
                url,
                status = raw.status,
                body = %raw.body,
                headers = ?raw.headers,
                "response received"
            );
            Ok(raw)
        }
        Err(err) => {
            warn!(url, error = %err, "transport failed");
            Err(DispatchError::Transport(err))
        }
    }
}
