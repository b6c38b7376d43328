//! Transport layer: the "perform request" capability consumed by clients and
//! the middleware that wraps it.
//!
//! * [`async_transport::ReqwestAsync`] / [`blocking_transport::UreqBlocking`] are the
//!   default HTTP stacks; any [`async_transport::AsyncTransport`] can be injected instead.
//! * Middleware layers (`HookAsync`, `RetryAsync`, ...) are transports themselves and
//!   compose by wrapping a shared `Arc<dyn ...>` handle.

use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use url::Url;

#[cfg(feature = "async")]
pub mod async_transport;
#[cfg(feature = "blocking")]
pub mod blocking_transport;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
pub mod middleware;
pub mod request;

/// Body bytes plus their content type.
#[derive(Clone, Debug)]
pub struct TransportBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<HeaderValue>,
}

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL without query string; see `query`.
    pub url: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<TransportBody>,
    pub timeout: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Number of retries performed by middleware before this response.
    pub retries: usize,
}

/// Raw response returned by a transport; status mapping happens in the client.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub meta: ResponseMeta,
}
