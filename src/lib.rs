//! OpenAI SDK: typed resource endpoints over a shared, pluggable transport.
//!
//! Choose the **async** client (default) and/or the **blocking** client at compile time.
//! Every resource service (e.g. [`api::AssistantsService`]) is a cheap handle over one
//! client; the client owns the transport stack and all configuration.

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("Enable at least one of: `async` (default) or `blocking`.");

#[cfg(all(feature = "rustls", feature = "native-tls"))]
compile_error!("Features `rustls` and `native-tls` are mutually exclusive.");

pub mod api;
mod auth;
pub mod client;
mod error;
mod request_hook;
pub mod types;
mod util;

#[cfg(feature = "unstable-raw")]
pub mod raw;

pub(crate) mod transport;

pub use auth::{Auth, SecretString};
pub use client::DEFAULT_BASE_URL;
#[cfg(feature = "async")]
pub use client::{Client, ClientBuilder};
#[cfg(feature = "blocking")]
pub use client::{BlockingClient, BlockingClientBuilder};
pub use error::{BodySnippetConfig, Error, ErrorKind, HttpError, Result, TransportErrorKind};
pub use request_hook::{RequestHook, RequestHookContext};
pub use transport::middleware::RetryConfig;
pub use transport::{ResponseMeta, TransportBody, TransportRequest, TransportResponse};
#[cfg(feature = "async")]
pub use transport::async_transport::{AsyncTransport, DynAsyncTransport};
#[cfg(feature = "blocking")]
pub use transport::blocking_transport::{BlockingTransport, DynBlockingTransport};
pub use types::*;
