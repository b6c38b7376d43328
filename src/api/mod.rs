//! Resource-scoped endpoint services.
//!
//! Each service is a cheap, immutable handle over the shared client and is obtained
//! from an accessor on the client:
//! - `Client::assistants()` / `BlockingClient::assistants()`

pub mod assistants;

pub use assistants::*;
