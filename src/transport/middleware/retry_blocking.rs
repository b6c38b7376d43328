//! Conservative retry wrapper (blocking).

use super::retry::{RetryConfig, retry_delay};
use crate::{
    Error,
    transport::{
        TransportRequest, TransportResponse,
        blocking_transport::{BlockingTransport, DynBlockingTransport},
    },
};
use std::thread::sleep;

#[derive(Clone)]
pub struct RetryBlocking {
    inner: DynBlockingTransport,
    config: RetryConfig,
}

impl RetryBlocking {
    #[must_use]
    pub fn new(inner: DynBlockingTransport, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

impl BlockingTransport for RetryBlocking {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let mut retries = 0usize;
        loop {
            let outcome = self.inner.send(req.clone());
            let Some(delay) = retry_delay(&self.config, &req.method, retries, &outcome) else {
                return outcome.map(|mut resp| {
                    resp.meta.retries = resp.meta.retries.saturating_add(retries);
                    resp
                });
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                http.method = %req.method,
                http.path = %req.url.path(),
                attempt = retries + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );

            if !delay.is_zero() {
                sleep(delay);
            }
            retries += 1;
        }
    }
}
