//! Conservative retry wrapper (async).

use super::retry::{RetryConfig, retry_delay};
use crate::{
    Error,
    transport::{
        TransportRequest, TransportResponse,
        async_transport::{AsyncTransport, DynAsyncTransport},
    },
};
use async_trait::async_trait;
use tokio::time::sleep;

#[derive(Clone)]
pub struct RetryAsync {
    inner: DynAsyncTransport,
    config: RetryConfig,
}

impl RetryAsync {
    #[must_use]
    pub fn new(inner: DynAsyncTransport, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl AsyncTransport for RetryAsync {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let mut retries = 0usize;
        loop {
            let outcome = self.inner.send(req.clone()).await;
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
                sleep(delay).await;
            }
            retries += 1;
        }
    }
}
