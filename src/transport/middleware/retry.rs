use crate::{Error, TransportErrorKind, transport::TransportResponse};
use http::{HeaderMap, Method, StatusCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Retry configuration for both async and blocking clients.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base delay used for exponential backoff (`base * 2^n`).
    pub base_delay: Duration,
    /// Maximum delay cap for exponential backoff.
    pub max_delay: Duration,
    /// Add jitter to backoff delays to avoid retry storms.
    pub jitter: bool,
    /// Retry non-idempotent methods (e.g. `POST`). Defaults to `false`.
    pub retry_non_idempotent: bool,
    /// Prefer the server-provided `Retry-After` header when present.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            jitter: true,
            retry_non_idempotent: false,
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }
}

pub(crate) fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS | Method::TRACE
    )
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub(crate) fn backoff_delay(config: &RetryConfig, attempt: usize) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp = 2u32.saturating_pow((attempt - 1).min(31) as u32);
    let scaled = config.base_delay.saturating_mul(exp);
    scaled.min(config.max_delay)
}

/// Server-provided delay: `retry-after-ms` (milliseconds) takes precedence over
/// `Retry-After` (delta seconds or HTTP date).
pub(crate) fn parse_retry_after(headers: &HeaderMap, now: SystemTime) -> Option<Duration> {
    if let Some(ms) = headers
        .get("retry-after-ms")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
    {
        return Some(ms);
    }

    let value = headers.get(http::header::RETRY_AFTER)?;
    let text = value.to_str().ok()?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(secs) = text.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = httpdate::parse_http_date(text).ok()?;
    let delay = at.duration_since(now).unwrap_or(Duration::ZERO);
    Some(delay)
}

pub(crate) fn jitter_delay(cap: Duration) -> Duration {
    if cap.is_zero() {
        return cap;
    }

    let max_ms = cap.as_millis().min(u128::from(u64::MAX)) as u64;
    if max_ms == 0 {
        return cap;
    }

    // Full jitter: random delay in [0, cap].
    let mut x = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    let ms = x % (max_ms + 1);
    Duration::from_millis(ms)
}

/// Delay before the next attempt, or `None` when `outcome` is final.
///
/// `retries` counts the retries already performed for this request.
pub(crate) fn retry_delay(
    config: &RetryConfig,
    method: &Method,
    retries: usize,
    outcome: &Result<TransportResponse, Error>,
) -> Option<Duration> {
    if retries >= config.max_retries || !(config.retry_non_idempotent || is_idempotent(method)) {
        return None;
    }

    let server_hint = match outcome {
        Ok(resp) if is_retryable_status(resp.status) => config
            .respect_retry_after
            .then(|| parse_retry_after(&resp.headers, SystemTime::now()))
            .flatten()
            .map(|hint| hint.min(config.max_delay)),
        Err(Error::Transport {
            kind: TransportErrorKind::Timeout | TransportErrorKind::Connect,
            ..
        }) => None,
        _ => return None,
    };

    let delay = server_hint.unwrap_or_else(|| {
        let cap = backoff_delay(config, retries + 1);
        if config.jitter {
            jitter_delay(cap)
        } else {
            cap
        }
    });
    Some(delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue};
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, HeaderValue::from_static("7"));
        let delay = parse_retry_after(&headers, UNIX_EPOCH).unwrap();
        assert_eq!(delay, Duration::from_secs(7));
    }

    #[test]
    fn retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let now = UNIX_EPOCH + Duration::from_secs(100);
        let at = UNIX_EPOCH + Duration::from_secs(130);
        let value = httpdate::fmt_http_date(at);
        headers.insert(
            http::header::RETRY_AFTER,
            HeaderValue::from_str(&value).unwrap(),
        );
        let delay = parse_retry_after(&headers, now).unwrap();
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn retry_after_ms_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, HeaderValue::from_static("7"));
        headers.insert("retry-after-ms", HeaderValue::from_static("250"));
        let delay = parse_retry_after(&headers, UNIX_EPOCH).unwrap();
        assert_eq!(delay, Duration::from_millis(250));
    }

    #[test]
    fn retry_after_ms_out_of_range_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("1e30"));
        assert_eq!(parse_retry_after(&headers, UNIX_EPOCH), None);

        headers.insert(http::header::RETRY_AFTER, HeaderValue::from_static("3"));
        headers.insert("retry-after-ms", HeaderValue::from_static("-5"));
        assert_eq!(
            parse_retry_after(&headers, UNIX_EPOCH),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            ..RetryConfig::default()
        };
        assert_eq!(backoff_delay(&config, 0), Duration::ZERO);
        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 3), Duration::from_millis(300));
    }

    fn response(status: StatusCode) -> Result<TransportResponse, Error> {
        Ok(TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
            meta: Default::default(),
        })
    }

    #[test]
    fn retry_delay_respects_method_budget_and_status() {
        let config = RetryConfig {
            max_retries: 1,
            base_delay: Duration::from_millis(10),
            jitter: false,
            ..RetryConfig::default()
        };
        let busy = response(StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(
            retry_delay(&config, &Method::GET, 0, &busy),
            Some(Duration::from_millis(10))
        );
        assert_eq!(retry_delay(&config, &Method::GET, 1, &busy), None);
        assert_eq!(retry_delay(&config, &Method::POST, 0, &busy), None);
        assert_eq!(
            retry_delay(&config, &Method::GET, 0, &response(StatusCode::OK)),
            None
        );
    }

    #[test]
    fn retry_delay_retries_connect_errors_only() {
        let config = RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        };
        let connect: Result<TransportResponse, Error> = Err(Error::Transport {
            method: Method::GET,
            path: "/v1/assistants".into(),
            kind: TransportErrorKind::Connect,
            source: "refused".into(),
        });
        let other: Result<TransportResponse, Error> = Err(Error::Transport {
            method: Method::GET,
            path: "/v1/assistants".into(),
            kind: TransportErrorKind::Other,
            source: "tls".into(),
        });
        assert!(retry_delay(&config, &Method::GET, 0, &connect).is_some());
        assert!(retry_delay(&config, &Method::GET, 0, &other).is_none());
    }

    #[test]
    fn server_retry_hint_is_capped_by_max_delay() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(5),
            ..RetryConfig::default()
        };
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, HeaderValue::from_static("86400"));
        let limited: Result<TransportResponse, Error> = Ok(TransportResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            headers,
            body: Vec::new(),
            meta: Default::default(),
        });
        assert_eq!(
            retry_delay(&config, &Method::GET, 0, &limited),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn post_is_not_idempotent_and_5xx_is_retryable() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }
}
