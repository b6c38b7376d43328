//! Client implementations (async + optional blocking).

use crate::Error;
use http::{HeaderMap, HeaderName, HeaderValue};

#[cfg(feature = "async")]
pub mod async_client;
#[cfg(feature = "blocking")]
pub mod blocking_client;

#[cfg(feature = "async")]
pub use async_client::{Client, ClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{BlockingClient, BlockingClientBuilder};

/// Public OpenAI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const ORGANIZATION_HEADER: &str = "openai-organization";
const PROJECT_HEADER: &str = "openai-project";

/// Settings read from `OPENAI_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: Option<String>,
    pub(crate) organization: Option<String>,
    pub(crate) project: Option<String>,
}

impl EnvConfig {
    pub(crate) fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let api_key = non_empty("OPENAI_API_KEY").ok_or_else(|| Error::InvalidConfig {
            message: "OPENAI_API_KEY is not set".into(),
            source: None,
        })?;
        Ok(Self {
            api_key,
            base_url: non_empty("OPENAI_BASE_URL"),
            organization: non_empty("OPENAI_ORG_ID"),
            project: non_empty("OPENAI_PROJECT_ID"),
        })
    }
}

pub(crate) fn identity_headers(
    organization: Option<&str>,
    project: Option<&str>,
) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in [(ORGANIZATION_HEADER, organization), (PROJECT_HEADER, project)] {
        let Some(value) = value else { continue };
        let value = HeaderValue::from_str(value).map_err(|err| Error::InvalidConfig {
            message: format!("invalid {name} header value").into_boxed_str(),
            source: Some(Box::new(err)),
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}
