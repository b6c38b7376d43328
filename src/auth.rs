use crate::Error;
use http::{HeaderMap, HeaderName, HeaderValue, header::AUTHORIZATION};
use std::fmt;

#[derive(Clone, Default, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Auth {
    /// `Authorization: Bearer <api key>`, the scheme used by the OpenAI API.
    Bearer { token: SecretString },
    /// A raw key sent under a custom header, for gateways such as `api-key: <key>`.
    Header {
        name: HeaderName,
        value: SecretString,
    },
}

impl Auth {
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::new(token),
        }
    }

    #[must_use]
    pub fn header(name: HeaderName, value: impl Into<String>) -> Self {
        Self::Header {
            name,
            value: SecretString::new(value),
        }
    }

    pub(crate) fn secrets(&self) -> Vec<&str> {
        match self {
            Self::Bearer { token } => vec![token.expose()],
            Self::Header { value, .. } => vec![value.expose()],
        }
    }

    pub(crate) fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let invalid = |err: http::header::InvalidHeaderValue| Error::InvalidConfig {
            message: "invalid authentication header value".into(),
            source: Some(Box::new(err)),
        };

        match self {
            Self::Bearer { token } => {
                let raw = format!("Bearer {}", token.expose());
                let mut value = HeaderValue::from_str(&raw).map_err(invalid)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Self::Header { name, value } => {
                let mut value = HeaderValue::from_str(value.expose()).map_err(invalid)?;
                value.set_sensitive(true);
                headers.insert(name.clone(), value);
            }
        }
        Ok(())
    }
}
