//! The blocking HTTP client shared by all remote operations.

use crate::config::{Credentials, HttpOptions};
use crate::error::{ConfigurationError, Error, TransportError};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, HOST};
use reqwest::Method;
use std::ops::Deref;
use url::Url;

/// A configured HTTP client.
///
/// A client can be shared by many calls. Operations that are not given one create a client
/// with the default [`HttpOptions`] for the duration of the call.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    credentials: Option<Credentials>,
}

impl HttpClient {
    /// Creates a client with the default [`HttpOptions`].
    pub fn new() -> Result<Self, Error> {
        Self::with_options(&HttpOptions::default())
    }

    /// Creates a client with the given options.
    pub fn with_options(options: &HttpOptions) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(host) = &options.host_header {
            let value =
                HeaderValue::from_str(host).map_err(|_| ConfigurationError::InvalidHeader {
                    name: "Host",
                    value: host.clone(),
                })?;
            headers.insert(HOST, value);
        }
        let inner = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .default_headers(headers)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self {
            inner,
            credentials: options.credentials.clone(),
        })
    }

    /// Starts a request, attaching Basic authentication when credentials are configured.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(credentials.username(), Some(credentials.password()))
            }
            None => builder,
        }
    }
}

/// A client available for the duration of a single operation.
///
/// Borrows the caller's client when one is given, otherwise owns a fresh one that is released
/// when the scope ends, on success and on error alike.
pub(crate) enum ScopedClient<'a> {
    Borrowed(&'a HttpClient),
    Owned(HttpClient),
}

impl<'a> ScopedClient<'a> {
    pub fn acquire(client: Option<&'a HttpClient>) -> Result<Self, Error> {
        Ok(match client {
            Some(client) => Self::Borrowed(client),
            None => Self::Owned(HttpClient::new()?),
        })
    }

    #[cfg(test)]
    fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl Deref for ScopedClient<'_> {
    type Target = HttpClient;

    fn deref(&self) -> &HttpClient {
        match self {
            Self::Borrowed(client) => client,
            Self::Owned(client) => client,
        }
    }
}

/// Parses an endpoint URL, rejecting anything that is not HTTP(S).
pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    let url = Url::parse(endpoint).map_err(|e| ConfigurationError::InvalidEndpoint {
        url: endpoint.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason: "the URL must start with 'http'".to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_client_borrows_a_given_client() {
        let client = HttpClient::new().unwrap();
        assert!(!ScopedClient::acquire(Some(&client)).unwrap().is_owned());
        assert!(ScopedClient::acquire(None).unwrap().is_owned());
    }

    #[test]
    fn rejects_invalid_host_header() {
        let options = HttpOptions {
            host_header: Some("bad\nhost".to_owned()),
            ..HttpOptions::default()
        };
        assert!(matches!(
            HttpClient::with_options(&options),
            Err(Error::Configuration(ConfigurationError::InvalidHeader { .. }))
        ));
    }

    #[test]
    fn endpoints_must_be_http() {
        assert!(parse_endpoint("http://localhost:3030/ds").is_ok());
        assert!(parse_endpoint("https://example.com/sparql").is_ok());
        assert!(parse_endpoint("ftp://example.com/sparql").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }
}
