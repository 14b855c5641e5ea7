use std::time::Duration;

/// The timeout applied to every HTTP request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a username and a password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds credentials only if both parts are present.
    ///
    /// A lone username or a lone password is treated as anonymous access.
    ///
    /// ```
    /// use sparql_kit::Credentials;
    ///
    /// assert!(Credentials::from_parts(Some("admin".into()), Some("pw".into())).is_some());
    /// assert!(Credentials::from_parts(Some("admin".into()), None).is_none());
    /// ```
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        Some(Self::new(username?, password?))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Holds the configuration of an [`HttpClient`](crate::HttpClient).
#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// Basic authentication sent with every request.
    pub credentials: Option<Credentials>,
    /// Per-request timeout. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Whether invalid TLS certificates are accepted.
    pub accept_invalid_certs: bool,
    /// Overrides the `Host` header of every request.
    pub host_header: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            credentials: None,
            timeout: Some(DEFAULT_TIMEOUT),
            accept_invalid_certs: false,
            host_header: None,
        }
    }
}

impl HttpOptions {
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
