use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Where the route guards send users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteSettings {
    pub(crate) login_route: String,
    pub(crate) home_route: String,
}

impl RouteSettings {
    fn defaults() -> Self {
        Self {
            login_route: "/".into(),
            home_route: "/dashboard".into(),
        }
    }
}

/// RepTrack API client configuration.
///
/// The API base URL is the only required value and is a constructor parameter.
/// Identity endpoints default to `auth/login`, `auth/refresh`, `auth/logout` and
/// `auth/register` below the base; resource endpoints are resolved against it.
///
/// ```rust,ignore
/// use reptrack::ClientConfig;
///
/// let config = ClientConfig::new("http://127.0.0.1:5000".parse()?)?
///     .with_timeout(std::time::Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) api_base: Url,
    pub(crate) login_url: Url,
    pub(crate) refresh_url: Url,
    pub(crate) logout_url: Url,
    pub(crate) register_url: Url,
    pub(crate) timeout: Option<Duration>,
    pub(crate) routes: RouteSettings,
}

impl ClientConfig {
    /// Create a configuration rooted at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_base` cannot have relative paths
    /// resolved against it (e.g. a `mailto:` URL).
    pub fn new(api_base: Url) -> Result<Self, Error> {
        let api_base = normalize_base(api_base)?;
        Ok(Self {
            login_url: join(&api_base, "auth/login")?,
            refresh_url: join(&api_base, "auth/refresh")?,
            logout_url: join(&api_base, "auth/logout")?,
            register_url: join(&api_base, "auth/register")?,
            api_base,
            timeout: None,
            routes: RouteSettings::defaults(),
        })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `REPTRACK_API_URL`: API base URL
    ///
    /// # Optional env vars
    /// - `REPTRACK_LOGIN_PATH`, `REPTRACK_REFRESH_PATH`, `REPTRACK_LOGOUT_PATH`,
    ///   `REPTRACK_REGISTER_PATH`: identity endpoints, relative to the base
    /// - `REPTRACK_TIMEOUT_SECS`: per-request timeout in seconds
    /// - `REPTRACK_LOGIN_ROUTE`: where guards send users without a session
    /// - `REPTRACK_HOME_ROUTE`: where guards send users who already have one
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or values are invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_str = std::env::var("REPTRACK_API_URL")
            .map_err(|_| Error::Config("REPTRACK_API_URL is required".into()))?;
        let api_base: Url = base_str
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("REPTRACK_API_URL: {e}")))?;

        let mut config = Self::new(api_base)?;

        if let Some(path) = env_value("REPTRACK_LOGIN_PATH") {
            config.login_url = config.endpoint(&path)?;
        }
        if let Some(path) = env_value("REPTRACK_REFRESH_PATH") {
            config.refresh_url = config.endpoint(&path)?;
        }
        if let Some(path) = env_value("REPTRACK_LOGOUT_PATH") {
            config.logout_url = config.endpoint(&path)?;
        }
        if let Some(path) = env_value("REPTRACK_REGISTER_PATH") {
            config.register_url = config.endpoint(&path)?;
        }
        if let Some(secs) = env_value("REPTRACK_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("REPTRACK_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(route) = env_value("REPTRACK_LOGIN_ROUTE") {
            config = config.with_login_route(route);
        }
        if let Some(route) = env_value("REPTRACK_HOME_ROUTE") {
            config = config.with_home_route(route);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_login_url(mut self, url: Url) -> Self {
        self.login_url = url;
        self
    }

    #[must_use]
    pub fn with_refresh_url(mut self, url: Url) -> Self {
        self.refresh_url = url;
        self
    }

    #[must_use]
    pub fn with_logout_url(mut self, url: Url) -> Self {
        self.logout_url = url;
        self
    }

    #[must_use]
    pub fn with_register_url(mut self, url: Url) -> Self {
        self.register_url = url;
        self
    }

    /// Per-request timeout. Unset means the transport default (none).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.routes.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_home_route(mut self, route: impl Into<String>) -> Self {
        self.routes.home_route = route.into();
        self
    }

    /// API base URL, always ending in `/`.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    #[must_use]
    pub fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }

    #[must_use]
    pub fn logout_url(&self) -> &Url {
        &self.logout_url
    }

    #[must_use]
    pub fn register_url(&self) -> &Url {
        &self.register_url
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.routes.login_route
    }

    #[must_use]
    pub fn home_route(&self) -> &str {
        &self.routes.home_route
    }

    /// Resolve an API path against the base URL.
    ///
    /// A leading `/` is ignored so `"/coursemates/"` and `"coursemates/"` resolve
    /// to the same endpoint below the base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the path does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        join(&self.api_base, path.trim().trim_start_matches('/'))
    }
}

fn normalize_base(mut url: Url) -> Result<Url, Error> {
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("{url} cannot be used as an API base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, Error> {
    base.join(path)
        .map_err(|e| Error::Config(format!("{path}: {e}")))
}

fn env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
