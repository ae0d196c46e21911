use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{Error, server_message};
use crate::types::AuthPayload;

/// Stateless client for the RepTrack identity endpoints.
///
/// The underlying HTTP client keeps a cookie jar: the refresh secret set by the
/// server on login/refresh is replayed automatically and is never visible to
/// application code. Nothing here retries.
pub struct AuthClient {
    config: ClientConfig,
    http: reqwest::Client,
}

/// New account details for `POST /auth/register`.
#[non_exhaustive]
pub struct Registration {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
}

impl Registration {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            email: email.into(),
            password,
        }
    }

    #[must_use]
    pub fn with_middle_name(mut self, name: impl Into<String>) -> Self {
        self.middle_name = Some(name.into());
        self
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    first_name: &'a str,
    middle_name: Option<&'a str>,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl AuthClient {
    /// Create a client with a cookie-enabled HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The client must have a cookie store, or refresh will never see the secret.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Exchange email and password for a credential and identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] with the server's message when the
    /// credentials are rejected, [`Error::Network`] when the server cannot be
    /// reached, or [`Error::InvalidResponse`] for an undecodable success body.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthPayload, Error> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let response = self
            .http
            .post(self.config.login_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Login rejected");
            return Err(Error::Authentication {
                status: status.as_u16(),
                message: server_message(&text, "Login failed"),
            });
        }

        Self::decode(response, "login").await
    }

    /// Mint a new credential from the refresh secret held in the cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Refresh`] when the server reports the secret missing,
    /// expired or invalid, and [`Error::Network`] on transport failure.
    pub async fn refresh(&self) -> Result<AuthPayload, Error> {
        let response = self
            .http
            .post(self.config.refresh_url.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Refresh {
                status: status.as_u16(),
                detail: server_message(&text, "Refresh failed"),
            });
        }

        Self::decode(response, "refresh").await
    }

    /// Ask the server to invalidate the refresh secret. Best effort: failures
    /// are logged and swallowed.
    pub async fn logout(&self) {
        match self
            .http
            .post(self.config.logout_url.clone())
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    status = response.status().as_u16(),
                    "Logout request rejected"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Logout request failed"),
        }
    }

    /// Create a new account. Does not establish a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with the server's message when registration is
    /// rejected, or [`Error::Network`] on transport failure.
    pub async fn register(&self, registration: &Registration) -> Result<(), Error> {
        let body = RegisterRequest {
            first_name: &registration.first_name,
            middle_name: registration.middle_name.as_deref(),
            last_name: &registration.last_name,
            email: &registration.email,
            password: registration.password.expose_secret(),
        };

        let response = self
            .http
            .post(self.config.register_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Account registered");
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(Error::Api {
            operation: "registration",
            status: status.as_u16(),
            message: server_message(&text, "Registration failed"),
        })
    }

    /// Reads the body and decodes it as JSON, keeping decode errors distinct from transport errors.
    pub(crate) async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, Error> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::InvalidResponse {
            operation,
            detail: e.to_string(),
        })
    }
}
