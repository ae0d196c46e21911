use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{OnceCell, watch};

use super::dispatcher::Dispatcher;
use super::guard::{Guard, GuardDecision};
use super::refresh::Refresher;
use super::store::{SessionState, SessionStore};
use super::verdict::Verdict;
use crate::auth::{AuthClient, Registration};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::Identity;

/// Owns the session lifecycle: bootstrap, login and logout.
///
/// The only writer of its [`SessionStore`] apart from the dispatchers it hands
/// out. [`connect`](Self::connect) is the usual entry point: it builds the
/// controller and restores the session before returning.
///
/// [`new`](Self::new) and [`from_config`](Self::from_config) return a
/// controller in the bootstrapping state instead. Its verdict stays `Loading`
/// and guards stay [`GuardDecision::Pending`] until
/// [`bootstrap`](Self::bootstrap) is awaited. Use them to render a loading view
/// while bootstrap runs elsewhere.
pub struct SessionController {
    refresher: Arc<Refresher>,
    bootstrapped: OnceCell<()>,
}

impl SessionController {
    /// Controller in the bootstrapping state. Call [`bootstrap`](Self::bootstrap)
    /// next, or use [`connect`](Self::connect).
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        let store = SessionStore::bootstrapping();
        Self {
            refresher: Arc::new(Refresher::new(Arc::new(client), store)),
            bootstrapped: OnceCell::new(),
        }
    }

    /// Build the auth client from `config`. Like [`new`](Self::new), the
    /// verdict is `Loading` until [`bootstrap`](Self::bootstrap) has run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be initialized.
    pub fn from_config(config: ClientConfig) -> Result<Self, Error> {
        Ok(Self::new(AuthClient::new(config)?))
    }

    /// Build from `config` and run the bootstrap before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be initialized.
    /// A failed silent refresh is not an error.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let controller = Self::from_config(config)?;
        controller.bootstrap().await;
        Ok(controller)
    }

    /// Try to restore a session from the refresh cookie.
    ///
    /// Calls the refresh endpoint at most once per controller; later calls
    /// return the current verdict. Failure means "no session" and is never
    /// surfaced.
    pub async fn bootstrap(&self) -> Verdict {
        self.bootstrapped
            .get_or_init(|| async {
                match self.refresher.refresh_after(None).await {
                    Ok(_) => tracing::info!("Session restored"),
                    Err(e) => tracing::debug!(error = %e, "No session to restore"),
                }
                self.store().finish_bootstrap();
            })
            .await;
        self.verdict()
    }

    /// Log in with email and password.
    ///
    /// On success the session is replaced and the new identity returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] with a displayable message when the
    /// server rejects the credentials, or [`Error::Network`]. The session is left
    /// untouched on error.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, Error> {
        let _gate = self.refresher.lock().await;

        let payload = self.refresher.client().login(email, password).await?;
        let identity = payload.user.clone();
        self.store().set_session(payload.access_token, payload.user);
        tracing::info!("Login successful");
        Ok(identity)
    }

    /// Invalidate the server session (best effort) and clear local state.
    ///
    /// Always succeeds: local state is cleared even if the network call fails.
    pub async fn logout(&self) {
        let _gate = self.refresher.lock().await;

        self.refresher.client().logout().await;
        self.store().clear_session();
        tracing::info!("Logged out");
    }

    /// Create an account. The new user still has to log in.
    ///
    /// # Errors
    ///
    /// See [`AuthClient::register`].
    pub async fn register(&self, registration: &Registration) -> Result<(), Error> {
        self.refresher.client().register(registration).await
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.store().verdict()
    }

    /// Wait until bootstrap has finished, then return the verdict.
    pub async fn wait_for_verdict(&self) -> Verdict {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_bootstrapping()).await {
            Ok(state) => state.verdict(),
            Err(_) => self.verdict(),
        }
    }

    /// Evaluate a route guard against the current verdict.
    #[must_use]
    pub fn guard(&self, guard: Guard) -> GuardDecision {
        guard.evaluate(self.verdict(), self.refresher.client().config())
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.store().identity()
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.refresher.store()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store().subscribe()
    }

    #[must_use]
    pub fn auth_client(&self) -> &AuthClient {
        self.refresher.client()
    }

    /// Dispatcher sharing this controller's session and refresh gate.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.refresher.clone())
    }

    #[cfg(feature = "resources")]
    #[must_use]
    pub fn resources(&self) -> crate::resources::ResourceClient {
        crate::resources::ResourceClient::new(self.dispatcher())
    }
}
