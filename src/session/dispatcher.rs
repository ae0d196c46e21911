use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Request, RequestBuilder, Response, StatusCode};

use super::refresh::Refresher;
use super::store::SessionStore;
use crate::error::Error;
use crate::types::AccessToken;

/// Sends API requests with the current credential attached.
///
/// A 401 triggers exactly one refresh (shared with any concurrent callers) and
/// one re-send of the original request. If the refresh fails, the session is
/// cleared and [`Error::SessionExpired`] is returned: callers must discard what
/// they are showing and send the user back to login.
///
/// Obtain one from [`SessionController::dispatcher`](super::SessionController::dispatcher).
#[derive(Clone)]
pub struct Dispatcher {
    refresher: Arc<Refresher>,
}

impl Dispatcher {
    pub(crate) fn new(refresher: Arc<Refresher>) -> Self {
        Self { refresher }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.refresher.store()
    }

    /// Start a request to `path`, resolved against the configured API base.
    ///
    /// Uses the session's HTTP client, so the cookie jar is shared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `path` does not form a valid URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = self.refresher.client().config().endpoint(path)?;
        Ok(self.refresher.client().http().request(method, url))
    }

    /// Build `builder` and [`dispatch`](Self::dispatch) it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the request cannot be built, plus every
    /// error of [`dispatch`](Self::dispatch).
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, Error> {
        self.dispatch(builder.build()?).await
    }

    /// Send `request`, recovering once from an expired credential.
    ///
    /// Any response other than 401 is returned unmodified, as is the response
    /// to the re-sent request whatever its status.
    ///
    /// # Errors
    ///
    /// - [`Error::UnreplayableRequest`] if the body is a stream (checked before sending)
    /// - [`Error::InvalidCredential`] if the stored token cannot be sent as a header
    /// - [`Error::Network`] on transport failure
    /// - [`Error::SessionExpired`] if the refresh after a 401 failed
    pub async fn dispatch(&self, request: Request) -> Result<Response, Error> {
        let replay = request.try_clone().ok_or(Error::UnreplayableRequest)?;
        let sent_with = self.store().credential();

        let response = self.execute(request, sent_with.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(
            method = %replay.method(),
            url = %replay.url(),
            "Request unauthorized, refreshing session"
        );

        let credential = match self.refresher.refresh_after(sent_with.as_ref()).await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, session expired");
                return Err(Error::SessionExpired);
            }
        };

        self.execute(replay, Some(&credential)).await
    }

    async fn execute(
        &self,
        mut request: Request,
        credential: Option<&AccessToken>,
    ) -> Result<Response, Error> {
        if let Some(credential) = credential {
            let value = credential.header_value().map_err(|_| Error::InvalidCredential)?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(self.refresher.client().http().execute(request).await?)
    }
}
