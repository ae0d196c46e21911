use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::store::SessionStore;
use crate::auth::AuthClient;
use crate::error::Error;
use crate::types::AccessToken;

/// Serializes every session write that involves the network.
///
/// Refreshes, logins and logouts take the same gate, so concurrent 401s share a
/// single refresh and a late refresh cannot resurrect a cleared session.
pub(crate) struct Refresher {
    client: Arc<AuthClient>,
    store: SessionStore,
    gate: Mutex<()>,
}

impl Refresher {
    pub(crate) fn new(client: Arc<AuthClient>, store: SessionStore) -> Self {
        Self {
            client,
            store,
            gate: Mutex::new(()),
        }
    }

    pub(crate) fn client(&self) -> &AuthClient {
        &self.client
    }

    pub(crate) fn store(&self) -> &SessionStore {
        &self.store
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// Obtain a credential newer than `stale`.
    ///
    /// If another caller replaced `stale` while this one waited for the gate,
    /// the current credential is returned without a network call. If the
    /// session holding `stale` has since been cleared (logout or a failed
    /// refresh), [`Error::SessionExpired`] is returned, also without a network
    /// call. Otherwise the refresh endpoint is called once; on failure the
    /// session is cleared and the refresh error returned.
    pub(crate) async fn refresh_after(
        &self,
        stale: Option<&AccessToken>,
    ) -> Result<AccessToken, Error> {
        let _gate = self.lock().await;

        match (self.store.credential(), stale) {
            (Some(current), stale) if stale != Some(&current) => {
                tracing::debug!("Credential already refreshed by a concurrent caller");
                return Ok(current);
            }
            (None, Some(_)) => {
                tracing::debug!("Session ended while waiting to refresh");
                return Err(Error::SessionExpired);
            }
            _ => {}
        }

        match self.client.refresh().await {
            Ok(payload) => {
                let credential = payload.access_token.clone();
                self.store.set_session(payload.access_token, payload.user);
                tracing::debug!("Session refreshed");
                Ok(credential)
            }
            Err(e) => {
                self.store.clear_session();
                Err(e)
            }
        }
    }
}
