use std::sync::Arc;

use tokio::sync::watch;

use super::verdict::Verdict;
use crate::types::{AccessToken, Identity, Session};

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    session: Option<Session>,
    bootstrapping: bool,
}

impl SessionState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_bootstrapping(&self) -> bool {
        self.bootstrapping
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        Verdict::derive(self.session.is_some(), self.bootstrapping)
    }
}

/// Holds the current credential and identity in memory.
///
/// Cheap to clone; clones share the same state. Reads are synchronous and
/// observe every completed write. UI layers watch for changes through
/// [`subscribe`](SessionStore::subscribe). Writes are reserved to the session
/// controller and the dispatcher.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_state(SessionState::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("verdict", &self.verdict())
            .finish()
    }
}

impl SessionStore {
    /// Empty store, not bootstrapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose verdict is `Loading` until [`finish_bootstrap`](Self::finish_bootstrap).
    pub(crate) fn bootstrapping() -> Self {
        Self::with_state(SessionState {
            session: None,
            bootstrapping: true,
        })
    }

    fn with_state(state: SessionState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            state: Arc::new(sender),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn credential(&self) -> Option<AccessToken> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.credential().clone())
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.identity().clone())
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.state.borrow().verdict()
    }

    /// Receiver notified after every session transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Replace credential and identity in one transition.
    pub(crate) fn set_session(&self, credential: AccessToken, identity: Identity) {
        self.state.send_modify(|state| {
            state.session = Some(Session::new(credential, identity));
        });
    }

    /// Drop credential and identity in one transition.
    pub(crate) fn clear_session(&self) {
        self.state.send_modify(|state| state.session = None);
    }

    pub(crate) fn finish_bootstrap(&self) {
        self.state.send_if_modified(|state| {
            let was = state.bootstrapping;
            state.bootstrapping = false;
            was
        });
    }
}
