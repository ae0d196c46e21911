//! In-memory session lifecycle for the RepTrack console.
//!
//! The access token lives only in process memory; the long-lived refresh
//! secret is a cookie held by the HTTP client's jar. On startup the
//! [`SessionController`] performs one silent refresh to restore a session, and
//! every API call made through the [`Dispatcher`] recovers from a single 401 by
//! refreshing and re-sending.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reptrack::{ClientConfig, SessionController, Verdict};
//!
//! let controller = SessionController::connect(ClientConfig::from_env()?).await?;
//! if controller.verdict() == Verdict::Unauthenticated {
//!     controller.login("rep@uni.edu", &password).await?;
//! }
//!
//! let api = controller.dispatcher();
//! let response = api.send(api.request(reqwest::Method::GET, "coursemates/")?).await?;
//! ```

mod controller;
mod dispatcher;
mod guard;
mod refresh;
mod store;
mod verdict;

pub use controller::SessionController;
pub use dispatcher::Dispatcher;
pub use guard::{Guard, GuardDecision};
pub use store::{SessionState, SessionStore};
pub use verdict::Verdict;
