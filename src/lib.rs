#![doc = include_str!("../README.md")]

pub mod auth;
pub mod config;
pub mod error;
#[cfg(feature = "resources")]
pub mod resources;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use auth::{AuthClient, Registration};
pub use config::ClientConfig;
pub use error::Error;
#[cfg(feature = "resources")]
pub use resources::{
    Activity, ActivityId, ActivityRecord, ActivityType, ActivityTypeId, Coursemate, CoursemateId,
    DashboardSummary, NewActivity, NewActivityRecord, NewCoursemate, RecordId, ResourceClient,
};
pub use session::{
    Dispatcher, Guard, GuardDecision, SessionController, SessionState, SessionStore, Verdict,
};
pub use types::{AccessToken, AuthPayload, Identity, Session};
