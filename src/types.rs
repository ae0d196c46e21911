use reqwest::header::{HeaderValue, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Short-lived access token attached to API calls as a bearer credential.
///
/// Opaque to the client. `Debug` is redacted so the token never ends up in logs.
/// Tokens decoded from a server response are checked to be sendable as an
/// `Authorization` header.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// [`bearer`](Self::bearer) as a header value marked sensitive.
    pub(crate) fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&self.bearer())?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl TryFrom<String> for AccessToken {
    type Error = InvalidHeaderValue;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        let token = Self(token);
        token.header_value()?;
        Ok(token)
    }
}

impl From<AccessToken> for String {
    fn from(token: AccessToken) -> Self {
        token.0
    }
}

/// Profile of the authenticated user, as returned by the identity endpoint.
///
/// Treated as a cache of server data: fields the client does not model are kept
/// verbatim in [`extra`](Identity::extra).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Identity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// "First Last", skipping missing parts. Empty when neither is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Looks up a profile field the client does not model explicitly.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }
}

/// Successful response of the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AuthPayload {
    pub access_token: AccessToken,
    #[serde(default)]
    pub user: Identity,
}

/// An established session: credential and identity always travel together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    credential: AccessToken,
    identity: Identity,
}

impl Session {
    #[must_use]
    pub fn new(credential: AccessToken, identity: Identity) -> Self {
        Self {
            credential,
            identity,
        }
    }

    #[must_use]
    pub fn credential(&self) -> &AccessToken {
        &self.credential
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl From<AuthPayload> for Session {
    fn from(payload: AuthPayload) -> Self {
        Self::new(payload.access_token, payload.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(token.as_str(), "super-secret");
        assert_eq!(token.bearer(), "Bearer super-secret");
    }

    #[test]
    fn auth_payload_parses_camel_case() {
        let payload: AuthPayload = serde_json::from_value(serde_json::json!({
            "accessToken": "t1",
            "user": {"firstName": "Ada", "lastName": "Obi", "role": "rep", "id": 7}
        }))
        .unwrap();

        assert_eq!(payload.access_token.as_str(), "t1");
        assert_eq!(payload.user.first_name.as_deref(), Some("Ada"));
        assert_eq!(payload.user.last_name.as_deref(), Some("Obi"));
        assert_eq!(payload.user.field("role"), Some(&JsonValue::from("rep")));
        assert_eq!(payload.user.field("id"), Some(&JsonValue::from(7)));
    }

    #[test]
    fn access_token_rejects_unsendable_values() {
        let err = serde_json::from_value::<AccessToken>(serde_json::json!("t1\nX-Injected: 1"))
            .unwrap_err();
        assert!(err.to_string().contains("header value"));

        let token: AccessToken = serde_json::from_value(serde_json::json!("t1")).unwrap();
        assert!(token.header_value().unwrap().is_sensitive());
        assert_eq!(serde_json::to_value(&token).unwrap(), serde_json::json!("t1"));
    }

    #[test]
    fn auth_payload_tolerates_missing_user() {
        let payload: AuthPayload = serde_json::from_str(r#"{"accessToken":"t1"}"#).unwrap();
        assert_eq!(payload.user, Identity::default());
    }

    #[test]
    fn display_name_joins_known_parts() {
        let identity = Identity::new().with_first_name("Ada").with_last_name("Obi");
        assert_eq!(identity.display_name(), "Ada Obi");
        assert_eq!(Identity::new().with_last_name("Obi").display_name(), "Obi");
        assert_eq!(Identity::new().display_name(), "");
    }

    #[test]
    fn session_from_payload_keeps_both_halves() {
        let payload: AuthPayload =
            serde_json::from_str(r#"{"accessToken":"t2","user":{"email":"a@b.c"}}"#).unwrap();
        let session = Session::from(payload);
        assert_eq!(session.credential().as_str(), "t2");
        assert_eq!(session.identity().email.as_deref(), Some("a@b.c"));
    }
}
