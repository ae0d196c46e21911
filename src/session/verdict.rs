use derive_more::Display;

/// Authentication status consumed by route guards.
///
/// Always derived from the session state, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Verdict {
    /// Bootstrap is still in flight.
    #[display("loading")]
    Loading,
    #[display("authenticated")]
    Authenticated,
    #[display("unauthenticated")]
    Unauthenticated,
}

impl Verdict {
    pub(crate) fn derive(has_credential: bool, bootstrapping: bool) -> Self {
        match (bootstrapping, has_credential) {
            (true, _) => Self::Loading,
            (false, true) => Self::Authenticated,
            (false, false) => Self::Unauthenticated,
        }
    }

    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_masks_credential() {
        assert_eq!(Verdict::derive(true, true), Verdict::Loading);
        assert_eq!(Verdict::derive(false, true), Verdict::Loading);
    }

    #[test]
    fn credential_decides_after_bootstrap() {
        assert_eq!(Verdict::derive(true, false), Verdict::Authenticated);
        assert_eq!(Verdict::derive(false, false), Verdict::Unauthenticated);
        assert!(Verdict::Authenticated.is_authenticated());
        assert!(!Verdict::Loading.is_authenticated());
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(Verdict::Loading.to_string(), "loading");
        assert_eq!(Verdict::Unauthenticated.to_string(), "unauthenticated");
    }
}
