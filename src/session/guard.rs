use super::verdict::Verdict;
use crate::config::ClientConfig;

/// Navigation policies applied before rendering a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Protected pages (dashboard, coursemates, activities, records).
    RequireSession,
    /// Public-only pages (login, signup).
    RequireNoSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Verdict still loading: render a neutral state, do not redirect.
    Pending,
    Allow,
    /// Navigate to this route instead.
    Redirect(String),
}

impl Guard {
    #[must_use]
    pub fn evaluate(self, verdict: Verdict, config: &ClientConfig) -> GuardDecision {
        match (self, verdict) {
            (_, Verdict::Loading) => GuardDecision::Pending,
            (Self::RequireSession, Verdict::Authenticated)
            | (Self::RequireNoSession, Verdict::Unauthenticated) => GuardDecision::Allow,
            (Self::RequireSession, Verdict::Unauthenticated) => {
                GuardDecision::Redirect(config.login_route().to_owned())
            }
            (Self::RequireNoSession, Verdict::Authenticated) => {
                GuardDecision::Redirect(config.home_route().to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:5000".parse().unwrap()).unwrap()
    }

    #[test]
    fn loading_never_redirects() {
        let config = config();
        assert_eq!(
            Guard::RequireSession.evaluate(Verdict::Loading, &config),
            GuardDecision::Pending
        );
        assert_eq!(
            Guard::RequireNoSession.evaluate(Verdict::Loading, &config),
            GuardDecision::Pending
        );
    }

    #[test]
    fn require_session() {
        let config = config();
        assert_eq!(
            Guard::RequireSession.evaluate(Verdict::Authenticated, &config),
            GuardDecision::Allow
        );
        assert_eq!(
            Guard::RequireSession.evaluate(Verdict::Unauthenticated, &config),
            GuardDecision::Redirect("/".into())
        );
    }

    #[test]
    fn require_no_session() {
        let config = config().with_home_route("/overview");
        assert_eq!(
            Guard::RequireNoSession.evaluate(Verdict::Unauthenticated, &config),
            GuardDecision::Allow
        );
        assert_eq!(
            Guard::RequireNoSession.evaluate(Verdict::Authenticated, &config),
            GuardDecision::Redirect("/overview".into())
        );
    }
}
