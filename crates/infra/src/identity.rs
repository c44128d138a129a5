//! Static identity service for tests/dev.

use orderflow_app::IdentityService;

/// Identity service that always resolves to one configured token.
///
/// Stands in for the real identity provider in tests and local development.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    identity: Option<String>,
}

impl StaticIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    /// An identity service with no authenticated caller.
    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityService for StaticIdentity {
    fn user_identity(&self) -> Option<String> {
        self.identity.clone()
    }
}
