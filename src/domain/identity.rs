//! Signed-in author identity.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub user_name: String,
}

/// Session holder passed by reference to whatever needs the current author.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    current: Option<UserIdentity>,
}

impl IdentityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: UserIdentity) -> Self {
        Self {
            current: Some(identity),
        }
    }

    pub fn login(&mut self, identity: UserIdentity) {
        self.current = Some(identity);
    }

    pub fn logout(&mut self) -> Option<UserIdentity> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&UserIdentity> {
        self.current.as_ref()
    }
}
