use uuid::Uuid;

use crate::middleware::AuthUser;

/// Ownership predicate required by every notebook and note store call.
///
/// Only obtainable from the identity the session middleware attached to the
/// request, so an owner id taken from a request body can never reach a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner_id: Uuid,
}

impl OwnerScope {
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// `resource.owner_id == caller`
    pub fn admits(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }
}

impl From<&AuthUser> for OwnerScope {
    fn from(user: &AuthUser) -> Self {
        Self { owner_id: user.user_id }
    }
}
