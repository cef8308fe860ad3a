use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{decoy_hash_blocking, hash_password_blocking, verify_password_blocking};
use crate::auth::{AuthError, TokenKind, TokenService};
use crate::database::models::{UserInfo, UserProfile};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;

/// Tokens minted by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

/// Registration, credential checks and the caller's own account
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<UserInfo, ApiError> {
        let password_hash = hash_password_blocking(password.to_string()).await?;

        let user = self
            .store
            .insert_user(username, &password_hash)
            .await
            .map_err(username_taken)?;

        info!(user_id = %user.id, "Registered user {}", user.username);
        Ok(UserInfo::from(&user))
    }

    /// Unknown usernames and wrong passwords fail identically, after the same
    /// amount of hashing work.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let user = self.store.lookup_by_username(username).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => decoy_hash_blocking().await?.to_string(),
        };
        let verified = verify_password_blocking(password.to_string(), stored_hash).await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("Failed login for username {}", username);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let session = Session {
            access_token: self.tokens.issue_access(user.id)?,
            refresh_token: self.tokens.issue_refresh(user.id)?,
            user: UserInfo::from(&user),
        };
        info!(user_id = %user.id, "User logged in");
        Ok(session)
    }

    /// Mint a new access token from a refresh token. The refresh token itself is not rotated.
    pub fn refresh(&self, refresh_token: Option<&str>) -> Result<String, ApiError> {
        let token = refresh_token.ok_or(AuthError::MissingRefreshToken)?;
        let claims = self.tokens.validate(token, TokenKind::Refresh).map_err(|e| {
            warn!("Rejected refresh token: {}", e);
            e
        })?;
        Ok(self.tokens.issue_access(claims.user_id)?)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = self
            .store
            .lookup_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        Ok(UserProfile::from(user))
    }

    pub async fn change_username(&self, user_id: Uuid, new_username: &str) -> Result<UserInfo, ApiError> {
        let user = self
            .store
            .update_username(user_id, new_username)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => AuthError::UnknownUser.into(),
                other => username_taken(other),
            })?;

        info!(user_id = %user.id, "Username changed to {}", user.username);
        Ok(UserInfo::from(&user))
    }
}

fn username_taken(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::conflict("Username already exists"),
        other => other.into(),
    }
}
