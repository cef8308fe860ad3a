use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has been deserialised and then checked with `validator`.
///
/// Body rejections (bad content type, syntax errors, missing fields) become
/// `INVALID_JSON`; rule violations become `VALIDATION_ERROR` with per-field messages.
/// Unknown fields are ignored, so a client can never smuggle in an owner id.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            ApiError::invalid_json(rejection.body_text())
        })?;

        value.validate().map_err(|errors| {
            tracing::debug!("Request validation failed: {}", errors);
            ApiError::from(errors)
        })?;

        Ok(Self(value))
    }
}

/// Parse a path id. Anything that is not a UUID cannot name a resource, so it
/// gets the same 404 as an id that does not exist.
pub fn parse_resource_id(raw: &str, not_found: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
