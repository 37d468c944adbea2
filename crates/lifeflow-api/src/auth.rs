//! Authenticated caller identity
//!
//! [`JwtLayer`](crate::jwt::JwtLayer) verifies the bearer token and stores an
//! [`AuthUser`] in the request extensions. Handlers take `AuthUser` as an
//! extractor and pass its `user_id` explicitly into every store call; nothing
//! downstream reads the caller from ambient state.
//!
//! ## Usage
//!
//! ```ignore
//! async fn list_habits(auth: AuthUser, State(state): State<AppState>) -> ApiResult<...> {
//!     state.store.list_habits(&auth.user_id).await?;
//! }
//! ```

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))
    }
}
