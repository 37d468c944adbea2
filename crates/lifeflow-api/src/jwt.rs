//! JWT Bearer Authentication for the LifeFlow API
//!
//! Turns an `Authorization: Bearer <token>` header into an [`AuthUser`] in the
//! request extensions. Token issuance (login, refresh) belongs to the identity
//! service; this module only needs to sign tokens for tests and local tooling.
//!
//! ## Usage
//!
//! ### Generate a JWT Token
//! ```ignore
//! use lifeflow_api::jwt::{JwtConfig, JwtService};
//!
//! let service = JwtService::new(JwtConfig::from_secret(secret.as_bytes())?);
//! let token = service.generate_token("user_123", None)?;
//! ```
//!
//! ### Use JWT Middleware
//! ```ignore
//! use lifeflow_api::jwt::JwtLayer;
//!
//! let protected_routes = Router::new()
//!     .route("/habits", get(list_habits))
//!     .route_layer(JwtLayer::new(service));
//! ```
//!
//! ## Claims
//!
//! - `sub`: user id, becomes [`AuthUser::user_id`]
//! - `iss` / `aud`: must match the configured issuer and audience
//! - `exp`: checked with zero leeway

use axum::{
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tower::{Layer, Service};

use crate::auth::AuthUser;
use crate::error::ApiError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    pub iss: String,
    pub aud: String,
    /// JWT ID (unique identifier for this token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl Claims {
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry_secs: u64,
    ) -> Self {
        let now = unix_now();

        Self {
            sub: subject.into(),
            iat: now,
            exp: now + expiry_secs,
            iss: issuer.into(),
            aud: audience.into(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            user_id: self.sub.clone(),
        }
    }
}

/// JWT configuration (HMAC-SHA256)
#[derive(Clone)]
pub struct JwtConfig {
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub issuer: String,
    pub audience: String,
    /// Default token expiry
    pub default_expiry: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("default_expiry", &self.default_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create configuration from a shared secret
    pub fn from_secret(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.len() < 32 {
            return Err(JwtError::ConfigError(
                "JWT secret must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: "lifeflow".to_string(),
            audience: "lifeflow-api".to_string(),
            default_expiry: Duration::from_secs(900),
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.default_expiry = expiry;
        self
    }
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: Arc<JwtConfig>,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Sign a token for `subject`.
    pub fn generate_token(
        &self,
        subject: impl Into<String>,
        expiry: Option<Duration>,
    ) -> Result<String, JwtError> {
        let expiry_secs = expiry.unwrap_or(self.config.default_expiry).as_secs();

        let claims = Claims::new(
            subject,
            &self.config.issuer,
            &self.config.audience,
            expiry_secs,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.config.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.config.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    JwtError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken("Token has no subject".to_string()));
        }

        Ok(token_data.claims)
    }
}

/// JWT authentication errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Missing authorization token")]
    MissingToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Invalid token audience")]
    InvalidAudience,
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::ConfigError(_) | JwtError::TokenGeneration(_) => {
                ApiError::Internal(e.to_string())
            }
            _ => ApiError::Unauthorized(e.to_string()),
        }
    }
}

impl IntoResponse for JwtError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// JWT authentication layer for Axum routes
#[derive(Clone)]
pub struct JwtLayer {
    service: Arc<JwtService>,
}

impl JwtLayer {
    pub fn new(service: Arc<JwtService>) -> Self {
        Self { service }
    }
}

impl<S> Layer<S> for JwtLayer {
    type Service = JwtMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JwtMiddleware {
            inner,
            service: self.service.clone(),
        }
    }
}

/// JWT authentication middleware
#[derive(Clone)]
pub struct JwtMiddleware<S> {
    inner: S,
    service: Arc<JwtService>,
}

impl<S> Service<Request> for JwtMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let service = self.service.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim);

            let token = match token {
                Some(token) if !token.is_empty() => token,
                _ => return Ok(JwtError::MissingToken.into_response()),
            };

            let claims = match service.validate_token(token) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!(error = %e, "JWT validation failed");
                    return Ok(e.into_response());
                }
            };

            request.extensions_mut().insert(claims.to_auth_user());

            inner.call(request).await
        })
    }
}
