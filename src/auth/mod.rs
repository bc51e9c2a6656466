/*!
 * # Authentication and Authorization Module
 *
 * JWT bearer authentication for the granja API:
 *
 * - `POST /access/token` exchanges email and password for an access token
 * - `auth_middleware` validates the bearer token and exposes [`AuthUser`]
 * - [`permissions`] checks the role/module/action matrix per route group
 */

pub mod password;
pub mod permissions;
pub mod users;

use crate::config::AppConfig;
use crate::db::DbPool;
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub use permissions::{verify_permissions, Accion, Modulo, PermissionGate};
pub use users::{create_user, NewUsuario, ROL_ADMINISTRADOR, ROL_OPERARIO};

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub id_usuario: i64,
    pub id_rol: i64,
    pub nombre: String,
    pub jti: String,      // JWT ID
    pub iat: i64,         // Issued at time
    pub exp: i64,         // Expiration time
    pub nbf: i64,         // Not valid before time
    pub iss: String,      // Issuer
    pub aud: String,      // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id_usuario: i64,
    pub id_rol: i64,
    pub nombre: String,
    pub token_id: String,
}

impl AuthUser {
    pub fn is_operario(&self) -> bool {
        self.id_rol == ROL_OPERARIO
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id_usuario: claims.id_usuario,
            id_rol: claims.id_rol,
            nombre: claims.nombre,
            token_id: claims.jti,
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        )
    }
}

/// Identity a token is minted for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id_usuario: i64,
    pub id_rol: i64,
    pub nombre: String,
}

/// Authentication service that handles login and token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Generate a JWT access token for a user
    pub fn generate_token(&self, subject: &TokenSubject) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: subject.id_usuario.to_string(),
            id_usuario: subject.id_usuario,
            id_rol: subject.id_rol,
            nombre: subject.nombre.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Checks email and password against the stored argon2 hash and issues a token.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let usuario = users::find_active_by_email(self.db.as_ref(), email)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &usuario.password_hash) {
            warn!(id_usuario = usuario.id_usuario, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(id_usuario = usuario.id_usuario, "login succeeded");
        self.generate_token(&TokenSubject {
            id_usuario: usuario.id_usuario,
            id_rol: usuario.id_rol,
            nombre: usuario.nombre,
        })
    }
}

/// Access token issued on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginCredentials {
    #[schema(example = "admin@granja.local")]
    pub email: String,
    pub password: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                self.to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::TokenCreation(msg) => {
                tracing::error!(error = %msg, "token creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_TOKEN_CREATION_FAILED",
                    "Internal server error".to_string(),
                )
            }
            Self::DatabaseError(msg) | Self::InternalError(msg) => {
                tracing::error!(error = %msg, "authentication failed internally");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that validates the bearer token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match bearer_token(request.headers()) {
        Some(token) => auth_service.validate_token(token),
        None => Err(AuthError::MissingAuth),
    };

    match claims {
        Ok(claims) => {
            let user = AuthUser::from(claims);
            debug!(id_usuario = user.id_usuario, id_rol = user.id_rol, "request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Authentication routes
pub fn auth_routes() -> Router<Arc<AuthService>> {
    Router::new()
        .route("/token", axum::routing::post(login_handler))
        .layer(DefaultBodyLimit::max(1024 * 64))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/access/token",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Credenciales inválidas")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = auth_service
        .authenticate(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(token))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self;
    fn with_permission(self, gate: PermissionGate) -> Self;
}

impl<S> AuthRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth_middleware,
        ))
    }

    fn with_permission(self, gate: PermissionGate) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            gate,
            permissions::permission_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sea_orm::Database;

    async fn service(secret: &str) -> AuthService {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        AuthService::new(
            AuthConfig::new(
                secret.to_string(),
                "granja-clients".to_string(),
                "granja-api".to_string(),
                Duration::from_secs(3600),
            ),
            Arc::new(db),
        )
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            id_usuario: 7,
            id_rol: ROL_OPERARIO,
            nombre: "Rosa".to_string(),
        }
    }

    #[tokio::test]
    async fn issued_token_validates() {
        let auth = service("k3y-for-tests-9f8e7d6c5b4a-granja-api").await;
        let token = auth.generate_token(&subject()).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = auth.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.id_rol, ROL_OPERARIO);

        let user = AuthUser::from(claims);
        assert!(user.is_operario());
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let issuer = service("k3y-for-tests-9f8e7d6c5b4a-granja-api").await;
        let verifier = service("otra-clave-de-pruebas-0a1b2c3d4e5f-xyz").await;
        let token = issuer.generate_token(&subject()).unwrap();
        assert_matches!(
            verifier.validate_token(&token.access_token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
