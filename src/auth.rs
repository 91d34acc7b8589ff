use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of roles a session can carry. A token naming any other
/// role fails to deserialize and is treated as no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims
///
/// The payload of a signed session token. Issued by the sign-in flow and
/// decoded here on every guarded request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the signed-in account's identifier.
    pub sub: String,
    /// The account's role, checked against the route family.
    pub role: Role,
    /// Issued At (iat), seconds since the epoch.
    pub iat: u64,
    /// Expiration Time (exp), seconds since the epoch. Always validated.
    pub exp: u64,
}

/// Session
///
/// The caller's identity as resolved for one request. Consumers must handle
/// both cases; there is no default role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(Claims),
    Absent,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Authenticated(claims) => Some(claims.role),
            Session::Absent => None,
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Session::Authenticated(claims) => Some(claims),
            Session::Absent => None,
        }
    }
}

/// VerificationError
///
/// Why a verifier could not produce claims. The access guard collapses all
/// of these into `Session::Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("no session credential in request")]
    MissingCredential,
    #[error("session token expired")]
    Expired,
    #[error("invalid session token: {0}")]
    Invalid(String),
    #[error("session verifier unavailable: {0}")]
    Unavailable(String),
}

/// SessionVerifier
///
/// The token-verification capability consumed by the access guard. Given the
/// request headers it returns the decoded claims or a reason it could not.
/// Implementations hold their own secret or remote endpoint.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> Result<Claims, VerificationError>;
}

/// The shared, read-only verifier handle stored in the application state.
pub type VerifierState = Arc<dyn SessionVerifier>;

/// JwtSessionVerifier
///
/// Verifies HS256 session tokens signed with the server secret. The token is
/// read from the session cookie, or from an `Authorization: Bearer` header
/// for API clients.
#[derive(Clone)]
pub struct JwtSessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
    has_secret: bool,
}

impl JwtSessionVerifier {
    pub fn new(secret: &str, cookie_name: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            cookie_name: cookie_name.into(),
            has_secret: !secret.is_empty(),
        }
    }

    /// The raw token carried by the request, cookie first.
    fn credential(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(token) = cookie_value(headers, &self.cookie_name) {
            return Some(token.to_string());
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl SessionVerifier for JwtSessionVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Result<Claims, VerificationError> {
        if !self.has_secret {
            return Err(VerificationError::Unavailable(
                "signing secret is empty".to_string(),
            ));
        }

        let token = self
            .credential(headers)
            .ok_or(VerificationError::MissingCredential)?;

        match decode::<Claims>(&token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(VerificationError::Expired),
                // Bad signature, malformed token, unknown role, ...
                _ => Err(VerificationError::Invalid(e.to_string())),
            },
        }
    }
}

/// cookie_value
///
/// Finds `name` among the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// AuthSession Extractor
///
/// Gives handlers behind the access guard the claims the guard resolved.
/// The guard stores them in the request extensions before forwarding; a
/// handler reached without them rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Claims);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthSession)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
