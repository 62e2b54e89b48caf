//! JWT handling
//!
//! Two token kinds share one HS256 secret:
//! - bearer tokens identifying a logged-in user
//! - short-lived OAuth `state` tokens carrying the post-login return URL
//!
//! The claim sets are disjoint, so one kind never decodes as the other.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use agora_common::{AuthError, User, UserId};

/// Lifetime of an OAuth state token
const STATE_EXPIRY_SECS: u64 = 600;

/// Bearer token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Agora user id
    pub sub: String,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub.as_str())
    }
}

/// OAuth state payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateClaims {
    pub return_to: String,
    pub nonce: String,
    pub iat: u64,
    pub exp: u64,
}

/// Token issuer and verifier
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: u64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a bearer token for a user
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = unix_now()?;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.expiry_seconds,
        };
        self.sign(&claims)
    }

    /// Verify a bearer token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Issue an OAuth state token remembering where to return after login
    pub fn issue_state(&self, return_to: &str) -> Result<String, AuthError> {
        let now = unix_now()?;
        let claims = StateClaims {
            return_to: return_to.to_string(),
            nonce: hex::encode(rand::random::<[u8; 16]>()),
            iat: now,
            exp: now + STATE_EXPIRY_SECS,
        };
        self.sign(&claims)
    }

    /// Verify an OAuth state token
    pub fn verify_state(&self, state: &str) -> Result<StateClaims, AuthError> {
        decode::<StateClaims>(state, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::StateMismatch)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::Provider(format!("Failed to sign token: {}", e)))
    }
}

fn unix_now() -> Result<u64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AuthError::Provider(format!("System time error: {}", e)))
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
