//! JWT token service
//!
//! Issues and validates HS256 access/refresh tokens. The subject is the customer id as a
//! string; every token carries a unique `jti` so it can be revoked.

use crate::auth::Role;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    pub issuer: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Customer id
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub jti: Uuid,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    pub fn customer_id(&self) -> Result<i32, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("subject is not a customer id".into()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("expected a {0:?} token")]
    WrongKind(TokenKind),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Access and refresh token issued together.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Sign a token of the given kind for a customer.
    pub fn issue(&self, customer_id: i32, roles: &[Role], kind: TokenKind) -> Result<String, JwtError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_minutes,
            TokenKind::Refresh => self.config.refresh_ttl_minutes,
        };
        self.issue_with_ttl(customer_id, roles, kind, Duration::minutes(ttl))
    }

    pub(crate) fn issue_with_ttl(
        &self,
        customer_id: i32,
        roles: &[Role],
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: customer_id.to_string(),
            roles: roles.to_vec(),
            jti: Uuid::new_v4(),
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn issue_pair(&self, customer_id: i32, roles: &[Role]) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue(customer_id, roles, TokenKind::Access)?,
            refresh_token: self.issue(customer_id, roles, TokenKind::Refresh)?,
            token_type: "Bearer",
        })
    }

    /// Verify signature, expiry and issuer, then check the token kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;
        if data.claims.kind != expected {
            return Err(JwtError::WrongKind(expected));
        }
        Ok(data.claims)
    }

    /// Token part of an `Authorization: Bearer <token>` header.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        let (scheme, token) = header.split_once(' ')?;
        let token = token.trim();
        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(token)
        } else {
            None
        }
    }
}
