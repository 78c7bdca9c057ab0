//! Login, token rotation and revocation.

use crate::auth::{verify_against_dummy, verify_password, Claims, Role, TokenPair};
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Identity of the bearer, as returned by `/auth/me`.
#[derive(Debug, Serialize, FromRow)]
pub struct Me {
    #[sqlx(rename = "customer_id")]
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(FromRow)]
struct Credentials {
    customer_id: i32,
    password_hash: String,
    #[sqlx(try_from = "String")]
    role: Role,
}

pub struct IdentityService;

impl IdentityService {
    /// Verify email and password and issue a token pair. Unknown email and wrong password
    /// fail identically, and both cost one Argon2 verification.
    pub async fn login(state: &AppState, req: LoginRequest) -> Result<TokenPair, AppError> {
        let email = req.email.trim();
        let found: Option<Credentials> =
            sqlx::query_as("SELECT customer_id, password_hash, role FROM customer WHERE email = $1")
                .bind(email)
                .fetch_optional(&state.pool)
                .await?;

        let creds = match found {
            Some(c) if verify_password(&req.password, &c.password_hash) => c,
            Some(c) => {
                tracing::warn!(customer_id = c.customer_id, "login failed: wrong password");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
            None => {
                verify_against_dummy(&req.password);
                tracing::warn!("login failed: unknown email");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
        };

        let pair = state
            .jwt
            .issue_pair(creds.customer_id, &[creds.role])
            .map_err(|e| AppError::Internal(e.to_string()))?;
        tracing::info!(customer_id = creds.customer_id, role = %creds.role, "login succeeded");
        Ok(pair)
    }

    pub async fn me(pool: &PgPool, customer_id: i32) -> Result<Me, AppError> {
        sqlx::query_as("SELECT customer_id, email, first_name, last_name FROM customer WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))
    }

    /// Revoke the presented access token until it would have expired anyway.
    pub async fn logout(state: &AppState, user: &CurrentUser) -> Result<(), AppError> {
        state.revoked.revoke(user.jti, user.expires_at).await?;
        tracing::info!(customer_id = user.customer_id, "logged out");
        Ok(())
    }

    /// Rotate a refresh token: revoke it and issue a fresh pair with the customer's current role.
    pub async fn refresh(state: &AppState, claims: Claims) -> Result<TokenPair, AppError> {
        let customer_id = claims.customer_id().map_err(|_| AppError::unauthorized())?;
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM customer WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&state.pool)
            .await?;
        let role: Role = role
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?
            .parse()
            .map_err(AppError::Internal)?;

        state.revoked.revoke(claims.jti, claims.expires_at()).await?;
        state
            .jwt
            .issue_pair(customer_id, &[role])
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
