//! Bearer token extractors.
//!
//! `CurrentUser` admits only access tokens; `RefreshGrant` admits only refresh tokens.
//! Both reject tokens whose `jti` is on the denylist.

use crate::auth::{intersects, Claims, JwtService, Role, TokenKind};
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authenticated caller, resolved from a valid non-revoked access token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub customer_id: i32,
    pub roles: Vec<Role>,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    pub fn has_any(&self, allowed: &[Role]) -> bool {
        intersects(&self.roles, allowed)
    }

    pub fn is_elevated(&self) -> bool {
        self.has_any(Role::ELEVATED)
    }

    pub fn is_admin(&self) -> bool {
        self.has_any(Role::ADMIN)
    }

    /// `None` admits every authenticated caller.
    pub fn require(&self, gate: Option<&[Role]>) -> Result<(), AppError> {
        match gate {
            Some(allowed) if !self.has_any(allowed) => {
                tracing::warn!(customer_id = self.customer_id, roles = ?self.roles, "role check failed");
                Err(AppError::forbidden())
            }
            _ => Ok(()),
        }
    }

    /// Self or an elevated role.
    pub fn require_self_or_elevated(&self, customer_id: i32) -> Result<(), AppError> {
        if self.customer_id == customer_id || self.is_elevated() {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }

    /// Write access to another account: admin on any, staff on `customer` accounts only.
    pub fn require_may_manage(&self, customer_id: i32, target_role: Role) -> Result<(), AppError> {
        if self.customer_id == customer_id || self.is_admin() {
            return Ok(());
        }
        if self.is_elevated() && !Role::ELEVATED.contains(&target_role) {
            return Ok(());
        }
        tracing::warn!(
            customer_id = self.customer_id,
            target = customer_id,
            target_role = %target_role,
            "refused to manage an account"
        );
        Err(AppError::Forbidden("only an admin may manage staff or admin accounts".into()))
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let customer_id = claims.customer_id().map_err(|_| AppError::unauthorized())?;
        Ok(CurrentUser {
            customer_id,
            expires_at: claims.expires_at(),
            roles: claims.roles,
            jti: claims.jti,
        })
    }
}

/// Validated refresh token presented to the refresh endpoint.
#[derive(Clone, Debug)]
pub struct RefreshGrant(pub Claims);

async fn authenticate(parts: &Parts, state: &AppState, kind: TokenKind) -> Result<Claims, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!(uri = %parts.uri, "missing bearer token");
            AppError::unauthorized()
        })?;
    let token = JwtService::extract_from_header(header).ok_or_else(AppError::unauthorized)?;
    let claims = state.jwt.validate(token, kind).map_err(|e| {
        tracing::warn!(uri = %parts.uri, error = %e, "token rejected");
        AppError::unauthorized()
    })?;
    if state.revoked.is_revoked(claims.jti).await? {
        tracing::warn!(uri = %parts.uri, jti = %claims.jti, "revoked token presented");
        return Err(AppError::Unauthorized("token has been revoked".into()));
    }
    Ok(claims)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let user = CurrentUser::try_from(authenticate(parts, state, TokenKind::Access).await?)?;
        tracing::debug!(customer_id = user.customer_id, "authenticated");
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RefreshGrant {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state, TokenKind::Refresh).await.map(RefreshGrant)
    }
}
