//! Session endpoints under `/auth`.

use crate::entities::Registration;
use crate::error::AppError;
use crate::extractors::{CurrentUser, RefreshGrant, ValidatedJson};
use crate::response::created;
use crate::service::{CustomerService, IdentityService, LoginRequest};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = IdentityService::login(&state, req).await?;
    Ok(Json(pair))
}

/// Public sign-up; always creates a `customer` role account with its loyalty account.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(reg): ValidatedJson<Registration>,
) -> Result<impl IntoResponse, AppError> {
    let customer = CustomerService::create(&state.pool, reg.into()).await?;
    Ok(created(customer))
}

pub async fn refresh(
    State(state): State<AppState>,
    RefreshGrant(claims): RefreshGrant,
) -> Result<impl IntoResponse, AppError> {
    let pair = IdentityService::refresh(&state, claims).await?;
    Ok(Json(pair))
}

pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    let me = IdentityService::me(&state.pool, user.customer_id).await?;
    Ok(Json(me))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> Result<StatusCode, AppError> {
    IdentityService::logout(&state, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
