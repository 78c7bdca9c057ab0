//! Customer endpoints. Ownership rules: a customer acts on their own record,
//! staff act on customer records, admin acts on any record and alone hands out
//! or changes roles.

use crate::auth::Role;
use crate::entities::{CustomerPatch, Customers, NewCustomer};
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::handlers::entity::{key, list_query};
use crate::response::{created, listed, ok};
use crate::service::{not_found, CrudService, CustomerService};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

fn require_role_grant(user: &CurrentUser, role: Option<Role>) -> Result<(), AppError> {
    match role {
        Some(Role::Staff | Role::Admin) if !user.is_admin() => {
            tracing::warn!(customer_id = user.customer_id, "non-admin tried to grant an elevated role");
            Err(AppError::Forbidden("only an admin may grant staff or admin".into()))
        }
        _ => Ok(()),
    }
}

/// Ownership check for writes: staff may not touch another staff or admin account.
async fn require_manageable(state: &AppState, user: &CurrentUser, id: i32) -> Result<(), AppError> {
    user.require_self_or_elevated(id)?;
    if user.customer_id == id || user.is_admin() {
        return Ok(());
    }
    let role = CustomerService::role_of(&state.pool, id)
        .await?
        .ok_or_else(|| not_found::<Customers>(&id))?;
    user.require_may_manage(id, role)
}

/// Elevated callers see every customer; a customer sees only themselves.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = list_query(params)?;
    if !user.is_elevated() {
        query.filters.retain(|(k, _)| k != "customer_id");
        query.filters.push(("customer_id".into(), user.customer_id.to_string()));
    }
    let rows = CrudService::<Customers>::list(&state.pool, &query).await?;
    Ok(listed(rows))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<ValidatedJson<NewCustomer>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    user.require(Some(Role::ELEVATED))?;
    let ValidatedJson(input) = body?;
    require_role_grant(&user, input.role)?;
    let customer = CustomerService::create(&state.pool, input).await?;
    Ok(created(customer))
}

pub async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = key(path)?;
    user.require_self_or_elevated(id)?;
    let customer = CrudService::<Customers>::get(&state.pool, &id).await?;
    Ok(ok(customer))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    body: Result<ValidatedJson<CustomerPatch>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = key(path)?;
    require_manageable(&state, &user, id).await?;
    let ValidatedJson(patch) = body?;
    if patch.role.is_some() && !user.is_admin() {
        return Err(AppError::Forbidden("only an admin may change a role".into()));
    }
    let customer = CustomerService::update(&state.pool, id, patch)
        .await?
        .ok_or_else(|| not_found::<Customers>(&id))?;
    Ok(ok(customer))
}

/// The loyalty account goes with the customer; reservations, orders and reviews stay, unlinked.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = key(path)?;
    require_manageable(&state, &user, id).await?;
    if !CrudService::<Customers>::delete(&state.pool, &id).await? {
        return Err(not_found::<Customers>(&id));
    }
    tracing::info!(customer_id = id, by = user.customer_id, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}
