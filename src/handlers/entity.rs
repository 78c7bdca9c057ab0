//! Generic CRUD handlers, instantiated once per resource type.
//!
//! The resource's `AccessPolicy` arrives as a request extension set by its router. Role gates
//! are checked before the body is looked at, so an unauthorized caller gets 403, not 422.

use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::resource::{AccessPolicy, PrimaryKey, Resource};
use crate::response::{created, listed, ok};
use crate::service::{not_found, CrudService, ListQuery};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use std::collections::HashMap;

/// `limit` and `offset` page the list; every other parameter is an exact-match column filter.
pub fn list_query(params: HashMap<String, String>) -> Result<ListQuery, AppError> {
    let mut query = ListQuery::default();
    for (k, v) in params {
        match k.as_str() {
            "limit" => {
                query.limit = Some(v.parse().map_err(|_| AppError::BadRequest("invalid limit".into()))?);
            }
            "offset" => {
                query.offset = Some(v.parse().map_err(|_| AppError::BadRequest("invalid offset".into()))?);
            }
            _ => query.filters.push((k, v)),
        }
    }
    query.filters.sort();
    Ok(query)
}

pub fn key<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(format!("invalid key: {}", e.body_text())))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Extension(policy): Extension<AccessPolicy>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    user.require(policy.list)?;
    let query = list_query(params)?;
    let rows = CrudService::<R>::list(&state.pool, &query).await?;
    Ok(listed(rows))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Extension(policy): Extension<AccessPolicy>,
    user: CurrentUser,
    body: Result<ValidatedJson<R::Create>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    user.require(policy.create)?;
    let ValidatedJson(input) = body?;
    let row = CrudService::<R>::create(&state.pool, input).await?;
    tracing::info!(resource = R::PATH, customer_id = user.customer_id, "created");
    Ok(created(row))
}

pub async fn read<R: Resource>(
    State(state): State<AppState>,
    Extension(policy): Extension<AccessPolicy>,
    user: CurrentUser,
    path: Result<Path<R::Id>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    user.require(policy.read)?;
    let id = key(path)?;
    let row = CrudService::<R>::get(&state.pool, &id).await?;
    Ok(ok(row))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Extension(policy): Extension<AccessPolicy>,
    user: CurrentUser,
    path: Result<Path<R::Id>, PathRejection>,
    body: Result<ValidatedJson<R::Patch>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    user.require(policy.update)?;
    let id = key(path)?;
    let ValidatedJson(patch) = body?;
    let row = CrudService::<R>::update(&state.pool, &id, patch)
        .await?
        .ok_or_else(|| not_found::<R>(&id))?;
    Ok(ok(row))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Extension(policy): Extension<AccessPolicy>,
    user: CurrentUser,
    path: Result<Path<R::Id>, PathRejection>,
) -> Result<StatusCode, AppError> {
    user.require(policy.delete)?;
    let id = key(path)?;
    if !CrudService::<R>::delete(&state.pool, &id).await? {
        return Err(not_found::<R>(&id));
    }
    tracing::info!(resource = R::PATH, key = %id.describe(), "deleted");
    Ok(StatusCode::NO_CONTENT)
}
