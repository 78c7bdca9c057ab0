//! Per-resource CRUD routers.
//!
//! Each resource gets its own collection and item routes; the item path has one segment per
//! primary-key column. The access policy rides along as a request extension.

use crate::handlers::entity::{create, delete, list, read, update};
use crate::resource::{item_path, AccessPolicy, Resource};
use crate::state::AppState;
use axum::{routing::get, Extension, Router};

pub fn resource_routes<R: Resource>(policy: AccessPolicy) -> Router<AppState> {
    let collection = format!("/{}", R::PATH);
    let item = format!("{}{}", collection, item_path(&R::META));
    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&item, get(read::<R>).put(update::<R>).delete(delete::<R>))
        .layer(Extension(policy))
}
