use crate::handlers::customer::{create, delete, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

/// Customer routes carry their own ownership rules instead of an `AccessPolicy`.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customer", get(list).post(create))
        .route("/customer/:customer_id", get(read).put(update).delete(delete))
}
