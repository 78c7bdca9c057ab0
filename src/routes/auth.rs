use crate::handlers::auth::{login, logout, me, refresh, register};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// POST /auth/login, /auth/register, /auth/refresh (public); GET /auth/me, POST /auth/logout (bearer).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}
