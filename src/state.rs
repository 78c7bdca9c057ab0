//! Shared application state for all routes.

use crate::auth::{JwtService, RevocationStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: Arc<JwtService>,
    /// Denylist consulted on every authenticated request.
    pub revoked: Arc<dyn RevocationStore>,
}

impl AppState {
    pub fn new(pool: PgPool, jwt: JwtService, revoked: Arc<dyn RevocationStore>) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            revoked,
        }
    }
}
