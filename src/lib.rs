//! Restaurant information system: REST backend over PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod resource;
pub mod response;
pub mod routes;
pub mod seed;
pub mod service;
pub mod sql;
pub mod state;

pub use auth::{JwtService, MemoryRevocationStore, PgRevocationStore, RevocationStore, Role};
pub use config::AppConfig;
pub use db::{connect, ensure_database_exists};
pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, truncate_all};
pub use resource::{AccessPolicy, Resource};
pub use routes::{api_routes, app};
pub use service::{CrudService, CustomerService, IdentityService};
pub use state::AppState;
