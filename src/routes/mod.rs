//! Router assembly.

mod auth;
mod common;
mod customer;
mod entity;

pub use auth::auth_routes;
pub use common::common_routes;
pub use customer::customer_routes;
pub use entity::resource_routes;

use crate::auth::Role;
use crate::config::AppConfig;
use crate::entities::{
    Allergens, CorporateEvents, DiningTables, FunctionRooms, LoyaltyAccounts, MealPlanLines, MealPlans,
    MenuItemAllergens, MenuItems, Notifications, OrderLines, Orders, Payments, Reservations, Reviews,
};
use crate::resource::AccessPolicy;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Readable by any signed-in caller, maintained by staff and admin.
pub const CATALOG: AccessPolicy = AccessPolicy::read_any_write(Role::ELEVATED);

/// Customer-facing records worked by staff and admin only.
pub const OPERATIONAL: AccessPolicy = AccessPolicy::only(Role::ELEVATED);

/// Every API route, unprefixed.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(customer_routes())
        .merge(resource_routes::<LoyaltyAccounts>(OPERATIONAL))
        .merge(resource_routes::<DiningTables>(CATALOG))
        .merge(resource_routes::<FunctionRooms>(CATALOG))
        .merge(resource_routes::<CorporateEvents>(CATALOG))
        .merge(resource_routes::<Reservations>(OPERATIONAL))
        .merge(resource_routes::<MenuItems>(CATALOG))
        .merge(resource_routes::<Allergens>(CATALOG))
        .merge(resource_routes::<MenuItemAllergens>(CATALOG))
        .merge(resource_routes::<Orders>(OPERATIONAL))
        .merge(resource_routes::<OrderLines>(OPERATIONAL))
        .merge(resource_routes::<Payments>(OPERATIONAL))
        .merge(resource_routes::<Reviews>(OPERATIONAL))
        .merge(resource_routes::<MealPlans>(CATALOG))
        .merge(resource_routes::<MealPlanLines>(CATALOG))
        .merge(resource_routes::<Notifications>(OPERATIONAL))
}

/// The full application: probes at the root, the API under `config.api_prefix`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = api_routes();
    let router = if config.api_prefix.is_empty() {
        common_routes().merge(api)
    } else {
        common_routes().nest(&config.api_prefix, api)
    };
    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.body_limit_bytes)),
        )
        .with_state(state)
}
