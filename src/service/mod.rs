//! Database-facing operations behind the handlers.

mod crud;
mod customer;
mod identity;

pub use crud::{not_found, CrudService, ListQuery};
pub use customer::CustomerService;
pub use identity::{IdentityService, LoginRequest, Me};
