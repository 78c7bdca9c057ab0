//! Request extractors.

mod auth;
mod json;

pub use auth::{CurrentUser, RefreshGrant};
pub use json::{field_errors, parse_body, ValidatedJson};
