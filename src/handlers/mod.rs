//! HTTP handlers.

pub mod auth;
pub mod customer;
pub mod entity;
