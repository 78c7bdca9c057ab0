//! Success envelopes: `{"data": row}` and `{"data": [rows], "meta": {"count": n}}`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub meta: ListingMeta,
}

#[derive(Debug, Serialize)]
pub struct ListingMeta {
    /// Rows in this page, not in the table.
    pub count: usize,
}

pub type Reply<B> = (StatusCode, Json<B>);

/// 201 with the stored row.
pub fn created<T: Serialize>(data: T) -> Reply<Envelope<T>> {
    (StatusCode::CREATED, Json(Envelope { data }))
}

pub fn ok<T: Serialize>(data: T) -> Reply<Envelope<T>> {
    (StatusCode::OK, Json(Envelope { data }))
}

pub fn listed<T: Serialize>(data: Vec<T>) -> Reply<Listing<T>> {
    let meta = ListingMeta { count: data.len() };
    (StatusCode::OK, Json(Listing { data, meta }))
}
