//! JSON body extractor that deserializes, then runs `validator` rules.
//!
//! Malformed JSON is a 400. Shape problems (missing or unknown fields, wrong types) and
//! rule violations are a 422 whose details map field names to messages.

use crate::error::{AppError, FieldErrors};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

/// Key used for rules that span several fields.
const SCHEMA_KEY: &str = "_schema";
const BODY_KEY: &str = "body";

#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let value = parse_body::<T>(&bytes)?;
        value
            .validate()
            .map_err(|e| AppError::Validation(field_errors(&e)))?;
        Ok(ValidatedJson(value))
    }
}

pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof | Category::Io => {
            AppError::BadRequest(format!("malformed JSON body: {}", e))
        }
        Category::Data => {
            let mut errors = FieldErrors::new();
            errors
                .entry(field_of(&e.to_string()).unwrap_or_else(|| BODY_KEY.to_string()))
                .or_default()
                .push(strip_position(&e.to_string()));
            AppError::Validation(errors)
        }
    })
}

/// Field named in a serde message such as "missing field `email`".
fn field_of(message: &str) -> Option<String> {
    static FIELD: OnceLock<Option<Regex>> = OnceLock::new();
    FIELD
        .get_or_init(|| Regex::new(r"(?:missing|unknown|duplicate) field `([^`]+)`").ok())
        .as_ref()?
        .captures(message)
        .map(|c| c[1].to_string())
}

fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let key = if field == "__all__" { SCHEMA_KEY.to_string() } else { field.to_string() };
        let messages = out.entry(key).or_default();
        for err in errs.iter() {
            messages.push(
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed rule '{}'", err.code)),
            );
        }
    }
    out
}
