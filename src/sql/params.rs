//! Values bound to generated statements.
//!
//! Every value travels as text and the placeholder carries an explicit cast to the
//! column type (`$1::int4`), so one parameter type covers every column, including NULLs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
}

impl PgBindValue {
    /// Text form sent to PostgreSQL, `None` for NULL.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PgBindValue::Null => None,
            PgBindValue::Bool(b) => Some(b.to_string()),
            PgBindValue::Int(n) => Some(n.to_string()),
            PgBindValue::Decimal(d) => Some(d.to_string()),
            PgBindValue::Text(s) => Some(s.clone()),
            PgBindValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            PgBindValue::Time(t) => Some(t.format("%H:%M:%S%.f").to_string()),
            PgBindValue::Timestamp(ts) => Some(ts.to_rfc3339()),
            PgBindValue::Uuid(u) => Some(u.to_string()),
        }
    }
}

impl From<bool> for PgBindValue {
    fn from(v: bool) -> Self {
        PgBindValue::Bool(v)
    }
}

impl From<i32> for PgBindValue {
    fn from(v: i32) -> Self {
        PgBindValue::Int(v.into())
    }
}

impl From<i64> for PgBindValue {
    fn from(v: i64) -> Self {
        PgBindValue::Int(v)
    }
}

impl From<Decimal> for PgBindValue {
    fn from(v: Decimal) -> Self {
        PgBindValue::Decimal(v)
    }
}

impl From<String> for PgBindValue {
    fn from(v: String) -> Self {
        PgBindValue::Text(v)
    }
}

impl From<&str> for PgBindValue {
    fn from(v: &str) -> Self {
        PgBindValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for PgBindValue {
    fn from(v: NaiveDate) -> Self {
        PgBindValue::Date(v)
    }
}

impl From<NaiveTime> for PgBindValue {
    fn from(v: NaiveTime) -> Self {
        PgBindValue::Time(v)
    }
}

impl From<DateTime<Utc>> for PgBindValue {
    fn from(v: DateTime<Utc>) -> Self {
        PgBindValue::Timestamp(v)
    }
}

impl From<uuid::Uuid> for PgBindValue {
    fn from(v: uuid::Uuid) -> Self {
        PgBindValue::Uuid(v)
    }
}

impl<T: Into<PgBindValue>> From<Option<T>> for PgBindValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(PgBindValue::Null)
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self.as_text() {
            None => Ok(IsNull::Yes),
            Some(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
        }
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
