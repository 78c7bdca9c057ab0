use super::{put, LoyaltySummary, Values, LOYALTY_SUMMARY};
use crate::auth::Role;
use crate::entities::nullable;
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct Customers;

/// `password_hash` is not listed: only the login query reads it.
const COLUMNS: &[Column] = &[
    col("customer_id", "int4"),
    col("first_name", "varchar"),
    col("last_name", "varchar"),
    col("email", "varchar"),
    col("phone", "varchar"),
    col("role", "varchar"),
    col("created_at", "timestamptz"),
];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub loyalty_account: Option<Json<LoyaltySummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"), length(max = 120))]
    pub email: String,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

/// Public self-registration. Never carries a role.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Registration {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"), length(max = 120))]
    pub email: String,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

impl From<Registration> for NewCustomer {
    fn from(r: Registration) -> Self {
        NewCustomer {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            password: r.password,
            role: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CustomerPatch {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "must be a valid email address"), length(max = 120))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<Option<String>>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

const INCLUDES: &[Include] = &[Include::to_one(
    "loyalty_account",
    "loyalty_account",
    LOYALTY_SUMMARY,
    "customer_id",
    "customer_id",
)];

impl Resource for Customers {
    const PATH: &'static str = "customer";
    const LABEL: &'static str = "Customer";
    const META: EntityMeta = EntityMeta {
        table: "customer",
        pk: &["customer_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = Customer;
    type Create = NewCustomer;
    type Patch = CustomerPatch;

    /// Everything except the password, which the caller hashes into `password_hash`.
    fn insert_values(input: NewCustomer) -> Values {
        let mut v: Values = vec![
            ("first_name", input.first_name.into()),
            ("last_name", input.last_name.into()),
            ("email", input.email.into()),
            ("phone", input.phone.into()),
        ];
        put(&mut v, "role", input.role.map(|r| r.as_str()));
        v
    }

    fn patch_values(patch: CustomerPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "first_name", patch.first_name);
        put(&mut v, "last_name", patch.last_name);
        put(&mut v, "email", patch.email);
        put(&mut v, "phone", patch.phone);
        put(&mut v, "role", patch.role.map(|r| r.as_str()));
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::PgBindValue;

    #[test]
    fn password_never_becomes_a_plain_column() {
        let input: NewCustomer = serde_json::from_value(serde_json::json!({
            "first_name": "Jana",
            "last_name": "Nováková",
            "email": "jana@example.com",
            "password": "tajneheslo1"
        }))
        .unwrap();
        let values = Customers::insert_values(input);
        assert!(values.iter().all(|(c, _)| *c != "password" && *c != "password_hash"));
        assert!(values.contains(&("phone", PgBindValue::Null)));
    }

    #[test]
    fn registration_rejects_a_role() {
        let res: Result<Registration, _> = serde_json::from_value(serde_json::json!({
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.cz",
            "password": "longenough",
            "role": "admin"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn patch_sets_only_supplied_fields() {
        let patch: CustomerPatch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(Customers::patch_values(patch), vec![("phone", PgBindValue::Null)]);
    }

    #[test]
    fn long_phone_is_invalid() {
        let patch: CustomerPatch = serde_json::from_str(r#"{"phone": "123456789012345678901"}"#).unwrap();
        assert!(patch.validate().is_err());
    }
}
