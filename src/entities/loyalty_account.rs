use super::{put, CustomerSummary, Values, CUSTOMER_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct LoyaltyAccounts;

const COLUMNS: &[Column] = &[
    col("account_id", "int4"),
    col("points", "int4"),
    col("opened_on", "date"),
    col("customer_id", "int4"),
];

const INCLUDES: &[Include] = &[Include::to_one(
    "customer",
    "customer",
    CUSTOMER_SUMMARY,
    "customer_id",
    "customer_id",
)];

#[derive(Debug, Serialize, FromRow)]
pub struct LoyaltyAccount {
    pub account_id: i32,
    pub points: i32,
    pub opened_on: NaiveDate,
    pub customer_id: i32,
    pub customer: Option<Json<CustomerSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewLoyaltyAccount {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub points: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub customer_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoyaltyAccountPatch {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub points: Option<i32>,
    pub opened_on: Option<NaiveDate>,
}

impl Resource for LoyaltyAccounts {
    const PATH: &'static str = "loyalty-account";
    const LABEL: &'static str = "Loyalty account";
    const META: EntityMeta = EntityMeta {
        table: "loyalty_account",
        pk: &["account_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = LoyaltyAccount;
    type Create = NewLoyaltyAccount;
    type Patch = LoyaltyAccountPatch;

    fn insert_values(input: NewLoyaltyAccount) -> Values {
        let mut v: Values = vec![("customer_id", input.customer_id.into())];
        put(&mut v, "points", input.points);
        put(&mut v, "opened_on", input.opened_on);
        v
    }

    fn patch_values(patch: LoyaltyAccountPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "points", patch.points);
        put(&mut v, "opened_on", patch.opened_on);
        v
    }
}
