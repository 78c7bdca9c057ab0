use super::{non_negative, put, OrderSummary, Values, ORDER_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct Payments;

const COLUMNS: &[Column] = &[
    col("payment_id", "int4"),
    col("amount", "numeric"),
    col("method", "varchar"),
    col("paid_at", "timestamptz"),
    col("order_id", "int4"),
];

const INCLUDES: &[Include] = &[Include::to_one("order", "customer_order", ORDER_SUMMARY, "order_id", "order_id")];

#[derive(Debug, Serialize, FromRow)]
pub struct Payment {
    pub payment_id: i32,
    pub amount: Decimal,
    pub method: String,
    pub paid_at: DateTime<Utc>,
    pub order_id: i32,
    pub order: Option<Json<OrderSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPayment {
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    /// e.g. "cash", "card", "voucher"
    #[validate(length(min = 1, max = 20))]
    pub method: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PaymentPatch {
    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,
    #[validate(length(min = 1, max = 20))]
    pub method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_id: Option<i32>,
}

impl Resource for Payments {
    const PATH: &'static str = "payment";
    const LABEL: &'static str = "Payment";
    const META: EntityMeta = EntityMeta {
        table: "payment",
        pk: &["payment_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = Payment;
    type Create = NewPayment;
    type Patch = PaymentPatch;

    fn insert_values(input: NewPayment) -> Values {
        let mut v: Values = vec![
            ("amount", input.amount.into()),
            ("method", input.method.into()),
            ("order_id", input.order_id.into()),
        ];
        put(&mut v, "paid_at", input.paid_at);
        v
    }

    fn patch_values(patch: PaymentPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "amount", patch.amount);
        put(&mut v, "method", patch.method);
        put(&mut v, "paid_at", patch.paid_at);
        put(&mut v, "order_id", patch.order_id);
        v
    }
}
