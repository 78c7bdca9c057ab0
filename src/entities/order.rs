use super::{
    non_negative, nullable, put, CustomerSummary, OrderLineSummary, Values, CUSTOMER_SUMMARY, ORDER_LINE_SUMMARY,
};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct Orders;

const COLUMNS: &[Column] = &[
    col("order_id", "int4"),
    col("ordered_at", "timestamptz"),
    col("status", "varchar"),
    col("total_amount", "numeric"),
    col("customer_id", "int4"),
];

const INCLUDES: &[Include] = &[
    Include::to_one("customer", "customer", CUSTOMER_SUMMARY, "customer_id", "customer_id"),
    Include::to_many("lines", "order_line", ORDER_LINE_SUMMARY, "order_id", "order_id"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct Order {
    pub order_id: i32,
    pub ordered_at: DateTime<Utc>,
    pub status: String,
    pub total_amount: Decimal,
    pub customer_id: Option<i32>,
    pub customer: Option<Json<CustomerSummary>>,
    pub lines: Json<Vec<OrderLineSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewOrder {
    pub ordered_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub total_amount: Decimal,
    pub customer_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrderPatch {
    pub ordered_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i32>>,
}

impl Resource for Orders {
    const PATH: &'static str = "order";
    const LABEL: &'static str = "Order";
    const META: EntityMeta = EntityMeta {
        table: "customer_order",
        pk: &["order_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = Order;
    type Create = NewOrder;
    type Patch = OrderPatch;

    fn insert_values(input: NewOrder) -> Values {
        let mut v: Values = vec![
            ("total_amount", input.total_amount.into()),
            ("customer_id", input.customer_id.into()),
        ];
        put(&mut v, "ordered_at", input.ordered_at);
        put(&mut v, "status", input.status);
        v
    }

    fn patch_values(patch: OrderPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "ordered_at", patch.ordered_at);
        put(&mut v, "status", patch.status);
        put(&mut v, "total_amount", patch.total_amount);
        put(&mut v, "customer_id", patch.customer_id);
        v
    }
}
