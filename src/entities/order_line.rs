use super::{non_negative, put, MenuItemSummary, Values, MENU_ITEM_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct OrderLines;

const COLUMNS: &[Column] = &[
    col("order_line_id", "int4"),
    col("quantity", "int4"),
    col("unit_price", "numeric"),
    col("order_id", "int4"),
    col("menu_item_id", "int4"),
];

const INCLUDES: &[Include] = &[Include::to_one(
    "menu_item",
    "menu_item",
    MENU_ITEM_SUMMARY,
    "menu_item_id",
    "menu_item_id",
)];

#[derive(Debug, Serialize, FromRow)]
pub struct OrderLine {
    pub order_line_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub menu_item: Option<Json<MenuItemSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewOrderLine {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
    pub order_id: i32,
    pub menu_item_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrderLinePatch {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Option<Decimal>,
    pub menu_item_id: Option<i32>,
}

impl Resource for OrderLines {
    const PATH: &'static str = "order-line";
    const LABEL: &'static str = "Order line";
    const META: EntityMeta = EntityMeta {
        table: "order_line",
        pk: &["order_line_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = OrderLine;
    type Create = NewOrderLine;
    type Patch = OrderLinePatch;

    fn insert_values(input: NewOrderLine) -> Values {
        let mut v: Values = vec![
            ("unit_price", input.unit_price.into()),
            ("order_id", input.order_id.into()),
            ("menu_item_id", input.menu_item_id.into()),
        ];
        put(&mut v, "quantity", input.quantity);
        v
    }

    fn patch_values(patch: OrderLinePatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "quantity", patch.quantity);
        put(&mut v, "unit_price", patch.unit_price);
        put(&mut v, "menu_item_id", patch.menu_item_id);
        v
    }
}
