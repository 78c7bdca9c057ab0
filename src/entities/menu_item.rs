use super::{non_negative, put, AllergenSummary, Values, ALLERGEN_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include, Via};
use crate::resource::Resource;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct MenuItems;

const COLUMNS: &[Column] = &[
    col("menu_item_id", "int4"),
    col("name", "varchar"),
    col("description", "text"),
    col("price", "numeric"),
    col("available", "bool"),
];

const INCLUDES: &[Include] = &[Include::to_many(
    "allergens",
    "allergen",
    ALLERGEN_SUMMARY,
    "menu_item_id",
    "allergen_id",
)
.through(Via {
    table: "menu_item_allergen",
    near_key: "menu_item_id",
    far_key: "allergen_id",
})];

#[derive(Debug, Serialize, FromRow)]
pub struct MenuItem {
    pub menu_item_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub available: bool,
    pub allergens: Json<Vec<AllergenSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewMenuItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MenuItemPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
    pub available: Option<bool>,
}

impl Resource for MenuItems {
    const PATH: &'static str = "menu-item";
    const LABEL: &'static str = "Menu item";
    const META: EntityMeta = EntityMeta {
        table: "menu_item",
        pk: &["menu_item_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = MenuItem;
    type Create = NewMenuItem;
    type Patch = MenuItemPatch;

    fn insert_values(input: NewMenuItem) -> Values {
        let mut v: Values = vec![("name", input.name.into()), ("price", input.price.into())];
        put(&mut v, "description", input.description);
        put(&mut v, "available", input.available);
        v
    }

    fn patch_values(patch: MenuItemPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "name", patch.name);
        put(&mut v, "description", patch.description);
        put(&mut v, "price", patch.price);
        put(&mut v, "available", patch.available);
        v
    }
}
