//! Association between menu items and allergens, keyed by both foreign keys.

use super::{put, AllergenSummary, MenuItemSummary, Values, ALLERGEN_SUMMARY, MENU_ITEM_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct MenuItemAllergens;

const COLUMNS: &[Column] = &[col("menu_item_id", "int4"), col("allergen_id", "int4")];

const INCLUDES: &[Include] = &[
    Include::to_one("menu_item", "menu_item", MENU_ITEM_SUMMARY, "menu_item_id", "menu_item_id"),
    Include::to_one("allergen", "allergen", ALLERGEN_SUMMARY, "allergen_id", "allergen_id"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct MenuItemAllergen {
    pub menu_item_id: i32,
    pub allergen_id: i32,
    pub menu_item: Option<Json<MenuItemSummary>>,
    pub allergen: Option<Json<AllergenSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewMenuItemAllergen {
    pub menu_item_id: i32,
    pub allergen_id: i32,
}

/// Re-pointing either half of the key moves the association.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MenuItemAllergenPatch {
    pub menu_item_id: Option<i32>,
    pub allergen_id: Option<i32>,
}

impl Resource for MenuItemAllergens {
    const PATH: &'static str = "menu-item-allergen";
    const LABEL: &'static str = "Menu item allergen";
    const META: EntityMeta = EntityMeta {
        table: "menu_item_allergen",
        pk: &["menu_item_id", "allergen_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = (i32, i32);
    type Row = MenuItemAllergen;
    type Create = NewMenuItemAllergen;
    type Patch = MenuItemAllergenPatch;

    fn insert_values(input: NewMenuItemAllergen) -> Values {
        vec![
            ("menu_item_id", input.menu_item_id.into()),
            ("allergen_id", input.allergen_id.into()),
        ]
    }

    fn patch_values(patch: MenuItemAllergenPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "menu_item_id", patch.menu_item_id);
        put(&mut v, "allergen_id", patch.allergen_id);
        v
    }
}
