use super::{put, MenuItemSummary, Values, MENU_ITEM_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct MealPlanLines;

const COLUMNS: &[Column] = &[
    col("meal_plan_line_id", "int4"),
    col("day", "int4"),
    col("position", "int4"),
    col("meal_plan_id", "int4"),
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
pub struct MealPlanLine {
    pub meal_plan_line_id: i32,
    /// ISO weekday, 1 = Monday.
    pub day: i32,
    pub position: i32,
    pub meal_plan_id: i32,
    pub menu_item_id: i32,
    pub menu_item: Option<Json<MenuItemSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewMealPlanLine {
    #[validate(range(min = 1, max = 7, message = "must be between 1 and 7"))]
    pub day: i32,
    #[validate(range(min = 1, message = "must be positive"))]
    pub position: Option<i32>,
    pub meal_plan_id: i32,
    pub menu_item_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MealPlanLinePatch {
    #[validate(range(min = 1, max = 7, message = "must be between 1 and 7"))]
    pub day: Option<i32>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub position: Option<i32>,
    pub menu_item_id: Option<i32>,
}

impl Resource for MealPlanLines {
    const PATH: &'static str = "meal-plan-line";
    const LABEL: &'static str = "Meal plan line";
    const META: EntityMeta = EntityMeta {
        table: "meal_plan_line",
        pk: &["meal_plan_line_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = MealPlanLine;
    type Create = NewMealPlanLine;
    type Patch = MealPlanLinePatch;

    fn insert_values(input: NewMealPlanLine) -> Values {
        let mut v: Values = vec![
            ("day", input.day.into()),
            ("meal_plan_id", input.meal_plan_id.into()),
            ("menu_item_id", input.menu_item_id.into()),
        ];
        put(&mut v, "position", input.position);
        v
    }

    fn patch_values(patch: MealPlanLinePatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "day", patch.day);
        put(&mut v, "position", patch.position);
        put(&mut v, "menu_item_id", patch.menu_item_id);
        v
    }
}
