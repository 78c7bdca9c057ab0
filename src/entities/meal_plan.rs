use super::{put, MealPlanLineSummary, Values, MEAL_PLAN_LINE_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub struct MealPlans;

const COLUMNS: &[Column] = &[
    col("meal_plan_id", "int4"),
    col("name", "varchar"),
    col("valid_from", "date"),
    col("valid_to", "date"),
];

const INCLUDES: &[Include] = &[Include::to_many(
    "lines",
    "meal_plan_line",
    MEAL_PLAN_LINE_SUMMARY,
    "meal_plan_id",
    "meal_plan_id",
)];

#[derive(Debug, Serialize, FromRow)]
pub struct MealPlan {
    pub meal_plan_id: i32,
    pub name: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub lines: Json<Vec<MealPlanLineSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validity_is_ordered"))]
pub struct NewMealPlan {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

fn validity_is_ordered(plan: &NewMealPlan) -> Result<(), ValidationError> {
    if plan.valid_to < plan.valid_from {
        return Err(ValidationError::new("validity").with_message("valid_to must not precede valid_from".into()));
    }
    Ok(())
}

/// Ordering of a partially updated window is enforced by the table constraint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MealPlanPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl Resource for MealPlans {
    const PATH: &'static str = "meal-plan";
    const LABEL: &'static str = "Meal plan";
    const META: EntityMeta = EntityMeta {
        table: "meal_plan",
        pk: &["meal_plan_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = MealPlan;
    type Create = NewMealPlan;
    type Patch = MealPlanPatch;

    fn insert_values(input: NewMealPlan) -> Values {
        vec![
            ("name", input.name.into()),
            ("valid_from", input.valid_from.into()),
            ("valid_to", input.valid_to.into()),
        ]
    }

    fn patch_values(patch: MealPlanPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "name", patch.name);
        put(&mut v, "valid_from", patch.valid_from);
        put(&mut v, "valid_to", patch.valid_to);
        v
    }
}
