use super::{nullable, put, Values};
use crate::model::{col, Column, EntityMeta};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub struct Allergens;

const COLUMNS: &[Column] = &[
    col("allergen_id", "int4"),
    col("name", "varchar"),
    col("description", "text"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct Allergen {
    pub allergen_id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewAllergen {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AllergenPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Resource for Allergens {
    const PATH: &'static str = "allergen";
    const LABEL: &'static str = "Allergen";
    const META: EntityMeta = EntityMeta {
        table: "allergen",
        pk: &["allergen_id"],
        columns: COLUMNS,
        includes: &[],
    };

    type Id = i32;
    type Row = Allergen;
    type Create = NewAllergen;
    type Patch = AllergenPatch;

    fn insert_values(input: NewAllergen) -> Values {
        vec![("name", input.name.into()), ("description", input.description.into())]
    }

    fn patch_values(patch: AllergenPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "name", patch.name);
        put(&mut v, "description", patch.description);
        v
    }
}
