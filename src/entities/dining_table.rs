use super::{nullable, put, Values};
use crate::model::{col, Column, EntityMeta};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub struct DiningTables;

const COLUMNS: &[Column] = &[
    col("table_id", "int4"),
    col("number", "int4"),
    col("capacity", "int4"),
    col("description", "text"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct DiningTable {
    pub table_id: i32,
    pub number: i32,
    pub capacity: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewDiningTable {
    #[validate(range(min = 1, message = "must be positive"))]
    pub number: i32,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub capacity: i32,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DiningTablePatch {
    #[validate(range(min = 1, message = "must be positive"))]
    pub number: Option<i32>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub capacity: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Resource for DiningTables {
    const PATH: &'static str = "table";
    const LABEL: &'static str = "Table";
    const META: EntityMeta = EntityMeta {
        table: "dining_table",
        pk: &["table_id"],
        columns: COLUMNS,
        includes: &[],
    };

    type Id = i32;
    type Row = DiningTable;
    type Create = NewDiningTable;
    type Patch = DiningTablePatch;

    fn insert_values(input: NewDiningTable) -> Values {
        vec![
            ("number", input.number.into()),
            ("capacity", input.capacity.into()),
            ("description", input.description.into()),
        ]
    }

    fn patch_values(patch: DiningTablePatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "number", patch.number);
        put(&mut v, "capacity", patch.capacity);
        put(&mut v, "description", patch.description);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_be_positive() {
        let t: NewDiningTable = serde_json::from_str(r#"{"number": 4, "capacity": 0}"#).unwrap();
        let errors = t.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }
}
