use super::{nullable, put, EventSummary, Values, EVENT_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct FunctionRooms;

const COLUMNS: &[Column] = &[
    col("room_id", "int4"),
    col("name", "varchar"),
    col("capacity", "int4"),
    col("description", "text"),
];

const INCLUDES: &[Include] = &[Include::to_many(
    "events",
    "corporate_event",
    EVENT_SUMMARY,
    "room_id",
    "room_id",
)];

#[derive(Debug, Serialize, FromRow)]
pub struct FunctionRoom {
    pub room_id: i32,
    pub name: String,
    pub capacity: i32,
    pub description: Option<String>,
    pub events: Json<Vec<EventSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewFunctionRoom {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub capacity: i32,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FunctionRoomPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub capacity: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Resource for FunctionRooms {
    const PATH: &'static str = "function-room";
    const LABEL: &'static str = "Function room";
    const META: EntityMeta = EntityMeta {
        table: "function_room",
        pk: &["room_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = FunctionRoom;
    type Create = NewFunctionRoom;
    type Patch = FunctionRoomPatch;

    fn insert_values(input: NewFunctionRoom) -> Values {
        vec![
            ("name", input.name.into()),
            ("capacity", input.capacity.into()),
            ("description", input.description.into()),
        ]
    }

    fn patch_values(patch: FunctionRoomPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "name", patch.name);
        put(&mut v, "capacity", patch.capacity);
        put(&mut v, "description", patch.description);
        v
    }
}
