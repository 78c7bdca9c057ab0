use super::{nullable, put, RoomSummary, Values, ROOM_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct CorporateEvents;

const COLUMNS: &[Column] = &[
    col("event_id", "int4"),
    col("name", "varchar"),
    col("description", "text"),
    col("event_date", "date"),
    col("event_time", "time"),
    col("room_id", "int4"),
];

const INCLUDES: &[Include] = &[Include::to_one("room", "function_room", ROOM_SUMMARY, "room_id", "room_id")];

#[derive(Debug, Serialize, FromRow)]
pub struct CorporateEvent {
    pub event_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub room_id: Option<i32>,
    pub room: Option<Json<RoomSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewCorporateEvent {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub room_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CorporateEventPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub event_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "nullable")]
    pub room_id: Option<Option<i32>>,
}

impl Resource for CorporateEvents {
    const PATH: &'static str = "corporate-event";
    const LABEL: &'static str = "Corporate event";
    const META: EntityMeta = EntityMeta {
        table: "corporate_event",
        pk: &["event_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = CorporateEvent;
    type Create = NewCorporateEvent;
    type Patch = CorporateEventPatch;

    fn insert_values(input: NewCorporateEvent) -> Values {
        vec![
            ("name", input.name.into()),
            ("description", input.description.into()),
            ("event_date", input.event_date.into()),
            ("event_time", input.event_time.into()),
            ("room_id", input.room_id.into()),
        ]
    }

    fn patch_values(patch: CorporateEventPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "name", patch.name);
        put(&mut v, "description", patch.description);
        put(&mut v, "event_date", patch.event_date);
        put(&mut v, "event_time", patch.event_time);
        put(&mut v, "room_id", patch.room_id);
        v
    }
}
