use super::{
    nullable, put, CustomerSummary, RoomSummary, TableSummary, Values, CUSTOMER_SUMMARY, ROOM_SUMMARY,
    TABLE_SUMMARY,
};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub struct Reservations;

const COLUMNS: &[Column] = &[
    col("reservation_id", "int4"),
    col("reserved_at", "timestamptz"),
    col("party_size", "int4"),
    col("status", "varchar"),
    col("discount", "numeric"),
    col("customer_id", "int4"),
    col("table_id", "int4"),
    col("room_id", "int4"),
];

const INCLUDES: &[Include] = &[
    Include::to_one("customer", "customer", CUSTOMER_SUMMARY, "customer_id", "customer_id"),
    Include::to_one("table", "dining_table", TABLE_SUMMARY, "table_id", "table_id"),
    Include::to_one("room", "function_room", ROOM_SUMMARY, "room_id", "room_id"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct Reservation {
    pub reservation_id: i32,
    pub reserved_at: DateTime<Utc>,
    pub party_size: i32,
    pub status: String,
    pub discount: Option<Decimal>,
    pub customer_id: Option<i32>,
    pub table_id: Option<i32>,
    pub room_id: Option<i32>,
    pub customer: Option<Json<CustomerSummary>>,
    pub table: Option<Json<TableSummary>>,
    pub room: Option<Json<RoomSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "requires_table_or_room"))]
pub struct NewReservation {
    pub reserved_at: DateTime<Utc>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub party_size: i32,
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    pub discount: Option<Decimal>,
    pub customer_id: Option<i32>,
    pub table_id: Option<i32>,
    pub room_id: Option<i32>,
}

fn requires_table_or_room(r: &NewReservation) -> Result<(), ValidationError> {
    if r.table_id.is_none() && r.room_id.is_none() {
        return Err(ValidationError::new("place")
            .with_message("a reservation needs a table_id or a room_id".into()));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReservationPatch {
    pub reserved_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub party_size: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub discount: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub table_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub room_id: Option<Option<i32>>,
}

impl Resource for Reservations {
    const PATH: &'static str = "reservation";
    const LABEL: &'static str = "Reservation";
    const META: EntityMeta = EntityMeta {
        table: "reservation",
        pk: &["reservation_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = Reservation;
    type Create = NewReservation;
    type Patch = ReservationPatch;

    fn insert_values(input: NewReservation) -> Values {
        let mut v: Values = vec![
            ("reserved_at", input.reserved_at.into()),
            ("party_size", input.party_size.into()),
            ("discount", input.discount.into()),
            ("customer_id", input.customer_id.into()),
            ("table_id", input.table_id.into()),
            ("room_id", input.room_id.into()),
        ];
        put(&mut v, "status", input.status);
        v
    }

    fn patch_values(patch: ReservationPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "reserved_at", patch.reserved_at);
        put(&mut v, "party_size", patch.party_size);
        put(&mut v, "status", patch.status);
        put(&mut v, "discount", patch.discount);
        put(&mut v, "customer_id", patch.customer_id);
        put(&mut v, "table_id", patch.table_id);
        put(&mut v, "room_id", patch.room_id);
        v
    }
}
