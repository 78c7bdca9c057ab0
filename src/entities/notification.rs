use super::{nullable, put, Values};
use crate::model::{col, Column, EntityMeta};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub struct Notifications;

const COLUMNS: &[Column] = &[
    col("notification_id", "int4"),
    col("kind", "varchar"),
    col("sent_at", "timestamptz"),
    col("body", "text"),
    col("reservation_id", "int4"),
    col("order_id", "int4"),
];

#[derive(Debug, Serialize, FromRow)]
pub struct Notification {
    pub notification_id: i32,
    pub kind: String,
    pub sent_at: DateTime<Utc>,
    pub body: String,
    pub reservation_id: Option<i32>,
    pub order_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewNotification {
    /// Delivery channel, e.g. "email" or "sms".
    #[validate(length(min = 1, max = 20))]
    pub kind: String,
    pub sent_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub body: String,
    pub reservation_id: Option<i32>,
    pub order_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NotificationPatch {
    #[validate(length(min = 1, max = 20))]
    pub kind: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub reservation_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub order_id: Option<Option<i32>>,
}

impl Resource for Notifications {
    const PATH: &'static str = "notification";
    const LABEL: &'static str = "Notification";
    const META: EntityMeta = EntityMeta {
        table: "notification",
        pk: &["notification_id"],
        columns: COLUMNS,
        includes: &[],
    };

    type Id = i32;
    type Row = Notification;
    type Create = NewNotification;
    type Patch = NotificationPatch;

    fn insert_values(input: NewNotification) -> Values {
        let mut v: Values = vec![
            ("kind", input.kind.into()),
            ("body", input.body.into()),
            ("reservation_id", input.reservation_id.into()),
            ("order_id", input.order_id.into()),
        ];
        put(&mut v, "sent_at", input.sent_at);
        v
    }

    fn patch_values(patch: NotificationPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "kind", patch.kind);
        put(&mut v, "sent_at", patch.sent_at);
        put(&mut v, "body", patch.body);
        put(&mut v, "reservation_id", patch.reservation_id);
        put(&mut v, "order_id", patch.order_id);
        v
    }
}
