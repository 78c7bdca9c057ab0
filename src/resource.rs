//! The contract an entity fulfils to be served by the generic CRUD handlers.

use crate::auth::Role;
use crate::model::EntityMeta;
use crate::sql::PgBindValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgRow;
use validator::Validate;

/// Primary key extracted from the item path. Single-column keys use `i32`; association
/// tables use a tuple with one element per key column, in `EntityMeta::pk` order.
pub trait PrimaryKey: DeserializeOwned + Send + Sync + 'static {
    fn bind_values(&self) -> Vec<PgBindValue>;
    /// Human readable form for messages.
    fn describe(&self) -> String;
}

impl PrimaryKey for i32 {
    fn bind_values(&self) -> Vec<PgBindValue> {
        vec![(*self).into()]
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl PrimaryKey for (i32, i32) {
    fn bind_values(&self) -> Vec<PgBindValue> {
        vec![self.0.into(), self.1.into()]
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.0, self.1)
    }
}

/// An entity served under `/{PATH}` and `/{PATH}/{key...}`.
pub trait Resource: Send + Sync + 'static {
    /// Route segment, e.g. "menu-item".
    const PATH: &'static str;
    /// Label used in not-found messages, e.g. "Menu item".
    const LABEL: &'static str;
    const META: EntityMeta;

    type Id: PrimaryKey;
    /// Read representation; column names and include names map onto fields.
    type Row: for<'r> sqlx::FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static;
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Patch: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Column values for an INSERT. Omitted columns take their database default.
    fn insert_values(input: Self::Create) -> Vec<(&'static str, PgBindValue)>;

    /// Column values for an UPDATE: only fields present in the patch.
    fn patch_values(patch: Self::Patch) -> Vec<(&'static str, PgBindValue)>;
}

/// Roles allowed for one operation. `None` admits any authenticated caller.
pub type Gate = Option<&'static [Role]>;

/// Per-operation role gates for a resource.
#[derive(Clone, Copy, Debug)]
pub struct AccessPolicy {
    pub list: Gate,
    pub create: Gate,
    pub read: Gate,
    pub update: Gate,
    pub delete: Gate,
}

impl AccessPolicy {
    /// Every operation restricted to the given roles.
    pub const fn only(roles: &'static [Role]) -> Self {
        AccessPolicy {
            list: Some(roles),
            create: Some(roles),
            read: Some(roles),
            update: Some(roles),
            delete: Some(roles),
        }
    }

    /// Reads open to any authenticated caller, writes restricted to `writers`.
    pub const fn read_any_write(writers: &'static [Role]) -> Self {
        AccessPolicy {
            list: None,
            create: Some(writers),
            read: None,
            update: Some(writers),
            delete: Some(writers),
        }
    }
}

/// Item route suffix from the key columns: "/:menu_item_id/:allergen_id".
pub fn item_path(meta: &EntityMeta) -> String {
    meta.pk.iter().map(|c| format!("/:{}", c)).collect()
}
