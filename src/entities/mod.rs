//! Entity definitions: table metadata, read rows, create payloads and sparse patches.
//!
//! Patch fields for nullable columns are `Option<Option<T>>`: absent leaves the column alone,
//! `null` clears it.

mod allergen;
mod corporate_event;
mod customer;
mod dining_table;
mod function_room;
mod loyalty_account;
mod meal_plan;
mod meal_plan_line;
mod menu_item;
mod menu_item_allergen;
mod notification;
mod order;
mod order_line;
mod payment;
mod reservation;
mod review;
mod summary;

pub use allergen::*;
pub use corporate_event::*;
pub use customer::*;
pub use dining_table::*;
pub use function_room::*;
pub use loyalty_account::*;
pub use meal_plan::*;
pub use meal_plan_line::*;
pub use menu_item::*;
pub use menu_item_allergen::*;
pub use notification::*;
pub use order::*;
pub use order_line::*;
pub use payment::*;
pub use reservation::*;
pub use review::*;
pub use summary::*;

use crate::sql::PgBindValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Column values for one write.
pub type Values = Vec<(&'static str, PgBindValue)>;

/// Push `column = value` when the field was supplied.
pub(crate) fn put<T: Into<PgBindValue>>(out: &mut Values, column: &'static str, value: Option<T>) {
    if let Some(v) = value {
        out.push((column, v.into()));
    }
}

/// Deserialize a present field into `Some(value)`, keeping an explicit `null` as `Some(None)`.
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("range").with_message("must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"note":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"note":"window seat"}"#).unwrap();
        assert_eq!(absent.note, None);
        assert_eq!(null.note, Some(None));
        assert_eq!(set.note, Some(Some("window seat".into())));
    }

    #[test]
    fn explicit_null_binds_as_sql_null() {
        let mut values = Values::new();
        put(&mut values, "note", Some(Option::<String>::None));
        put(&mut values, "skipped", Option::<String>::None);
        assert_eq!(values, vec![("note", PgBindValue::Null)]);
    }

    #[test]
    fn negative_amounts_fail() {
        assert!(non_negative(&Decimal::new(-1, 2)).is_err());
        assert!(non_negative(&Decimal::ZERO).is_ok());
    }

    #[test]
    fn money_patches_reject_negative_values() {
        let order: OrderPatch = serde_json::from_str(r#"{"total_amount": "-0.01"}"#).unwrap();
        assert!(order.validate().is_err());
        let line: OrderLinePatch = serde_json::from_str(r#"{"unit_price": "-2"}"#).unwrap();
        assert!(line.validate().is_err());
        let payment: PaymentPatch = serde_json::from_str(r#"{"amount": "-10.00"}"#).unwrap();
        assert!(payment.validate().is_err());
        let payment: PaymentPatch = serde_json::from_str(r#"{"amount": "10.00"}"#).unwrap();
        assert!(payment.validate().is_ok());
    }
}
