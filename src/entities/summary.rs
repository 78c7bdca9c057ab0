//! Summary projections embedded one level deep in read rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub const CUSTOMER_SUMMARY: &[&str] = &["customer_id", "first_name", "last_name", "email"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltySummary {
    pub account_id: i32,
    pub points: i32,
    pub opened_on: NaiveDate,
}

pub const LOYALTY_SUMMARY: &[&str] = &["account_id", "points", "opened_on"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_id: i32,
    pub number: i32,
    pub capacity: i32,
}

pub const TABLE_SUMMARY: &[&str] = &["table_id", "number", "capacity"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: i32,
    pub name: String,
    pub capacity: i32,
}

pub const ROOM_SUMMARY: &[&str] = &["room_id", "name", "capacity"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: i32,
    pub name: String,
    pub event_date: NaiveDate,
}

pub const EVENT_SUMMARY: &[&str] = &["event_id", "name", "event_date"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemSummary {
    pub menu_item_id: i32,
    pub name: String,
    pub price: Decimal,
}

pub const MENU_ITEM_SUMMARY: &[&str] = &["menu_item_id", "name", "price"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenSummary {
    pub allergen_id: i32,
    pub name: String,
}

pub const ALLERGEN_SUMMARY: &[&str] = &["allergen_id", "name"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i32,
    pub status: String,
    pub total_amount: Decimal,
}

pub const ORDER_SUMMARY: &[&str] = &["order_id", "status", "total_amount"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineSummary {
    pub order_line_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

pub const ORDER_LINE_SUMMARY: &[&str] = &["order_line_id", "menu_item_id", "quantity", "unit_price"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanLineSummary {
    pub meal_plan_line_id: i32,
    pub day: i32,
    pub position: i32,
    pub menu_item_id: i32,
}

pub const MEAL_PLAN_LINE_SUMMARY: &[&str] = &["meal_plan_line_id", "day", "position", "menu_item_id"];
