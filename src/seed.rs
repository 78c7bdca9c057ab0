//! Demo data for local development. Wipes every table first.

use crate::auth::Role;
use crate::entities::*;
use crate::error::AppError;
use crate::migration::truncate_all;
use crate::service::{CrudService, CustomerService};
use chrono::{Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

pub const ADMIN_EMAIL: &str = "admin@restaurant.local";
pub const STAFF_EMAIL: &str = "staff@restaurant.local";
pub const DEMO_PASSWORD: &str = "change-me-please";

fn account(first: &str, last: &str, email: &str, role: Role) -> NewCustomer {
    NewCustomer {
        first_name: first.into(),
        last_name: last.into(),
        email: email.into(),
        phone: None,
        password: DEMO_PASSWORD.into(),
        role: Some(role),
    }
}

/// Counts of what `seed` inserted, for the log line.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub customers: usize,
    pub tables: usize,
    pub menu_items: usize,
    pub reservations: usize,
    pub orders: usize,
}

pub async fn seed(pool: &PgPool) -> Result<SeedReport, AppError> {
    truncate_all(pool).await?;
    let mut report = SeedReport::default();

    CustomerService::create(pool, account("Ada", "Admin", ADMIN_EMAIL, Role::Admin)).await?;
    CustomerService::create(pool, account("Sam", "Staff", STAFF_EMAIL, Role::Staff)).await?;
    let mut guests = Vec::new();
    for (first, last) in [("Grace", "Hopper"), ("Alan", "Turing"), ("Edsger", "Dijkstra")] {
        let email = format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase());
        let c = CustomerService::create(pool, account(first, last, &email, Role::Customer)).await?;
        guests.push(c.customer_id);
    }
    report.customers = guests.len() + 2;

    let mut tables = Vec::new();
    for (number, capacity) in [(1, 2), (2, 4), (3, 4), (4, 6), (5, 8)] {
        let t = CrudService::<DiningTables>::create(
            pool,
            NewDiningTable {
                number,
                capacity,
                description: None,
            },
        )
        .await?;
        tables.push(t.table_id);
    }
    report.tables = tables.len();

    let room = CrudService::<FunctionRooms>::create(
        pool,
        NewFunctionRoom {
            name: "Garden Room".into(),
            capacity: 40,
            description: Some("Private room overlooking the courtyard".into()),
        },
    )
    .await?;

    let today = Utc::now().date_naive();
    CrudService::<CorporateEvents>::create(
        pool,
        NewCorporateEvent {
            name: "Quarterly offsite dinner".into(),
            description: None,
            event_date: today + Duration::days(14),
            event_time: NaiveTime::from_hms_opt(19, 0, 0),
            room_id: Some(room.room_id),
        },
    )
    .await?;

    let mut allergens = Vec::new();
    for name in ["Gluten", "Dairy", "Nuts", "Shellfish"] {
        let a = CrudService::<Allergens>::create(
            pool,
            NewAllergen {
                name: name.into(),
                description: None,
            },
        )
        .await?;
        allergens.push(a.allergen_id);
    }

    let mut menu = Vec::new();
    for (name, cents, tagged) in [
        ("Sourdough and butter", 650, &[0usize, 1][..]),
        ("Prawn linguine", 1850, &[0, 3][..]),
        ("Roast squash salad", 1200, &[2][..]),
        ("Chocolate torte", 850, &[0, 1, 2][..]),
    ] {
        let item = CrudService::<MenuItems>::create(
            pool,
            NewMenuItem {
                name: name.into(),
                description: None,
                price: Decimal::new(cents, 2),
                available: Some(true),
            },
        )
        .await?;
        for &i in tagged {
            CrudService::<MenuItemAllergens>::create(
                pool,
                NewMenuItemAllergen {
                    menu_item_id: item.menu_item_id,
                    allergen_id: allergens[i],
                },
            )
            .await?;
        }
        menu.push((item.menu_item_id, Decimal::new(cents, 2)));
    }
    report.menu_items = menu.len();

    let plan = CrudService::<MealPlans>::create(
        pool,
        NewMealPlan {
            name: "Winter set menu".into(),
            valid_from: today,
            valid_to: today + Duration::days(90),
        },
    )
    .await?;
    for (day, (menu_item_id, _)) in (1..=menu.len() as i32).zip(&menu) {
        CrudService::<MealPlanLines>::create(
            pool,
            NewMealPlanLine {
                day,
                position: Some(1),
                meal_plan_id: plan.meal_plan_id,
                menu_item_id: *menu_item_id,
            },
        )
        .await?;
    }

    for (i, &customer_id) in guests.iter().enumerate() {
        let reservation = CrudService::<Reservations>::create(
            pool,
            NewReservation {
                reserved_at: Utc::now() + Duration::days(i as i64 + 1),
                party_size: 2,
                status: None,
                discount: None,
                customer_id: Some(customer_id),
                table_id: Some(tables[i % tables.len()]),
                room_id: None,
            },
        )
        .await?;
        report.reservations += 1;

        CrudService::<Notifications>::create(
            pool,
            NewNotification {
                kind: "email".into(),
                sent_at: None,
                body: "Your table is booked.".into(),
                reservation_id: Some(reservation.reservation_id),
                order_id: None,
            },
        )
        .await?;

        let (menu_item_id, unit_price) = menu[i % menu.len()];
        let quantity = 2;
        let total = unit_price * Decimal::from(quantity);
        let order = CrudService::<Orders>::create(
            pool,
            NewOrder {
                ordered_at: None,
                status: None,
                total_amount: total,
                customer_id: Some(customer_id),
            },
        )
        .await?;
        CrudService::<OrderLines>::create(
            pool,
            NewOrderLine {
                quantity: Some(quantity),
                unit_price,
                order_id: order.order_id,
                menu_item_id,
            },
        )
        .await?;
        CrudService::<Payments>::create(
            pool,
            NewPayment {
                amount: total,
                method: "card".into(),
                paid_at: None,
                order_id: order.order_id,
            },
        )
        .await?;
        CrudService::<Reviews>::create(
            pool,
            NewReview {
                rating: 5 - i as i32 % 3,
                comment: Some("Lovely evening".into()),
                reviewed_at: None,
                order_id: Some(order.order_id),
                customer_id: Some(customer_id),
            },
        )
        .await?;
        report.orders += 1;
    }

    tracing::info!(?report, "seed complete");
    Ok(report)
}
