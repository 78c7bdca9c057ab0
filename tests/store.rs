//! Database-backed behaviour. Needs a live server: `DATABASE_URL=... cargo test -- --ignored`.

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use restaurant_api::auth::{JwtConfig, TokenKind};
use restaurant_api::entities::{
    CustomerPatch, Customers, DiningTables, NewCustomer, NewDiningTable, NewOrder, NewReservation, Orders,
    Reservations,
};
use restaurant_api::service::{ListQuery, LoginRequest};
use restaurant_api::{
    app, apply_migrations, AppConfig, AppError, AppState, CrudService, CustomerService, IdentityService, JwtService,
    MemoryRevocationStore, Role,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

const SECRET: &str = "store-test-secret-long-enough-for-hs256";

fn state(pool: PgPool) -> AppState {
    let jwt = JwtService::new(JwtConfig {
        secret: SECRET.into(),
        issuer: "restaurant-api".into(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    });
    AppState::new(pool, jwt, Arc::new(MemoryRevocationStore::new()))
}

fn new_customer(email: &str) -> NewCustomer {
    NewCustomer {
        first_name: "Test".into(),
        last_name: "Customer".into(),
        email: email.into(),
        phone: None,
        password: "correct-horse-battery".into(),
        role: None,
    }
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn new_customer_gets_an_empty_loyalty_account(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let customer = CustomerService::create(&pool, new_customer("a@example.com")).await.unwrap();

    let (points, opened_on): (i32, chrono::NaiveDate) =
        sqlx::query_as("SELECT points, opened_on FROM loyalty_account WHERE customer_id = $1")
            .bind(customer.customer_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(points, 0);
    let today: chrono::NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE").fetch_one(&pool).await.unwrap();
    assert_eq!(opened_on, today);
    assert_eq!(customer.role, Role::Customer);
    let loyalty = serde_json::to_value(&customer).unwrap();
    assert_eq!(loyalty["loyalty_account"]["points"], 0);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn failed_loyalty_insert_rolls_back_the_customer(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    sqlx::query(
        "CREATE FUNCTION refuse_loyalty() RETURNS trigger AS $$ \
         BEGIN RAISE unique_violation USING MESSAGE = 'refused'; END; $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("CREATE TRIGGER refuse BEFORE INSERT ON loyalty_account FOR EACH ROW EXECUTE FUNCTION refuse_loyalty()")
        .execute(&pool)
        .await
        .unwrap();

    let err = CustomerService::create(&pool, new_customer("b@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(count(&pool, "customer").await, 0);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn duplicate_email_is_a_conflict(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    CustomerService::create(&pool, new_customer("dup@example.com")).await.unwrap();
    let err = CustomerService::create(&pool, new_customer("dup@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == "duplicate or invalid record"));
    assert_eq!(count(&pool, "customer").await, 1);
    assert_eq!(count(&pool, "loyalty_account").await, 1);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn login_failures_are_indistinguishable(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    CustomerService::create(&pool, new_customer("login@example.com")).await.unwrap();

    let wrong_password = IdentityService::login(
        &state,
        LoginRequest {
            email: "login@example.com".into(),
            password: "not-the-password".into(),
        },
    )
    .await
    .unwrap_err();
    let unknown_email = IdentityService::login(
        &state,
        LoginRequest {
            email: "nobody@example.com".into(),
            password: "not-the-password".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(matches!(wrong_password, AppError::Unauthorized(_)));
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn login_subject_is_the_customer_id(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    let customer = CustomerService::create(&pool, new_customer("sub@example.com")).await.unwrap();

    let pair = IdentityService::login(
        &state,
        LoginRequest {
            email: "sub@example.com".into(),
            password: "correct-horse-battery".into(),
        },
    )
    .await
    .unwrap();
    let claims = state.jwt.validate(&pair.access_token, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, customer.customer_id.to_string());
    assert_eq!(claims.roles, vec![Role::Customer]);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn partial_update_touches_only_the_given_field(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let before = CustomerService::create(&pool, new_customer("patch@example.com")).await.unwrap();

    let patch = CustomerPatch {
        first_name: Some("Renamed".into()),
        ..Default::default()
    };
    let after = CustomerService::update(&pool, before.customer_id, patch).await.unwrap().unwrap();
    assert_eq!(after.first_name, "Renamed");
    assert_eq!(after.last_name, before.last_name);
    assert_eq!(after.email, before.email);
    assert_eq!(after.phone, before.phone);

    let missing = CustomerService::update(&pool, before.customer_id + 100, CustomerPatch::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn deleting_a_customer_keeps_their_history(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let customer = CustomerService::create(&pool, new_customer("gone@example.com")).await.unwrap();
    let table = CrudService::<DiningTables>::create(
        &pool,
        NewDiningTable {
            number: 1,
            capacity: 4,
            description: None,
        },
    )
    .await
    .unwrap();
    let reservation = CrudService::<Reservations>::create(
        &pool,
        NewReservation {
            reserved_at: chrono::Utc::now(),
            party_size: 2,
            status: None,
            discount: None,
            customer_id: Some(customer.customer_id),
            table_id: Some(table.table_id),
            room_id: None,
        },
    )
    .await
    .unwrap();
    let order = CrudService::<Orders>::create(
        &pool,
        NewOrder {
            ordered_at: None,
            status: None,
            total_amount: Decimal::new(1999, 2),
            customer_id: Some(customer.customer_id),
        },
    )
    .await
    .unwrap();

    assert!(CrudService::<Customers>::delete(&pool, &customer.customer_id).await.unwrap());
    assert!(!CrudService::<Customers>::delete(&pool, &customer.customer_id).await.unwrap());
    assert_eq!(count(&pool, "loyalty_account").await, 0);

    let reservation = CrudService::<Reservations>::get(&pool, &reservation.reservation_id).await.unwrap();
    assert_eq!(reservation.customer_id, None);
    let order = CrudService::<Orders>::get(&pool, &order.order_id).await.unwrap();
    assert_eq!(order.customer_id, None);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn list_filters_on_known_columns_and_pages(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    for (number, capacity) in [(1, 2), (2, 4), (3, 4)] {
        CrudService::<DiningTables>::create(
            &pool,
            NewDiningTable {
                number,
                capacity,
                description: None,
            },
        )
        .await
        .unwrap();
    }
    let query = ListQuery {
        filters: vec![("capacity".into(), "4".into())],
        ..Default::default()
    };
    assert_eq!(CrudService::<DiningTables>::list(&pool, &query).await.unwrap().len(), 2);

    let unknown = ListQuery {
        filters: vec![("colour".into(), "red".into())],
        ..Default::default()
    };
    assert_eq!(CrudService::<DiningTables>::list(&pool, &unknown).await.unwrap().len(), 3);

    let page = ListQuery {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    let rows = CrudService::<DiningTables>::list(&pool, &page).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number, 2);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn session_round_trip_over_http(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let env: HashMap<&str, &str> = [("DATABASE_URL", "postgres://unused"), ("JWT_SECRET", SECRET)]
        .into_iter()
        .collect();
    let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
    let server = TestServer::new(app(state(pool), &config)).unwrap();

    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "first_name": "Http",
            "last_name": "Client",
            "email": "http@example.com",
            "password": "correct-horse-battery"
        }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let id = res.json::<Value>()["data"]["customer_id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "http@example.com", "password": "correct-horse-battery" }))
        .await;
    res.assert_status_ok();
    let pair: Value = res.json();
    let access = pair["access_token"].as_str().unwrap().to_string();
    let refresh = pair["refresh_token"].as_str().unwrap().to_string();
    let auth = |t: &str| HeaderValue::from_str(&format!("Bearer {}", t)).unwrap();

    let res = server.get("/api/v1/auth/me").add_header(header::AUTHORIZATION, auth(&access)).await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["id"].as_i64(), Some(id));

    let res = server.get("/api/v1/customer/999999").add_header(header::AUTHORIZATION, auth(&access)).await;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = server.post("/api/v1/auth/refresh").add_header(header::AUTHORIZATION, auth(&refresh)).await;
    res.assert_status_ok();
    let res = server.post("/api/v1/auth/refresh").add_header(header::AUTHORIZATION, auth(&refresh)).await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    let res = server.post("/api/v1/auth/logout").add_header(header::AUTHORIZATION, auth(&access)).await;
    res.assert_status(StatusCode::NO_CONTENT);
    let res = server.get("/api/v1/auth/me").add_header(header::AUTHORIZATION, auth(&access)).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn missing_items_are_not_found(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let err = CrudService::<Orders>::get(&pool, &42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m.contains("42")));
    let err = CrudService::<restaurant_api::entities::MenuItemAllergens>::get(&pool, &(1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m.contains("1/2")));
    let err = CrudService::<Customers>::get(&pool, &7).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

fn server(state: AppState) -> TestServer {
    let env: HashMap<&str, &str> = [("DATABASE_URL", "postgres://unused"), ("JWT_SECRET", SECRET)]
        .into_iter()
        .collect();
    let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
    TestServer::new(app(state, &config)).unwrap()
}

fn bearer(state: &AppState, customer_id: i32, role: Role) -> HeaderValue {
    let token = state.jwt.issue(customer_id, &[role], TokenKind::Access).unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn account(pool: &PgPool, email: &str, role: Role) -> i32 {
    let input = NewCustomer {
        role: Some(role),
        ..new_customer(email)
    };
    CustomerService::create(pool, input).await.unwrap().customer_id
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn staff_cannot_take_over_elevated_accounts(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    let admin = account(&pool, "admin@example.com", Role::Admin).await;
    let staff = account(&pool, "staff@example.com", Role::Staff).await;
    let other_staff = account(&pool, "staff2@example.com", Role::Staff).await;
    let guest = account(&pool, "guest@example.com", Role::Customer).await;
    let server = server(state.clone());
    let as_staff = bearer(&state, staff, Role::Staff);

    let res = server
        .put(&format!("/api/v1/customer/{}", admin))
        .add_header(header::AUTHORIZATION, as_staff.clone())
        .json(&json!({ "password": "staff-chose-this" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
    let login = IdentityService::login(
        &state,
        LoginRequest {
            email: "admin@example.com".into(),
            password: "staff-chose-this".into(),
        },
    )
    .await;
    assert!(matches!(login, Err(AppError::Unauthorized(_))));

    let res = server
        .put(&format!("/api/v1/customer/{}", other_staff))
        .add_header(header::AUTHORIZATION, as_staff.clone())
        .json(&json!({ "email": "mine@example.com" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = server
        .delete(&format!("/api/v1/customer/{}", admin))
        .add_header(header::AUTHORIZATION, as_staff.clone())
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(count(&pool, "customer").await, 4);

    let res = server
        .put(&format!("/api/v1/customer/{}", guest))
        .add_header(header::AUTHORIZATION, as_staff.clone())
        .json(&json!({ "first_name": "Helped" }))
        .await;
    res.assert_status_ok();

    let res = server
        .put(&format!("/api/v1/customer/{}", staff))
        .add_header(header::AUTHORIZATION, as_staff)
        .json(&json!({ "phone": "555-0100" }))
        .await;
    res.assert_status_ok();

    let res = server
        .put(&format!("/api/v1/customer/{}", other_staff))
        .add_header(header::AUTHORIZATION, bearer(&state, admin, Role::Admin))
        .json(&json!({ "password": "admin-reset-this" }))
        .await;
    res.assert_status_ok();
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn generic_put_changes_only_the_given_field(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    let server = server(state.clone());
    let auth = bearer(&state, 1, Role::Staff);

    let res = server
        .post("/api/v1/menu-item")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Soup", "description": "Of the day", "price": "4.50" }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let id = res.json::<Value>()["data"]["menu_item_id"].as_i64().unwrap();
    let path = format!("/api/v1/menu-item/{}", id);

    let res = server
        .put(&path)
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "available": false }))
        .await;
    res.assert_status_ok();
    let item = &res.json::<Value>()["data"];
    assert_eq!(item["name"], "Soup");
    assert_eq!(item["description"], "Of the day");
    assert_eq!(item["available"], false);
    assert_eq!(Decimal::from_str(item["price"].as_str().unwrap()).unwrap(), Decimal::new(450, 2));

    let res = server
        .put(&path)
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "price": "-5.00" }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.json::<Value>()["error"]["details"]["price"].is_array());

    let res = server
        .put("/api/v1/menu-item/999999")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "available": true }))
        .await;
    res.assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn composite_key_update_and_delete(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    let server = server(state.clone());
    let auth = bearer(&state, 1, Role::Admin);

    let res = server
        .post("/api/v1/menu-item")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Pesto pasta", "price": "12.00" }))
        .await;
    let item = res.json::<Value>()["data"]["menu_item_id"].as_i64().unwrap();
    let mut allergens = Vec::new();
    for name in ["Nuts", "Dairy"] {
        let res = server
            .post("/api/v1/allergen")
            .add_header(header::AUTHORIZATION, auth.clone())
            .json(&json!({ "name": name }))
            .await;
        res.assert_status(StatusCode::CREATED);
        allergens.push(res.json::<Value>()["data"]["allergen_id"].as_i64().unwrap());
    }
    let (nuts, dairy) = (allergens[0], allergens[1]);

    let res = server
        .post("/api/v1/menu-item-allergen")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "menu_item_id": item, "allergen_id": nuts }))
        .await;
    res.assert_status(StatusCode::CREATED);

    let res = server
        .put(&format!("/api/v1/menu-item-allergen/{}/{}", item, nuts))
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "allergen_id": dairy }))
        .await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["data"]["allergen_id"].as_i64(), Some(dairy));

    let old = format!("/api/v1/menu-item-allergen/{}/{}", item, nuts);
    let new = format!("/api/v1/menu-item-allergen/{}/{}", item, dairy);
    server
        .get(&old)
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&new)
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .assert_status_ok();

    server
        .delete(&new)
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&new)
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&new)
        .add_header(header::AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(count(&pool, "menu_item_allergen").await, 0);
}

#[sqlx::test(migrations = false)]
#[ignore]
async fn delete_blocked_by_a_reference_is_a_conflict(pool: PgPool) {
    apply_migrations(&pool).await.unwrap();
    let state = state(pool.clone());
    let table = CrudService::<DiningTables>::create(
        &pool,
        NewDiningTable {
            number: 9,
            capacity: 2,
            description: None,
        },
    )
    .await
    .unwrap();
    CrudService::<Reservations>::create(
        &pool,
        NewReservation {
            reserved_at: chrono::Utc::now(),
            party_size: 2,
            status: None,
            discount: None,
            customer_id: None,
            table_id: Some(table.table_id),
            room_id: None,
        },
    )
    .await
    .unwrap();

    let server = server(state.clone());
    let res = server
        .delete(&format!("/api/v1/table/{}", table.table_id))
        .add_header(header::AUTHORIZATION, bearer(&state, 1, Role::Admin))
        .await;
    res.assert_status(StatusCode::CONFLICT);
    let body: Value = res.json();
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "duplicate or invalid record");
    assert_eq!(count(&pool, "dining_table").await, 1);
}
