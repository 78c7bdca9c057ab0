//! Router tests for paths that are decided before any query runs: authentication, role gates,
//! payload validation and the probes. The pool is lazy and never connects.

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use restaurant_api::auth::{JwtConfig, TokenKind};
use restaurant_api::{app, AppConfig, AppState, JwtService, MemoryRevocationStore, RevocationStore, Role};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;

const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

fn jwt() -> JwtService {
    JwtService::new(JwtConfig {
        secret: SECRET.into(),
        issuer: "restaurant-api".into(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    })
}

fn config(prefix: &str) -> AppConfig {
    let env: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://localhost:1/unused"),
        ("JWT_SECRET", SECRET),
        ("API_PREFIX", prefix),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap()
}

struct Harness {
    server: TestServer,
    jwt: JwtService,
    revoked: Arc<MemoryRevocationStore>,
}

fn harness_with_prefix(prefix: &str) -> Harness {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:1/unused")
        .unwrap();
    let revoked = Arc::new(MemoryRevocationStore::new());
    let state = AppState::new(pool, jwt(), revoked.clone());
    let server = TestServer::new(app(state, &config(prefix))).unwrap();
    Harness {
        server,
        jwt: jwt(),
        revoked,
    }
}

fn harness() -> Harness {
    harness_with_prefix("/api/v1")
}

impl Harness {
    fn token(&self, id: i32, role: Role) -> String {
        self.jwt.issue(id, &[role], TokenKind::Access).unwrap()
    }
}

fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn probes_live_at_the_root() {
    let h = harness();

    let res = h.server.get("/health").await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["status"], "ok");

    let res = h.server.get("/version").await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["name"], "restaurant-api");
}

#[tokio::test]
async fn resources_require_a_bearer_token() {
    let h = harness();
    for path in ["/api/v1/table", "/api/v1/order", "/api/v1/customer", "/api/v1/auth/me"] {
        let res = h.server.get(path).await;
        res.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&res.json()), "unauthorized");
    }
}

#[tokio::test]
async fn garbage_and_foreign_tokens_are_rejected() {
    let h = harness();
    let res = bearer(h.server.get("/api/v1/table"), "not-a-jwt").await;
    res.assert_status(StatusCode::UNAUTHORIZED);

    let other = JwtService::new(JwtConfig {
        secret: "a-completely-different-secret-of-some-length".into(),
        issuer: "restaurant-api".into(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    });
    let forged = other.issue(1, &[Role::Admin], TokenKind::Access).unwrap();
    let res = bearer(h.server.get("/api/v1/table"), &forged).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_are_not_access_tokens() {
    let h = harness();
    let refresh = h.jwt.issue(3, &[Role::Admin], TokenKind::Refresh).unwrap();
    let res = bearer(h.server.get("/api/v1/order"), &refresh).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_tokens_cannot_refresh() {
    let h = harness();
    let access = h.token(3, Role::Customer);
    let res = bearer(h.server.post("/api/v1/auth/refresh"), &access).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoked_tokens_are_rejected() {
    let h = harness();
    let token = h.token(5, Role::Staff);
    let claims = h.jwt.validate(&token, TokenKind::Access).unwrap();
    h.revoked.revoke(claims.jti, claims.expires_at()).await.unwrap();

    let res = bearer(h.server.get("/api/v1/order"), &token).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["error"]["message"], "token has been revoked");
}

#[tokio::test]
async fn customers_are_kept_out_of_operational_resources() {
    let h = harness();
    let token = h.token(7, Role::Customer);
    for path in ["/api/v1/order", "/api/v1/payment", "/api/v1/reservation/1", "/api/v1/loyalty-account"] {
        let res = bearer(h.server.get(path), &token).await;
        res.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(error_code(&res.json()), "forbidden");
    }
}

#[tokio::test]
async fn role_gate_is_checked_before_the_body() {
    let h = harness();
    let token = h.token(7, Role::Customer);
    let res = bearer(h.server.post("/api/v1/table"), &token)
        .json(&json!({ "capacity": "lots" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reservation_without_a_place_fails_validation() {
    let h = harness();
    let token = h.token(2, Role::Staff);
    let res = bearer(h.server.post("/api/v1/reservation"), &token)
        .json(&json!({ "reserved_at": "2026-10-16T18:00:00Z", "party_size": 4 }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json();
    assert_eq!(error_code(&body), "validation_error");
    assert!(body["error"]["details"]["_schema"].is_array());
}

#[tokio::test]
async fn unknown_and_missing_fields_are_reported_by_name() {
    let h = harness();
    let token = h.token(2, Role::Admin);

    let res = bearer(h.server.post("/api/v1/menu-item"), &token)
        .json(&json!({ "name": "Soup", "price": "4.50", "colour": "red" }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.json::<Value>()["error"]["details"]["colour"].is_array());

    let res = bearer(h.server.post("/api/v1/menu-item"), &token)
        .json(&json!({ "price": "4.50" }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.json::<Value>()["error"]["details"]["name"].is_array());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = harness();
    let token = h.token(2, Role::Admin);
    let res = bearer(h.server.post("/api/v1/allergen"), &token)
        .content_type("application/json")
        .text("{\"name\": ")
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_keys_are_a_bad_request() {
    let h = harness();
    let token = h.token(2, Role::Customer);
    let res = bearer(h.server.get("/api/v1/table/abc"), &token).await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let res = bearer(h.server.get("/api/v1/table?limit=many"), &token).await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_read_other_customers() {
    let h = harness();
    let token = h.token(7, Role::Customer);
    let res = bearer(h.server.get("/api/v1/customer/8"), &token).await;
    res.assert_status(StatusCode::FORBIDDEN);
    let res = bearer(h.server.delete("/api/v1/customer/8"), &token).await;
    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_admin_grants_elevated_roles() {
    let h = harness();
    let staff = h.token(2, Role::Staff);
    let res = bearer(h.server.post("/api/v1/customer"), &staff)
        .json(&json!({
            "first_name": "Eve",
            "last_name": "Elevated",
            "email": "eve@example.com",
            "password": "long-enough-password",
            "role": "admin"
        }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);

    let customer = h.token(7, Role::Customer);
    let res = bearer(h.server.put("/api/v1/customer/7"), &customer)
        .json(&json!({ "role": "staff" }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registration_validates_before_touching_the_database() {
    let h = harness();
    let res = h
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "first_name": "Reg",
            "last_name": "Istrant",
            "email": "not-an-email",
            "password": "short"
        }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let details = &res.json::<Value>()["error"]["details"];
    assert!(details["email"].is_array());
    assert!(details["password"].is_array());

    let res = h
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "first_name": "Reg",
            "last_name": "Istrant",
            "email": "reg@example.com",
            "password": "long-enough-password",
            "role": "admin"
        }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.json::<Value>()["error"]["details"]["role"].is_array());
}

#[tokio::test]
async fn login_requires_both_fields() {
    let h = harness();
    let res = h
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "", "password": "" }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn empty_prefix_mounts_the_api_at_the_root() {
    let h = harness_with_prefix("/");
    let res = h.server.get("/order").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    h.server.get("/health").await.assert_status_ok();
}
