//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use document_store::InMemoryDocumentStore;
use domain::InMemoryNotifier;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config {
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        ..Config::default()
    }
}

fn setup() -> (axum::Router, InMemoryNotifier) {
    let notifier = InMemoryNotifier::new();
    let state = api::create_state(
        InMemoryDocumentStore::new(),
        Arc::new(notifier.clone()),
        &test_config(),
    );
    (api::create_app(state, get_metrics_handle()), notifier)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn registration(email: &str, license: &str) -> Value {
    json!({
        "firstName": "Mo",
        "lastName": "Bello",
        "email": email,
        "phone": "08030000000",
        "address": "2 Close",
        "city": "Ikeja",
        "state": "Lagos",
        "zipCode": "100001",
        "emergencyContact": "08031111111",
        "stationName": "Central Fuel",
        "stationAddress": "1 Road",
        "stationEmail": "central@example.com",
        "stationPhone": "0800",
        "stationCity": "Lagos",
        "stationCountry": "Nigeria",
        "licenseNumber": license,
        "taxId": "TAX-9",
        "establishmentDate": "2020-01-15",
        "numberOfPumps": 4,
        "fuelTypesOffered": ["Petrol", "Diesel"],
        "password": "Secret@123"
    })
}

/// Registers a station and logs its manager in. Returns (station id, token).
async fn register_and_login(app: &axum::Router, email: &str, license: &str) -> (String, String) {
    let (status, json) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(registration(email, license)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let station_id = json["data"]["station"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "Secret@123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    (station_id, json["data"]["token"].as_str().unwrap().to_string())
}

async fn add_tank(app: &axum::Router, token: &str, title: &str, fuel: &str, limit: f64) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/tanks/add-tank",
        Some(token),
        Some(json!({"title": title, "fuelType": fuel, "limit": limit, "threshold": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["tanks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["title"] == title)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();
    let (status, json) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (app, _) = setup();
        let (status, json) = send(&app, "GET", "/api/tanks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let (app, _) = setup();
        let (status, _) = send(&app, "GET", "/api/tanks", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (app, _) = setup();
        register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "mo@example.com", "password": "Wrong@123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_manager_is_forbidden() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/auth",
            Some(&token),
            Some(json!({
                "firstName": "Ada",
                "lastName": "Obi",
                "email": "ada@example.com",
                "phone": "0803",
                "role": "attendant",
                "password": "Attend@123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");

        let (_, login) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "Attend@123"})),
        )
        .await;
        let attendant = login["data"]["token"].as_str().unwrap();

        let (status, _) = send(&app, "GET", "/api/tanks", Some(attendant), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (app, notifier) = setup();
        register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, json) = send(
            &app,
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({"email": "mo@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], domain::staff::FORGOT_PASSWORD_MESSAGE);
        let token = notifier.last_reset_token("mo@example.com").unwrap();

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"email": "mo@example.com", "token": token, "newPassword": "Fresh@456"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "mo@example.com", "password": "Fresh@456"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({"email": "mo@example.com", "token": token, "newPassword": "Again@789"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod stations {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (app, _) = setup();
        register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/register",
            None,
            Some(registration("other@example.com", "lic-1")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_bad_request() {
        let (app, _) = setup();
        let mut form = registration("mo@example.com", "LIC-1");
        form["password"] = json!("weak");
        let (status, json) = send(&app, "POST", "/api/register", None, Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_get_own_station_but_not_another() {
        let (app, _) = setup();
        let (ours, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;
        let (theirs, _) = register_and_login(&app, "zee@example.com", "LIC-2").await;

        let (status, json) = send(&app, "GET", &format!("/api/register/{ours}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["staff"].as_array().unwrap().len(), 1);
        assert!(json["data"]["staff"][0].get("passwordHash").is_none());

        let (status, _) = send(&app, "GET", &format!("/api/register/{theirs}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", "/api/register/not-an-id", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Stations are only readable one at a time.
        let (status, _) = send(&app, "GET", "/api/register", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_update_and_delete_station() {
        let (app, _) = setup();
        let (id, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, json) = send(
            &app,
            "PUT",
            &format!("/api/register/{id}"),
            Some(&token),
            Some(json!({"name": "Central Fuel Plus"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Central Fuel Plus");

        let (status, _) = send(&app, "DELETE", &format!("/api/register/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "mo@example.com", "password": "Secret@123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod tanks {
    use super::*;

    #[tokio::test]
    async fn test_tank_lifecycle() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;

        let (status, _) = send(&app, "GET", "/api/tanks", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let tank = add_tank(&app, &token, "Tank A", "Petrol", 1000.0).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/tanks/add-tank",
            Some(&token),
            Some(json!({"title": "tank a", "fuelType": "Diesel", "limit": 10, "threshold": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = send(
            &app,
            "POST",
            "/api/tanks/update-tank",
            Some(&token),
            Some(json!({"tankId": tank, "currentQuantity": 800})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["currentQuantity"].as_f64(), Some(800.0));

        let (status, _) = send(
            &app,
            "POST",
            "/api/tanks/update-tank",
            Some(&token),
            Some(json!({"tankId": tank, "currentQuantity": 300})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, json) = send(&app, "GET", "/api/tanks", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total"].as_f64(), Some(800.0));

        let (status, _) = send(
            &app,
            "POST",
            "/api/tanks/delete-tank",
            Some(&token),
            Some(json!({"tankId": tank})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_fields_are_bad_request() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;
        let (status, json) = send(
            &app,
            "POST",
            "/api/tanks/add-tank",
            Some(&token),
            Some(json!({"title": "Tank A"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/tanks/add-tank")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod supplies {
    use super::*;

    #[tokio::test]
    async fn test_completed_supply_fills_tank_once() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;
        let tank = add_tank(&app, &token, "Tank A", "Petrol", 10000.0).await;
        send(
            &app,
            "POST",
            "/api/tanks/update-tank",
            Some(&token),
            Some(json!({"tankId": tank, "currentQuantity": 9000})),
        )
        .await;

        let supply = |quantity: f64, status: &str| {
            json!({
                "tank": tank,
                "pricePerLtr": 800,
                "quantity": quantity,
                "supplier": "Depot",
                "deliveryDate": "2024-05-01",
                "status": status
            })
        };

        let (status, _) = send(&app, "POST", "/api/supplies/add-supply", Some(&token), Some(supply(500.0, "Completed"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app, "POST", "/api/supplies/add-supply", Some(&token), Some(supply(1500.0, "Completed"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, json) = send(&app, "POST", "/api/supplies/add-supply", Some(&token), Some(supply(200.0, "Pending"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let pending = json["data"]["id"].as_str().unwrap().to_string();

        let complete = json!({"supplyId": pending, "status": "Completed"});
        let (status, _) = send(&app, "POST", "/api/supplies/update-supply", Some(&token), Some(complete.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "POST", "/api/supplies/update-supply", Some(&token), Some(complete)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(&app, "GET", "/api/tanks", Some(&token), None).await;
        assert_eq!(json["data"]["tanks"][0]["currentQuantity"].as_f64(), Some(9700.0));

        let (status, _) = send(
            &app,
            "POST",
            "/api/supplies/update-supply",
            Some(&token),
            Some(json!({"supplyId": pending, "status": "Cancelled"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            "POST",
            "/api/supplies/delete-supply",
            Some(&token),
            Some(json!({"supplyId": pending})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = send(&app, "GET", "/api/supplies", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let supplies = json["data"].as_array().unwrap();
        assert_eq!(supplies.len(), 2);
        assert!(supplies.iter().all(|s| s["tankTitle"] == "Tank A"));
    }
}

mod pumps {
    use super::*;

    #[tokio::test]
    async fn test_pumps_prices_and_report() {
        let (app, _) = setup();
        let (_, token) = register_and_login(&app, "mo@example.com", "LIC-1").await;
        let petrol = add_tank(&app, &token, "Tank A", "Petrol", 10000.0).await;
        let diesel = add_tank(&app, &token, "Tank B", "Diesel", 10000.0).await;

        for tank in [&petrol, &petrol, &diesel] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/pumps/add-pump",
                Some(&token),
                Some(json!({"tankId": tank, "pricePerLtr": 700, "startDate": "2024-01-01"})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, json) = send(&app, "GET", "/api/pumps", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let pumps = json["data"].as_array().unwrap();
        assert_eq!(pumps.len(), 3);
        let titles: Vec<&str> = pumps
            .iter()
            .filter(|p| p["tankId"] == petrol.as_str())
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Pump 1", "Pump 2"]);

        let (status, json) = send(
            &app,
            "POST",
            "/api/pumps/update-prices",
            Some(&token),
            Some(json!({"prices": {"petrol": 850}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["updatedPumps"], 2);

        let (status, _) = send(
            &app,
            "POST",
            "/api/pumps/update-prices",
            Some(&token),
            Some(json!({"prices": {"Unobtainium": 850}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let pump_id = pumps
            .iter()
            .find(|p| p["tankId"] == diesel.as_str())
            .unwrap()["pumpId"]
            .as_str()
            .unwrap()
            .to_string();
        let (status, json) = send(
            &app,
            "POST",
            "/api/pumps/update-pump",
            Some(&token),
            Some(json!({
                "pumpId": pump_id,
                "dailyLtrSales": [
                    {"date": "2024-03-01", "ltrSale": 100},
                    {"date": "2024-04-01", "ltrSale": 50, "pricePerLtr": 900}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");

        let (status, json) = send(
            &app,
            "GET",
            "/api/pumps/sales-report?from=2024-03-01&to=2024-03-31",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["totalLiters"].as_f64(), Some(100.0));
        assert_eq!(json["data"]["totalRevenue"].as_f64(), Some(70000.0));

        let (status, _) = send(
            &app,
            "GET",
            "/api/pumps/sales-report?from=someday",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod contact {
    use super::*;

    #[tokio::test]
    async fn test_contact_form() {
        let (app, notifier) = setup();
        let (status, _) = send(
            &app,
            "POST",
            "/api/contact",
            None,
            Some(json!({
                "firstName": "Ada",
                "lastName": "Obi",
                "phoneNumber": "0803",
                "email": "ada@example.com",
                "message": "Do you sell kerosene?"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notifier.sent().len(), 1);

        let (status, _) = send(&app, "POST", "/api/contact", None, Some(json!({"firstName": "Ada"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
