//! Integration tests for Footprint API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use tower::ServiceExt;

use footprint::api::{AppState, router};
use footprint::engine::FootprintEngine;
use footprint::model::{Category, EmissionFactor};
use footprint::storage::Storage;

fn test_factors() -> Vec<EmissionFactor> {
    vec![
        EmissionFactor {
            factor_id: "electricity".to_string(),
            value: 0.5,
            unit: "kWh".to_string(),
            source: "test".to_string(),
            category: Category::Energy,
        },
        EmissionFactor {
            factor_id: "petrol".to_string(),
            value: 2.5,
            unit: "kgCO2e/liter".to_string(),
            source: "test".to_string(),
            category: Category::Transport,
        },
    ]
}

async fn create_state() -> AppState {
    let storage = Storage::new("sqlite::memory:").await.unwrap();
    storage.seed_factors(&test_factors()).await.unwrap();
    AppState {
        engine: FootprintEngine::new(storage),
        ranking_size: 5,
    }
}

async fn create_test_server() -> TestServer {
    TestServer::new(router(create_state().await)).unwrap()
}

fn electricity(period: &str, kwh: f64) -> serde_json::Value {
    json!({
        "period": period,
        "activities": [
            { "category": "energy", "sub_type": "electricity", "quantity": kwh, "unit": "kWh" }
        ]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_endpoint_oneshot() {
    let app = router(create_state().await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_post_footprint() {
    let server = create_test_server().await;

    let response = server
        .post("/users/u1/footprints")
        .json(&json!({
            "period": "2025-03",
            "activities": [
                { "category": "energy", "sub_type": "electricity", "quantity": 100, "unit": "kWh" },
                { "category": "transport", "sub_type": "petrol", "quantity": 20, "unit": "liter" }
            ]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["period"], "2025-03");
    assert_eq!(body["results"]["total_co2e"], 100.0);
    assert_eq!(body["results"]["breakdown_co2e"]["energy"], 50.0);
    assert_eq!(body["results"]["breakdown_co2e"]["transport"], 50.0);
    assert_eq!(body["results"]["breakdown_co2e"]["consumption"], 0.0);
    assert_eq!(body["results"]["breakdown_co2e"]["waste"], 0.0);
    assert!(body["id"].as_str().is_some());
    assert!(body["date_calculated"].as_str().is_some());
}

#[tokio::test]
async fn test_post_footprint_unknown_factor() {
    let server = create_test_server().await;

    let response = server
        .post("/users/u1/footprints")
        .json(&json!({
            "period": "2025-03",
            "activities": [
                { "category": "energy", "sub_type": "electricity", "quantity": 100, "unit": "kWh" },
                { "category": "energy", "sub_type": "coal", "quantity": 1, "unit": "kg" }
            ]
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "UNKNOWN_FACTOR");

    let records: serde_json::Value = server.get("/users/u1/footprints").await.json();
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_footprint_classified_errors() {
    let server = create_test_server().await;

    let cases = [
        (
            json!({ "period": "2025-03", "activities": [
                { "category": "energy", "sub_type": "electricity", "quantity": 1, "unit": "liter" }
            ]}),
            "UNIT_MISMATCH",
        ),
        (
            json!({ "period": "2025-03", "activities": [
                { "category": "energy", "sub_type": "electricity", "quantity": -1, "unit": "kWh" }
            ]}),
            "INVALID_QUANTITY",
        ),
        (
            json!({ "period": "2025-03", "activities": [
                { "category": "leisure", "sub_type": "electricity", "quantity": 1, "unit": "kWh" }
            ]}),
            "UNKNOWN_CATEGORY",
        ),
        (electricity("03/2025", 1.0), "INVALID_PERIOD"),
    ];

    for (request, code) in cases {
        let response = server.post("/users/u1/footprints").json(&request).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], code);
        assert!(body["error"]["message"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_post_footprint_malformed_body() {
    let server = create_test_server().await;

    let missing_quantity = json!({
        "period": "2025-03",
        "activities": [
            { "category": "energy", "sub_type": "electricity", "unit": "kWh" }
        ]
    });
    let response = server.post("/users/u1/footprints").json(&missing_quantity).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("quantity"));

    let out_of_range = r#"{"period":"2025-03","activities":[{"category":"energy","sub_type":"electricity","quantity":1e400,"unit":"kWh"}]}"#;
    let response = server
        .post("/users/u1/footprints")
        .content_type("application/json")
        .bytes(out_of_range.into())
        .await;
    assert!(response.status_code().is_client_error());
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let records: serde_json::Value = server.get("/users/u1/footprints").await.json();
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_footprint_overflowing_quantity() {
    let server = create_test_server().await;

    let response = server
        .post("/users/u1/footprints")
        .json(&json!({
            "period": "2025-03",
            "activities": [
                { "category": "energy", "sub_type": "electricity", "quantity": 1e306, "unit": "MWh" }
            ]
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_QUANTITY");
}

#[tokio::test]
async fn test_recalculation_replaces_record() {
    let server = create_test_server().await;

    server
        .post("/users/u1/footprints")
        .json(&electricity("2025-03", 100.0))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/users/u1/footprints")
        .json(&electricity("2025-03", 10.0))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/users/u1/footprints").await;
    response.assert_status_ok();

    let records: serde_json::Value = response.json();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["results"]["total_co2e"], 5.0);
}

#[tokio::test]
async fn test_monthly_analytics() {
    let server = create_test_server().await;

    for (period, kwh) in [("2025-02", 300.0), ("2025-01", 200.0)] {
        server
            .post("/users/u1/footprints")
            .json(&electricity(period, kwh))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get("/users/u1/analytics/monthly").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], "u1");
    let months = body["months"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], "2025-01");
    assert_eq!(months[0]["total_emissions"], 100.0);
    assert_eq!(months[0]["count"], 1);
    assert_eq!(months[1]["month"], "2025-02");
    assert_eq!(months[1]["avg_emissions"], 150.0);
    assert_eq!(body["trend"]["change"], 50.0);
    assert_eq!(body["trend"]["percent_change"], 50.0);
}

#[tokio::test]
async fn test_monthly_analytics_empty_user() {
    let server = create_test_server().await;

    let response = server.get("/users/nobody/analytics/monthly").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["months"].as_array().unwrap().is_empty());
    assert!(body["trend"].is_null());
}

#[tokio::test]
async fn test_admin_summary_empty() {
    let server = create_test_server().await;

    let response = server.get("/admin/summary").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["global_average"], 0.0);
    assert_eq!(body["total_users"], 0);
    assert!(body["top_performers"].as_array().unwrap().is_empty());
    assert!(body["bottom_performers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_summary_rankings() {
    let server = create_test_server().await;

    for (user, kwh) in [("u1", 200.0), ("u2", 600.0), ("u3", 1000.0)] {
        server
            .post(&format!("/users/{}/footprints", user))
            .json(&electricity("2025-01", kwh))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .put("/users/u1")
        .json(&json!({ "username": "ursula", "region": "north" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server.get("/admin/summary?limit=2").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["global_average"], 300.0);
    assert_eq!(body["total_users"], 3);

    let top = body["top_performers"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["user_id"], "u1");
    assert_eq!(top[0]["co2e"], 100.0);
    assert_eq!(top[0]["user_info"]["username"], "ursula");
    assert_eq!(top[0]["user_info"]["region"], "north");
    assert_eq!(top[1]["co2e"], 300.0);

    let bottom = body["bottom_performers"].as_array().unwrap();
    assert_eq!(bottom[0]["co2e"], 500.0);
    assert_eq!(bottom[1]["co2e"], 300.0);
}

#[tokio::test]
async fn test_delete_footprints() {
    let server = create_test_server().await;

    server
        .post("/users/u1/footprints")
        .json(&electricity("2025-01", 10.0))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.delete("/users/u1/footprints").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], 1);

    let records: serde_json::Value = server.get("/users/u1/footprints").await.json();
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_factors() {
    let server = create_test_server().await;

    let response = server.get("/factors").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let factors = body.as_array().unwrap();
    assert_eq!(factors.len(), 2);
    assert_eq!(factors[0]["factor_id"], "electricity");
    assert_eq!(factors[0]["category"], "energy");
}
