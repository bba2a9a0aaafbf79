//! HTTP-level tests for the backend client, against a mock backend.

use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agroclim::api::{BackendClient, HistoricalQuery};
use agroclim::error::ErrorCode;
use agroclim::models::{BroadcastMessage, NewAlert};
use agroclim::{AgroClimConfig, AgroClimError};

fn client_for(server: &MockServer) -> BackendClient {
    let mut config = AgroClimConfig::default();
    config.backend.base_url = format!("{}/api", server.uri());
    // Keep failing tests fast: no retries against the mock
    config.backend.max_retries = 0;
    BackendClient::new(&config).unwrap()
}

fn january_query() -> HistoricalQuery {
    HistoricalQuery::for_range(
        chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        100,
    )
}

#[tokio::test]
async fn historical_weather_parses_wrapped_records() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": {
            "records": [
                {"date": "2024-01-10", "weatherSummary": {
                    "temperature": {"min": 14.0, "max": 26.0, "current": 20.0},
                    "precipitation": {"rainAmount": 5.0}
                }},
                {"date": "2024-01-20", "weatherSummary": {
                    "temperature": {"current": 22.0},
                    "precipitation": {"rainAmount": 3.0}
                }}
            ],
            "pagination": {"total": 2, "page": 1, "limit": 100, "totalPages": 1}
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/weather/historical/location/loc-1"))
        .and(query_param("startDate", "2024-01-01"))
        .and(query_param("endDate", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client
        .historical_weather("loc-1", &january_query())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, "2024-01-10");
    assert_eq!(
        records[0].weather_summary.temperature.current,
        Some(20.0)
    );
    assert_eq!(
        records[1].weather_summary.precipitation.rain_amount,
        Some(3.0)
    );
}

#[tokio::test]
async fn historical_weather_accepts_bare_array() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {"date": "2024-01-10", "weatherSummary": {}}
    ]);

    Mock::given(method("GET"))
        .and(path("/api/weather/historical/location/loc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client
        .historical_weather("loc-1", &january_query())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn historical_weather_unrecognized_shape_yields_empty() {
    let server = MockServer::start().await;
    let body = serde_json::json!({"status": "ok"});

    Mock::given(method("GET"))
        .and(path("/api/weather/historical/location/loc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client
        .historical_weather("loc-1", &january_query())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn unauthorized_maps_to_credentials_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather/alerts"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "token expired"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.alerts().await.unwrap_err();
    let err = err.downcast_ref::<AgroClimError>().unwrap();
    assert_eq!(err.api_code(), Some(ErrorCode::ApiUnauthorized));
    assert!(err.to_string().contains("token expired"));
}

#[tokio::test]
async fn not_found_maps_to_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather/historical/location/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "Location not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .historical_weather("missing", &january_query())
        .await
        .unwrap_err();
    let err = err.downcast_ref::<AgroClimError>().unwrap();
    assert_eq!(err.api_code(), Some(ErrorCode::ApiNotFound));
    assert!(err.user_message().contains("Location not found"));
}

#[tokio::test]
async fn invalid_json_maps_to_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/locations/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.locations().await.unwrap_err();
    let err = err.downcast_ref::<AgroClimError>().unwrap();
    assert_eq!(err.api_code(), Some(ErrorCode::ApiInvalidResponse));
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/locations/all"))
        .and(bearer_token("secret-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "locations": [{"id": 1, "name": "Musanze"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = AgroClimConfig::default();
    config.backend.base_url = format!("{}/api", server.uri());
    config.backend.max_retries = 0;
    config.backend.access_token = Some("secret-token-123".to_string());
    let client = BackendClient::new(&config).unwrap();

    let locations = client.locations().await.unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "Musanze");
    assert_eq!(locations[0].id.as_deref(), Some("1"));
}

#[tokio::test]
async fn admin_locations_uses_admin_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"locations": [
                {"id": 1, "name": "Musanze", "district": "Northern Province"},
                {"id": 2, "name": "Nyagatare"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locations = client.admin_locations().await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].label(), "Musanze (Northern Province)");
    assert_eq!(locations[1].id.as_deref(), Some("2"));
}

#[tokio::test]
async fn create_alert_posts_payload_and_returns_receipt() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "title": "Heavy rain",
        "message": "Expect flooding in valleys",
        "priority": "high"
    });

    Mock::given(method("POST"))
        .and(path("/api/weather/alerts"))
        .and(body_json(&expected))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"message": "Alert created"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let receipt = client
        .create_alert(&NewAlert {
            title: "Heavy rain".into(),
            message: "Expect flooding in valleys".into(),
            priority: "high".into(),
            location_id: None,
        })
        .await
        .unwrap();
    assert_eq!(receipt.text(), "Alert created");
}

#[tokio::test]
async fn create_alert_rejects_empty_title_without_request() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and fail differently

    let client = client_for(&server);
    let err = client
        .create_alert(&NewAlert {
            title: String::new(),
            message: "body".into(),
            priority: "low".into(),
            location_id: None,
        })
        .await
        .unwrap_err();
    let err = err.downcast_ref::<AgroClimError>().unwrap();
    assert!(matches!(err, AgroClimError::Validation { .. }));
}

#[tokio::test]
async fn broadcast_receipt_defaults_when_body_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/broadcast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let receipt = client
        .broadcast(&BroadcastMessage {
            body: "Rain expected tomorrow".into(),
            recipient_ids: vec!["1".into(), "2".into()],
            location_id: None,
        })
        .await
        .unwrap();
    assert_eq!(receipt.text(), "Request accepted");
}

#[tokio::test]
async fn delete_alert_hits_resource_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/weather/alerts/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "Alert deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let receipt = client.delete_alert("42").await.unwrap();
    assert_eq!(receipt.text(), "Alert deleted");
}
