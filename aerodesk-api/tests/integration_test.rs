use aerodesk_api::{app, AppState, Repositories};
use aerodesk_shared::Airport;
use aerodesk_store::app_config::EngineConfig;
use aerodesk_store::InMemoryDirectory;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    han: Uuid,
    sgn: Uuid,
    user: Uuid,
}

fn airport(code: &str, name: &str) -> Airport {
    Airport {
        id: Uuid::new_v4(),
        code: code.into(),
        name: name.into(),
        country: "Vietnam".into(),
        address: String::new(),
        timezone: "Asia/Ho_Chi_Minh".into(),
        terminal_count: 1,
        capacity: 0,
        international: true,
        location: None,
        active: true,
    }
}

async fn test_app() -> TestApp {
    let directory = Arc::new(InMemoryDirectory::new());
    let han = airport("HAN", "Noi Bai International Airport");
    let sgn = airport("SGN", "Tan Son Nhat International Airport");
    let (han_id, sgn_id) = (han.id, sgn.id);
    directory.add_airport(han).await;
    directory.add_airport(sgn).await;
    let user = Uuid::new_v4();
    directory.add_user(user).await;

    let state = AppState::new(
        Repositories::in_memory(directory),
        &EngineConfig::default(),
        None,
    );
    TestApp {
        router: app(state),
        han: han_id,
        sgn: sgn_id,
        user,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn flight_body(t: &TestApp, number: &str, duration: i64, seats: i32) -> Value {
    json!({
        "flight_number": number,
        "departure_airport": t.han,
        "destination_airport": t.sgn,
        "departure_time": "2099-06-10T08:00:00Z",
        "duration_minutes": duration,
        "seat_classes": [{"class_label": "1", "count": seats}],
        "ticket_price": 1000000,
        "rules": {"flight_time": "flight_time", "ticket_class": "ticket_class"}
    })
}

fn booking_body(t: &TestApp, flight_id: &Value) -> Value {
    json!({
        "user_id": t.user,
        "flight_id": flight_id,
        "seat_class": "1",
        "passenger_name": "Nguyen Van A",
        "identification_number": "001099000001",
        "phone_number": "0912345678"
    })
}

#[tokio::test]
async fn test_health() {
    let t = test_app().await;
    let (status, body) = send(&t.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_rule_driven_flight_validation() {
    let t = test_app().await;

    let (status, rule) = send(
        &t.router,
        "PUT",
        "/v1/rules/flight_time",
        Some(json!({"code": "FT", "values": {"min_flight_time": 30}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rule["name"], "flight_time");

    let (status, body) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(flight_body(&t, "VN210", 20, 10)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("30"));

    let (status, flight) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(flight_body(&t, "VN210", 125, 10)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(flight["flight_code"], "HAN-SGN");

    let (status, _) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(flight_body(&t, "VN210", 125, 10)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reservation_lifecycle() {
    let t = test_app().await;
    send(
        &t.router,
        "PUT",
        "/v1/rules/ticket_class",
        Some(json!({"code": "TC", "values": {"price_multiplier_1": 1.5}})),
    )
    .await;

    let (_, flight) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(flight_body(&t, "VN210", 125, 1)),
    )
    .await;
    let flight_id = flight["id"].clone();
    let flight_uri = format!("/v1/flights/{}", flight_id.as_str().unwrap());

    let (status, reservation) = send(
        &t.router,
        "POST",
        "/v1/reservations",
        Some(booking_body(&t, &flight_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["status"], "BOOKED");
    assert_eq!(reservation["price"], 1500000);
    let reservation_id = reservation["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &t.router,
        "POST",
        "/v1/reservations",
        Some(booking_body(&t, &flight_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "No available seats in this class");

    let (status, _) = send(&t.router, "DELETE", &flight_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, paid) = send(
        &t.router,
        "POST",
        &format!("/v1/reservations/{}/pay", reservation_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["reservation"]["status"], "PAID");
    assert_eq!(paid["settled"]["price"], 1500000);

    let (status, _) = send(
        &t.router,
        "POST",
        &format!("/v1/reservations/{}/cancel", reservation_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, report) = send(
        &t.router,
        "GET",
        "/v1/reports/revenue/monthly?month=6&year=2099",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_revenue"], 1500000);
    assert_eq!(report["rows"][0]["flight_code"], "HAN-SGN");
    assert_eq!(report["rows"][0]["number_of_tickets"], 1);
    assert_eq!(report["rows"][0]["percentage"], "100.00");

    let (status, list) = send(
        &t.router,
        "GET",
        &format!("/v1/reservations?user_id={}", t.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Paid reservations do not block deletion.
    let (status, _) = send(&t.router, "DELETE", &flight_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cancel_frees_seat_for_capacity_change() {
    let t = test_app().await;
    let (_, flight) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(flight_body(&t, "VN212", 125, 2)),
    )
    .await;
    let flight_id = flight["id"].clone();
    let capacity_uri = format!(
        "/v1/flights/{}/seat-classes/1/capacity",
        flight_id.as_str().unwrap()
    );

    let (_, reservation) = send(
        &t.router,
        "POST",
        "/v1/reservations",
        Some(booking_body(&t, &flight_id)),
    )
    .await;

    let (status, _) = send(&t.router, "PUT", &capacity_uri, Some(json!({"count": 0}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, cancelled) = send(
        &t.router,
        "POST",
        &format!("/v1/reservations/{}/cancel", reservation["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (status, flight) = send(&t.router, "PUT", &capacity_uri, Some(json!({"count": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flight["seat_classes"][0]["count"], 0);
    assert_eq!(flight["seat_classes"][0]["status"], false);
}

#[tokio::test]
async fn test_error_responses() {
    let t = test_app().await;

    let (status, body) = send(
        &t.router,
        "GET",
        &format!("/v1/reservations/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Reservation not found"));

    let (status, _) = send(&t.router, "GET", "/v1/rules/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &t.router,
        "POST",
        "/v1/flights",
        Some(json!({"flight_number": "VN1"})),
    )
    .await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, _) = send(
        &t.router,
        "GET",
        "/v1/reports/revenue/monthly?month=13&year=2024",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
