mod common;

use axum::http::StatusCode;
use chrono::Weekday;
use common::{TestApp, ALL_DAYS, upcoming};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_booking_beyond_remaining_is_rejected_then_exact_fit_fills_slot() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "harbour-walk", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Mon), 10).await;

    let guest = app.register("guest@example.com").await;
    let (status, _) = app.book(&guest, &slot_id, 8).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.booked_slots(&slot_id).await, 8);

    let (status, body) = app.book(&guest, &slot_id, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2 remaining"), "unexpected body: {}", body);
    assert_eq!(app.booked_slots(&slot_id).await, 8);

    let (status, body) = app.book(&guest, &slot_id, 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["number_of_people"], 2);
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(app.booked_slots(&slot_id).await, 10);
}

#[tokio::test]
async fn test_deleting_booking_returns_its_places() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "olive-press", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Tue), 6).await;

    let guest = app.register("press@example.com").await;
    let (_, first) = app.book(&guest, &slot_id, 4).await;
    app.book(&guest, &slot_id, 1).await;
    assert_eq!(app.booked_slots(&slot_id).await, 5);

    let booking_id = first["id"].as_str().unwrap();
    let (status, _) = app.send("DELETE", &format!("/api/v1/bookings/{}", booking_id), Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.booked_slots(&slot_id).await, 1);

    let (status, _) = app.send("GET", &format!("/api/v1/bookings/{}", booking_id), Some(&guest), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_releases_places_once() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "cliff-dive", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Wed), 4).await;

    let guest = app.register("diver@example.com").await;
    let (_, booking) = app.book(&guest, &slot_id, 3).await;
    let booking_id = booking["id"].as_str().unwrap();

    let uri = format!("/api/v1/bookings/{}/cancel", booking_id);
    let (status, body) = app.send("POST", &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(app.booked_slots(&slot_id).await, 0);

    let (status, _) = app.send("POST", &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Deleting the cancelled booking must not release its places a second time.
    app.book(&guest, &slot_id, 2).await;
    let (status, _) = app.send("DELETE", &format!("/api/v1/bookings/{}", booking_id), Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.booked_slots(&slot_id).await, 2);
}

#[tokio::test]
async fn test_cancelled_slot_rejects_new_bookings() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "night-sail", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Fri), 10).await;

    let guest = app.register("sailor@example.com").await;
    app.book(&guest, &slot_id, 2).await;

    let (status, _) = app.send("PUT", &format!("/api/v1/admin/slots/{}", slot_id), Some(&admin), Some(json!({
        "is_cancelled": true
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.book(&guest, &slot_id, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This slot has been cancelled");
    assert_eq!(app.booked_slots(&slot_id).await, 2);
}

#[tokio::test]
async fn test_booking_input_validation() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "food-tour", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Sat), 10).await;
    let guest = app.register("foodie@example.com").await;

    let (status, _) = app.book(&guest, &slot_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("POST", "/api/v1/bookings", Some(&guest), Some(json!({
        "slotId": slot_id
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.book(&guest, "missing-slot", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("POST", "/api/v1/bookings", None, Some(json!({
        "slotId": slot_id, "numberOfPeople": 1
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // snake_case payloads are accepted too
    let (status, _) = app.send("POST", "/api/v1/bookings", Some(&guest), Some(json!({
        "slot_id": slot_id, "number_of_people": 2, "notes": "vegetarian"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.booked_slots(&slot_id).await, 2);
}

#[tokio::test]
async fn test_concurrent_bookings_never_oversell() {
    let app = Arc::new(TestApp::new().await);
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "balloon-ride", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Sun), 5).await;
    let guest = app.register("balloon@example.com").await;

    let mut set = JoinSet::new();
    for _ in 0..12 {
        let app = app.clone();
        let guest = guest.clone();
        let slot_id = slot_id.clone();
        set.spawn(async move { app.book(&guest, &slot_id, 1).await.0 });
    }

    let mut created = 0;
    let mut rejected = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 5);
    assert_eq!(rejected, 7);
    assert_eq!(app.booked_slots(&slot_id).await, 5);

    let bookings = app.state.booking_repo.list_by_slot(&slot_id).await.unwrap();
    assert_eq!(bookings.len(), 5);
}

#[tokio::test]
async fn test_malformed_booking_body_gets_json_error() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "tram-ride", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Tue), 10).await;
    let guest = app.register("tram@example.com").await;

    for people in [json!("3"), json!(2.5), json!(3_000_000_000i64)] {
        let (status, body) = app.send("POST", "/api/v1/bookings", Some(&guest), Some(json!({
            "slotId": slot_id, "numberOfPeople": people
        }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "numberOfPeople = {}", people);
        assert!(body["error"].is_string(), "unexpected body: {}", body);
    }

    // No body and no content type.
    let (status, body) = app.send("POST", "/api/v1/bookings", Some(&guest), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "unexpected body: {}", body);

    assert_eq!(app.booked_slots(&slot_id).await, 0);
}

#[tokio::test]
async fn test_huge_party_is_rejected_without_touching_slot() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "zip-line", &ALL_DAYS).await;
    let slot_id = app.create_slot(&admin, &exp_id, upcoming(Weekday::Thu), 10).await;
    let guest = app.register("zip@example.com").await;

    let (status, body) = app.book(&guest, &slot_id, i32::MAX).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("10 remaining"), "unexpected body: {}", body);

    app.book(&guest, &slot_id, 4).await;
    let (status, _) = app.book(&guest, &slot_id, i32::MAX - 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.booked_slots(&slot_id).await, 4);
}
