mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc, Weekday};
use common::{parse_body, TestApp, ALL_DAYS, CRON_SECRET, upcoming};
use tower::ServiceExt;

async fn call_cleanup(app: &TestApp, method: &str, bearer: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri("/api/v1/cron/cleanup");
    if let Some(secret) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", secret));
    }
    let res = app.router.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    let status = res.status();
    (status, parse_body(res).await)
}

#[tokio::test]
async fn test_cleanup_requires_cron_secret() {
    let app = TestApp::new().await;

    let (status, _) = call_cleanup(&app, "POST", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_cleanup(&app, "POST", Some("wrong-secret")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call_cleanup(&app, "GET", Some(CRON_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings_deleted"], 0);
    assert_eq!(body["slots_deleted"], 0);
}

#[tokio::test]
async fn test_cleanup_purges_only_data_older_than_a_month() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let exp_id = app.create_experience(&admin, "museum-night", &ALL_DAYS).await;

    let ancient = app.create_slot(&admin, &exp_id, Utc::now() - Duration::days(45), 10).await;
    let recent = app.create_slot(&admin, &exp_id, Utc::now() - Duration::days(10), 10).await;
    let future = app.create_slot(&admin, &exp_id, upcoming(Weekday::Sat), 10).await;

    let guest = app.register("museum@example.com").await;
    app.book(&guest, &ancient, 2).await;
    app.book(&guest, &ancient, 1).await;
    app.book(&guest, &recent, 1).await;
    app.book(&guest, &future, 1).await;

    let (status, body) = call_cleanup(&app, "POST", Some(CRON_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings_deleted"], 2);
    assert_eq!(body["slots_deleted"], 1);

    assert!(app.state.slot_repo.find_by_id(&ancient).await.unwrap().is_none());
    assert!(app.state.slot_repo.find_by_id(&recent).await.unwrap().is_some());
    assert!(app.state.slot_repo.find_by_id(&future).await.unwrap().is_some());

    let (_, mine) = app.send("GET", "/api/v1/bookings", Some(&guest), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (_, body) = call_cleanup(&app, "POST", Some(CRON_SECRET)).await;
    assert_eq!(body["slots_deleted"], 0);
}
