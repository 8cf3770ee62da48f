use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, experience, slot, booking, user, cron};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))

        // Public Catalogue
        .route("/api/v1/experiences", get(experience::list_experiences))
        .route("/api/v1/experiences/{slug}", get(experience::get_experience))
        .route("/api/v1/experiences/{slug}/slots", get(experience::list_available_slots))

        // Customer Bookings
        .route("/api/v1/bookings", get(booking::list_my_bookings).post(booking::create_booking))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking).delete(booking::delete_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))

        // Admin Experiences & Slots
        .route("/api/v1/admin/experiences", get(experience::admin_list_experiences).post(experience::create_experience))
        .route("/api/v1/admin/experiences/{experience_id}", get(experience::admin_get_experience).put(experience::update_experience).delete(experience::delete_experience))
        .route("/api/v1/admin/experiences/{experience_id}/slots", get(slot::list_slots).post(slot::create_slot))
        .route("/api/v1/admin/experiences/{experience_id}/slots/bulk", post(slot::create_slots_in_range))
        .route("/api/v1/admin/slots/{slot_id}", get(slot::get_slot).put(slot::update_slot).delete(slot::delete_slot))
        .route("/api/v1/admin/slots/{slot_id}/bookings", get(slot::list_slot_bookings))

        // Admin Bookings
        .route("/api/v1/admin/bookings", get(booking::admin_list_bookings).post(booking::admin_create_booking))
        .route("/api/v1/admin/bookings/{booking_id}", put(booking::admin_update_booking).delete(booking::admin_delete_booking))

        // Admin Users
        .route("/api/v1/admin/users", get(user::list_users).post(user::create_user))
        .route("/api/v1/admin/users/{user_id}", get(user::get_user).put(user::update_user).delete(user::delete_user))

        // Scheduler
        .route("/api/v1/cron/cleanup", get(cron::cleanup).post(cron::cleanup))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
