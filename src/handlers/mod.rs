use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

pub mod auth;
pub mod bookings;
pub mod events;
pub mod messages;
pub mod orders;
pub mod wishlist;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "dutydinar-api",
    };

    success(payload, "Health check successful").into_response()
}
