use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::user::User;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, success};

const ROLE_SELLER: &str = "seller";

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub price: Decimal,
    pub available_tickets: i32,
}

pub fn validate_create_event(req: &CreateEventRequest) -> AppResult<()> {
    if req.title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required.".to_string()));
    }
    if req.location.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Location is required.".to_string(),
        ));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Price cannot be negative.".to_string(),
        ));
    }
    if req.available_tickets < 0 {
        return Err(AppError::ValidationError(
            "Ticket count cannot be negative.".to_string(),
        ));
    }
    if let Some(end) = req.end_time {
        if end <= req.start_time {
            return Err(AppError::ValidationError(
                "End time must be after start time.".to_string(),
            ));
        }
    }
    Ok(())
}

/// Only seller accounts may publish events.
pub fn ensure_seller(role: &str) -> AppResult<()> {
    if role != ROLE_SELLER {
        return Err(AppError::Forbidden(
            "Only seller accounts can create events.".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Response> {
    let events = Event::list(&state.pool).await?;
    Ok(success(events, "Events retrieved").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Response> {
    let event = Event::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;
    Ok(success(event, "Event retrieved").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<Response> {
    validate_create_event(&req)?;

    let caller = User::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;
    ensure_seller(&caller.role)?;

    let event = Event::create(
        &state.pool,
        user.user_id,
        req.title.trim(),
        req.description.as_deref(),
        req.location.trim(),
        req.start_time,
        req.end_time,
        req.price,
        req.available_tickets,
    )
    .await?;

    Ok(created(event, "Event created").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_request() -> CreateEventRequest {
        let start = Utc::now() + Duration::days(7);
        CreateEventRequest {
            title: "Gulf Foods Fair".to_string(),
            description: None,
            location: "Dubai World Trade Centre".to_string(),
            start_time: start,
            end_time: Some(start + Duration::hours(8)),
            price: Decimal::new(5000, 2),
            available_tickets: 200,
        }
    }

    #[test]
    fn test_valid_event_passes() {
        assert!(validate_create_event(&valid_request()).is_ok());
    }

    #[test]
    fn test_negative_tickets_rejected() {
        let mut req = valid_request();
        req.available_tickets = -1;
        assert!(validate_create_event(&req).is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut req = valid_request();
        req.end_time = Some(req.start_time - Duration::hours(1));
        assert!(validate_create_event(&req).is_err());
    }

    #[test]
    fn test_free_event_allowed() {
        let mut req = valid_request();
        req.price = Decimal::ZERO;
        assert!(validate_create_event(&req).is_ok());
    }

    #[test]
    fn test_buyer_cannot_create_events() {
        let err = ensure_seller("buyer").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_seller_can_create_events() {
        assert!(ensure_seller("seller").is_ok());
    }
}
