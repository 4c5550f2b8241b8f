use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::EventBooking;
use crate::models::event::Event;
use crate::models::order::{Order, OrderItem};
use crate::models::outbox::OutboxTask;
use crate::models::user::User;
use crate::outbox::{BookingConfirmationPayload, KIND_BOOKING_CONFIRMATION};
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

const MSG_EVENT_NOT_FOUND: &str = "Event not found.";
const MSG_NOT_ENOUGH_TICKETS: &str = "Not enough tickets available.";
const MSG_ALREADY_BOOKED: &str = "You have already booked a ticket for this event.";

#[derive(Debug, Deserialize)]
pub struct BookEventRequest {
    pub event_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub order_id: Uuid,
    pub booking_id: Uuid,
    pub tickets_remaining: i32,
    pub wallet_status: &'static str,
    pub email_status: &'static str,
}

pub fn validate_booking_request(req: &BookEventRequest) -> AppResult<()> {
    if req.quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be a positive integer.".to_string(),
        ));
    }
    Ok(())
}

/// The event-booking transaction.
///
/// All writes for one attempt share a single transaction: ticket decrement,
/// order, order item, booking row, and the confirmation outbox task. The
/// decrement is conditional on remaining inventory, so two concurrent
/// requests for the last ticket cannot both commit. Wallet pass and email are
/// executed after commit by the outbox worker and cannot undo the booking.
pub async fn book_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<BookEventRequest>,
) -> AppResult<Response> {
    validate_booking_request(&req)?;

    let buyer = User::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

    let event = Event::find_by_id(&state.pool, req.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_EVENT_NOT_FOUND.to_string()))?;

    if req.quantity > event.available_tickets {
        return Err(AppError::Conflict(MSG_NOT_ENOUGH_TICKETS.to_string()));
    }

    let mut tx = state.pool.begin().await?;

    // Re-checked atomically; the read above can be stale under concurrency.
    let Some(tickets_remaining) =
        Event::try_reserve_tickets(&mut tx, event.id, req.quantity).await?
    else {
        return Err(AppError::Conflict(MSG_NOT_ENOUGH_TICKETS.to_string()));
    };

    if EventBooking::exists(&mut tx, user.user_id, event.id).await? {
        return Err(AppError::Conflict(MSG_ALREADY_BOOKED.to_string()));
    }

    let total_amount = event.price * Decimal::from(req.quantity);
    let order = Order::create_pending_event_order(&mut tx, user.user_id, total_amount).await?;
    OrderItem::create_event_item(&mut tx, order.id, event.id, req.quantity, event.price).await?;

    // The unique index catches the duplicate that slips past the pre-check
    // when two requests from the same user race.
    let booking = EventBooking::create(&mut tx, user.user_id, event.id)
        .await
        .map_err(map_duplicate_booking)?;

    let payload = BookingConfirmationPayload {
        booking_id: booking.id,
        order_id: order.id,
        event_title: event.title.clone(),
        buyer_email: buyer.email.clone(),
    };
    let payload = serde_json::to_value(&payload)
        .map_err(|e| AppError::InternalServerError(format!("outbox payload: {e}")))?;
    OutboxTask::enqueue(&mut tx, KIND_BOOKING_CONFIRMATION, &payload).await?;

    tx.commit().await?;

    let confirmation = BookingConfirmation {
        order_id: order.id,
        booking_id: booking.id,
        tickets_remaining,
        wallet_status: "queued",
        email_status: "queued",
    };

    Ok(success(confirmation, "Event booked successfully.").into_response())
}

pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Response> {
    let bookings = EventBooking::list_for_user(&state.pool, user.user_id).await?;
    Ok(success(bookings, "Bookings retrieved").into_response())
}

fn map_duplicate_booking(err: AppError) -> AppError {
    if let AppError::DatabaseError(sqlx::Error::Database(db)) = &err {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(MSG_ALREADY_BOOKED.to_string());
        }
    }
    err
}
