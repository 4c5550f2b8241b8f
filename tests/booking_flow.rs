//! Database-backed tests for the booking transaction. They need a live
//! PostgreSQL and are ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/dutydinar_test \
//!     cargo test --test booking_flow -- --ignored
//! ```

use axum::extract::{Json, State};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use dutydinar_server::config::Config;
use dutydinar_server::handlers::bookings::{book_event, BookEventRequest};
use dutydinar_server::models::event::Event;
use dutydinar_server::models::user::User;
use dutydinar_server::state::AppState;
use dutydinar_server::utils::auth::AuthUser;
use dutydinar_server::utils::crypto;
use dutydinar_server::utils::error::AppError;

async fn test_state() -> AppState {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!().run(&pool).await.expect("run migrations");
    AppState::new(pool, Config::from_env())
}

async fn create_buyer(pool: &PgPool) -> User {
    let (hash, salt) = crypto::hash_password("a test password");
    let email = format!("buyer-{}@example.com", Uuid::new_v4());
    User::create(pool, "Test Buyer", &email, "buyer", &hash, &salt)
        .await
        .expect("create buyer")
}

async fn create_event(pool: &PgPool, organizer: Uuid, tickets: i32, price: Decimal) -> Event {
    let start = Utc::now() + Duration::days(30);
    Event::create(
        pool,
        organizer,
        "Test Expo",
        None,
        "Hall 4",
        start,
        None,
        price,
        tickets,
    )
    .await
    .expect("create event")
}

fn as_caller(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        token: "test-session".to_string(),
    }
}

async fn available_tickets(pool: &PgPool, event_id: Uuid) -> i32 {
    let (n,): (i32,) = sqlx::query_as("SELECT available_tickets FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("read counter");
    n
}

async fn order_count(pool: &PgPool, buyer_id: Uuid) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE buyer_id = $1")
        .bind(buyer_id)
        .fetch_one(pool)
        .await
        .expect("count orders");
    n
}

async fn order_item_count(pool: &PgPool, buyer_id: Uuid) -> i64 {
    let (n,): (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM order_items i
           JOIN orders o ON o.id = i.order_id
           WHERE o.buyer_id = $1"#,
    )
    .bind(buyer_id)
    .fetch_one(pool)
    .await
    .expect("count order items");
    n
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn valid_booking_decrements_and_creates_single_booking() {
    let state = test_state().await;
    let buyer = create_buyer(&state.pool).await;
    let event = create_event(&state.pool, buyer.id, 5, Decimal::new(2000, 2)).await;

    let response = book_event(
        State(state.clone()),
        as_caller(&buyer),
        Json(BookEventRequest {
            event_id: event.id,
            quantity: 3,
        }),
    )
    .await
    .expect("booking succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    // Remaining count comes from the decrement itself, not the earlier read.
    assert_eq!(body["data"]["tickets_remaining"], 2);

    assert_eq!(available_tickets(&state.pool, event.id).await, 2);
    assert_eq!(order_count(&state.pool, buyer.id).await, 1);
    assert_eq!(order_item_count(&state.pool, buyer.id).await, 1);

    // One booking row, quantity pinned to 1 regardless of the requested 3.
    let bookings: Vec<(i32,)> =
        sqlx::query_as("SELECT quantity FROM event_bookings WHERE user_id = $1 AND event_id = $2")
            .bind(buyer.id)
            .bind(event.id)
            .fetch_all(&state.pool)
            .await
            .unwrap();
    assert_eq!(bookings, vec![(1,)]);

    // The confirmation side effects were enqueued with the booking.
    let (outbox,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM outbox_tasks WHERE kind = 'booking_confirmation' \
         AND payload->>'buyer_email' = $1",
    )
    .bind(&buyer.email)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(outbox, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn insufficient_tickets_leaves_state_untouched() {
    let state = test_state().await;
    let buyer = create_buyer(&state.pool).await;
    let event = create_event(&state.pool, buyer.id, 2, Decimal::new(2000, 2)).await;

    let err = book_event(
        State(state.clone()),
        as_caller(&buyer),
        Json(BookEventRequest {
            event_id: event.id,
            quantity: 5,
        }),
    )
    .await
    .expect_err("overdrawn request must fail");

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("Not enough tickets available."));

    assert_eq!(available_tickets(&state.pool, event.id).await, 2);
    assert_eq!(order_count(&state.pool, buyer.id).await, 0);
    assert_eq!(order_item_count(&state.pool, buyer.id).await, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_booking_rolls_back_every_row() {
    let state = test_state().await;
    let buyer = create_buyer(&state.pool).await;
    let event = create_event(&state.pool, buyer.id, 10, Decimal::new(2000, 2)).await;

    book_event(
        State(state.clone()),
        as_caller(&buyer),
        Json(BookEventRequest {
            event_id: event.id,
            quantity: 1,
        }),
    )
    .await
    .expect("first booking succeeds");

    let err = book_event(
        State(state.clone()),
        as_caller(&buyer),
        Json(BookEventRequest {
            event_id: event.id,
            quantity: 1,
        }),
    )
    .await
    .expect_err("second booking must fail");

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err
        .to_string()
        .contains("You have already booked a ticket for this event."));

    // The failed attempt's decrement rolled back with the rest of its
    // transaction; only the first booking's writes persist.
    assert_eq!(available_tickets(&state.pool, event.id).await, 9);
    assert_eq!(order_count(&state.pool, buyer.id).await, 1);
    assert_eq!(order_item_count(&state.pool, buyer.id).await, 1);

    let (bookings,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM event_bookings WHERE user_id = $1 AND event_id = $2",
    )
    .bind(buyer.id)
    .bind(event.id)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(bookings, 1);
}
