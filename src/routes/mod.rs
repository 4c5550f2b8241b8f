use axum::routing::{delete, get, post};
use axum::Router;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{auth, bookings, events, health_check, messages, orders, wishlist};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/request-reset", post(auth::request_reset))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:id", get(events::get_event))
        .route("/events/book", post(bookings::book_event))
        .route("/bookings", get(bookings::list_bookings))
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/messages", post(messages::send_message))
        .route("/messages/:user_id", get(messages::get_conversation))
        .route("/wishlist", get(wishlist::list_wishlist).post(wishlist::add_to_wishlist))
        .route("/wishlist/:product_id", delete(wishlist::remove_from_wishlist));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
