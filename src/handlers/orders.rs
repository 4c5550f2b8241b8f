use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::models::order::{Order, OrderItem};
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn list_orders(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let orders = Order::list_for_buyer(&state.pool, user.user_id).await?;
    Ok(success(orders, "Orders retrieved").into_response())
}

/// Other users' orders are indistinguishable from missing ones.
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Response> {
    let order = Order::find_for_buyer(&state.pool, order_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

    let items = OrderItem::list_for_order(&state.pool, order.id).await?;

    Ok(success(OrderWithItems { order, items }, "Order retrieved").into_response())
}
