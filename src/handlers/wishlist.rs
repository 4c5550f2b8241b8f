use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::product::Product;
use crate::models::wishlist::WishlistItem;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct AddWishlistRequest {
    pub product_id: Uuid,
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddWishlistRequest>,
) -> AppResult<Response> {
    if !Product::exists(&state.pool, req.product_id).await? {
        return Err(AppError::NotFound("Product not found.".to_string()));
    }

    WishlistItem::add(&state.pool, user.user_id, req.product_id).await?;
    Ok(empty_success("Added to wishlist").into_response())
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Response> {
    let removed = WishlistItem::remove(&state.pool, user.user_id, product_id).await?;
    if !removed {
        return Err(AppError::NotFound(
            "Product is not on your wishlist.".to_string(),
        ));
    }
    Ok(empty_success("Removed from wishlist").into_response())
}

pub async fn list_wishlist(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    let items = WishlistItem::list_for_user(&state.pool, user.user_id).await?;
    Ok(success(items, "Wishlist retrieved").into_response())
}
