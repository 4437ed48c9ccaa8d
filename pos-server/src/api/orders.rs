//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{OrderCreate, OrderDetail, OrderStatusUpdate, OrderUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/orders - create an order with nested items
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.create_order(payload, Some(&user))?;
    Ok(Json(detail))
}

/// GET /api/orders/{id} - fetch an order, scoped to the acting user
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.get_order(id, Some(&user))?;
    Ok(Json(detail))
}

/// PUT /api/orders/{id} - partial update; a supplied item list replaces
/// the existing rows wholesale
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.update_order(id, payload, Some(&user))?;
    Ok(Json(detail))
}

/// PUT /api/orders/{id}/status - status transition; terminal statuses
/// release the held table in the same transaction
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.update_order_status(id, payload, Some(&user))?;
    Ok(Json(detail))
}
