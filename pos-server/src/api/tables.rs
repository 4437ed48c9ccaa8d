//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::DiningTable;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::tables;
use crate::utils::AppResult;

/// GET /api/tables - the table pool with live occupancy
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.store.list_tables()?;
    Ok(Json(tables))
}

/// POST /api/tables/{id}/clear - staff-explicit clear; cancels the live
/// order holding the table and frees it
pub async fn clear(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<u64>,
) -> AppResult<Json<DiningTable>> {
    let table = tables::clear_table(&state.store, id)?;
    Ok(Json(table))
}
