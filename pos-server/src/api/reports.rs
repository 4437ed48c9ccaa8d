//! Daily Report API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::DailySalesReport;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/reports/daily/{date} - daily sales for `YYYY-MM-DD`
pub async fn daily(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(date): Path<String>,
) -> AppResult<Json<DailySalesReport>> {
    let report = state.reporter.daily_sales(&date)?;
    Ok(Json(report))
}
