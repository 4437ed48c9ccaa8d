//! External Order API Handlers
//!
//! `submit` is the public trust boundary — no authentication, everything
//! else about the submission is resolved server-side. The remaining
//! handlers are staff-facing: the pending-list polling fallback, the
//! idempotent status transition, and the SSE push stream.

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use shared::models::{
    ExternalOrder, ExternalOrderDetail, ExternalOrderStatusUpdate, ExternalOrderSubmit,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// POST /api/public/orders - unauthenticated public submission
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<ExternalOrderSubmit>,
) -> AppResult<Json<ExternalOrderDetail>> {
    let detail = state.pipeline.submit(payload)?;
    Ok(Json(detail))
}

/// GET /api/external-orders/pending - polling fallback for missed pushes
pub async fn pending(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ExternalOrderDetail>>> {
    let details = state.pipeline.list_pending_by_admin(user.tenant_id())?;
    Ok(Json(details))
}

/// PUT /api/external-orders/{id}/status - staff-driven transition,
/// idempotent on re-apply
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ExternalOrderStatusUpdate>,
) -> AppResult<Json<ExternalOrder>> {
    // Scope to the acting tenant before touching the row
    let existing = state.pipeline.get(&id)?;
    if existing.external.admin_user_id != user.tenant_id() {
        return Err(AppError::NotFound(format!("external order {id}")));
    }
    let external = state.pipeline.update_status(&id, payload.status)?;
    Ok(Json(external))
}

/// GET /api/external-orders/events - server-push stream of new external
/// orders; fan-out, observation does not claim an order
pub async fn events(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifier.subscribe();
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    match Event::default().event(event.topic.clone()).json_data(&event.order) {
                        Ok(sse_event) => return Some((Ok(sse_event), rx)),
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to encode push event, skipped");
                            continue;
                        }
                    }
                }
                // slow consumer skipped some events; the pending-list
                // query is the system of record, keep streaming
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
