// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction feed endpoints over the local event queue.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::ApiError,
    state::AppState,
    storage::{QueueStatus, QueuedEvent},
};

/// Default page size for the feed.
const DEFAULT_LIMIT: usize = 50;
/// Upper bound on `limit`.
const MAX_LIMIT: usize = 500;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for the transaction feed.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionListQuery {
    /// Only return events in this display state
    pub status: Option<QueueStatus>,
    /// Maximum number of results (default: 50, max: 500)
    #[param(default = 50)]
    pub limit: Option<usize>,
}

/// Transaction feed response, oldest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionListResponse {
    pub transactions: Vec<QueuedEvent>,
}

/// Result of acknowledging an event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarkVisibleResponse {
    /// Transaction hash
    pub id: String,
    pub status: QueueStatus,
    /// Whether this call changed the status
    pub changed: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List queued transaction events in display order.
#[utoipa::path(
    get,
    path = "/v1/transactions",
    tag = "Transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Transaction feed", body = TransactionListResponse),
        (status = 400, description = "Invalid limit"),
        (status = 500, description = "Queue unavailable")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let transactions = state
        .queue
        .list()
        .filter(|item| match item {
            Ok(queued) => query.status.is_none_or(|s| queued.status == s),
            Err(_) => true,
        })
        .take(limit)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(TransactionListResponse { transactions }))
}

/// Fetch a single queued event.
#[utoipa::path(
    get,
    path = "/v1/transactions/{id}",
    tag = "Transactions",
    params(
        ("id" = String, Path, description = "Transaction hash")
    ),
    responses(
        (status = 200, description = "Transaction event", body = QueuedEvent),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedEvent>, ApiError> {
    state
        .queue
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Transaction not found"))
}

/// Mark an event as shown to the user.
#[utoipa::path(
    post,
    path = "/v1/transactions/{id}/visible",
    tag = "Transactions",
    params(
        ("id" = String, Path, description = "Transaction hash")
    ),
    responses(
        (status = 200, description = "Event is visible", body = MarkVisibleResponse),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn mark_visible(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MarkVisibleResponse>, ApiError> {
    let changed = state.queue.mark_visible(&id)?;
    Ok(Json(MarkVisibleResponse {
        id,
        status: QueueStatus::Visible,
        changed,
    }))
}
