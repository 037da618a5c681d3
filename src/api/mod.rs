// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    state::AppState,
    storage::{QueueStatus, QueuedEvent, TransactionEvent, TxEventData, TxEventType},
};

pub mod health;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/{id}", get(transactions::get_transaction))
        .route(
            "/transactions/{id}/visible",
            post(transactions::mark_visible),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        transactions::list_transactions,
        transactions::get_transaction,
        transactions::mark_visible,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            TransactionEvent,
            TxEventType,
            TxEventData,
            QueueStatus,
            QueuedEvent,
            transactions::TransactionListResponse,
            transactions::MarkVisibleResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Transactions", description = "Local transaction event feed"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
