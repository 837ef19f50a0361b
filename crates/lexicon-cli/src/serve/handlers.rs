//! HTTP route handlers for the taxonomy server.
//!
//! Handlers are kept thin: the catalog owns the data rules and the
//! classifier owns placement.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use lexicon_core::remote::{AddTermRequest, AddTermResponse, DeleteTermResponse};
use lexicon_core::{normalize_label, propose_parent, resolve_placement, View};

use super::models::{ApiError, NavigateQuery};
use super::AppState;

/// GET `/api/lexicon/graph` - every term and edge.
///
/// Response format:
/// ```json
/// {
///   "terms": [{"id": "...", "label": "KNOWLEDGE"}],
///   "edges": [{"parent_id": "...", "child_id": "...", "sort_order": 0}]
/// }
/// ```
pub async fn api_graph(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let payload = state.catalog.read().await.graph().to_payload();
    let cache_control = format!("public, max-age={}", state.graph_max_age_secs);
    ([(header::CACHE_CONTROL, cache_control)], Json(payload))
}

/// GET `/api/lexicon/navigate?term=LABEL` - the view around one label.
pub async fn api_navigate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NavigateQuery>,
) -> Result<Json<View>, ApiError> {
    state
        .catalog
        .read()
        .await
        .view(&params.term)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&normalize_label(&params.term)))
}

/// POST `/api/lexicon/terms` - add a term under a classifier-chosen parent.
pub async fn api_add_term(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTermRequest>,
) -> Result<(StatusCode, Json<AddTermResponse>), ApiError> {
    let label = normalize_label(&request.label);
    if label.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Label is empty"));
    }

    // Reject duplicates before spending a model call on them. The guard is
    // released before classifying so writes are not held behind the model.
    let taxonomy = {
        let catalog = state.catalog.read().await;
        if catalog.graph().find_by_label(&label).is_some() {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                format!("Term already exists: {label}"),
            ));
        }
        catalog.describe()
    };

    let proposed = propose_parent(state.classifier.as_ref(), &label, &taxonomy).await;

    // Resolved against the catalog as it is now; the proposed parent may
    // have been deleted while the classifier ran.
    let mut catalog = state.catalog.write().await;
    let placement = resolve_placement(&catalog, &label, proposed.as_deref());
    let (term, parent) = catalog.insert(&label, &placement.parent)?;
    let provenance = placement.provenance;

    Ok((
        StatusCode::CREATED,
        Json(AddTermResponse {
            term,
            parent,
            provenance,
        }),
    ))
}

/// DELETE `/api/lexicon/terms/{id}` - remove a term and its subtree.
pub async fn api_delete_term(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTermResponse>, ApiError> {
    let removed = state.catalog.write().await.remove(&id)?;
    tracing::debug!(%id, removed, "delete served");
    Ok(Json(DeleteTermResponse { success: true }))
}
