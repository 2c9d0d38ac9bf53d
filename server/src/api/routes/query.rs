//! Query compilation endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::search::{SearchRequest, SearchService};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct QueryApiState {
    pub search: Arc<SearchService>,
    pub max_columns: usize,
}

fn check_column_count(request: &SearchRequest, max_columns: usize) -> Result<(), ApiError> {
    if request.columns.len() > max_columns {
        return Err(ApiError::too_many_columns(request.columns.len(), max_columns));
    }
    Ok(())
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(search: Arc<SearchService>, max_columns: usize) -> Router<()> {
    let state = QueryApiState {
        search,
        max_columns,
    };

    Router::new()
        .route("/compile", post(compile))
        .route("/validate", post(validate))
        .with_state(state)
}

/// Compile a search request into filter, sort, limit and skip documents
pub async fn compile(
    State(state): State<QueryApiState>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<Json<Value>, ApiError> {
    check_column_count(&request, state.max_columns)?;
    let compiled = state.search.compile(&request)?;
    tracing::debug!(
        columns = request.columns.len(),
        limit = compiled.limit,
        skip = compiled.skip,
        "Compiled search request"
    );
    Ok(Json(compiled.to_document()))
}

/// Validate a search request's columns without compiling them
pub async fn validate(
    State(state): State<QueryApiState>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<StatusCode, ApiError> {
    check_column_count(&request, state.max_columns)?;
    state.search.validate(&request)?;
    Ok(StatusCode::NO_CONTENT)
}
