use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json,
    Router,
};
use data_model::RecordId;
use storage_provider::StorageError;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    facade::StorageFacade,
    http_objects::{ApiError, BackendsInfo, ListParams, StorageDataDefinition},
};

#[derive(Clone)]
pub struct RouteState {
    pub facade: Arc<StorageFacade>,
}

pub fn create_routes(route_state: RouteState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/v1/backends", get(backends).with_state(route_state.clone()))
        .route(
            "/api/v1/{target}",
            get(list_records)
                .post(write_record)
                .with_state(route_state.clone()),
        )
        .route(
            "/api/v1/{target}/{id}",
            get(read_record)
                .delete(delete_record)
                .with_state(route_state.clone()),
        )
        .layer(TraceLayer::new_for_http())
}

async fn index() -> &'static str {
    "Storage service is running"
}

/// Stores the envelope with its `uid` cleared and returns the new identifier.
async fn write_record(
    Path(target): Path<String>,
    State(state): State<RouteState>,
    Json(mut envelope): Json<StorageDataDefinition>,
) -> Result<String, ApiError> {
    envelope.uid = None;
    let payload = serde_json::to_string(&envelope)?;
    let id = state.facade.write(&target, payload).await?;
    info!(%target, %id, "stored record");
    Ok(id.to_string())
}

async fn read_record(
    Path((target, id)): Path<(String, String)>,
    State(state): State<RouteState>,
) -> Result<Json<StorageDataDefinition>, ApiError> {
    let payload = state.facade.read(&target, &id).await?;
    let id: RecordId = id.parse().map_err(StorageError::from)?;
    let mut envelope: StorageDataDefinition = serde_json::from_str(&payload).map_err(|e| {
        ApiError::internal_error(anyhow::anyhow!("stored record {} is not valid: {}", id, e))
    })?;
    envelope.uid = Some(id.to_string());
    Ok(Json(envelope))
}

async fn delete_record(
    Path((target, id)): Path<(String, String)>,
    State(state): State<RouteState>,
) -> Result<(), ApiError> {
    state.facade.delete(&target, &id).await?;
    Ok(())
}

async fn list_records(
    Path(target): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<RouteState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let ids = state.facade.list(&target, params.limit).await?;
    Ok(Json(ids.iter().map(ToString::to_string).collect()))
}

async fn backends(State(state): State<RouteState>) -> Json<BackendsInfo> {
    Json(BackendsInfo {
        targets: state
            .facade
            .targets()
            .iter()
            .map(ToString::to_string)
            .collect(),
        cache_enabled: state.facade.cache_enabled(),
    })
}
