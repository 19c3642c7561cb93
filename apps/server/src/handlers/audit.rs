use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use netval_model::AuditLogEntry;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AuditLogQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

const DEFAULT_LIMIT: i64 = 50;

pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);
    Ok(Json(state.audit.list_by_project(&project_id, limit, offset).await?))
}
