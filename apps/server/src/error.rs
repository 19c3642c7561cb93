//! The REST surface's single error type. Every handler returns
//! `Result<T, ApiError>`; `IntoResponse` maps each variant to the status
//! code and JSON body clients see.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use netval_store::DbError;
use netval_vault::VaultError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// A request body or path parameter failed validation before any store
    /// or device I/O was attempted.
    Validation(String),
    NotFound { entity: &'static str, id: String },
    /// A mutating action requires `{"confirm": true}` and didn't get it.
    ConfirmationRequired,
    /// The embedded store rejected or failed a query.
    Storage(String),
    /// SSH/device I/O failed outside of a background job (e.g. the
    /// synchronous connectivity probe).
    DeviceUnreachable(String),
    /// The credential vault rejected a lookup or store.
    Vault(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(message) => write!(f, "validation error: {message}"),
            ApiError::NotFound { entity, id } => write!(f, "no {entity} found for id {id}"),
            ApiError::ConfirmationRequired => write!(f, "this action requires explicit confirmation"),
            ApiError::Storage(message) => write!(f, "storage error: {message}"),
            ApiError::DeviceUnreachable(message) => write!(f, "device unreachable: {message}"),
            ApiError::Vault(message) => write!(f, "credential vault error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::ConfirmationRequired => (StatusCode::CONFLICT, "confirmation_required"),
            ApiError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_error"),
            ApiError::DeviceUnreachable(_) => (StatusCode::BAD_GATEWAY, "device_unreachable"),
            ApiError::Vault(_) => (StatusCode::BAD_GATEWAY, "vault_error"),
        };
        let message = self.to_string();
        (status, Json(ErrorBody { error: code.to_string(), message })).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            DbError::RollbackWindowClosed => ApiError::Validation("rollback window has closed for this device".into()),
            DbError::InvalidPlanState => ApiError::Validation("remediation plan is not in a state that accepts this operation".into()),
            DbError::DuplicateInterfaceName(name) => ApiError::Validation(format!("interface name '{name}' is already in use on this device")),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(error: VaultError) -> Self {
        match error {
            VaultError::NotFound(reference) => ApiError::NotFound { entity: "credential", id: reference },
            other => ApiError::Vault(other.to_string()),
        }
    }
}
