//! Error catalog for the store crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query rejected by the database engine: {0}")]
    Query(#[from] libsql::Error),

    #[error("row did not map to the expected domain type: {0}")]
    Mapping(String),

    #[error("no {entity} found for id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("interface name '{0}' is already in use on this device")]
    DuplicateInterfaceName(String),

    #[error("a transaction could not be committed")]
    Transaction,

    #[error("remediation plan is not in a state that accepts this operation")]
    InvalidPlanState,

    #[error("rollback window for this snapshot has closed")]
    RollbackWindowClosed,
}
