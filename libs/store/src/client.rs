//! Connection management for the embedded topology database.

use crate::errors::DbError;
use crate::schema::{apply_pragmas, apply_schema};
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

/// Owns the libSQL database handle and, for in-memory test databases, an
/// anchor connection that keeps the schema alive for the process lifetime.
#[derive(Clone)]
pub struct StoreClient {
    database: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    /// Opens (creating if absent) the local database file at `path`, or an
    /// in-memory database when `path` is `:memory:`.
    #[instrument]
    pub async fn connect(path: &str) -> Result<Self, DbError> {
        if path.is_empty() {
            return Err(DbError::Connection("database path is empty".into()));
        }

        info!(path, "opening topology store");

        let database = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;
        let database = Arc::new(database);

        let is_memory = path.contains(":memory:");
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&anchor_conn)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap = database.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&bootstrap)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))?;
        }

        Ok(Self { database, _memory_anchor: anchor })
    }

    /// Hands out a fresh connection with this store's pragmas (notably
    /// `foreign_keys = ON`) applied. libSQL pragmas are per-connection, so
    /// every connection handed to a repository needs them re-applied here,
    /// not just the bootstrap/anchor connection schema creation used.
    pub async fn connection(&self) -> Result<Connection, DbError> {
        let conn = self.database.connect().map_err(|e| DbError::Connection(e.to_string()))?;
        apply_pragmas(&conn).await.map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(conn)
    }
}
