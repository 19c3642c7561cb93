use crate::errors::DbError;
use crate::repositories::project_repository::parse_ts;
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::{JobKind, JobStatus, SimulationJob};
use tracing::instrument;
use uuid::Uuid;

pub struct JobRepository {
    client: StoreClient,
}

impl JobRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, project_id: &str, kind: JobKind) -> Result<SimulationJob, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO jobs (id, project_id, kind) VALUES (?1, ?2, ?3)",
            params![id.clone(), project_id, kind_to_str(kind)],
        )
        .await?;
        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<SimulationJob, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, kind, status, result, started_at, completed_at FROM jobs WHERE id = ?1",
                params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "job", id: id.to_string() })?;
        row_to_job(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<SimulationJob>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, kind, status, result, started_at, completed_at FROM jobs
                 WHERE project_id = ?1 ORDER BY started_at DESC",
                params![project_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_job(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn mark_running(&self, id: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute(
                "UPDATE jobs SET status = 'running', started_at = CURRENT_TIMESTAMP WHERE id = ?1 AND status = 'queued'",
                params![id],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "job", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self, result))]
    pub async fn mark_complete(&self, id: &str, result: &serde_json::Value) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let payload = serde_json::to_string(result).map_err(|e| DbError::Mapping(e.to_string()))?;
        let affected = conn
            .execute(
                "UPDATE jobs SET status = 'complete', result = ?2, completed_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, payload],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "job", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_failed(&self, id: &str, message: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let payload = serde_json::json!({ "error": message }).to_string();
        let affected = conn
            .execute(
                "UPDATE jobs SET status = 'failed', result = ?2, completed_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, payload],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "job", id: id.to_string() });
        }
        Ok(())
    }
}

fn kind_to_str(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Simulation => "simulation",
        JobKind::Ingestion => "ingestion",
        JobKind::Remediation => "remediation",
    }
}

fn kind_from_str(raw: &str) -> Result<JobKind, DbError> {
    Ok(match raw {
        "simulation" => JobKind::Simulation,
        "ingestion" => JobKind::Ingestion,
        "remediation" => JobKind::Remediation,
        other => return Err(DbError::Mapping(format!("unknown job kind '{other}'"))),
    })
}

fn status_from_str(raw: &str) -> Result<JobStatus, DbError> {
    Ok(match raw {
        "queued" => JobStatus::Queued,
        "running" => JobStatus::Running,
        "complete" => JobStatus::Complete,
        "failed" => JobStatus::Failed,
        other => return Err(DbError::Mapping(format!("unknown job status '{other}'"))),
    })
}

fn row_to_job(row: &Row) -> Result<SimulationJob, DbError> {
    let started_at: Option<String> = row.get(5)?;
    let completed_at: Option<String> = row.get(6)?;
    let result: Option<String> = row.get(4)?;

    Ok(SimulationJob {
        id: row.get(0)?,
        project_id: row.get(1)?,
        kind: kind_from_str(&row.get::<String>(2)?)?,
        status: status_from_str(&row.get::<String>(3)?)?,
        result: result.map(|raw| serde_json::from_str(&raw)).transpose().map_err(|e| DbError::Mapping(e.to_string()))?,
        started_at: started_at.map(parse_ts).transpose()?,
        completed_at: completed_at.map(parse_ts).transpose()?,
    })
}
