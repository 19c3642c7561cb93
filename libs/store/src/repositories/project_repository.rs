use crate::errors::DbError;
use crate::StoreClient;
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use netval_model::Project;
use tracing::instrument;
use uuid::Uuid;

pub struct ProjectRepository {
    client: StoreClient,
}

impl ProjectRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Project, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO projects (id, name, description) VALUES (?1, ?2, ?3)",
            params![id.clone(), name, description],
        )
        .await?;
        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Project, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT id, name, description, created_at, updated_at FROM projects WHERE id = ?1", params![id])
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "project", id: id.to_string() })?;
        row_to_project(&row)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Project>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT id, name, description, created_at, updated_at FROM projects ORDER BY created_at DESC", ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_project(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, name: &str, description: Option<&str>) -> Result<Project, DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute(
                "UPDATE projects SET name = ?2, description = ?3, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, name, description],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "project", id: id.to_string() });
        }
        self.get(id).await
    }

    /// Deletes the project. Every device, interface, link, snapshot, job and
    /// plan it owns is removed by the `ON DELETE CASCADE` foreign keys.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn.execute("DELETE FROM projects WHERE id = ?1", params![id]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "project", id: id.to_string() });
        }
        Ok(())
    }
}

fn row_to_project(row: &Row) -> Result<Project, DbError> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_ts(row.get::<String>(3)?)?,
        updated_at: parse_ts(row.get::<String>(4)?)?,
    })
}

pub(crate) fn parse_ts(raw: String) -> Result<DateTime<Utc>, DbError> {
    chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| DbError::Mapping(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_client() -> StoreClient {
        StoreClient::connect("file::memory:?cache=shared").await.expect("connect")
    }

    #[tokio::test]
    async fn creates_and_fetches_a_project() {
        let repo = ProjectRepository::new(test_client().await);
        let created = repo.create("Campus A", Some("pre-deploy validation")).await.expect("create");
        let fetched = repo.get(&created.id).await.expect("get");
        assert_eq!(fetched.name, "Campus A");
    }

    #[tokio::test]
    async fn delete_of_missing_project_errors() {
        let repo = ProjectRepository::new(test_client().await);
        assert!(matches!(repo.delete("does-not-exist").await, Err(DbError::NotFound { .. })));
    }
}
