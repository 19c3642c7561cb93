use crate::errors::DbError;
use crate::repositories::project_repository::parse_ts;
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::{PlanStatus, RemediationItem, RemediationPlan};
use tracing::instrument;
use uuid::Uuid;

pub struct PlanRepository {
    client: StoreClient,
}

impl PlanRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, items))]
    pub async fn create_with_items(&self, project_id: &str, items: &[RemediationItem]) -> Result<RemediationPlan, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        let tx = conn.transaction().await.map_err(|_| DbError::Transaction)?;

        tx.execute("INSERT INTO remediation_plans (id, project_id) VALUES (?1, ?2)", params![id.clone(), project_id])
            .await?;

        for item in items {
            tx.execute(
                "INSERT INTO remediation_items (plan_id, device_id, interface, source_check_id, cli_patch, rollback_cli, approved)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.clone(),
                    item.device_id.clone(),
                    item.interface.clone(),
                    item.source_check_id.clone(),
                    item.cli_patch.clone(),
                    item.rollback_cli.clone(),
                    item.approved,
                ],
            )
            .await?;
        }

        tx.commit().await.map_err(|_| DbError::Transaction)?;
        self.get_with_items(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get_with_items(&self, id: &str) -> Result<RemediationPlan, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT id, project_id, status, created_at, applied_at FROM remediation_plans WHERE id = ?1", params![id])
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "remediation_plan", id: id.to_string() })?;

        let mut item_rows = conn
            .query(
                "SELECT device_id, interface, source_check_id, cli_patch, rollback_cli, approved
                 FROM remediation_items WHERE plan_id = ?1 ORDER BY id ASC",
                params![id],
            )
            .await?;
        let mut items = Vec::new();
        while let Some(item_row) = item_rows.next().await? {
            items.push(row_to_item(&item_row)?);
        }

        row_to_plan(&row, items)
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<RemediationPlan>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT id FROM remediation_plans WHERE project_id = ?1 ORDER BY created_at DESC", params![project_id])
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get_with_items(&id).await?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: &str, status: PlanStatus) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let applied_clause = if matches!(status, PlanStatus::Applied) { ", applied_at = CURRENT_TIMESTAMP" } else { "" };
        let sql = format!("UPDATE remediation_plans SET status = ?2{applied_clause} WHERE id = ?1");
        let affected = conn.execute(&sql, params![id, status_to_str(status)]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "remediation_plan", id: id.to_string() });
        }
        Ok(())
    }

    /// Toggles whether one item in a pending/approved plan will be applied.
    /// The plan itself must be in a state that accepts approval edits: once
    /// applying has started, items are frozen.
    #[instrument(skip(self))]
    pub async fn set_item_approval(&self, plan_id: &str, item_index: usize, approved: bool) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let mut status_rows = conn
            .query("SELECT status FROM remediation_plans WHERE id = ?1", params![plan_id])
            .await?;
        let status_row = status_rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "remediation_plan", id: plan_id.to_string() })?;
        let status = status_from_str(&status_row.get::<String>(0)?)?;
        if !status.accepts_approval_toggle() {
            return Err(DbError::InvalidPlanState);
        }

        let mut id_rows = conn
            .query("SELECT id FROM remediation_items WHERE plan_id = ?1 ORDER BY id ASC", params![plan_id])
            .await?;
        let mut item_ids = Vec::new();
        while let Some(row) = id_rows.next().await? {
            item_ids.push(row.get::<i64>(0)?);
        }
        let item_id = item_ids
            .get(item_index)
            .ok_or_else(|| DbError::NotFound { entity: "remediation_item", id: item_index.to_string() })?;

        conn.execute("UPDATE remediation_items SET approved = ?2 WHERE id = ?1", params![*item_id, approved]).await?;
        Ok(())
    }
}

fn status_to_str(status: PlanStatus) -> &'static str {
    match status {
        PlanStatus::Pending => "pending",
        PlanStatus::Approved => "approved",
        PlanStatus::Applying => "applying",
        PlanStatus::Applied => "applied",
        PlanStatus::RolledBack => "rolled_back",
        PlanStatus::Failed => "failed",
    }
}

fn status_from_str(raw: &str) -> Result<PlanStatus, DbError> {
    Ok(match raw {
        "pending" => PlanStatus::Pending,
        "approved" => PlanStatus::Approved,
        "applying" => PlanStatus::Applying,
        "applied" => PlanStatus::Applied,
        "rolled_back" => PlanStatus::RolledBack,
        "failed" => PlanStatus::Failed,
        other => return Err(DbError::Mapping(format!("unknown plan status '{other}'"))),
    })
}

fn row_to_item(row: &Row) -> Result<RemediationItem, DbError> {
    Ok(RemediationItem {
        device_id: row.get(0)?,
        interface: row.get(1)?,
        source_check_id: row.get(2)?,
        cli_patch: row.get(3)?,
        rollback_cli: row.get(4)?,
        approved: row.get::<i64>(5)? != 0,
    })
}

fn row_to_plan(row: &Row, items: Vec<RemediationItem>) -> Result<RemediationPlan, DbError> {
    let applied_at: Option<String> = row.get(4)?;
    Ok(RemediationPlan {
        id: row.get(0)?,
        project_id: row.get(1)?,
        items,
        status: status_from_str(&row.get::<String>(2)?)?,
        created_at: parse_ts(row.get::<String>(3)?)?,
        applied_at: applied_at.map(parse_ts).transpose()?,
    })
}
