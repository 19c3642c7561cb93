//! Composition root: wires the store, builds [`AppState`], and serves the
//! router until a `ctrl_c` is received. Any job still `running` at shutdown
//! is marked `failed` so no client is left waiting on a job that will never
//! complete.

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use netval_model::JobStatus;
use netval_store::StoreClient;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{error, info};

pub struct Kernel {
    port: u16,
    state: AppState,
}

impl Kernel {
    pub async fn ignite(config: Config) -> Self {
        ensure_parent_dir(&config.database_url);

        let store = StoreClient::connect(&config.database_url).await.expect("failed to open topology store");
        let port = config.port;
        let state = AppState::new(config, store);

        Self { port, state }
    }

    pub async fn serve(self) {
        let router = build_router(self.state.clone());
        let address = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = tokio::net::TcpListener::bind(address).await.expect("failed to bind listening port");
        info!(%address, "netval-server listening");

        let state_for_shutdown = self.state.clone();
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(state_for_shutdown))
            .await;

        if let Err(error) = result {
            error!(%error, "server exited with an error");
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal(state: AppState) {
    tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    info!("shutdown signal received, marking running jobs failed");

    let Ok(projects) = state.projects.list().await else { return };
    for project in projects {
        let Ok(jobs) = state.jobs.list_by_project(&project.id).await else { continue };
        for job in jobs.into_iter().filter(|job| job.status == JobStatus::Running) {
            let _ = state.jobs.mark_failed(&job.id, "server shut down while this job was running").await;
        }
    }
}

fn ensure_parent_dir(database_url: &str) {
    if database_url.contains(":memory:") {
        return;
    }
    if let Some(parent) = Path::new(database_url).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
