//! Composition root's shared handle: every handler receives a clone of this
//! through axum's `State` extractor. Repositories and the SSH pool are cheap
//! to clone (they hold only a `StoreClient`/`Arc` internally), so `AppState`
//! itself derives `Clone` rather than wrapping everything in an `Arc<Mutex<_>>`.

use crate::config::Config;
use crate::jobs::JobEventHub;
use netval_checks::Check;
use netval_ssh::SshPool;
use netval_store::{
    AuditRepository, DeviceRepository, DeviceVlanRepository, InterfaceRepository, JobRepository,
    LinkRepository, PlanRepository, ProjectRepository, SnapshotRepository, StoreClient,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreClient,
    pub projects: Arc<ProjectRepository>,
    pub devices: Arc<DeviceRepository>,
    pub interfaces: Arc<InterfaceRepository>,
    pub vlans: Arc<DeviceVlanRepository>,
    pub links: Arc<LinkRepository>,
    pub snapshots: Arc<SnapshotRepository>,
    pub jobs: Arc<JobRepository>,
    pub plans: Arc<PlanRepository>,
    pub audit: Arc<AuditRepository>,
    pub ssh_pool: SshPool,
    pub registry: Arc<Vec<Box<dyn Check>>>,
    pub job_events: Arc<JobEventHub>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: StoreClient) -> Self {
        let ssh_pool = SshPool::new(config.worker_pool_size);
        Self {
            store: store.clone(),
            projects: Arc::new(ProjectRepository::new(store.clone())),
            devices: Arc::new(DeviceRepository::new(store.clone())),
            interfaces: Arc::new(InterfaceRepository::new(store.clone())),
            vlans: Arc::new(DeviceVlanRepository::new(store.clone())),
            links: Arc::new(LinkRepository::new(store.clone())),
            snapshots: Arc::new(SnapshotRepository::new(store.clone())),
            jobs: Arc::new(JobRepository::new(store.clone())),
            plans: Arc::new(PlanRepository::new(store.clone())),
            audit: Arc::new(AuditRepository::new(store)),
            ssh_pool,
            registry: Arc::new(netval_checks::default_registry()),
            job_events: Arc::new(JobEventHub::new()),
            http_client: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}
