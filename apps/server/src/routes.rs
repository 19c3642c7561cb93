//! The REST + WebSocket surface. A handful of `Router::new()` groups, nested
//! under the entities they cover and merged into one tree, the way the
//! teacher groups routes by subsystem before composing them in the kernel.

use crate::handlers::{audit, configs, credentials, devices, health, links, projects, remediation, ssh, validate};
use crate::state::AppState;
use crate::ws;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any).max_age(Duration::from_secs(3600));

    let project_routes = Router::new()
        .route("/", post(projects::create).get(projects::list))
        .route("/:project_id", get(projects::get).put(projects::update).delete(projects::delete))
        .route("/:project_id/devices", post(devices::create))
        .route("/:project_id/links", post(links::create).get(links::list_by_project))
        .route("/:project_id/validate", post(validate::trigger))
        .route("/:project_id/generate-cli", get(validate::generate_cli))
        .route("/:project_id/remediate", post(remediation::build_plan))
        .route("/:project_id/plans", get(remediation::list_by_project))
        .route("/:project_id/audit-log", get(audit::list));

    // Device listing is keyed by project id (`GET /devices/{project_id}`)
    // and single-device lookup lives under `/devices/detail/{device_id}`,
    // per the ratified resolution of spec.md's ambiguous single-route
    // notation recorded in DESIGN.md.
    let device_routes = Router::new()
        .route("/:project_id", get(devices::list_by_project))
        .route("/detail/:device_id", get(devices::detail).delete(devices::delete))
        .route("/:device_id/upload-config", post(configs::upload))
        .route("/:device_id/configs", post(configs::create_manual))
        .route("/:device_id/configs/latest", get(configs::latest))
        .route("/:device_id/ssh-connect", post(ssh::connect))
        .route("/:device_id/ingest", post(ssh::ingest))
        .route("/:device_id/credentials", post(credentials::store).delete(credentials::delete));

    let link_routes = Router::new().route("/:link_id", axum::routing::delete(links::delete));

    let job_routes = Router::new().route("/:job_id", get(validate::get_job));

    let plan_routes = Router::new()
        .route("/:plan_id", get(remediation::get))
        .route("/:plan_id/approve", post(remediation::approve))
        .route("/:plan_id/apply", post(remediation::apply))
        .route("/:plan_id/rollback", post(remediation::rollback));

    let ws_routes = Router::new()
        .route("/simulation/:job_id", get(ws::simulation_stream))
        .route("/ingestion/:job_id", get(ws::ingestion_stream))
        .route("/remediation/:job_id", get(ws::remediation_stream));

    Router::new()
        .route("/health", get(health::health))
        .nest("/projects", project_routes)
        .nest("/devices", device_routes)
        .nest("/links", link_routes)
        .nest("/jobs", job_routes)
        .nest("/plans", plan_routes)
        .nest("/ws", ws_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
