//! Drives the router through `tower::ServiceExt::oneshot` the way the
//! teacher's own handler tests exercise `axum::Router` without binding a
//! real TCP listener.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use netval_server::routes::build_router;
use netval_server::{AppState, Config};
use netval_store::StoreClient;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let store = StoreClient::connect("file::memory:?cache=shared").await.expect("connect");
    let config = Config {
        database_url: ":memory:".to_string(),
        port: 0,
        worker_pool_size: 2,
        retention_window_hours: 24,
        ollama_url: None,
    };
    AppState::new(config, store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_reports_ok_with_no_ollama_configured() {
    let router = build_router(test_state().await);
    let response = router.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["ai_bridge_available"], false);
}

#[tokio::test]
async fn creating_a_project_then_a_device_then_a_link_enforces_project_membership() {
    let router = build_router(test_state().await);

    let create_project = Request::builder()
        .method("POST")
        .uri("/projects")
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Campus A", "description": null}).to_string()))
        .unwrap();
    let response = router.clone().oneshot(create_project).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let project = body_json(response).await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let create_device = |hostname: &str| {
        Request::builder()
            .method("POST")
            .uri(format!("/projects/{project_id}/devices"))
            .header("content-type", "application/json")
            .body(Body::from(json!({"hostname": hostname, "role": "switch", "vendor": "Cisco", "platform": "IOS-XE", "management_ip": null}).to_string()))
            .unwrap()
    };

    let access_response = router.clone().oneshot(create_device("access-sw-01")).await.unwrap();
    assert_eq!(access_response.status(), StatusCode::OK);
    let access_device = body_json(access_response).await;
    let access_id = access_device["id"].as_str().unwrap().to_string();

    let core_response = router.clone().oneshot(create_device("core-sw-01")).await.unwrap();
    let core_device = body_json(core_response).await;
    let core_id = core_device["id"].as_str().unwrap().to_string();

    let create_link = Request::builder()
        .method("POST")
        .uri(format!("/projects/{project_id}/links"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "source_device_id": access_id,
                "source_interface": "Gi0/1",
                "target_device_id": core_id,
                "target_interface": "Gi0/1",
                "medium": "ethernet",
            })
            .to_string(),
        ))
        .unwrap();
    let response = router.clone().oneshot(create_link).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A link into a device that belongs to a different project must be rejected.
    let other_project = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/projects")
                .header("content-type", "application/json")
                .body(Body::from(json!({"name": "Campus B", "description": null}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let other_project_id = body_json(other_project).await["id"].as_str().unwrap().to_string();

    let cross_project_link = Request::builder()
        .method("POST")
        .uri(format!("/projects/{other_project_id}/links"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "source_device_id": access_id,
                "source_interface": "Gi0/2",
                "target_device_id": core_id,
                "target_interface": "Gi0/2",
                "medium": "ethernet",
            })
            .to_string(),
        ))
        .unwrap();
    let response = router.oneshot(cross_project_link).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn applying_a_plan_without_confirmation_is_rejected_before_any_job_is_created() {
    let state = test_state().await;
    let project = state.projects.create("Campus C", None).await.expect("project");
    let plan = state.plans.create_with_items(&project.id, &[]).await.expect("plan");

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/plans/{}/apply", plan.id))
                .header("content-type", "application/json")
                .body(Body::from(json!({"confirm": false}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT, "confirmation_required maps to 409");

    let jobs = state.jobs.list_by_project(&project.id).await.expect("jobs");
    assert!(jobs.is_empty(), "no job row may exist when the apply was rejected for lack of confirmation");
}
