use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    ai_bridge_available: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ai_bridge_available = match &state.config.ollama_url {
        Some(url) => probe_ollama(&state.http_client, url).await,
        None => false,
    };
    Json(HealthResponse { status: "ok", ai_bridge_available })
}

async fn probe_ollama(client: &reqwest::Client, base_url: &str) -> bool {
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    client
        .get(url)
        .timeout(std::time::Duration::from_secs(2))
        .send()
        .await
        .map(|response| response.status().is_success())
        .unwrap_or(false)
}
