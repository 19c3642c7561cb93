//! WebSocket progress streams, one per job kind, all backed by the same
//! per-job broadcast hub. A subscriber that connects after the job has
//! already finished gets the persisted terminal event replayed from the
//! `jobs` table instead of hanging forever waiting for a broadcast that
//! already happened.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use netval_model::{JobEvent, JobStatus};
use tokio::sync::broadcast::error::RecvError;

pub async fn simulation_stream(ws: WebSocketUpgrade, State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    ws.on_upgrade(move |socket| stream_job(socket, state, job_id))
}

pub async fn ingestion_stream(ws: WebSocketUpgrade, State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    ws.on_upgrade(move |socket| stream_job(socket, state, job_id))
}

pub async fn remediation_stream(ws: WebSocketUpgrade, State(state): State<AppState>, Path(job_id): Path<String>) -> Response {
    ws.on_upgrade(move |socket| stream_job(socket, state, job_id))
}

async fn stream_job(mut socket: WebSocket, state: AppState, job_id: String) {
    // Subscribe before consulting the store: any event published from this
    // point on is queued for us even if it races the status check below.
    let mut events = state.job_events.subscribe(&job_id);

    if let Ok(job) = state.jobs.get(&job_id).await {
        match job.status {
            JobStatus::Complete => {
                let result = job.result.clone().unwrap_or(serde_json::Value::Null);
                let _ = send_event(&mut socket, &JobEvent::Complete { result }).await;
                let _ = socket.close().await;
                return;
            }
            JobStatus::Failed => {
                let message = job
                    .result
                    .as_ref()
                    .and_then(|value| value.get("error"))
                    .and_then(|value| value.as_str())
                    .unwrap_or("job failed")
                    .to_string();
                let _ = send_event(&mut socket, &JobEvent::Failed { message }).await;
                let _ = socket.close().await;
                return;
            }
            JobStatus::Queued | JobStatus::Running => {}
        }
    }

    loop {
        tokio::select! {
            received = events.recv() => {
                match received {
                    Ok(event) => {
                        let terminal = matches!(event, JobEvent::Complete { .. } | JobEvent::Failed { .. });
                        if send_event(&mut socket, &event).await.is_err() || terminal {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    let _ = socket.close().await;
}

async fn send_event(socket: &mut WebSocket, event: &JobEvent) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    socket.send(Message::Text(text)).await
}
