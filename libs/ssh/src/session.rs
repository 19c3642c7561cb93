//! One SSH session's worth of work: connect, authenticate, run the fixed
//! ingest command set, or push a rendered CLI patch.

use crate::errors::SshError;
use crate::{DeviceTarget, COMMAND_TIMEOUT, CONNECT_TIMEOUT, INGEST_COMMANDS};
use russh::client::{Handle, Handler};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

/// Every result of `ingest`: each fixed command's output keyed by the
/// command itself, plus the `show running-config` output pulled out
/// separately for the caller to persist as a `ConfigSnapshot`.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub outputs: BTreeMap<String, String>,
    pub raw_config: String,
}

/// One progress event during a push, multiplexed by the job manager to
/// WebSocket subscribers as `push_line`/`push_device_complete` events.
#[derive(Debug, Clone)]
pub enum PushProgress {
    Line { device_id: String, line: String },
    DeviceComplete { device_id: String, success: bool },
}

/// Outcome of a single device's push, including the pre-push snapshot text
/// so the caller can persist it as the rollback target before anything else.
#[derive(Debug, Clone)]
pub struct PushOutcome {
    pub pre_push_snapshot: String,
}

/// Lab devices accept any host key; this is a pre-deployment validation tool
/// against devices the operator already controls, not a hardened production
/// SSH client.
struct AcceptAnyHostKey;

#[async_trait::async_trait]
impl Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[instrument(skip(target), fields(device_id = %target.device_id))]
async fn open_session(target: &DeviceTarget) -> Result<Handle<AcceptAnyHostKey>, SshError> {
    let config = Arc::new(russh::client::Config::default());
    let addr = (target.host.as_str(), target.port);

    let mut session = timeout(CONNECT_TIMEOUT, russh::client::connect(config, addr, AcceptAnyHostKey))
        .await
        .map_err(|_| SshError::ConnectTimeout { host: target.host.clone(), timeout_secs: CONNECT_TIMEOUT.as_secs() })?
        .map_err(|_| SshError::DeviceUnreachable(target.host.clone()))?;

    let authenticated = if let Some(password) = &target.credentials.password {
        session
            .authenticate_password(&target.credentials.username, password)
            .await
            .map_err(SshError::Transport)?
    } else if let Some(key_path) = &target.credentials.key_path {
        let key_pair = russh_keys::load_secret_key(key_path, None)?;
        session
            .authenticate_publickey(&target.credentials.username, Arc::new(key_pair))
            .await
            .map_err(SshError::Transport)?
    } else {
        return Err(SshError::AuthFailure { host: target.host.clone(), username: target.credentials.username.clone() });
    };

    if !authenticated {
        return Err(SshError::AuthFailure { host: target.host.clone(), username: target.credentials.username.clone() });
    }

    Ok(session)
}

async fn exec_command(session: &mut Handle<AcceptAnyHostKey>, command: &str) -> Result<String, SshError> {
    let run = async {
        let mut channel = session.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut output = Vec::new();
        while let Some(message) = channel.wait().await {
            match message {
                ChannelMsg::Data { data } => output.extend_from_slice(&data),
                ChannelMsg::ExtendedData { data, .. } => output.extend_from_slice(&data),
                ChannelMsg::ExitStatus { .. } => break,
                _ => {}
            }
        }
        Ok::<_, russh::Error>(String::from_utf8_lossy(&output).into_owned())
    };

    timeout(COMMAND_TIMEOUT, run)
        .await
        .map_err(|_| SshError::CommandTimeout { command: command.to_string(), timeout_secs: COMMAND_TIMEOUT.as_secs() })?
        .map_err(SshError::Transport)
}

/// Opens one session and runs the fixed ingest command set.
#[instrument(skip(target), fields(device_id = %target.device_id))]
pub async fn ingest(target: &DeviceTarget) -> Result<IngestResult, SshError> {
    let mut session = open_session(target).await?;

    let mut outputs = BTreeMap::new();
    for command in INGEST_COMMANDS {
        let output = exec_command(&mut session, command).await?;
        outputs.insert(command.to_string(), output);
    }

    let raw_config = outputs.get("show running-config").cloned().unwrap_or_default();
    let _ = session.disconnect(Disconnect::ByApplication, "ingest complete", "en").await;

    info!(device_id = %target.device_id, "ingest complete");
    Ok(IngestResult { outputs, raw_config })
}

/// Captures a `pre_push` snapshot, enters configure mode, sends `config_block`
/// line by line with a short inter-line settle, then `end` and
/// `write memory`. Requires `confirm == true`; the caller
/// (the pool) is expected to have already rejected `confirm == false` before
/// this is ever invoked, so no session is opened for an unconfirmed push.
#[instrument(skip(target, config_block, on_progress), fields(device_id = %target.device_id))]
pub async fn push(
    target: &DeviceTarget,
    config_block: &str,
    confirm: bool,
    mut on_progress: impl FnMut(PushProgress),
) -> Result<PushOutcome, SshError> {
    if !confirm {
        return Err(SshError::ConfirmationRequired);
    }

    let mut session = open_session(target).await?;

    let pre_push_snapshot = exec_command(&mut session, "show running-config").await.map_err(|e| SshError::PushFailure {
        device_id: target.device_id.clone(),
        step: "pre-push snapshot".to_string(),
        source_class: error_class(&e),
        message: e.to_string(),
        pre_push_snapshot: None,
    })?;

    let send_step = |step: &'static str| step.to_string();

    (|| async {
        exec_command(&mut session, "configure terminal").await?;
        for line in config_block.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            on_progress(PushProgress::Line { device_id: target.device_id.clone(), line: line.to_string() });
            exec_command(&mut session, line).await?;
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        exec_command(&mut session, "end").await?;
        exec_command(&mut session, "write memory").await?;
        Ok::<_, SshError>(())
    })()
    .await
    .map_err(|e| SshError::PushFailure {
        device_id: target.device_id.clone(),
        step: send_step("apply patch"),
        source_class: error_class(&e),
        message: e.to_string(),
        // The snapshot was already captured above; a failure applying the
        // patch must not drop the one thing that makes rollback possible.
        pre_push_snapshot: Some(pre_push_snapshot.clone()),
    })?;

    let _ = session.disconnect(Disconnect::ByApplication, "push complete", "en").await;
    on_progress(PushProgress::DeviceComplete { device_id: target.device_id.clone(), success: true });
    warn!(device_id = %target.device_id, "push applied; pre-push snapshot retained for rollback");

    Ok(PushOutcome { pre_push_snapshot })
}

/// A liveness probe: opens a session and runs `show version` only, distinct
/// from `ingest`'s full command set.
#[instrument(skip(target), fields(device_id = %target.device_id))]
pub async fn probe(target: &DeviceTarget) -> Result<String, SshError> {
    let mut session = open_session(target).await?;
    let output = exec_command(&mut session, "show version").await?;
    let _ = session.disconnect(Disconnect::ByApplication, "probe complete", "en").await;
    Ok(output)
}

fn error_class(error: &SshError) -> String {
    match error {
        SshError::ConnectTimeout { .. } => "ConnectTimeout".to_string(),
        SshError::CommandTimeout { .. } => "CommandTimeout".to_string(),
        SshError::AuthFailure { .. } => "AuthenticationException".to_string(),
        SshError::DeviceUnreachable(_) => "NoValidConnectionsError".to_string(),
        SshError::PushFailure { source_class, .. } => source_class.clone(),
        SshError::ConfirmationRequired => "ConfirmationRequired".to_string(),
        SshError::Transport(_) => "SSHException".to_string(),
        SshError::Key(_) => "SSHException".to_string(),
        SshError::Vault(_) => "VaultError".to_string(),
        SshError::PoolClosed => "PoolClosed".to_string(),
    }
}
