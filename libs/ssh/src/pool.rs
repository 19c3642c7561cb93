//! The bounded worker pool itself: a semaphore capping concurrent SSH
//! sessions at `max_ssh_connections`; excess requests queue for a slot.

use crate::errors::SshError;
use crate::session::{self, IngestResult, PushOutcome, PushProgress};
use crate::{DeviceTarget, DEFAULT_POOL_SIZE};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::instrument;

#[derive(Clone)]
pub struct SshPool {
    semaphore: Arc<Semaphore>,
}

impl SshPool {
    pub fn new(capacity: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(capacity.max(1))) }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }

    /// Opens one session and runs the fixed ingest command set, queuing
    /// behind the pool's capacity if every slot is in use.
    #[instrument(skip(self, target), fields(device_id = %target.device_id))]
    pub async fn ingest(&self, target: &DeviceTarget) -> Result<IngestResult, SshError> {
        let _permit = self.semaphore.acquire().await.map_err(|_| SshError::PoolClosed)?;
        session::ingest(target).await
    }

    /// Pushes `config_block` to `target`. Fails with `ConfirmationRequired`
    /// before acquiring a pool slot or opening any session when
    /// `confirm == false`, without opening any session or taking a pool slot.
    #[instrument(skip(self, target, config_block, on_progress), fields(device_id = %target.device_id))]
    pub async fn push(
        &self,
        target: &DeviceTarget,
        config_block: &str,
        confirm: bool,
        on_progress: impl FnMut(PushProgress),
    ) -> Result<PushOutcome, SshError> {
        if !confirm {
            return Err(SshError::ConfirmationRequired);
        }
        let _permit = self.semaphore.acquire().await.map_err(|_| SshError::PoolClosed)?;
        session::push(target, config_block, confirm, on_progress).await
    }

    /// A liveness probe, backing the device connectivity-check endpoint.
    #[instrument(skip(self, target), fields(device_id = %target.device_id))]
    pub async fn probe(&self, target: &DeviceTarget) -> Result<(), SshError> {
        let _permit = self.semaphore.acquire().await.map_err(|_| SshError::PoolClosed)?;
        session::probe(target).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_without_confirmation_never_acquires_a_permit() {
        let pool = SshPool::new(1);
        let target = DeviceTarget {
            device_id: "d1".into(),
            host: "127.0.0.1".into(),
            port: 22,
            credentials: netval_vault::CredentialMaterial { username: "admin".into(), password: Some("x".into()), key_path: None },
        };
        let result = pool.push(&target, "vlan 10", false, |_| {}).await;
        assert!(matches!(result, Err(SshError::ConfirmationRequired)));
        // The permit was never touched, so the pool is still fully available.
        assert_eq!(pool.semaphore.available_permits(), 1);
    }
}
