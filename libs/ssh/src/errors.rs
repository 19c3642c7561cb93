//! SSH error catalog. Device-automation tooling conventionally surfaces the
//! underlying transport library's own exception class name to callers; here
//! the analogous `russh`/`russh_keys` error variant name is preserved in
//! `error_class()` so the underlying library's classification survives into
//! the surfaced error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SshError {
    #[error("connection to {host} timed out after {timeout_secs}s")]
    ConnectTimeout { host: String, timeout_secs: u64 },

    #[error("command '{command}' timed out after {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    #[error("authentication failed for {username}@{host}")]
    AuthFailure { host: String, username: String },

    #[error("device unreachable: {0}")]
    DeviceUnreachable(String),

    /// `pre_push_snapshot` is `Some` whenever the `show running-config`
    /// capture itself succeeded before a later step failed, so the caller
    /// can still persist a rollback target even though the push as a whole
    /// failed.
    #[error("push to {device_id} failed at step '{step}': {source_class}: {message}")]
    PushFailure { device_id: String, step: String, source_class: String, message: String, pre_push_snapshot: Option<String> },

    #[error("push requires explicit confirmation")]
    ConfirmationRequired,

    #[error("transport error: {0}")]
    Transport(#[from] russh::Error),

    #[error("key handling error: {0}")]
    Key(#[from] russh_keys::Error),

    #[error("credential vault error: {0}")]
    Vault(#[from] netval_vault::VaultError),

    #[error("worker pool is shutting down")]
    PoolClosed,
}
