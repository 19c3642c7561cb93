//! Credential Vault.
//!
//! An isolation layer over the host OS secret store (Keychain / Secret Service /
//! Windows Credential Manager via `keyring`). The persistent store never holds
//! plaintext credentials, only the opaque reference this crate hands back.

use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Service name under which every entry is filed in the host secret store.
const SERVICE_NAME: &str = "netval-app";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("credential store backend error: {0}")]
    Backend(#[from] keyring::Error),
    #[error("credential material is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no credential material for reference {0}")]
    NotFound(String),
}

/// Login material for a single device. `password` and `key_path` are mutually
/// usable; a device may have either, both, or neither set beyond `username`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialMaterial {
    pub username: String,
    pub password: Option<String>,
    pub key_path: Option<String>,
}

/// An opaque handle into the host secret store. Never `Display`s its contents
/// because it has none — the string itself is just a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef(pub String);

impl CredentialRef {
    fn entry(&self) -> Result<Entry, VaultError> {
        Ok(Entry::new(SERVICE_NAME, &self.0)?)
    }
}

/// Stores `material` under a freshly minted reference, scoped informationally
/// to a project/device pair (the scoping is advisory for the reference's human
/// -readable prefix only; the host secret store itself does not partition by
/// project).
pub fn store(project_id: &str, device_id: &str, material: &CredentialMaterial) -> Result<CredentialRef, VaultError> {
    let reference = CredentialRef(format!("{project_id}:{device_id}:{}", Uuid::new_v4()));
    let payload = serde_json::to_string(material)?;
    reference.entry()?.set_password(&payload)?;
    Ok(reference)
}

/// Loads the material behind `reference`.
pub fn load(reference: &CredentialRef) -> Result<CredentialMaterial, VaultError> {
    let payload = match reference.entry()?.get_password() {
        Ok(payload) => payload,
        Err(keyring::Error::NoEntry) => return Err(VaultError::NotFound(reference.0.clone())),
        Err(other) => return Err(other.into()),
    };
    Ok(serde_json::from_str(&payload)?)
}

/// Deletes the vault entry behind `reference`. Deleting a device must call this
/// so no orphaned secret survives the device row.
pub fn delete(reference: &CredentialRef) -> Result<(), VaultError> {
    match reference.entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn round_trips_material_through_the_host_store() {
        let material = CredentialMaterial {
            username: "admin".into(),
            password: Some("cisco123".into()),
            key_path: None,
        };
        let reference = store("proj-1", "dev-1", &material).expect("store");
        let loaded = load(&reference).expect("load");
        assert_eq!(loaded.username, "admin");
        assert_eq!(loaded.password.as_deref(), Some("cisco123"));

        delete(&reference).expect("delete");
        assert!(matches!(load(&reference), Err(VaultError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn deleting_a_missing_reference_is_not_an_error() {
        let reference = CredentialRef("proj-x:dev-x:does-not-exist".into());
        assert!(delete(&reference).is_ok());
    }
}
