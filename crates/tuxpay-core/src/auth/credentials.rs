use anyhow::{Context, Result};
use keyring::Entry;

use super::store::TokenStore;

const SERVICE_NAME: &str = "tuxpay-admin";

/// Durable token store backed by the OS keychain.
///
/// Each key becomes one keychain entry under the `tuxpay-admin` service,
/// optionally namespaced by the API URL so tokens for different servers
/// do not collide.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    namespace: String,
}

impl KeyringStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        let user = if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}@{}", key, self.namespace)
        };
        Entry::new(SERVICE_NAME, &user).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
