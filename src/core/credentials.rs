//! API key lookup: environment first, then the platform keyring.

use keyring::Entry;
use tracing::{debug, warn};

use crate::core::constants::{API_KEY_ENV_VARS, KEYRING_SERVICE, KEYRING_USER};
use crate::core::keyring::KeyringAccessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment(&'static str),
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: CredentialSource,
}

/// Finds the API key. Recoverable keyring outages count as "not found";
/// permanent keyring failures are returned so the caller can report them.
pub fn resolve_api_key(use_keyring: bool) -> Result<Option<ResolvedKey>, KeyringAccessError> {
    resolve_with(
        |name| std::env::var(name).ok(),
        || {
            if use_keyring {
                read_keyring()
            } else {
                Ok(None)
            }
        },
    )
}

fn resolve_with<E, K>(env: E, keyring: K) -> Result<Option<ResolvedKey>, KeyringAccessError>
where
    E: Fn(&str) -> Option<String>,
    K: FnOnce() -> Result<Option<String>, KeyringAccessError>,
{
    for &name in API_KEY_ENV_VARS {
        if let Some(key) = env(name).filter(|key| !key.trim().is_empty()) {
            debug!(source = name, "using API key from environment");
            return Ok(Some(ResolvedKey {
                key,
                source: CredentialSource::Environment(name),
            }));
        }
    }

    match keyring() {
        Ok(Some(key)) if !key.trim().is_empty() => Ok(Some(ResolvedKey {
            key,
            source: CredentialSource::Keyring,
        })),
        Ok(_) => Ok(None),
        Err(err) if err.is_recoverable() => {
            warn!("keyring unavailable, continuing without stored key: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn entry() -> Result<Entry, KeyringAccessError> {
    Ok(Entry::new(KEYRING_SERVICE, KEYRING_USER)?)
}

fn read_keyring() -> Result<Option<String>, KeyringAccessError> {
    match entry()?.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn store_api_key(key: &str) -> Result<(), KeyringAccessError> {
    entry()?.set_password(key.trim())?;
    Ok(())
}

/// Returns false when there was nothing to delete.
pub fn delete_api_key() -> Result<bool, KeyringAccessError> {
    match entry()?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(err.into()),
    }
}
