//! Remote sync settings persisted alongside studio data.
//!
//! # Invariants
//! - The shared secret stays wrapped in `SecretString` outside storage I/O.
//! - Blank URL/secret values are treated as absent.

use super::kv_store::{encode_json, load_json, KeyValueStore, RepoResult, StoreKey};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub remote_url: Option<String>,
    pub shared_secret: Option<SecretString>,
    pub autosave: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            shared_secret: None,
            autosave: true,
        }
    }
}

/// Endpoint plus credential, present only when both are configured.
#[derive(Debug, Clone, Copy)]
pub struct RemoteTarget<'a> {
    pub url: &'a str,
    pub secret: &'a SecretString,
}

impl SyncSettings {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> RepoResult<Self> {
        let remote_url: Option<String> = load_json(store, StoreKey::RemoteUrl)?;
        let secret: Option<String> = load_json(store, StoreKey::SharedSecret)?;
        let autosave: Option<bool> = load_json(store, StoreKey::Autosave)?;
        Ok(Self {
            remote_url: remote_url.filter(|value| !value.trim().is_empty()),
            shared_secret: secret
                .filter(|value| !value.trim().is_empty())
                .map(SecretString::new),
            autosave: autosave.unwrap_or(true),
        })
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> RepoResult<()> {
        let mut entries = vec![encode_json(StoreKey::Autosave, &self.autosave)?];
        match self.remote_url.as_deref() {
            Some(url) => entries.push(encode_json(StoreKey::RemoteUrl, url.trim())?),
            None => store.remove(StoreKey::RemoteUrl)?,
        }
        match self.shared_secret.as_ref() {
            Some(secret) => entries.push(encode_json(
                StoreKey::SharedSecret,
                secret.expose_secret().as_str(),
            )?),
            None => store.remove(StoreKey::SharedSecret)?,
        }
        store.save_raw(&entries)
    }

    pub fn remote(&self) -> Option<RemoteTarget<'_>> {
        Some(RemoteTarget {
            url: self.remote_url.as_deref()?,
            secret: self.shared_secret.as_ref()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.remote().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::SyncSettings;
    use crate::repo::kv_store::{KeyValueStore, MemoryKvStore, StoreKey};
    use secrecy::{ExposeSecret, SecretString};

    #[test]
    fn defaults_to_autosave_without_remote() {
        let store = MemoryKvStore::new();
        let settings = SyncSettings::load(&store).unwrap();
        assert!(settings.autosave);
        assert!(!settings.is_configured());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let store = MemoryKvStore::new();
        let settings = SyncSettings {
            remote_url: Some("https://example.com/exec".to_string()),
            shared_secret: Some(SecretString::new("lotus".to_string())),
            autosave: false,
        };
        settings.save(&store).unwrap();

        let loaded = SyncSettings::load(&store).unwrap();
        let remote = loaded.remote().expect("remote should be configured");
        assert_eq!(remote.url, "https://example.com/exec");
        assert_eq!(remote.secret.expose_secret(), "lotus");
        assert!(!loaded.autosave);
    }

    #[test]
    fn clearing_secret_removes_key() {
        let store = MemoryKvStore::new();
        SyncSettings {
            remote_url: Some("https://example.com/exec".to_string()),
            shared_secret: Some(SecretString::new("lotus".to_string())),
            autosave: true,
        }
        .save(&store)
        .unwrap();

        SyncSettings {
            remote_url: Some("https://example.com/exec".to_string()),
            shared_secret: None,
            autosave: true,
        }
        .save(&store)
        .unwrap();

        assert!(store.load_raw(StoreKey::SharedSecret).unwrap().is_none());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let settings = SyncSettings {
            remote_url: None,
            shared_secret: Some(SecretString::new("lotus".to_string())),
            autosave: true,
        };
        assert!(!format!("{settings:?}").contains("lotus"));
    }
}
