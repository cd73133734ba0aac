//! Cookie consent storage and analytics gating.
//!
//! Consent lives under a single key in a small JSON key/value file, read once
//! at startup and rewritten whenever the visitor accepts or declines.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Storage key holding `"true"` or `"false"`.
pub const CONSENT_KEY: &str = "cookieConsent";

/// Analytics toggle and tracking id from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSettings {
    pub enabled: bool,
    pub tracking_id: Option<String>,
}

impl AnalyticsSettings {
    /// Tracking id to load, only when analytics is on and consent is given.
    pub fn tracking_id_for(&self, consent: Option<bool>) -> Option<&str> {
        if self.enabled && consent == Some(true) {
            self.tracking_id.as_deref().filter(|id| !id.is_empty())
        } else {
            None
        }
    }
}

/// File-backed key/value storage.
#[derive(Debug, Clone)]
pub struct ConsentStore {
    path: PathBuf,
}

impl ConsentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded choice, or `None` if the visitor never chose.
    ///
    /// A missing or unreadable file counts as no choice.
    pub fn load(&self) -> Option<bool> {
        let entries = self.read_entries();
        match entries.get(CONSENT_KEY).map(String::as_str) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                tracing::warn!(value = other, "Ignoring unrecognized consent value");
                None
            }
            None => None,
        }
    }

    /// Record a choice, keeping other keys in the file.
    ///
    /// The file is replaced atomically: a temp file in the same directory is
    /// written, then renamed over the old one.
    pub fn save(&self, accepted: bool) -> io::Result<()> {
        let mut entries = self.read_entries();
        entries.insert(CONSENT_KEY.to_string(), accepted.to_string());

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(&entries).map_err(io::Error::other)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read consent storage");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = ?self.path, error = %e, "Consent storage is not valid JSON");
            BTreeMap::new()
        })
    }
}

/// Consent choice shared by the request handlers.
///
/// Writers are serialized so the file and the in-memory choice always end on
/// the same value.
#[derive(Debug)]
pub struct ConsentState {
    store: ConsentStore,
    choice: RwLock<Option<bool>>,
    writer: Mutex<()>,
}

impl ConsentState {
    /// Read the stored choice once.
    pub fn load(store: ConsentStore) -> Self {
        let choice = store.load();
        tracing::info!(?choice, path = ?store.path(), "Loaded cookie consent");
        Self {
            store,
            choice: RwLock::new(choice),
            writer: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Option<bool> {
        *self.choice.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persist and publish a new choice.
    pub async fn record(&self, accepted: bool) -> io::Result<()> {
        let _writer = self.writer.lock().await;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.save(accepted))
            .await
            .map_err(io::Error::other)??;

        *self.choice.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(accepted);
        Ok(())
    }
}
