// File: ./src/storage.rs
// Persists the record store as one JSON document and handles backups.
//
// On-disk layout (`production_app_v2.json`):
//   { "tasks": [...], "shipments": [...], "installations": [...], "daily_notes": {...} }
// Backups wrap the same document: { "version", "exportDate", "data" }.
use crate::context::AppContext;
use crate::model::{Installation, Shipment, Task};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

pub const BACKUP_VERSION: &str = "2.9.0";
pub const INVALID_BACKUP: &str = "Неверный формат файла";

/// Everything the application stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub shipments: Vec<Shipment>,
    #[serde(default)]
    pub installations: Vec<Installation>,
    /// ISO date (YYYY-MM-DD) -> note text, one per day.
    #[serde(default)]
    pub daily_notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub version: String,
    #[serde(rename = "exportDate")]
    pub export_date: String,
    pub data: StoreData,
}

/// Tracks whether the last load of a given file succeeded.
/// Saves are refused after a failed load so unreadable data is never overwritten.
static LOAD_STATE_MAP: OnceLock<Mutex<HashMap<PathBuf, LoadState>>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Uninitialized,
    Success,
    Failed,
}

impl LoadState {
    fn get(path: &Path) -> LoadState {
        let map = LOAD_STATE_MAP.get_or_init(|| Mutex::new(HashMap::new()));
        match map.lock() {
            Ok(guard) => *guard.get(path).unwrap_or(&LoadState::Uninitialized),
            Err(poisoned) => *poisoned
                .into_inner()
                .get(path)
                .unwrap_or(&LoadState::Uninitialized),
        }
    }

    fn set(path: &Path, state: LoadState) {
        let map = LOAD_STATE_MAP.get_or_init(|| Mutex::new(HashMap::new()));
        let mut guard = match map.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(path.to_path_buf(), state);
    }
}

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Copies the pre-v2 store over when the current one does not exist yet.
    /// Shipments without a date are dropped; the legacy file is left in place.
    /// Returns true when a migration happened.
    pub fn migrate_legacy(ctx: &dyn AppContext) -> Result<bool> {
        let legacy = ctx.get_legacy_store_path()?;
        let current = ctx.get_store_path()?;
        if !legacy.exists() || current.exists() {
            return Ok(false);
        }

        log::info!("Migrating legacy store {:?}", legacy);
        let raw = fs::read_to_string(&legacy)
            .with_context(|| format!("Failed to read legacy store {:?}", legacy))?;
        let mut doc: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Legacy store is not valid JSON, skipping migration: {}", e);
                return Ok(false);
            }
        };
        if !doc.is_object() {
            log::warn!("Legacy store is not an object, skipping migration");
            return Ok(false);
        }

        if let Some(shipments) = doc.get_mut("shipments").and_then(|s| s.as_array_mut()) {
            let before = shipments.len();
            shipments.retain(has_usable_date);
            log::info!("Kept {} of {} legacy shipments", shipments.len(), before);
        }

        Self::with_lock(&current, || {
            Self::atomic_write(&current, serde_json::to_string_pretty(&doc)?)
        })?;
        Ok(true)
    }

    /// Loads the store, running the legacy migration first. A missing file is an empty store.
    pub fn load(ctx: &dyn AppContext) -> Result<StoreData> {
        Self::migrate_legacy(ctx)?;
        let path = ctx.get_store_path()?;
        if !path.exists() {
            LoadState::set(&path, LoadState::Success);
            return Ok(StoreData::default());
        }

        let result = Self::with_lock(&path, || {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store {:?}", path))?;
            let data: StoreData = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse store {:?}", path))?;
            Ok(data)
        });

        match &result {
            Ok(data) => {
                LoadState::set(&path, LoadState::Success);
                log::debug!(
                    "Loaded {} tasks, {} shipments, {} installations",
                    data.tasks.len(),
                    data.shipments.len(),
                    data.installations.len()
                );
            }
            Err(e) => {
                LoadState::set(&path, LoadState::Failed);
                log::error!("Store load failed: {:#}", e);
            }
        }
        result
    }

    /// Writes the whole store. Refused when the last load of this file failed.
    pub fn save(ctx: &dyn AppContext, data: &StoreData) -> Result<()> {
        let path = ctx.get_store_path()?;
        if LoadState::get(&path) == LoadState::Failed {
            anyhow::bail!(
                "Cannot save {:?}: previous load failed. This prevents overwriting data that couldn't be read.",
                path
            );
        }
        Self::write_store(&path, data)
    }

    /// Writes the store even after a failed load (explicit restore).
    pub fn force_save(ctx: &dyn AppContext, data: &StoreData) -> Result<()> {
        let path = ctx.get_store_path()?;
        Self::write_store(&path, data)?;
        LoadState::set(&path, LoadState::Success);
        Ok(())
    }

    fn write_store(path: &Path, data: &StoreData) -> Result<()> {
        Self::with_lock(path, || {
            let json = serde_json::to_string_pretty(data)?;
            Self::atomic_write(path, json)
                .with_context(|| format!("Failed to write store {:?}", path))
        })
    }

    /// Removes the legacy store so a cleared store is not re-populated by migration.
    pub fn remove_legacy(ctx: &dyn AppContext) -> Result<()> {
        let legacy = ctx.get_legacy_store_path()?;
        if legacy.exists() {
            fs::remove_file(&legacy)
                .with_context(|| format!("Failed to remove legacy store {:?}", legacy))?;
        }
        Ok(())
    }

    pub fn to_backup_json(data: &StoreData, now: DateTime<Utc>) -> Result<String> {
        let backup = Backup {
            version: BACKUP_VERSION.to_string(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            data: data.clone(),
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Parses a backup file. The document must carry `data.tasks`.
    pub fn from_backup_json(json: &str) -> Result<Backup> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Backup is not valid JSON")?;
        let has_tasks = value
            .get("data")
            .and_then(|d| d.get("tasks"))
            .is_some_and(|t| !t.is_null());
        if !has_tasks {
            anyhow::bail!(INVALID_BACKUP);
        }

        let data: StoreData = serde_json::from_value(value["data"].clone())
            .with_context(|| INVALID_BACKUP.to_string())?;
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        Ok(Backup {
            version: text("version"),
            export_date: text("exportDate"),
            data,
        })
    }

    /// Backup file name for a given day.
    pub fn backup_file_name(now: DateTime<Utc>) -> String {
        format!("operativka-backup-{}.json", now.format("%Y-%m-%d"))
    }
}

fn has_usable_date(shipment: &serde_json::Value) -> bool {
    match shipment.get("date") {
        Some(serde_json::Value::String(s)) => !s.is_empty() && s != "null",
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    }
}
