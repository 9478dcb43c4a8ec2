// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::parser::{
    AssigneeTable, DEFAULT_KNOWN_PROJECTS, DEFAULT_PAINTING_ASSIGNEE, ParseContext, ParseRules,
};
use crate::storage::LocalStorage;
use crate::store::AlertRules;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_known_projects() -> Vec<String> {
    DEFAULT_KNOWN_PROJECTS.iter().map(|s| s.to_string()).collect()
}
fn default_painting_assignee() -> String {
    DEFAULT_PAINTING_ASSIGNEE.to_string()
}

fn default_blocker_alert_days() -> i64 {
    3
}
fn default_shipment_alert_days() -> i64 {
    2
}
fn default_max_notifications() -> usize {
    5
}
fn default_recent_notes() -> usize {
    5
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub assignee_keywords: AssigneeTable,
    #[serde(default = "default_known_projects")]
    pub known_projects: Vec<String>,
    #[serde(default = "default_painting_assignee")]
    pub painting_assignee: String,

    /// Full share text lists shipments and installations under one day header.
    #[serde(default)]
    pub overlay_shipments: bool,

    #[serde(default = "default_blocker_alert_days")]
    pub blocker_alert_days: i64,
    #[serde(default = "default_shipment_alert_days")]
    pub shipment_alert_days: i64,
    #[serde(default = "default_max_notifications")]
    pub max_notifications: usize,
    #[serde(default = "default_recent_notes")]
    pub recent_notes: usize,

    // "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assignee_keywords: AssigneeTable::default(),
            known_projects: default_known_projects(),
            painting_assignee: default_painting_assignee(),
            overlay_shipments: false,
            blocker_alert_days: 3,
            shipment_alert_days: 2,
            max_notifications: 5,
            recent_notes: 5,
            log_level: None,
        }
    }
}

impl Config {
    /// Loads `config.toml`; a missing file yields the defaults.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn parse_rules(&self) -> ParseRules {
        ParseRules::new(
            self.assignee_keywords.clone(),
            &self.known_projects,
            &self.painting_assignee,
        )
    }

    pub fn parse_context(&self, now: DateTime<Local>) -> ParseContext {
        ParseContext::new(now, self.parse_rules())
    }

    pub fn alert_rules(&self) -> AlertRules {
        AlertRules {
            blocker_days: self.blocker_alert_days,
            shipment_days: self.shipment_alert_days,
            max: self.max_notifications,
        }
    }

    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.log_level
            .as_deref()
            .and_then(|s| s.trim().parse::<log::LevelFilter>().ok())
    }
}
