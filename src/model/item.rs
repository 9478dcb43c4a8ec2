// File: ./src/model/item.rs
use chrono::{DateTime, Datelike, DurationRound, NaiveDate, TimeDelta, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

pub const NO_PROJECT: &str = "Без проекта";
pub const NO_ASSIGNEE: &str = "Без исполнителя";
pub const NO_DATE_LABEL: &str = "БЕЗ ДАТЫ";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Record timestamp for `now`, cut to whole milliseconds as stored on disk.
pub fn record_stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let utc = now.with_timezone(&Utc);
    utc.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(utc)
}

// --- STATUS / KIND ENUMS ---

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    InProgress,
    Waiting,
    Ready,
    Done,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "В работе",
            TaskStatus::Waiting => "Ожидание",
            TaskStatus::Ready => "Готово",
            TaskStatus::Done => "Завершено",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskType {
    #[default]
    Production,
    Painting,
    Carpentry,
    Assembly,
}

/// Fixed task groups. Iteration order is the display order.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
pub enum Category {
    #[default]
    #[serde(rename = "Задачи по объекту")]
    #[strum(to_string = "Задачи по объекту")]
    ObjectTasks,
    #[serde(rename = "Столяра")]
    #[strum(to_string = "Столяра")]
    Carpenters,
    #[serde(rename = "Малярка")]
    #[strum(to_string = "Малярка")]
    Painting,
    #[serde(rename = "Сборщики")]
    #[strum(to_string = "Сборщики")]
    Assemblers,
}

impl Category {
    /// Categories rendered with one sub-group per assignee.
    pub fn groups_by_assignee(&self) -> bool {
        !matches!(self, Category::Painting)
    }
}

#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    StatusChanged,
    Completed,
    Uncompleted,
    Updated,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    // Older backups carry `updated` entries without a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

// --- TASK ---

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "legacy_id::deserialize")]
    pub id: String,
    pub project: String,
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    pub status: TaskStatus,
    #[serde(rename = "type", default)]
    pub kind: TaskType,
    #[serde(default)]
    pub category: Category,
    #[serde(default, with = "lenient_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub blocker: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Fields a manual create/edit supplies. Mirrors the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub project: String,
    pub title: String,
    pub assignee: String,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub blocker: Option<String>,
}

impl Task {
    pub fn new(title: &str, status: TaskStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            project: NO_PROJECT.to_string(),
            title: title.to_string(),
            assignee: String::new(),
            status,
            kind: TaskType::Production,
            category: Category::ObjectTasks,
            deadline: None,
            blocker: None,
            priority: Priority::Normal,
            created: now,
            updated: now,
            history: vec![HistoryEntry {
                timestamp: now,
                action: HistoryAction::Created,
                status: Some(status),
            }],
        }
    }

    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let mut task = Self::new(&draft.title, draft.status, now);
        task.project = draft.project;
        task.assignee = draft.assignee;
        task.deadline = draft.deadline;
        task.priority = draft.priority;
        task.blocker = draft.blocker;
        task
    }

    /// Sets the status and appends the matching history entry.
    pub fn record_status(&mut self, status: TaskStatus, action: HistoryAction, now: DateTime<Utc>) {
        self.status = status;
        self.updated = now;
        self.history.push(HistoryEntry {
            timestamp: now,
            action,
            status: Some(status),
        });
    }

    /// Replaces the editable fields. Manual edits always reset the type to production.
    pub fn apply_draft(&mut self, draft: TaskDraft, now: DateTime<Utc>) {
        self.project = draft.project;
        self.title = draft.title;
        self.assignee = draft.assignee;
        self.deadline = draft.deadline;
        self.priority = draft.priority;
        self.blocker = draft.blocker;
        self.kind = TaskType::Production;
        self.record_status(draft.status, HistoryAction::Updated, now);
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            project: self.project.clone(),
            title: self.title.clone(),
            assignee: self.assignee.clone(),
            status: self.status,
            deadline: self.deadline,
            priority: self.priority,
            blocker: self.blocker.clone(),
        }
    }

    pub fn has_project(&self) -> bool {
        !self.project.is_empty() && self.project != NO_PROJECT
    }

    pub fn assignee_or_default(&self) -> &str {
        if self.assignee.is_empty() {
            NO_ASSIGNEE
        } else {
            &self.assignee
        }
    }
}

// --- SHIPMENT ---

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Planned,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(deserialize_with = "legacy_id::deserialize")]
    pub id: String,
    pub project: String,
    #[serde(default, with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(
        rename = "dayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub day_name: Option<String>,
    #[serde(default)]
    pub assembler: String,
    #[serde(default)]
    pub installer: String,
    #[serde(default)]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentDraft {
    pub project: String,
    pub date: Option<NaiveDate>,
    pub assembler: String,
    pub installer: String,
    pub notes: String,
}

impl Shipment {
    pub fn new(project: &str, date: Option<NaiveDate>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            project: project.to_string(),
            date,
            day_name: None,
            assembler: String::new(),
            installer: String::new(),
            status: ShipmentStatus::Planned,
            notes: String::new(),
            created: now,
            updated: now,
        }
    }

    pub fn from_draft(draft: ShipmentDraft, now: DateTime<Utc>) -> Self {
        let mut shipment = Self::new(&draft.project, draft.date, now);
        shipment.assembler = draft.assembler;
        shipment.installer = draft.installer;
        shipment.notes = draft.notes;
        shipment
    }

    /// Edits never touch `day_name`: a plan label stays authoritative for grouping.
    pub fn apply_draft(&mut self, draft: ShipmentDraft, now: DateTime<Utc>) {
        self.project = draft.project;
        self.date = draft.date;
        self.assembler = draft.assembler;
        self.installer = draft.installer;
        self.notes = draft.notes;
        self.status = ShipmentStatus::Planned;
        self.updated = now;
    }

    pub fn to_draft(&self) -> ShipmentDraft {
        ShipmentDraft {
            project: self.project.clone(),
            date: self.date,
            assembler: self.assembler.clone(),
            installer: self.installer.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Whoever is named for the leg, assembler first.
    pub fn crew(&self) -> &str {
        if self.assembler.is_empty() {
            &self.installer
        } else {
            &self.assembler
        }
    }
}

// --- INSTALLATION ---

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "InstallationRecord")]
pub struct Installation {
    pub id: String,
    pub project: String,
    #[serde(with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "dayName")]
    pub day_name: String,
    pub installer: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

/// Stored shape; items listed before any day header carry `"dayName": null`.
#[derive(Deserialize)]
struct InstallationRecord {
    #[serde(deserialize_with = "legacy_id::deserialize")]
    id: String,
    project: String,
    #[serde(default, with = "lenient_date")]
    date: Option<NaiveDate>,
    #[serde(rename = "dayName", default)]
    day_name: Option<String>,
    #[serde(default)]
    installer: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated: DateTime<Utc>,
}

impl From<InstallationRecord> for Installation {
    fn from(raw: InstallationRecord) -> Self {
        let day_name = raw
            .day_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| day_label(raw.date));
        Self {
            id: raw.id,
            project: raw.project,
            date: raw.date,
            day_name,
            installer: raw.installer,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationDraft {
    pub project: String,
    pub date: Option<NaiveDate>,
    pub installer: String,
}

impl Installation {
    /// Builds an installation with the day label derived from `date`.
    pub fn new(project: &str, date: Option<NaiveDate>, installer: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            project: project.to_string(),
            date,
            day_name: day_label(date),
            installer: installer.to_string(),
            created: now,
            updated: now,
        }
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
        self.day_name = day_label(date);
    }

    pub fn from_draft(draft: InstallationDraft, now: DateTime<Utc>) -> Self {
        Self::new(&draft.project, draft.date, &draft.installer, now)
    }

    /// Manual edits recompute the day label from the date.
    pub fn apply_draft(&mut self, draft: InstallationDraft, now: DateTime<Utc>) {
        self.project = draft.project;
        self.installer = draft.installer;
        self.set_date(draft.date);
        self.updated = now;
    }

    pub fn to_draft(&self) -> InstallationDraft {
        InstallationDraft {
            project: self.project.clone(),
            date: self.date,
            installer: self.installer.clone(),
        }
    }
}

/// Upper-case Russian weekday name for a date, or "БЕЗ ДАТЫ".
pub fn day_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => weekday_label(d.weekday()).to_string(),
        None => NO_DATE_LABEL.to_string(),
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "ПОНЕДЕЛЬНИК",
        Weekday::Tue => "ВТОРНИК",
        Weekday::Wed => "СРЕДА",
        Weekday::Thu => "ЧЕТВЕРГ",
        Weekday::Fri => "ПЯТНИЦА",
        Weekday::Sat => "СУББОТА",
        Weekday::Sun => "ВОСКРЕСЕНЬЕ",
    }
}

// --- SERDE HELPERS ---

/// Dates stored as `YYYY-MM-DD`. Empty strings, the literal "null" and garbage read as `None`.
pub mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
    }
}

/// Older data used `Date.now() + Math.random()` numbers as ids.
mod legacy_id {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {}",
                other
            ))),
        }
    }
}
