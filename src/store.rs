// File: ./src/store.rs
// In-memory record store: tasks, shipments, installations and daily notes.
use crate::context::AppContext;
use crate::model::parser::{self, ParseContext, ParseResult, StructuredForm};
use crate::model::{
    Category, HistoryAction, Installation, InstallationDraft, Shipment, ShipmentDraft, Task,
    TaskDraft, TaskStatus,
};
use crate::storage::{LocalStorage, StoreData};
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use strum::IntoEnumIterator;

pub const PROJECT_REQUIRED: &str = "Укажите проект";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    pub data: StoreData,
}

/// Tasks of one category, split per assignee in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub assignees: Vec<(String, Vec<&'a Task>)>,
}

impl CategoryGroup<'_> {
    pub fn len(&self) -> usize {
        self.assignees.iter().map(|(_, t)| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thresholds for `RecordStore::notifications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRules {
    /// Waiting tasks untouched for longer than this many days are reported.
    pub blocker_days: i64,
    /// Shipments due within this many days (inclusive) are checked for open tasks.
    pub shipment_days: i64,
    pub max: usize,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self {
            blocker_days: 3,
            shipment_days: 2,
            max: 5,
        }
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: StoreData) -> Self {
        Self { data }
    }

    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self::from_data(LocalStorage::load(ctx)?))
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        LocalStorage::save(ctx, &self.data)
    }

    pub fn clear(&mut self) {
        self.data = StoreData::default();
    }

    // --- Ingestion ---

    /// Appends parsed records in parse order.
    pub fn add_parsed(&mut self, result: ParseResult) {
        self.data.tasks.extend(result.tasks);
        self.data.shipments.extend(result.shipments);
        self.data.installations.extend(result.installations);
    }

    /// Parses a form, appends the records and stores the rendered note under today's date.
    pub fn ingest_form(&mut self, form: &StructuredForm, ctx: &ParseContext) -> ParseResult {
        let result = parser::parse_form(form, ctx);
        self.add_parsed(result.clone());
        self.save_note(ctx.now.date_naive(), &form.to_note());
        result
    }

    /// Same as `ingest_form` for note text; the text itself becomes today's note.
    pub fn ingest_note(&mut self, text: &str, ctx: &ParseContext) -> ParseResult {
        let result = parser::parse_note(text, ctx);
        self.add_parsed(result.clone());
        self.save_note(ctx.now.date_naive(), text.trim());
        result
    }

    // --- Tasks ---

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.data.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.data.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn create_task(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Task {
        let task = Task::from_draft(draft, now);
        self.data.tasks.push(task.clone());
        task
    }

    pub fn edit_task(&mut self, id: &str, draft: TaskDraft, now: DateTime<Utc>) -> Option<Task> {
        let task = self.get_task_mut(id)?;
        task.apply_draft(draft, now);
        Some(task.clone())
    }

    pub fn change_task_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        let task = self.get_task_mut(id)?;
        task.record_status(status, HistoryAction::StatusChanged, now);
        Some(task.clone())
    }

    /// Marks done, or back to in progress.
    pub fn set_task_done(&mut self, id: &str, done: bool, now: DateTime<Utc>) -> Option<Task> {
        let task = self.get_task_mut(id)?;
        if done {
            task.record_status(TaskStatus::Done, HistoryAction::Completed, now);
        } else {
            task.record_status(TaskStatus::InProgress, HistoryAction::Uncompleted, now);
        }
        Some(task.clone())
    }

    pub fn toggle_task_done(&mut self, id: &str, now: DateTime<Utc>) -> Option<Task> {
        let done = self.get_task(id)?.status.is_done();
        self.set_task_done(id, !done, now)
    }

    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let idx = self.data.tasks.iter().position(|t| t.id == id)?;
        Some(self.data.tasks.remove(idx))
    }

    /// `None` means every status.
    pub fn tasks_with_status(&self, status: Option<TaskStatus>) -> Vec<&Task> {
        self.data
            .tasks
            .iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect()
    }

    /// Filtered tasks grouped by category, then assignee.
    pub fn tasks_by_category(&self, status: Option<TaskStatus>) -> Vec<CategoryGroup<'_>> {
        group_tasks(self.tasks_with_status(status))
    }

    pub fn active_tasks(&self) -> Vec<&Task> {
        self.data
            .tasks
            .iter()
            .filter(|t| !t.status.is_done())
            .collect()
    }

    /// Unfinished tasks of a project.
    pub fn open_tasks_for(&self, project: &str) -> usize {
        self.data
            .tasks
            .iter()
            .filter(|t| t.project == project && !t.status.is_done())
            .count()
    }

    // --- Shipments ---

    pub fn get_shipment(&self, id: &str) -> Option<&Shipment> {
        self.data.shipments.iter().find(|s| s.id == id)
    }

    pub fn create_shipment(&mut self, draft: ShipmentDraft, now: DateTime<Utc>) -> Shipment {
        let shipment = Shipment::from_draft(draft, now);
        self.data.shipments.push(shipment.clone());
        shipment
    }

    pub fn edit_shipment(
        &mut self,
        id: &str,
        draft: ShipmentDraft,
        now: DateTime<Utc>,
    ) -> Option<Shipment> {
        let shipment = self.data.shipments.iter_mut().find(|s| s.id == id)?;
        shipment.apply_draft(draft, now);
        Some(shipment.clone())
    }

    pub fn delete_shipment(&mut self, id: &str) -> Option<Shipment> {
        let idx = self.data.shipments.iter().position(|s| s.id == id)?;
        Some(self.data.shipments.remove(idx))
    }

    /// Shipments by date, undated first; ties keep insertion order.
    pub fn shipments_by_date(&self) -> Vec<&Shipment> {
        let mut list: Vec<&Shipment> = self.data.shipments.iter().collect();
        list.sort_by_key(|s| s.date);
        list
    }

    // --- Installations ---

    pub fn get_installation(&self, id: &str) -> Option<&Installation> {
        self.data.installations.iter().find(|i| i.id == id)
    }

    pub fn create_installation(
        &mut self,
        draft: InstallationDraft,
        now: DateTime<Utc>,
    ) -> Result<Installation> {
        let draft = validated(draft)?;
        let inst = Installation::from_draft(draft, now);
        self.data.installations.push(inst.clone());
        Ok(inst)
    }

    /// `Ok(None)` when the id is unknown.
    pub fn edit_installation(
        &mut self,
        id: &str,
        draft: InstallationDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Installation>> {
        let draft = validated(draft)?;
        let Some(inst) = self.data.installations.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        inst.apply_draft(draft, now);
        Ok(Some(inst.clone()))
    }

    pub fn delete_installation(&mut self, id: &str) -> Option<Installation> {
        let idx = self.data.installations.iter().position(|i| i.id == id)?;
        Some(self.data.installations.remove(idx))
    }

    // --- Notes ---

    /// One note per day; a second save on the same day replaces the first.
    pub fn save_note(&mut self, day: NaiveDate, text: &str) {
        self.data
            .daily_notes
            .insert(day.format("%Y-%m-%d").to_string(), text.to_string());
    }

    /// Newest first.
    pub fn recent_notes(&self, limit: usize) -> Vec<(&str, &str)> {
        self.data
            .daily_notes
            .iter()
            .rev()
            .take(limit)
            .map(|(day, text)| (day.as_str(), text.as_str()))
            .collect()
    }

    // --- Notifications ---

    /// Overdue deadlines, long waits, then shipments due soon with open tasks; capped at
    /// `rules.max`.
    pub fn notifications(&self, now: DateTime<Local>, rules: &AlertRules) -> Vec<String> {
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);
        let mut out = Vec::new();

        for task in &self.data.tasks {
            if let Some(deadline) = task.deadline
                && !task.status.is_done()
                && deadline < today
            {
                out.push(format!("⚠️ Просрочено: {} ({})", task.title, task.project));
            }
        }

        for task in &self.data.tasks {
            if task.status == TaskStatus::Waiting
                && let Some(blocker) = &task.blocker
                && !blocker.is_empty()
            {
                let waited_ms = (now_utc - task.updated).num_milliseconds();
                let days = waited_ms as f64 / 86_400_000.0;
                if days > rules.blocker_days as f64 {
                    out.push(format!(
                        "⏰ Долго ждем: {} для {} ({} дн)",
                        blocker,
                        task.project,
                        days.floor() as i64
                    ));
                }
            }
        }

        for ship in &self.data.shipments {
            let Some(date) = ship.date else { continue };
            let days_until = (date - today).num_days();
            if !(0..=rules.shipment_days).contains(&days_until) {
                continue;
            }
            let open = self.open_tasks_for(&ship.project);
            if open > 0 {
                let when = if days_until == 0 {
                    "СЕГОДНЯ".to_string()
                } else {
                    format!("через {} дн", days_until)
                };
                out.push(format!(
                    "📦 Отгрузка {} {}: {} задач не готово",
                    ship.project, when, open
                ));
            }
        }

        out.truncate(rules.max);
        out
    }
}

/// Groups tasks by category (fixed order, empty categories omitted), then by assignee in
/// first-seen order. Empty assignees are listed under "Без исполнителя".
pub fn group_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<CategoryGroup<'a>> {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    Category::iter()
        .filter_map(|category| {
            let mut assignees: Vec<(String, Vec<&Task>)> = Vec::new();
            for task in tasks.iter().copied().filter(|t| t.category == category) {
                let name = task.assignee_or_default();
                match assignees.iter().position(|(a, _)| a == name) {
                    Some(idx) => assignees[idx].1.push(task),
                    None => assignees.push((name.to_string(), vec![task])),
                }
            }
            (!assignees.is_empty()).then_some(CategoryGroup {
                category,
                assignees,
            })
        })
        .collect()
}

fn validated(mut draft: InstallationDraft) -> Result<InstallationDraft> {
    draft.project = draft.project.trim().to_string();
    if draft.project.is_empty() {
        anyhow::bail!(PROJECT_REQUIRED);
    }
    draft.installer = draft.installer.trim().to_string();
    Ok(draft)
}
