// File: ./src/cli.rs
//! Command-line surface: clap definitions and command execution.
//!
//! `execute` returns the text to print so commands can be exercised without a terminal.
use crate::config::Config;
use crate::context::AppContext;
use crate::export;
use crate::model::display::{TaskDisplay, format_optional_date, plural};
use crate::model::item::{NO_PROJECT, record_stamp};
use crate::model::parser::{self, StructuredForm};
use crate::model::{InstallationDraft, Priority, ShipmentDraft, TaskDraft, TaskStatus};
use crate::schedule::{self, ScheduleItem, Urgency};
use crate::storage::LocalStorage;
use crate::store::RecordStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "operativka", version)]
#[command(about = "Оперативка производства: задачи, отгрузки и монтажи из текста", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use a different directory for config and data
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a stand-up note (file or stdin) or a TOML form and store the results
    Import {
        /// Note text file; "-" or nothing reads stdin
        file: Option<PathBuf>,
        /// Structured form in TOML instead of a note
        #[arg(long, conflicts_with = "file")]
        form: Option<PathBuf>,
    },
    /// List tasks grouped by category and assignee
    Tasks {
        /// in_progress | waiting | ready | done
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    AddTask(TaskArgs),
    EditTask {
        id: String,
        #[command(flatten)]
        fields: TaskEditArgs,
    },
    /// Set a task status
    Status { id: String, status: TaskStatus },
    Done { id: String },
    Undone { id: String },
    RmTask { id: String },
    /// List shipments by date, or by day with --calendar
    Shipments {
        #[arg(long)]
        calendar: bool,
    },
    AddShipment(ShipmentArgs),
    EditShipment {
        id: String,
        #[command(flatten)]
        fields: ShipmentEditArgs,
    },
    RmShipment { id: String },
    /// Installation calendar; --overlay adds shipments
    Installations {
        #[arg(long)]
        overlay: bool,
    },
    AddInstallation(InstallationArgs),
    EditInstallation {
        id: String,
        #[command(flatten)]
        fields: InstallationEditArgs,
    },
    RmInstallation { id: String },
    /// Save today's note without parsing it
    Note { text: String },
    /// Most recent notes, newest first
    Notes {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Messenger text for the plan or the full stand-up
    Share {
        #[arg(value_enum, default_value_t = ShareKind::All)]
        what: ShareKind,
        /// Merge shipments and installations by day (full report only)
        #[arg(long)]
        overlay: bool,
    },
    /// Overdue work, long waits and shipments at risk
    Alerts,
    /// Write a JSON backup (stdout unless -o; a directory gets a dated file name)
    Backup {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a JSON backup
    Restore { file: PathBuf },
    /// Delete all data
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Show the config file, or write one with every key filled in
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareKind {
    Shipments,
    Installations,
    All,
}

#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    pub title: String,
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub assignee: Option<String>,
    #[arg(short, long)]
    pub status: Option<TaskStatus>,
    /// YYYY-MM-DD or a phrase like "5 ноября"
    #[arg(short, long)]
    pub deadline: Option<String>,
    #[arg(long)]
    pub high: bool,
    #[arg(short, long)]
    pub blocker: Option<String>,
}

/// Only the given fields change. An empty string clears deadline/blocker.
#[derive(Args, Debug, Clone, Default)]
pub struct TaskEditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub assignee: Option<String>,
    #[arg(short, long)]
    pub status: Option<TaskStatus>,
    #[arg(short, long)]
    pub deadline: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(short, long)]
    pub blocker: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ShipmentArgs {
    pub project: String,
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(long)]
    pub assembler: Option<String>,
    #[arg(long)]
    pub installer: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ShipmentEditArgs {
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(long)]
    pub assembler: Option<String>,
    #[arg(long)]
    pub installer: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InstallationArgs {
    pub project: String,
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(long)]
    pub installer: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallationEditArgs {
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(long)]
    pub installer: Option<String>,
}

// --- HELPERS ---

/// Accepts ISO dates and the same phrases the parser understands. Empty means "no date".
pub fn parse_date_arg(raw: &str, now: DateTime<Local>) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(d));
    }
    match parser::resolve_date(raw, now.naive_local()) {
        Some(d) => Ok(Some(d)),
        None => anyhow::bail!("Не удалось распознать дату: {}", raw),
    }
}

fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn not_found(kind: &str, id: &str) -> anyhow::Error {
    anyhow::anyhow!("Не найдено ({}): {}", kind, id)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("Failed to read {:?}", p))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn import_summary(result: &parser::ParseResult) -> String {
    format!(
        "✅ Импортировано:\n📋 Задач: {}\n📦 Отгрузок: {}\n🔧 Монтажей: {}",
        result.tasks.len(),
        result.shipments.len(),
        result.installations.len()
    )
}

fn render_tasks(store: &RecordStore, status: Option<TaskStatus>) -> String {
    let groups = store.tasks_by_category(status);
    if groups.is_empty() {
        return "Нет задач".to_string();
    }
    let mut out = String::new();
    for group in groups {
        let n = group.len() as i64;
        out.push_str(&format!(
            "{} ({} {})\n",
            group.category,
            n,
            plural(n, "задача", "задачи", "задач")
        ));
        for (assignee, tasks) in &group.assignees {
            out.push_str(&format!("  {}:\n", assignee));
            for task in tasks {
                out.push_str(&format!("    {}  {}\n", task.id, task.list_line()));
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn render_shipments(store: &RecordStore, calendar: bool, today: NaiveDate) -> String {
    if store.data.shipments.is_empty() {
        return "Нет отгрузок".to_string();
    }
    let mut out = String::new();
    if calendar {
        for group in schedule::group_by_day(&store.data.shipments) {
            out.push_str(&format!("{}\n", group.header()));
            for ship in &group.items {
                let crew = if ship.crew().is_empty() { "—" } else { ship.crew() };
                out.push_str(&format!("  📦 {}  {}  {}\n", ship.project, crew, ship.id));
            }
        }
    } else {
        for ship in store.shipments_by_date() {
            let urgency = Urgency::of(ship.date, today);
            out.push_str(&format!(
                "{}  {}  [{}]{}  {}\n",
                ship.list_line(),
                format_optional_date(ship.date),
                urgency.label(),
                if urgency.is_urgent() { " ❗" } else { "" },
                ship.id
            ));
        }
    }
    out.trim_end().to_string()
}

fn render_installations(store: &RecordStore, overlay: bool) -> String {
    let items = if overlay {
        schedule::overlay(&store.data.installations, &store.data.shipments)
    } else {
        schedule::overlay(&store.data.installations, &[])
    };
    if items.is_empty() {
        return "Нет данных".to_string();
    }
    let mut out = String::new();
    for group in schedule::group_by_day(&items) {
        out.push_str(&format!("{}\n", group.header()));
        for item in &group.items {
            let crew = if item.crew().is_empty() { "—" } else { item.crew() };
            let id = match item {
                schedule::PlanItem::Installation(i) => i.id.as_str(),
                schedule::PlanItem::Shipment(s) => s.id.as_str(),
            };
            out.push_str(&format!("  {} {}  {}  {}\n", item.icon(), item.project(), crew, id));
        }
    }
    out.trim_end().to_string()
}

// --- EXECUTION ---

/// Replaces the whole store with a backup file, even when the current store is unreadable.
fn restore(ctx: &dyn AppContext, file: &Path) -> Result<String> {
    let json = fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;
    let backup = LocalStorage::from_backup_json(&json)?;
    let summary = format!(
        "✅ Данные импортированы!\nВерсия: {}\nДата экспорта: {}",
        if backup.version.is_empty() { "неизвестно" } else { &backup.version },
        if backup.export_date.is_empty() { "неизвестно" } else { &backup.export_date },
    );
    LocalStorage::force_save(ctx, &backup.data)?;
    log::info!("Restored backup from {:?}", file);
    Ok(summary)
}

/// Runs one command against the store in `ctx` and returns what should be printed.
pub fn execute(
    command: Commands,
    ctx: &dyn AppContext,
    config: &Config,
    now: DateTime<Local>,
) -> Result<String> {
    let stamp: DateTime<Utc> = record_stamp(&now);
    let today = now.date_naive();

    // Restore and config must work even when the current store cannot be read.
    let mut store = match &command {
        Commands::Restore { .. } | Commands::Config { .. } => RecordStore::new(),
        _ => RecordStore::load(ctx)?,
    };

    let (output, dirty) = match command {
        Commands::Import { file, form } => {
            let pctx = config.parse_context(now);
            let result = match form {
                Some(path) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    let form: StructuredForm = toml::from_str(&raw)
                        .with_context(|| format!("Failed to parse form {:?}", path))?;
                    if !form.has_data() {
                        anyhow::bail!("Форма пуста");
                    }
                    store.ingest_form(&form, &pctx)
                }
                None => {
                    let text = read_input(file.as_deref())?;
                    if text.trim().is_empty() {
                        anyhow::bail!("Нет текста для импорта");
                    }
                    store.ingest_note(&text, &pctx)
                }
            };
            (import_summary(&result), true)
        }

        Commands::Tasks { status } => (render_tasks(&store, status), false),

        Commands::AddTask(args) => {
            let draft = TaskDraft {
                project: optional_text(args.project).unwrap_or_else(|| NO_PROJECT.to_string()),
                title: args.title.trim().to_string(),
                assignee: optional_text(args.assignee).unwrap_or_default(),
                status: args.status.unwrap_or_default(),
                deadline: match args.deadline {
                    Some(raw) => parse_date_arg(&raw, now)?,
                    None => None,
                },
                priority: if args.high { Priority::High } else { Priority::Normal },
                blocker: optional_text(args.blocker),
            };
            if draft.title.is_empty() {
                anyhow::bail!("Укажите задачу");
            }
            let task = store.create_task(draft, stamp);
            (format!("Создана задача {}", task.id), true)
        }

        Commands::EditTask { id, fields } => {
            let mut draft = store
                .get_task(&id)
                .ok_or_else(|| not_found("задача", &id))?
                .to_draft();
            if let Some(title) = fields.title {
                draft.title = title;
            }
            if let Some(project) = fields.project {
                draft.project = project;
            }
            if let Some(assignee) = fields.assignee {
                draft.assignee = assignee;
            }
            if let Some(status) = fields.status {
                draft.status = status;
            }
            if let Some(raw) = fields.deadline {
                draft.deadline = parse_date_arg(&raw, now)?;
            }
            if let Some(priority) = fields.priority {
                draft.priority = priority;
            }
            if let Some(blocker) = fields.blocker {
                draft.blocker = optional_text(Some(blocker));
            }
            let task = store
                .edit_task(&id, draft, stamp)
                .ok_or_else(|| not_found("задача", &id))?;
            (task.list_line(), true)
        }

        Commands::Status { id, status } => {
            let task = store
                .change_task_status(&id, status, stamp)
                .ok_or_else(|| not_found("задача", &id))?;
            (format!("{} → {}", task.title, task.status.label()), true)
        }

        Commands::Done { id } => {
            let task = store
                .set_task_done(&id, true, stamp)
                .ok_or_else(|| not_found("задача", &id))?;
            (task.list_line(), true)
        }

        Commands::Undone { id } => {
            let task = store
                .set_task_done(&id, false, stamp)
                .ok_or_else(|| not_found("задача", &id))?;
            (task.list_line(), true)
        }

        Commands::RmTask { id } => {
            let task = store.delete_task(&id).ok_or_else(|| not_found("задача", &id))?;
            (format!("Удалена задача: {}", task.title), true)
        }

        Commands::Shipments { calendar } => (render_shipments(&store, calendar, today), false),

        Commands::AddShipment(args) => {
            let draft = ShipmentDraft {
                project: args.project.trim().to_string(),
                date: match args.date {
                    Some(raw) => parse_date_arg(&raw, now)?,
                    None => None,
                },
                assembler: optional_text(args.assembler).unwrap_or_default(),
                installer: optional_text(args.installer).unwrap_or_default(),
                notes: optional_text(args.notes).unwrap_or_default(),
            };
            let shipment = store.create_shipment(draft, stamp);
            (format!("Создана отгрузка {}", shipment.id), true)
        }

        Commands::EditShipment { id, fields } => {
            let mut draft = store
                .get_shipment(&id)
                .ok_or_else(|| not_found("отгрузка", &id))?
                .to_draft();
            if let Some(project) = fields.project {
                draft.project = project.trim().to_string();
            }
            if let Some(raw) = fields.date {
                draft.date = parse_date_arg(&raw, now)?;
            }
            if let Some(assembler) = fields.assembler {
                draft.assembler = assembler.trim().to_string();
            }
            if let Some(installer) = fields.installer {
                draft.installer = installer.trim().to_string();
            }
            if let Some(notes) = fields.notes {
                draft.notes = notes.trim().to_string();
            }
            let shipment = store
                .edit_shipment(&id, draft, stamp)
                .ok_or_else(|| not_found("отгрузка", &id))?;
            (shipment.list_line(), true)
        }

        Commands::RmShipment { id } => {
            let shipment = store
                .delete_shipment(&id)
                .ok_or_else(|| not_found("отгрузка", &id))?;
            (format!("Удалена отгрузка: {}", shipment.project), true)
        }

        Commands::Installations { overlay } => (render_installations(&store, overlay), false),

        Commands::AddInstallation(args) => {
            let draft = InstallationDraft {
                project: args.project,
                date: match args.date {
                    Some(raw) => parse_date_arg(&raw, now)?,
                    None => None,
                },
                installer: args.installer.unwrap_or_default(),
            };
            let inst = store.create_installation(draft, stamp)?;
            (format!("Создан монтаж {} ({})", inst.id, inst.day_name), true)
        }

        Commands::EditInstallation { id, fields } => {
            let mut draft = store
                .get_installation(&id)
                .ok_or_else(|| not_found("монтаж", &id))?
                .to_draft();
            if let Some(project) = fields.project {
                draft.project = project;
            }
            if let Some(raw) = fields.date {
                draft.date = parse_date_arg(&raw, now)?;
            }
            if let Some(installer) = fields.installer {
                draft.installer = installer;
            }
            let inst = store
                .edit_installation(&id, draft, stamp)?
                .ok_or_else(|| not_found("монтаж", &id))?;
            (format!("{} · {} · {}", inst.day_name, inst.project, inst.installer), true)
        }

        Commands::RmInstallation { id } => {
            let inst = store
                .delete_installation(&id)
                .ok_or_else(|| not_found("монтаж", &id))?;
            (format!("Удален монтаж: {}", inst.project), true)
        }

        Commands::Note { text } => {
            if text.trim().is_empty() {
                anyhow::bail!("Пустая заметка");
            }
            store.save_note(today, text.trim());
            ("Заметка сохранена".to_string(), true)
        }

        Commands::Notes { limit } => {
            let notes = store.recent_notes(limit.unwrap_or(config.recent_notes));
            if notes.is_empty() {
                ("Нет сохраненных оперативок".to_string(), false)
            } else {
                let body = notes
                    .iter()
                    .map(|(day, text)| format!("=== {} ===\n{}", day, text))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (body, false)
            }
        }

        Commands::Share { what, overlay } => {
            let text = match what {
                ShareKind::Shipments => export::shipments_plan(&store.data.shipments)
                    .ok_or_else(|| anyhow::anyhow!("Нет отгрузок для копирования"))?,
                ShareKind::Installations => export::installations_plan(&store.data.installations)
                    .ok_or_else(|| anyhow::anyhow!("Нет монтажей для копирования"))?,
                ShareKind::All => export::full_report(
                    &store,
                    today,
                    overlay || config.overlay_shipments,
                    &config.painting_assignee,
                ),
            };
            (text, false)
        }

        Commands::Alerts => {
            let alerts = store.notifications(now, &config.alert_rules());
            if alerts.is_empty() {
                ("Нет уведомлений".to_string(), false)
            } else {
                (alerts.join("\n"), false)
            }
        }

        Commands::Backup { output } => {
            let json = LocalStorage::to_backup_json(&store.data, stamp)?;
            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(LocalStorage::backup_file_name(stamp))
                    } else {
                        path
                    };
                    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
                    (format!("✅ Данные экспортированы: {}", path.display()), false)
                }
                None => (json, false),
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("Это удалит ВСЕ данные. Повторите с --yes");
            }
            store.clear();
            LocalStorage::remove_legacy(ctx)?;
            ("Все данные удалены".to_string(), true)
        }

        Commands::Restore { file } => (restore(ctx, &file)?, false),

        Commands::Config { init } => {
            let path = Config::get_path_string(ctx)?;
            if init {
                if ctx.get_config_file_path()?.exists() {
                    anyhow::bail!("Файл настроек уже существует: {}", path);
                }
                config.save(ctx)?;
                (format!("✅ Настройки записаны: {}", path), false)
            } else {
                let body = toml::to_string_pretty(config)?;
                (format!("# {}\n{}", path, body), false)
            }
        }
    };

    if dirty {
        store.save(ctx)?;
    }
    Ok(output)
}
