// File: ./src/export.rs
// Messenger-ready plain text: **bold**, __italic__ and ● bullets.
use crate::model::display::format_short_date;
use crate::model::item::{NO_ASSIGNEE, Task};
use crate::model::{Installation, Shipment};
use crate::schedule::{self, DayGroup, ScheduleItem};
use crate::store::{self, RecordStore};
use chrono::NaiveDate;

pub const SHIPMENTS_TITLE: &str = "📦**ПЛАН ОТГРУЗОК**\n\n";
pub const INSTALLATIONS_TITLE: &str = "🔧**ПЛАН МОНТАЖА**\n\n";
pub const OVERLAY_TITLE: &str = "**ОТГРУЗКИ И МОНТАЖИ**\n\n";
pub const REPORT_TITLE: &str = "**ОПЕРАТИВКА ПРОИЗВОДСТВО**\n";
pub const TASKS_TITLE: &str = "**ЗАДАЧИ**\n\n";

fn push_groups<T: ScheduleItem>(text: &mut String, groups: &[DayGroup<'_, T>]) {
    for group in groups {
        text.push_str(&format!("**{}**\n", group.header()));
        for item in &group.items {
            text.push_str(&format!("● {}", item.project()));
            let crew = item.crew();
            if !crew.is_empty() {
                text.push_str(&format!(" | __{}__", crew));
            }
            text.push('\n');
        }
        text.push('\n');
    }
}

/// `None` when there is nothing to share.
pub fn shipments_plan(shipments: &[Shipment]) -> Option<String> {
    if shipments.is_empty() {
        return None;
    }
    let mut text = SHIPMENTS_TITLE.to_string();
    push_groups(&mut text, &schedule::group_by_day(shipments));
    Some(text)
}

pub fn installations_plan(installations: &[Installation]) -> Option<String> {
    if installations.is_empty() {
        return None;
    }
    let mut text = INSTALLATIONS_TITLE.to_string();
    push_groups(&mut text, &schedule::group_by_day(installations));
    Some(text)
}

fn task_line(task: &Task) -> String {
    if task.has_project() {
        format!("● {} | {}", task.project, task.title)
    } else {
        format!("● {}", task.title)
    }
}

/// Full stand-up report: schedule first (merged by day when `overlay`), then every
/// unfinished task by category.
pub fn full_report(
    records: &RecordStore,
    today: NaiveDate,
    overlay: bool,
    painting_assignee: &str,
) -> String {
    let data = &records.data;
    let mut text = format!("{}__{}__\n\n", REPORT_TITLE, format_short_date(today));

    if overlay {
        if !data.installations.is_empty() || !data.shipments.is_empty() {
            text.push_str(OVERLAY_TITLE);
            let items = schedule::overlay(&data.installations, &data.shipments);
            push_groups(&mut text, &schedule::group_by_day(&items));
        }
    } else {
        if let Some(plan) = shipments_plan(&data.shipments) {
            text.push_str(&plan);
        }
        if let Some(plan) = installations_plan(&data.installations) {
            text.push_str(&plan);
        }
    }

    let active = records.active_tasks();
    let groups = store::group_tasks(active.iter().copied());
    if groups.is_empty() {
        return text;
    }

    text.push_str(TASKS_TITLE);
    for group in groups {
        text.push_str(&format!("**{}**:\n\n", group.category));

        if group.category.groups_by_assignee() {
            for (assignee, list) in &group.assignees {
                text.push_str(&format!("**{}**:\n", assignee));
                for task in list {
                    text.push_str(&task_line(task));
                    text.push('\n');
                }
                text.push('\n');
            }
        } else {
            // Flat list in entry order.
            for task in active.iter().filter(|t| t.category == group.category) {
                text.push_str(&task_line(task));
                let shown = !task.assignee.is_empty()
                    && task.assignee != NO_ASSIGNEE
                    && task.assignee != painting_assignee;
                if shown {
                    text.push_str(&format!(" __({})__", task.assignee));
                }
                text.push('\n');
            }
            text.push('\n');
        }
    }
    text
}
