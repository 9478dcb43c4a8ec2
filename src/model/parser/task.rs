// File: ./src/model/parser/task.rs
use super::ParseContext;
use super::date::resolve_date;
use crate::model::item::{Category, NO_PROJECT, Task, TaskStatus, TaskType};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// "Охтинский парк - ..." : capitalised word (+ optional lower-case word) before a dash.
static PROJECT_BEFORE_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([А-ЯЁ][а-яё]+(?:\s+[а-яё]+)?)\s*(?:-|–|—)").unwrap());
// "Новая Рига шкаф": up to two capitalised words at the start.
static PROJECT_AT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([А-ЯЁ][а-яё]+(?:\s+[А-ЯЁ][а-яё]+)?)").unwrap());

static DEADLINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bдо\s+(\d+\s+\w+)",
        r"(?i)\bк\s+(\d+\s+\w+|\w+)",
        r"(\d+\s+\w+)",
        r"(\d+-\d+\s+\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BLOCKER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)ждем?\s+([^-\n]+?)(?:\s*(?:-|$|\()|,)",
        r"(?i)ожида[ею][тм]\s+([^-\n]+?)(?:\s*(?:-|$|\()|,)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Values a section already knows about the task. Empty or missing values fall back
/// to extraction from the text.
#[derive(Debug, Clone, Copy)]
pub struct TaskSeed<'a> {
    pub project: Option<&'a str>,
    pub assignee: Option<&'a str>,
    pub kind: TaskType,
    pub category: Category,
}

impl Default for TaskSeed<'_> {
    fn default() -> Self {
        Self {
            project: None,
            assignee: None,
            kind: TaskType::Production,
            category: Category::ObjectTasks,
        }
    }
}

/// Builds one task from a single line of text.
pub fn build_task(text: &str, seed: TaskSeed<'_>, ctx: &ParseContext) -> Task {
    let project = match seed.project.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => extract_project(text, ctx.rules.known_projects()),
    };
    let assignee = match seed.assignee.map(str::trim) {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => ctx.rules.assignees.guess(text),
    };
    let blocker = extract_blocker(text);
    let status = if blocker.is_some() {
        TaskStatus::Waiting
    } else {
        TaskStatus::InProgress
    };

    let mut task = Task::new(text, status, ctx.stamp());
    task.project = project;
    task.assignee = assignee;
    task.kind = seed.kind;
    task.category = seed.category;
    task.deadline = extract_deadline(text, ctx.reference());
    task.blocker = blocker;
    task
}

/// Project name from free text, or "Без проекта".
pub fn extract_project(text: &str, known: Option<&Regex>) -> String {
    let found = PROJECT_BEFORE_DASH
        .captures(text)
        .or_else(|| PROJECT_AT_START.captures(text))
        .and_then(|c| c.get(1))
        .or_else(|| known.and_then(|re| re.captures(text)).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim().to_string());

    match found {
        Some(p) if !p.is_empty() => p,
        _ => NO_PROJECT.to_string(),
    }
}

/// First deadline phrase that resolves to a date.
pub fn extract_deadline(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    DEADLINE_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| resolve_date(m.as_str(), now))
    })
}

/// What the task is waiting on ("ждем фурнитуру" -> "фурнитуру").
pub fn extract_blocker(text: &str) -> Option<String> {
    BLOCKER_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|b| !b.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn ctx() -> ParseContext {
        ParseContext::at(Local.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_project_before_dash() {
        assert_eq!(
            extract_project("Охтинский парк - собрать кухню", None),
            "Охтинский парк"
        );
    }

    #[test]
    fn test_project_at_start_and_fallback() {
        assert_eq!(extract_project("Новая Рига шкаф", None), "Новая Рига");
        assert_eq!(extract_project("собрать шкаф", None), NO_PROJECT);
    }

    #[test]
    fn test_known_project_anywhere() {
        let c = ctx();
        assert_eq!(
            extract_project("отвезти фасады в токсово", c.rules.known_projects()),
            "токсово"
        );
    }

    #[test]
    fn test_blocker_stops_at_dash_or_paren() {
        assert_eq!(
            extract_blocker("Левел - ждем фурнитуру - срочно").as_deref(),
            Some("фурнитуру")
        );
        assert_eq!(
            extract_blocker("ждем стекло (Вова)").as_deref(),
            Some("стекло")
        );
        assert_eq!(
            extract_blocker("ожидаем замер, потом монтаж").as_deref(),
            Some("замер")
        );
        assert_eq!(extract_blocker("собрать шкаф"), None);
    }

    #[test]
    fn test_deadline_first_resolving_pattern_wins() {
        let c = ctx();
        assert_eq!(
            extract_deadline("кухня 1812 до 15 ноября", c.reference()),
            NaiveDate::from_ymd_opt(2025, 11, 15)
        );
        assert_eq!(
            extract_deadline("фасады к пятнице", c.reference()),
            None,
            "only the listed weekday forms resolve"
        );
        assert_eq!(
            extract_deadline("фасады к 5 ноября", c.reference()),
            NaiveDate::from_ymd_opt(2025, 11, 5)
        );
        assert_eq!(extract_deadline("шкаф", c.reference()), None);
    }

    #[test]
    fn test_build_task_waiting_when_blocked() {
        let c = ctx();
        let task = build_task("Левел - кухня, ждем фасады", TaskSeed::default(), &c);
        assert_eq!(task.project, "Левел");
        assert_eq!(task.assignee, "Владимир");
        assert_eq!(task.status, TaskStatus::Waiting);
        assert_eq!(task.blocker.as_deref(), Some("фасады"));
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].status, Some(TaskStatus::Waiting));
    }
}
