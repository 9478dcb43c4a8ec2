// File: ./src/model/parser/mod.rs
// Turns free-form Russian stand-up text into tasks, shipments and installations.
//
// Every entry point is a pure function of its input text plus a `ParseContext`
// (reference moment + lookup rules); nothing here touches the store.
pub mod assignee;
pub mod date;
pub mod day_block;
pub mod form;
pub mod sections;
pub mod shipment;
pub mod task;

pub use assignee::{AssigneeKeywords, AssigneeTable};
pub use date::resolve_date;
pub use day_block::{DayBlockItem, parse_day_blocks, parse_installations, parse_shipments_plan};
pub use form::{ProjectBlock, StructuredForm};
pub use sections::{parse_assignee_section, parse_painting, parse_project_tasks};
pub use shipment::{parse_shipment_line, parse_shipments};
pub use task::{TaskSeed, build_task, extract_blocker, extract_deadline, extract_project};

use crate::model::item::{Category, Installation, Shipment, Task, TaskType, record_stamp};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use regex::Regex;

pub const DEFAULT_PAINTING_ASSIGNEE: &str = "Малярка";

/// Project names recognised anywhere in a task line when no other project pattern matched.
pub const DEFAULT_KNOWN_PROJECTS: &[&str] = &[
    "Доминанта",
    "Левел",
    "Муравьев",
    "Петровская",
    "Жизневская",
    "Лобачева",
    "Данилушкина",
    "Охтинский",
    "Токсово",
    "Привилегия",
    "Рылеева",
    "Шидловский",
    "Пикунов",
    "Новая рига",
];

/// Lookup rules shared by every parse call.
#[derive(Debug, Clone)]
pub struct ParseRules {
    pub assignees: AssigneeTable,
    pub painting_assignee: String,
    known_projects: Option<Regex>,
}

impl ParseRules {
    pub fn new(assignees: AssigneeTable, known_projects: &[String], painting_assignee: &str) -> Self {
        Self {
            assignees,
            painting_assignee: painting_assignee.to_string(),
            known_projects: known_projects_pattern(known_projects),
        }
    }

    pub(crate) fn known_projects(&self) -> Option<&Regex> {
        self.known_projects.as_ref()
    }
}

impl Default for ParseRules {
    fn default() -> Self {
        let known: Vec<String> = DEFAULT_KNOWN_PROJECTS.iter().map(|s| s.to_string()).collect();
        Self::new(AssigneeTable::default(), &known, DEFAULT_PAINTING_ASSIGNEE)
    }
}

// Case-insensitive alternation; inner spaces match any whitespace run.
fn known_projects_pattern(names: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|n| {
            n.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    match Regex::new(&format!("(?i)({})", alternatives.join("|"))) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Ignoring known project list: {}", e);
            None
        }
    }
}

/// Reference moment and rules for one parse run.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub now: DateTime<Local>,
    pub rules: ParseRules,
}

impl ParseContext {
    pub fn new(now: DateTime<Local>, rules: ParseRules) -> Self {
        Self { now, rules }
    }

    /// Default rules at a fixed moment.
    pub fn at(now: DateTime<Local>) -> Self {
        Self::new(now, ParseRules::default())
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.now.naive_local()
    }

    pub fn stamp(&self) -> DateTime<Utc> {
        record_stamp(&self.now)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub tasks: Vec<Task>,
    pub shipments: Vec<Shipment>,
    pub installations: Vec<Installation>,
}

impl ParseResult {
    pub fn total(&self) -> usize {
        self.tasks.len() + self.shipments.len() + self.installations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Parses every section of the structured form.
pub fn parse_form(form: &StructuredForm, ctx: &ParseContext) -> ParseResult {
    let mut result = ParseResult::default();

    for block in &form.projects {
        if block.tasks.trim().is_empty() {
            continue;
        }
        let name = block.name.trim();
        result
            .tasks
            .extend(parse_project_tasks((!name.is_empty()).then_some(name), &block.tasks, ctx));
    }

    result.tasks.extend(parse_assignee_section(
        &form.carpentry,
        TaskType::Carpentry,
        Category::Carpenters,
        ctx,
    ));
    result.tasks.extend(parse_painting(&form.painting, ctx));
    result.tasks.extend(parse_assignee_section(
        &form.assembly,
        TaskType::Assembly,
        Category::Assemblers,
        ctx,
    ));

    result.shipments.extend(parse_shipments(&form.shipments, ctx));
    result
        .shipments
        .extend(parse_shipments_plan(&form.shipments_plan, ctx));
    result
        .installations
        .extend(parse_installations(&form.installation, ctx));

    log::debug!(
        "Parsed form: {} tasks, {} shipments, {} installations",
        result.tasks.len(),
        result.shipments.len(),
        result.installations.len()
    );
    result
}

/// Parses a saved daily note (the text `StructuredForm::to_note` produces, or hand-typed text
/// in the same layout).
pub fn parse_note(text: &str, ctx: &ParseContext) -> ParseResult {
    parse_form(&StructuredForm::from_note(text), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_projects_pattern_tolerates_spacing() {
        let re = known_projects_pattern(&["Новая рига".to_string()]).unwrap();
        assert!(re.is_match("отгрузка новая   рига"));
        assert!(known_projects_pattern(&[" ".to_string()]).is_none());
    }

    #[test]
    fn test_result_total() {
        assert!(ParseResult::default().is_empty());
        let r = ParseResult {
            installations: vec![Installation::new("Лахта", None, "", Utc::now())],
            ..ParseResult::default()
        };
        assert_eq!(r.total(), 1);
        assert!(!r.is_empty());
    }
}
