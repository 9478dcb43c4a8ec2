// File: ./src/model/parser/sections.rs
// Line-oriented sections: per-project task lists, "Имя:" assignee sections, painting.
use super::ParseContext;
use super::task::{TaskSeed, build_task};
use crate::model::item::{Category, Task, TaskType};
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNEE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([А-ЯЁ][а-яё]+):\s*$").unwrap());
static ASSIGNEE_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([А-ЯЁ][а-яё]+):\s*(.+)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*\-•]\s*").unwrap());

fn task_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn strip_bullet(line: &str) -> &str {
    match BULLET.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Lines of a project block. `project` is `None` for loose text, in which case each line
/// carries its own project.
pub fn parse_project_tasks(project: Option<&str>, text: &str, ctx: &ParseContext) -> Vec<Task> {
    task_lines(text)
        .map(|line| {
            build_task(
                strip_bullet(line),
                TaskSeed {
                    project,
                    ..TaskSeed::default()
                },
                ctx,
            )
        })
        .collect()
}

/// Parses a section where "Имя:" lines switch the current assignee.
///
/// "Имя: текст" sets the assignee and yields a task from the rest of the line.
/// Lines before any declaration get a guessed assignee.
pub fn parse_assignee_section(
    text: &str,
    kind: TaskType,
    category: Category,
    ctx: &ParseContext,
) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut current: Option<String> = None;

    for line in task_lines(text) {
        if let Some(caps) = ASSIGNEE_HEADER.captures(line) {
            current = Some(caps[1].to_string());
            continue;
        }

        let body = if let Some(caps) = ASSIGNEE_INLINE.captures(line) {
            current = Some(caps[1].to_string());
            caps.get(2).map_or("", |m| m.as_str()).trim().to_string()
        } else {
            strip_bullet(line).to_string()
        };

        tasks.push(build_task(
            &body,
            TaskSeed {
                project: None,
                assignee: current.as_deref(),
                kind,
                category,
            },
            ctx,
        ));
    }

    log::debug!("{} section: {} tasks", category, tasks.len());
    tasks
}

/// Painting lines all go to the painting shop.
pub fn parse_painting(text: &str, ctx: &ParseContext) -> Vec<Task> {
    let assignee = ctx.rules.painting_assignee.as_str();
    task_lines(text)
        .map(|line| {
            build_task(
                strip_bullet(line),
                TaskSeed {
                    project: None,
                    assignee: Some(assignee),
                    kind: TaskType::Painting,
                    category: Category::Painting,
                },
                ctx,
            )
        })
        .collect()
}
