// File: tests/parser_sections.rs
use chrono::{Local, NaiveDate, TimeZone};
use operativka::model::parser::{
    ParseContext, parse_assignee_section, parse_painting, parse_project_tasks, resolve_date,
};
use operativka::model::{Category, TaskStatus, TaskType};

fn ctx() -> ParseContext {
    // Monday
    ParseContext::at(Local.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap())
}

fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, day)
}

#[test]
fn test_assignee_declarations_carry_forward() {
    let text = "Иван:\n- столешница Левел\n- полка\n\nПетр: двери Токсово\n- карниз";
    let tasks = parse_assignee_section(text, TaskType::Carpentry, Category::Carpenters, &ctx());

    let got: Vec<(&str, &str)> = tasks
        .iter()
        .map(|t| (t.assignee.as_str(), t.title.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("Иван", "столешница Левел"),
            ("Иван", "полка"),
            ("Петр", "двери Токсово"),
            ("Петр", "карниз"),
        ]
    );
    assert!(tasks.iter().all(|t| t.kind == TaskType::Carpentry));
    assert!(tasks.iter().all(|t| t.category == Category::Carpenters));
    assert_eq!(tasks[0].project, "Левел");
    assert_eq!(tasks[1].project, "Без проекта");
    assert_eq!(tasks[2].project, "Токсово");
}

#[test]
fn test_lines_before_any_declaration_get_guessed_assignee() {
    let tasks = parse_assignee_section(
        "- шкаф в спальню\n- что-то непонятное",
        TaskType::Assembly,
        Category::Assemblers,
        &ctx(),
    );
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].assignee, "Антон");
    assert_eq!(tasks[1].assignee, "");
    assert_eq!(tasks[1].assignee_or_default(), "Без исполнителя");
}

#[test]
fn test_painting_lines_go_to_painting_shop() {
    let tasks = parse_painting("фасады Левел\n* двери Охтинский\n\n", &ctx());
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].title, "двери Охтинский");
    assert_eq!(tasks[1].project, "Охтинский");
    for t in &tasks {
        assert_eq!(t.assignee, "Малярка");
        assert_eq!(t.kind, TaskType::Painting);
        assert_eq!(t.category, Category::Painting);
    }
}

#[test]
fn test_project_block_uses_block_name() {
    let tasks = parse_project_tasks(Some("Левел"), "кухня\n- фасады ждем стекло\n", &ctx());
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.project == "Левел"));

    assert_eq!(tasks[0].assignee, "Владимир");
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[0].blocker, None);

    assert_eq!(tasks[1].title, "фасады ждем стекло");
    assert_eq!(tasks[1].assignee, "Вова");
    assert_eq!(tasks[1].status, TaskStatus::Waiting);
    assert_eq!(tasks[1].blocker.as_deref(), Some("стекло"));
}

#[test]
fn test_loose_lines_extract_project_and_deadline() {
    let tasks = parse_project_tasks(
        None,
        "Охтинский парк - кухня к 5 ноября\nЛевел - фасады до 7 ноября\nпочинить станок",
        &ctx(),
    );
    assert_eq!(tasks[0].project, "Охтинский парк");
    assert_eq!(tasks[0].deadline, d(2025, 11, 5));
    assert_eq!(tasks[1].project, "Левел");
    assert_eq!(tasks[1].deadline, d(2025, 11, 7));
    assert_eq!(tasks[2].project, "Без проекта");
    assert_eq!(tasks[2].deadline, None);
}

#[test]
fn test_waiting_on_supplier() {
    let tasks = parse_project_tasks(Some("Токсово"), "ожидаем фурнитуру, потом сборка", &ctx());
    assert_eq!(tasks[0].status, TaskStatus::Waiting);
    assert_eq!(tasks[0].blocker.as_deref(), Some("фурнитуру"));
}

#[test]
fn test_history_starts_with_creation() {
    let tasks = parse_project_tasks(Some("Левел"), "кухня", &ctx());
    assert_eq!(tasks[0].history.len(), 1);
    assert_eq!(tasks[0].history[0].status, Some(TaskStatus::InProgress));
    assert_eq!(tasks[0].created, tasks[0].updated);
}

#[test]
fn test_date_phrases() {
    let now = ctx().reference();
    assert_eq!(resolve_date("в пятницу", now), d(2025, 10, 24));
    assert_eq!(resolve_date("понедельник", now), d(2025, 10, 27));
    assert_eq!(resolve_date("21 октября", now), d(2025, 10, 21));
    // Midnight of today is already behind the reference moment.
    assert_eq!(resolve_date("20 октября", now), d(2026, 10, 20));
    assert_eq!(resolve_date("6-7 ноября", now), d(2025, 11, 6));
    assert_eq!(resolve_date("7 или 10 ноября", now), d(2025, 11, 7));
    assert_eq!(resolve_date("31 февраля", now), None);
    assert_eq!(resolve_date("завтра", now), None);
    assert_eq!(resolve_date("", now), None);
}
