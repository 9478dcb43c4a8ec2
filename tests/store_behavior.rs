// File: tests/store_behavior.rs
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use operativka::model::{
    Category, HistoryAction, InstallationDraft, Shipment, ShipmentDraft, Task, TaskDraft,
    TaskStatus, TaskType,
};
use operativka::store::{AlertRules, PROJECT_REQUIRED, RecordStore};

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap()
}

fn stamp() -> DateTime<Utc> {
    now().with_timezone(&Utc)
}

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

fn task(title: &str, project: &str, assignee: &str, category: Category) -> Task {
    let mut t = Task::new(title, TaskStatus::InProgress, stamp());
    t.project = project.to_string();
    t.assignee = assignee.to_string();
    t.category = category;
    t
}

#[test]
fn test_status_changes_are_recorded() {
    let mut store = RecordStore::new();
    let id = store
        .create_task(
            TaskDraft {
                title: "кухня".to_string(),
                ..TaskDraft::default()
            },
            stamp(),
        )
        .id;

    let later = stamp() + Duration::hours(1);
    let t = store
        .change_task_status(&id, TaskStatus::Ready, later)
        .unwrap();
    assert_eq!(t.status, TaskStatus::Ready);
    assert_eq!(t.updated, later);

    let t = store.toggle_task_done(&id, later).unwrap();
    assert_eq!(t.status, TaskStatus::Done);
    let t = store.toggle_task_done(&id, later).unwrap();
    assert_eq!(t.status, TaskStatus::InProgress);

    let actions: Vec<HistoryAction> = t.history.iter().map(|h| h.action).collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Created,
            HistoryAction::StatusChanged,
            HistoryAction::Completed,
            HistoryAction::Uncompleted,
        ]
    );
    assert!(t.history.iter().all(|h| h.status.is_some()));
}

#[test]
fn test_unknown_ids_return_none() {
    let mut store = RecordStore::new();
    assert!(store.change_task_status("nope", TaskStatus::Done, stamp()).is_none());
    assert!(store.toggle_task_done("nope", stamp()).is_none());
    assert!(store.delete_task("nope").is_none());
    assert!(store.edit_shipment("nope", ShipmentDraft::default(), stamp()).is_none());
    assert!(store.delete_installation("nope").is_none());
    assert!(
        store
            .edit_installation(
                "nope",
                InstallationDraft {
                    project: "Левел".to_string(),
                    ..InstallationDraft::default()
                },
                stamp()
            )
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_edit_resets_type_and_logs_update() {
    let mut store = RecordStore::new();
    let mut painted = task("фасады", "Левел", "Малярка", Category::Painting);
    painted.kind = TaskType::Painting;
    let id = painted.id.clone();
    store.data.tasks.push(painted);

    let mut draft = store.get_task(&id).unwrap().to_draft();
    draft.title = "фасады, 2 слоя".to_string();
    draft.status = TaskStatus::Waiting;
    draft.blocker = Some("грунт".to_string());
    let t = store.edit_task(&id, draft, stamp()).unwrap();

    assert_eq!(t.title, "фасады, 2 слоя");
    assert_eq!(t.kind, TaskType::Production);
    assert_eq!(t.category, Category::Painting);
    assert_eq!(t.history.last().unwrap().action, HistoryAction::Updated);
    assert_eq!(t.history.last().unwrap().status, Some(TaskStatus::Waiting));
}

#[test]
fn test_delete_and_filter() {
    let mut store = RecordStore::new();
    let a = task("a", "Левел", "", Category::ObjectTasks);
    let mut b = task("b", "Левел", "", Category::ObjectTasks);
    b.status = TaskStatus::Done;
    let a_id = a.id.clone();
    store.data.tasks.extend([a, b]);

    assert_eq!(store.tasks_with_status(None).len(), 2);
    assert_eq!(store.tasks_with_status(Some(TaskStatus::Done)).len(), 1);
    assert_eq!(store.active_tasks().len(), 1);
    assert_eq!(store.open_tasks_for("Левел"), 1);

    assert_eq!(store.delete_task(&a_id).unwrap().title, "a");
    assert_eq!(store.tasks_with_status(Some(TaskStatus::InProgress)).len(), 0);
}

#[test]
fn test_grouping_follows_category_order_then_first_seen_assignee() {
    let mut store = RecordStore::new();
    store.data.tasks.extend([
        task("покраска", "Левел", "Малярка", Category::Painting),
        task("шкаф", "Левел", "Антон", Category::ObjectTasks),
        task("уборка", "", "", Category::ObjectTasks),
        task("кровать", "Токсово", "Антон", Category::ObjectTasks),
        task("столешница", "Левел", "Иван", Category::Carpenters),
    ]);

    let groups = store.tasks_by_category(None);
    let cats: Vec<Category> = groups.iter().map(|g| g.category).collect();
    assert_eq!(
        cats,
        vec![Category::ObjectTasks, Category::Carpenters, Category::Painting]
    );

    let object = &groups[0];
    assert_eq!(object.len(), 3);
    assert_eq!(object.assignees[0].0, "Антон");
    assert_eq!(object.assignees[0].1.len(), 2);
    assert_eq!(object.assignees[1].0, "Без исполнителя");
}

#[test]
fn test_shipment_edit_keeps_plan_label() {
    let mut store = RecordStore::new();
    let mut planned = Shipment::new("Левел", Some(d(10, 27)), stamp());
    planned.day_name = Some("ПОНЕДЕЛЬНИК".to_string());
    let id = planned.id.clone();
    store.data.shipments.push(planned);

    let mut draft = store.get_shipment(&id).unwrap().to_draft();
    draft.date = Some(d(10, 29));
    draft.installer = "Денис".to_string();
    let s = store.edit_shipment(&id, draft, stamp()).unwrap();

    assert_eq!(s.date, Some(d(10, 29)));
    assert_eq!(s.day_name.as_deref(), Some("ПОНЕДЕЛЬНИК"));
    assert_eq!(s.installer, "Денис");
}

#[test]
fn test_shipments_by_date_lists_undated_first() {
    let mut store = RecordStore::new();
    for (project, date) in [
        ("Левел", Some(d(11, 5))),
        ("Токсово", None),
        ("Рылеева", Some(d(10, 27))),
        ("Пикунов", Some(d(11, 5))),
    ] {
        store.create_shipment(
            ShipmentDraft {
                project: project.to_string(),
                date,
                ..ShipmentDraft::default()
            },
            stamp(),
        );
    }
    let order: Vec<&str> = store
        .shipments_by_date()
        .iter()
        .map(|s| s.project.as_str())
        .collect();
    assert_eq!(order, vec!["Токсово", "Рылеева", "Левел", "Пикунов"]);
}

#[test]
fn test_installation_requires_project() {
    let mut store = RecordStore::new();
    let err = store
        .create_installation(
            InstallationDraft {
                project: "  ".to_string(),
                date: Some(d(10, 27)),
                installer: "Денис".to_string(),
            },
            stamp(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), PROJECT_REQUIRED);
    assert!(store.data.installations.is_empty());

    let inst = store
        .create_installation(
            InstallationDraft {
                project: " Токсово ".to_string(),
                date: Some(d(10, 27)),
                installer: "Денис".to_string(),
            },
            stamp(),
        )
        .unwrap();
    assert_eq!(inst.project, "Токсово");
    assert_eq!(inst.day_name, "ПОНЕДЕЛЬНИК");

    let mut draft = inst.to_draft();
    draft.date = None;
    let edited = store.edit_installation(&inst.id, draft, stamp()).unwrap().unwrap();
    assert_eq!(edited.day_name, "БЕЗ ДАТЫ");

    let mut draft = edited.to_draft();
    draft.project = String::new();
    assert!(store.edit_installation(&inst.id, draft, stamp()).is_err());
    assert_eq!(store.get_installation(&inst.id).unwrap().project, "Токсово");
}

#[test]
fn test_notes_one_per_day_newest_first() {
    let mut store = RecordStore::new();
    store.save_note(d(10, 17), "пятница");
    store.save_note(d(10, 20), "черновик");
    store.save_note(d(10, 20), "понедельник");
    store.save_note(d(10, 14), "вторник");

    let recent = store.recent_notes(2);
    assert_eq!(
        recent,
        vec![("2025-10-20", "понедельник"), ("2025-10-17", "пятница")]
    );
    assert_eq!(store.recent_notes(10).len(), 3);
}

#[test]
fn test_notifications() {
    let mut store = RecordStore::new();

    let mut overdue = task("кухня", "Левел", "", Category::ObjectTasks);
    overdue.deadline = Some(d(10, 18));
    let mut finished = task("шкаф", "Левел", "", Category::ObjectTasks);
    finished.deadline = Some(d(10, 1));
    finished.status = TaskStatus::Done;
    let mut waiting = task("фасады", "Левел", "", Category::ObjectTasks);
    waiting.status = TaskStatus::Waiting;
    waiting.blocker = Some("стекло".to_string());
    waiting.updated = stamp() - Duration::days(5);
    let mut recent_wait = task("двери", "Токсово", "", Category::ObjectTasks);
    recent_wait.status = TaskStatus::Waiting;
    recent_wait.blocker = Some("петли".to_string());
    recent_wait.updated = stamp() - Duration::days(2);
    store
        .data
        .tasks
        .extend([overdue, finished, waiting, recent_wait]);

    store.data.shipments.extend([
        Shipment::new("Левел", Some(d(10, 20)), stamp()),
        Shipment::new("Рылеева", Some(d(10, 21)), stamp()),
        Shipment::new("Токсово", Some(d(10, 23)), stamp()),
        Shipment::new("Токсово", Some(d(10, 22)), stamp()),
    ]);

    let alerts = store.notifications(now(), &AlertRules::default());
    assert_eq!(
        alerts,
        vec![
            "⚠️ Просрочено: кухня (Левел)".to_string(),
            "⏰ Долго ждем: стекло для Левел (5 дн)".to_string(),
            "📦 Отгрузка Левел СЕГОДНЯ: 2 задач не готово".to_string(),
            "📦 Отгрузка Токсово через 2 дн: 1 задач не готово".to_string(),
        ]
    );

    let capped = store.notifications(
        now(),
        &AlertRules {
            max: 2,
            ..AlertRules::default()
        },
    );
    assert_eq!(capped.len(), 2);
}
