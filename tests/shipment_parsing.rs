// File: tests/shipment_parsing.rs
use chrono::{Local, NaiveDate, TimeZone};
use operativka::model::item::NO_DATE_LABEL;
use operativka::model::parser::{
    ParseContext, parse_day_blocks, parse_installations, parse_shipment_line, parse_shipments,
    parse_shipments_plan,
};

fn ctx() -> ParseContext {
    ParseContext::at(Local.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap())
}

fn d(m: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, m, day)
}

#[test]
fn test_shipment_lines() {
    let text = "Доминанта - 5 ноября (Петров) монтаж Денис + Артем\n\
                Левел - 6-7 ноября\n\
                без разделителя\n\
                Токсово - на следующей неделе";
    let ships = parse_shipments(text, &ctx());
    assert_eq!(ships.len(), 3);

    assert_eq!(ships[0].project, "Доминанта");
    assert_eq!(ships[0].date, d(11, 5));
    assert_eq!(ships[0].assembler, "Петров");
    assert_eq!(ships[0].installer, "Денис + Артем");
    assert_eq!(ships[0].day_name, None);

    assert_eq!(ships[1].project, "Левел");
    assert_eq!(ships[1].date, d(11, 6));
    assert_eq!(ships[1].assembler, "");
    assert_eq!(ships[1].installer, "");

    assert_eq!(ships[2].project, "Токсово");
    assert_eq!(ships[2].date, None);
}

#[test]
fn test_project_is_text_before_first_separator() {
    let ship = parse_shipment_line("Новая Рига - кухня - 7 или 10 ноября", &ctx()).unwrap();
    assert_eq!(ship.project, "Новая Рига");
    assert_eq!(ship.date, d(11, 7));
}

#[test]
fn test_lower_case_installer_is_ignored() {
    let ship = parse_shipment_line("Левел - 5 ноября монтаж денис", &ctx()).unwrap();
    assert_eq!(ship.installer, "");
}

#[test]
fn test_line_without_separator_is_rejected() {
    assert!(parse_shipment_line("Левел 5 ноября", &ctx()).is_none());
    assert!(parse_shipments("\n\n", &ctx()).is_empty());
}

#[test]
fn test_shipment_plan_keeps_day_labels() {
    let text = "ПОНЕДЕЛЬНИК 27/10\n- Левел\n- Токсово\nБЕЗ ДАТЫ\n- Рылеева";
    let ships = parse_shipments_plan(text, &ctx());
    assert_eq!(ships.len(), 3);
    assert_eq!(ships[0].day_name.as_deref(), Some("ПОНЕДЕЛЬНИК"));
    assert_eq!(ships[0].date, d(10, 27));
    assert_eq!(ships[1].project, "Токсово");
    assert_eq!(ships[1].date, d(10, 27));
    assert_eq!(ships[2].day_name.as_deref(), Some(NO_DATE_LABEL));
    assert_eq!(ships[2].date, None);
}

#[test]
fn test_installations_split_on_last_separator() {
    let text = "ВТОРНИК 28/10\n\
                - Левел - кухня - Денис\n\
                - Токсово\n\
                БЕЗ ДАТЫ\n\
                - Рылеева - Артем\n\
                СРЕДА 31/02\n\
                - Пикунов - Денис";
    let insts = parse_installations(text, &ctx());
    assert_eq!(insts.len(), 4);

    assert_eq!(insts[0].project, "Левел - кухня");
    assert_eq!(insts[0].installer, "Денис");
    assert_eq!(insts[0].day_name, "ВТОРНИК");
    assert_eq!(insts[0].date, d(10, 28));

    assert_eq!(insts[1].project, "Токсово");
    assert_eq!(insts[1].installer, "");
    assert_eq!(insts[1].day_name, "ВТОРНИК");

    assert_eq!(insts[2].installer, "Артем");
    assert_eq!(insts[2].day_name, NO_DATE_LABEL);
    assert_eq!(insts[2].date, None);

    // Impossible header date.
    assert_eq!(insts[3].project, "Пикунов");
    assert_eq!(insts[3].date, None);
    assert_eq!(insts[3].day_name, NO_DATE_LABEL);
}

#[test]
fn test_day_blocks_ignore_stray_lines() {
    let items = parse_day_blocks("заметка\nпятница 31/10\n- Левел\nещё заметка", 2025);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].day_label.as_deref(), Some("пятница"));
    assert_eq!(items[0].date, d(10, 31));
    assert_eq!(items[0].text, "Левел");
}
