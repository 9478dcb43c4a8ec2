// File: ./src/model/parser/shipment.rs
use super::ParseContext;
use super::date::resolve_date;
use crate::model::item::Shipment;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_SPANS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "5 ноября", "6-7 ноября", "7 или 10 ноября"
        r"(?i)(\d+(?:\s+или\s+\d+)?(?:-\d+)?\s+[а-яё]+)",
        r"(?i)до\s+(\d+\s+[а-яё]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static ASSEMBLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
// Only the keyword is case-insensitive; names must be capitalised.
static INSTALLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:монтаж)\s+([А-ЯЁ][а-яё]+(?:\s+\+\s+[А-ЯЁ][а-яё]+)*)(?:\s|$)").unwrap()
});

const SEPARATOR: &str = " - ";

/// One shipment per non-blank line; lines without " - " are skipped.
pub fn parse_shipments(text: &str, ctx: &ParseContext) -> Vec<Shipment> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| parse_shipment_line(l, ctx))
        .collect()
}

/// "Проект - дата (сборщик) монтаж Имя [+ Имя]".
///
/// The project is everything before the first " - ". Date, assembler and installer are
/// read from the remainder and are each optional.
pub fn parse_shipment_line(line: &str, ctx: &ParseContext) -> Option<Shipment> {
    let Some((project, rest)) = line.split_once(SEPARATOR) else {
        log::warn!("Shipment line has no \" - \" separator: {}", line);
        return None;
    };
    let project = project.trim();
    let rest = rest.trim();

    let date_text = DATE_SPANS
        .iter()
        .find_map(|re| re.captures(rest).and_then(|c| c.get(1)))
        .map(|m| m.as_str());
    if date_text.is_none() {
        log::debug!("No date in shipment line: {}", rest);
    }

    let mut shipment = Shipment::new(
        project,
        date_text.and_then(|t| resolve_date(t, ctx.reference())),
        ctx.stamp(),
    );
    shipment.assembler = ASSEMBLER
        .captures(rest)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    shipment.installer = INSTALLER
        .captures(rest)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    Some(shipment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, TimeZone};

    fn ctx() -> ParseContext {
        ParseContext::at(Local.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_missing_separator_skips_line() {
        assert!(parse_shipment_line("Левел 5 ноября", &ctx()).is_none());
    }

    #[test]
    fn test_lowercase_name_is_not_an_installer() {
        let s = parse_shipment_line("Левел - 5 ноября монтаж денис", &ctx()).unwrap();
        assert_eq!(s.installer, "");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 11, 5));
    }

    #[test]
    fn test_installer_keyword_any_case() {
        let s = parse_shipment_line("Левел - 5 ноября МОНТАЖ Денис", &ctx()).unwrap();
        assert_eq!(s.installer, "Денис");
    }

    #[test]
    fn test_only_first_separator_splits() {
        let s = parse_shipment_line("Левел - кухня - 5 ноября", &ctx()).unwrap();
        assert_eq!(s.project, "Левел");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 11, 5));
    }
}
