// File: ./src/model/parser/day_block.rs
// Multi-day schedule blocks:
//
//   ПОНЕДЕЛЬНИК 27/10
//   - Левел - Денис
//   БЕЗ ДАТЫ
//   - Токсово
use super::ParseContext;
use crate::model::item::{Installation, NO_DATE_LABEL, Shipment};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([А-ЯЁ]+(?:\s+[А-ЯЁ]+)*)\s+(\d{1,2})/(\d{1,2})$").unwrap()
});
static NO_DATE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^БЕЗ\s+ДАТЫ$").unwrap());

const ITEM_PREFIX: &str = "- ";
const INSTALLER_SEPARATOR: &str = " - ";

/// An item line together with the day header in effect above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBlockItem {
    pub day_label: Option<String>,
    pub date: Option<NaiveDate>,
    pub text: String,
}

/// Walks the block top to bottom carrying the current header forward. Header dates use
/// `year`; an impossible day/month leaves the date empty. Lines that are neither headers
/// nor "- " items are ignored.
pub fn parse_day_blocks(text: &str, year: i32) -> Vec<DayBlockItem> {
    let mut items = Vec::new();
    let mut day_label: Option<String> = None;
    let mut date: Option<NaiveDate> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if NO_DATE_HEADER.is_match(line) {
            day_label = Some(NO_DATE_LABEL.to_string());
            date = None;
            continue;
        }

        if let Some(caps) = DAY_HEADER.captures(line) {
            let day = caps[2].parse::<u32>().unwrap_or(0);
            let month = caps[3].parse::<u32>().unwrap_or(0);
            day_label = Some(caps[1].to_string());
            date = NaiveDate::from_ymd_opt(year, month, day);
            if date.is_none() {
                log::warn!("Day header with impossible date: {}", line);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(ITEM_PREFIX) {
            items.push(DayBlockItem {
                day_label: day_label.clone(),
                date,
                text: rest.trim().to_string(),
            });
        }
    }
    items
}

/// "- Проект - Монтажник" items; the installer follows the last " - ".
pub fn parse_installations(text: &str, ctx: &ParseContext) -> Vec<Installation> {
    let stamp = ctx.stamp();
    let installations: Vec<Installation> = parse_day_blocks(text, ctx.now.year())
        .into_iter()
        .map(|item| {
            let (project, installer) = match item.text.rfind(INSTALLER_SEPARATOR) {
                Some(idx) if idx > 0 => (
                    item.text[..idx].trim(),
                    item.text[idx + INSTALLER_SEPARATOR.len()..].trim(),
                ),
                _ => (item.text.as_str(), ""),
            };
            let mut inst = Installation::new(project, item.date, installer, stamp);
            if item.date.is_some()
                && let Some(label) = item.day_label
            {
                inst.day_name = label;
            }
            inst
        })
        .collect();
    log::debug!("Parsed {} installations", installations.len());
    installations
}

/// "- Проект" items of a shipment plan; the whole remainder is the project.
pub fn parse_shipments_plan(text: &str, ctx: &ParseContext) -> Vec<Shipment> {
    let stamp = ctx.stamp();
    let shipments: Vec<Shipment> = parse_day_blocks(text, ctx.now.year())
        .into_iter()
        .map(|item| {
            let mut shipment = Shipment::new(&item.text, item.date, stamp);
            shipment.day_name = item.day_label;
            shipment
        })
        .collect();
    log::debug!("Parsed {} planned shipments", shipments.len());
    shipments
}
