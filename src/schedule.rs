// File: ./src/schedule.rs
// Day-grouped calendar views over shipments and installations.
use crate::model::display::format_short_date;
use crate::model::item::NO_DATE_LABEL;
use crate::model::{Installation, Shipment};
use chrono::NaiveDate;

/// Anything that can be placed on the day calendar.
pub trait ScheduleItem {
    fn project(&self) -> &str;
    fn date(&self) -> Option<NaiveDate>;
    fn day_name(&self) -> Option<&str>;
    /// Person shown next to the project.
    fn crew(&self) -> &str;
    fn icon(&self) -> &'static str;

    /// Grouping key: the day label, else the short date, else "БЕЗ ДАТЫ".
    fn day_key(&self) -> String {
        match (self.day_name().filter(|d| !d.is_empty()), self.date()) {
            (Some(day), _) => day.to_string(),
            (None, Some(date)) => format_short_date(date),
            (None, None) => NO_DATE_LABEL.to_string(),
        }
    }
}

impl ScheduleItem for Shipment {
    fn project(&self) -> &str {
        &self.project
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn day_name(&self) -> Option<&str> {
        self.day_name.as_deref()
    }
    fn crew(&self) -> &str {
        Shipment::crew(self)
    }
    fn icon(&self) -> &'static str {
        "📦"
    }
}

impl ScheduleItem for Installation {
    fn project(&self) -> &str {
        &self.project
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn day_name(&self) -> Option<&str> {
        Some(&self.day_name)
    }
    fn crew(&self) -> &str {
        &self.installer
    }
    fn icon(&self) -> &'static str {
        "🔧"
    }
}

/// Shipments and installations on one calendar. A shipment shows its installer first here.
#[derive(Debug, Clone, Copy)]
pub enum PlanItem<'a> {
    Shipment(&'a Shipment),
    Installation(&'a Installation),
}

impl ScheduleItem for PlanItem<'_> {
    fn project(&self) -> &str {
        match self {
            PlanItem::Shipment(s) => &s.project,
            PlanItem::Installation(i) => &i.project,
        }
    }
    fn date(&self) -> Option<NaiveDate> {
        match self {
            PlanItem::Shipment(s) => s.date,
            PlanItem::Installation(i) => i.date,
        }
    }
    fn day_name(&self) -> Option<&str> {
        match self {
            PlanItem::Shipment(s) => s.day_name.as_deref(),
            PlanItem::Installation(i) => Some(&i.day_name),
        }
    }
    fn crew(&self) -> &str {
        match self {
            PlanItem::Shipment(s) if !s.installer.is_empty() => &s.installer,
            PlanItem::Shipment(s) => &s.assembler,
            PlanItem::Installation(i) => &i.installer,
        }
    }
    fn icon(&self) -> &'static str {
        match self {
            PlanItem::Shipment(s) => s.icon(),
            PlanItem::Installation(i) => i.icon(),
        }
    }
}

/// Installations first, then shipments, as one list.
pub fn overlay<'a>(
    installations: &'a [Installation],
    shipments: &'a [Shipment],
) -> Vec<PlanItem<'a>> {
    installations
        .iter()
        .map(PlanItem::Installation)
        .chain(shipments.iter().map(PlanItem::Shipment))
        .collect()
}

#[derive(Debug, Clone)]
pub struct DayGroup<'a, T> {
    pub key: String,
    /// Date of the first item that opened the group.
    pub date: Option<NaiveDate>,
    pub items: Vec<&'a T>,
}

impl<T> DayGroup<'_, T> {
    /// "ПОНЕДЕЛЬНИК · 27 окт", or just the key when the group has no date or is keyed by it.
    pub fn header(&self) -> String {
        match self.date.map(format_short_date) {
            Some(date) if date != self.key => format!("{} · {}", self.key, date),
            _ => self.key.clone(),
        }
    }
}

/// Groups items by `day_key` in first-seen order, then orders the groups: "БЕЗ ДАТЫ" first,
/// the rest by group date with undated groups ahead of dated ones. Equal dates keep
/// first-seen order.
pub fn group_by_day<'a, T: ScheduleItem>(
    items: impl IntoIterator<Item = &'a T>,
) -> Vec<DayGroup<'a, T>> {
    let mut groups: Vec<DayGroup<'a, T>> = Vec::new();
    for item in items {
        let key = item.day_key();
        match groups.iter().position(|g| g.key == key) {
            Some(idx) => groups[idx].items.push(item),
            None => groups.push(DayGroup {
                key,
                date: item.date(),
                items: vec![item],
            }),
        }
    }
    groups.sort_by_key(|g| (g.key != NO_DATE_LABEL, g.date));
    groups
}

/// How soon a shipment leaves, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue(i64),
    Today,
    Soon(i64),
    Later(i64),
    Undated,
}

/// Shipments this many days out or closer are flagged as urgent.
pub const URGENT_DAYS: i64 = 2;

impl Urgency {
    pub fn of(date: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(date) = date else {
            return Urgency::Undated;
        };
        match (date - today).num_days() {
            d if d < 0 => Urgency::Overdue(-d),
            0 => Urgency::Today,
            d if d <= URGENT_DAYS => Urgency::Soon(d),
            d => Urgency::Later(d),
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Urgency::Overdue(_) | Urgency::Today | Urgency::Soon(_))
    }

    pub fn label(&self) -> String {
        match self {
            Urgency::Overdue(d) => format!("Просрочено {} дн", d),
            Urgency::Today => "Сегодня!".to_string(),
            Urgency::Soon(d) | Urgency::Later(d) => format!("Через {} дн", d),
            Urgency::Undated => "Нет даты".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn test_urgency_labels() {
        let today = d(10, 20);
        assert_eq!(Urgency::of(Some(d(10, 18)), today).label(), "Просрочено 2 дн");
        assert_eq!(Urgency::of(Some(today), today).label(), "Сегодня!");
        assert_eq!(Urgency::of(Some(d(10, 22)), today), Urgency::Soon(2));
        assert!(!Urgency::of(Some(d(10, 25)), today).is_urgent());
        assert_eq!(Urgency::of(None, today).label(), "Нет даты");
    }

    #[test]
    fn test_overlay_crew_prefers_installer() {
        let stamp = Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap();
        let mut ship = Shipment::new("Левел", Some(d(10, 27)), stamp);
        ship.assembler = "Петров".to_string();
        ship.installer = "Денис".to_string();
        assert_eq!(ScheduleItem::crew(&ship), "Петров");
        assert_eq!(PlanItem::Shipment(&ship).crew(), "Денис");
    }

    #[test]
    fn test_day_key_fallbacks() {
        let stamp = Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap();
        let mut ship = Shipment::new("Левел", Some(d(11, 5)), stamp);
        assert_eq!(ship.day_key(), "5 ноя");
        ship.day_name = Some("СРЕДА".to_string());
        assert_eq!(ship.day_key(), "СРЕДА");
        ship.day_name = None;
        ship.date = None;
        assert_eq!(ship.day_key(), NO_DATE_LABEL);
    }
}
