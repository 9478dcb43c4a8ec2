// File: ./src/model/display.rs
use crate::model::item::{Priority, Shipment, Task, TaskStatus};
use chrono::{Datelike, NaiveDate};

const SHORT_MONTHS: [&str; 12] = [
    "янв", "фев", "мар", "апр", "май", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

/// "5 ноя" style date used in every list and export.
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{} {}", date.day(), SHORT_MONTHS[date.month0() as usize])
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format_short_date(d),
        None => "Нет даты".to_string(),
    }
}

/// Russian plural form: plural(3, "задача", "задачи", "задач") == "задачи".
pub fn plural<'a>(num: i64, one: &'a str, two: &'a str, five: &'a str) -> &'a str {
    let n = num.abs() % 100;
    let n1 = n % 10;
    if n > 10 && n < 20 {
        return five;
    }
    if n1 > 1 && n1 < 5 {
        return two;
    }
    if n1 == 1 {
        return one;
    }
    five
}

pub trait TaskDisplay {
    fn checkbox_symbol(&self) -> &'static str;
    fn list_line(&self) -> String;
}

impl TaskDisplay for Task {
    fn checkbox_symbol(&self) -> &'static str {
        match self.status {
            TaskStatus::Done => "[✔]",
            TaskStatus::Ready => "[✓]",
            TaskStatus::Waiting => "[…]",
            TaskStatus::InProgress => "[ ]",
        }
    }

    fn list_line(&self) -> String {
        let mut s = format!("{} {}", self.checkbox_symbol(), self.title);
        if self.priority == Priority::High {
            s.push_str(" !");
        }
        s.push_str(&format!("  📁 {}", self.project));
        if let Some(d) = self.deadline {
            s.push_str(&format!("  📅 {}", format_short_date(d)));
        }
        if let Some(b) = &self.blocker {
            s.push_str(&format!("  ⏳ Ждем: {}", b));
        }
        s
    }
}

impl TaskDisplay for Shipment {
    fn checkbox_symbol(&self) -> &'static str {
        "📦"
    }

    fn list_line(&self) -> String {
        let mut s = format!("{} {}", self.checkbox_symbol(), self.project);
        if !self.assembler.is_empty() {
            s.push_str(&format!("  Сборщик: {}", self.assembler));
        }
        if !self.installer.is_empty() {
            s.push_str(&format!("  Монтаж: {}", self.installer));
        }
        if !self.notes.is_empty() {
            s.push_str(&format!("  ({})", self.notes));
        }
        s
    }
}
