// File: ./src/model/parser/assignee.rs
// Keyword table used to guess who a task belongs to when no one was named.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered person -> keywords table. Lookup is first-match-wins in table order,
/// so overlapping keywords ("тумб") resolve to whoever is listed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssigneeTable(Vec<AssigneeKeywords>);

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    ("Максим", &["прихожую", "разобра", "дособра"]),
    ("Владимир", &["кухн", "1812"]),
    ("Вова", &["фасад", "витрин", "двер", "профил"]),
    ("Денис", &["монтаж", "отгрузк", "новая рига"]),
    ("Шероз", &["гардероб", "шр"]),
    ("Антон", &["шкаф", "радиус", "кровать"]),
    ("Артем", &["откос", "лиственниц"]),
    ("Константин", &["библиотек", "столик", "тумб"]),
    ("Андрей", &["тв зон", "тумб"]),
];

impl Default for AssigneeTable {
    fn default() -> Self {
        Self(
            DEFAULT_TABLE
                .iter()
                .map(|(name, words)| AssigneeKeywords {
                    name: name.to_string(),
                    keywords: words.iter().map(|w| w.to_string()).collect(),
                })
                .collect(),
        )
    }
}

impl AssigneeTable {
    pub fn new(entries: Vec<AssigneeKeywords>) -> Self {
        Self(entries)
    }

    /// Returns the first person whose keyword occurs in `text`, or an empty string.
    pub fn guess(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        self.0
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .any(|k| lower.contains(&k.to_lowercase()))
            })
            .map(|entry| entry.name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_is_case_insensitive() {
        let table = AssigneeTable::default();
        assert_eq!(table.guess("Собрать ШКАФ в спальню"), "Антон");
        assert_eq!(table.guess("Кухня 1812"), "Владимир");
        assert_eq!(table.guess("купить хлеб"), "");
    }

    #[test]
    fn test_overlap_first_listed_wins() {
        let table = AssigneeTable::default();
        assert_eq!(table.guess("тумба под тв зону"), "Константин");
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let table = AssigneeTable::new(vec![AssigneeKeywords {
            name: "Никто".to_string(),
            keywords: vec![String::new()],
        }]);
        assert_eq!(table.guess("что угодно"), "");
    }
}
