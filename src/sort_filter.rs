use std::cmp::Ordering;

use serde::Serialize;

use crate::dataset::Value;
use crate::normalize::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort column and direction. Not tied to any view: a column the current view lacks
/// simply leaves the order untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Same column flips direction; a new column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        match &self.column {
            Some(column) => sort_records(records, column, self.direction),
            None => records.to_vec(),
        }
    }

    /// Header suffix for `column`, empty when it is not the sort column.
    pub fn indicator(&self, column: &str) -> &'static str {
        if self.column.as_deref() == Some(column) {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

enum SortKey {
    Number(f64),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None => SortKey::Number(0.0),
            Some(value) if value.is_null() => SortKey::Number(0.0),
            Some(value) => match value.as_f64() {
                Some(n) => SortKey::Number(n),
                None => {
                    let raw = value.to_string();
                    SortKey::Text {
                        folded: raw.to_lowercase(),
                        raw,
                    }
                }
            },
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (
            SortKey::Text { folded: fx, raw: rx },
            SortKey::Text { folded: fy, raw: ry },
        ) => fx.cmp(fy).then_with(|| ry.cmp(rx)),
        (SortKey::Number(_), SortKey::Text { .. }) => Ordering::Less,
        (SortKey::Text { .. }, SortKey::Number(_)) => Ordering::Greater,
    }
}

/// Dictionary-style text order: case-insensitive first, lowercase ahead of uppercase on ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Stable sort on `column`. Two numeric cells (numbers, numeric text, NULL as zero) compare
/// by value, two text cells by [`collate`], and numeric cells rank ahead of text.
pub fn sort_records(records: &[Record], column: &str, direction: SortDirection) -> Vec<Record> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    if first.get(column).is_none() {
        return records.to_vec();
    }

    let mut keyed: Vec<(SortKey, &Record)> = records
        .iter()
        .map(|record| (SortKey::of(record.get(column)), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| direction.apply(compare_keys(a, b)));
    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

/// Keeps records where any of `columns` contains `text`, ignoring case. Empty text keeps all.
/// NULL cells read as empty text, so they never match a literal "null".
pub fn filter_records(records: &[Record], columns: &[String], text: &str) -> Vec<Record> {
    if text.is_empty() {
        return records.to_vec();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|record| record_matches(record, columns, &needle))
        .cloned()
        .collect()
}

fn record_matches(record: &Record, columns: &[String], needle: &str) -> bool {
    columns
        .iter()
        .any(|column| record.text(column).to_lowercase().contains(needle))
}
