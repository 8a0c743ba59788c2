use crate::service::Record;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort column and direction of the applications table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    /// Header click: the same column flips direction, another column starts ascending.
    pub fn toggle(current: Option<&SortState>, key: &str) -> SortState {
        match current {
            Some(sort) if sort.key == key => SortState {
                key: key.to_string(),
                direction: sort.direction.reversed(),
            },
            _ => SortState::ascending(key),
        }
    }
}

/// Stable sort of `records` by one column.
pub fn sort_records(records: &mut [Record], sort: &SortState) {
    records.sort_by(|a, b| {
        let ordering = compare_values(a.get(&sort.key), b.get(&sort.key));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Orders two cells: missing and null first, then JSON numbers by value, then
/// everything else by its text. Numeric-looking text stays text, so `"10"`
/// sorts before `"9"`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => cell_text(a).cmp(&cell_text(b)),
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// The text a cell shows; also what the search term is matched against.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: &[Value]) -> Vec<Record> {
        values
            .iter()
            .map(|v| {
                let mut record = Record::new();
                record.insert("v".to_string(), v.clone());
                record
            })
            .collect()
    }

    fn column(records: &[Record]) -> Vec<Value> {
        records
            .iter()
            .map(|r| r.get("v").cloned().unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let first = SortState::toggle(None, "City");
        assert_eq!(first, SortState::ascending("City"));

        let second = SortState::toggle(Some(&first), "City");
        assert_eq!(second.direction, SortDirection::Descending);

        let third = SortState::toggle(Some(&second), "Status");
        assert_eq!(third, SortState::ascending("Status"));
    }

    #[test]
    fn numeric_text_sorts_as_text() {
        let mut records = rows(&[json!("9"), json!("10"), json!("100")]);
        sort_records(&mut records, &SortState::ascending("v"));
        assert_eq!(column(&records), vec![json!("10"), json!("100"), json!("9")]);
    }

    #[test]
    fn numbers_sort_by_value_and_before_text() {
        let mut records = rows(&[json!("1a"), json!(100), json!("10"), json!(9)]);
        sort_records(&mut records, &SortState::ascending("v"));
        assert_eq!(
            column(&records),
            vec![json!(9), json!(100), json!("10"), json!("1a")]
        );
    }

    #[test]
    fn nulls_first_ascending_and_last_descending() {
        let mut records = rows(&[json!("b"), Value::Null, json!("a")]);
        sort_records(&mut records, &SortState::ascending("v"));
        assert_eq!(column(&records), vec![Value::Null, json!("a"), json!("b")]);

        let desc = SortState::toggle(Some(&SortState::ascending("v")), "v");
        sort_records(&mut records, &desc);
        assert_eq!(column(&records), vec![json!("b"), json!("a"), Value::Null]);
    }

    #[test]
    fn sort_is_stable() {
        let mut records: Vec<Record> = ["x", "y", "z"]
            .iter()
            .map(|tag| {
                let mut record = Record::new();
                record.insert("v".to_string(), json!("same"));
                record.insert("tag".to_string(), json!(tag));
                record
            })
            .collect();
        sort_records(&mut records, &SortState::ascending("v"));
        let tags: Vec<_> = records.iter().map(|r| r["tag"].clone()).collect();
        assert_eq!(tags, vec![json!("x"), json!("y"), json!("z")]);
    }
}
