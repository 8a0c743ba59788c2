use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// The current input of a single field.
///
/// Text covers every single-valued kind (text, date, select, radio and numbers,
/// which stay strings until validation parses them). Checkboxes hold a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Input state of a form, keyed by field id across the whole (flattened) tree.
pub type FormValues = AHashMap<String, FieldValue>;

/// Error messages of fields currently failing validation, keyed by field id.
pub type FormErrors = AHashMap<String, String>;

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// The textual form used for pattern checks and search: lists are comma-joined.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::List(items) => Cow::Owned(items.join(",")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }
}

/// Treats an absent value the same as an empty one.
pub fn is_empty_value(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_empty)
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Formats a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    // `as i64` saturates outside this range; `f64`'s Display already prints
    // large integral values in full.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// `450000` -> `450,000`; fractional parts are kept as-is.
pub fn group_thousands(n: f64) -> String {
    let formatted = format_number(n);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&FieldValue::from(""))));
        assert!(is_empty_value(Some(&FieldValue::List(vec![]))));
        assert!(!is_empty_value(Some(&FieldValue::from("0"))));
        assert!(!is_empty_value(Some(&FieldValue::from(vec!["a"]))));
    }

    #[test]
    fn list_text_is_comma_joined() {
        let v = FieldValue::from(vec!["Smoke Detectors", "Sprinkler System"]);
        assert_eq!(v.as_text(), "Smoke Detectors,Sprinkler System");
        assert_eq!(v.as_str(), None);
    }

    #[test]
    fn untagged_json_shape() {
        let v: FieldValue = serde_json::from_str("\"Yes\"").unwrap();
        assert_eq!(v, FieldValue::from("Yes"));
        let v: FieldValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(v, FieldValue::from(vec!["a", "b"]));
        assert!(serde_json::from_str::<FieldValue>("5").is_err());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(50000.0), "50000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-1e20), "-100000000000000000000");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(450000.0), "450,000");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(-1234567.5), "-1,234,567.5");
        assert_eq!(group_thousands(1e20), "100,000,000,000,000,000,000");
    }
}
