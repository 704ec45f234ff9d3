use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text shown for null values and cells whose accessor failed.
pub const PLACEHOLDER: &str = "-";

/// A primitive value extracted from a row for sorting, filtering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Chronological view of the value. Text qualifies when it looks like an
    /// ISO-8601 date or timestamp.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => parse_iso_datetime(s),
            _ => None,
        }
    }

    /// Display text with the placeholder substituted for null.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => PLACEHOLDER.to_string(),
            other => other.to_string(),
        }
    }

    /// Ordering between two values of the same kind, or `None` when the
    /// kinds cannot be meaningfully compared (including any null). Two text
    /// values always compare, as text when their kinds differ.
    pub fn try_compare(&self, other: &CellValue) -> Option<Ordering> {
        match (self.kind(), other.kind()) {
            (Kind::Null, _) | (_, Kind::Null) => None,
            (a, b) if a.rank() == b.rank() => Some(a.cmp_same(&b)),
            _ => match (self, other) {
                (CellValue::Text(a), CellValue::Text(b)) => Some(compare_text(a, b)),
                _ => None,
            },
        }
    }

    /// Total order used by the default sort comparator. Values are ranked
    /// by kind first (null, number, date, bool, text) and compared within a
    /// kind, so mixed columns still sort consistently.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        let (a, b) = (self.kind(), other.kind());
        a.rank().cmp(&b.rank()).then_with(|| a.cmp_same(&b))
    }

    /// Equality used by `Equals`/`OneOf` filters: text compares
    /// case-insensitively, everything else by value.
    pub fn loosely_equals(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => self.try_compare(other) == Some(Ordering::Equal),
        }
    }

    fn kind(&self) -> Kind<'_> {
        match self {
            CellValue::Null => Kind::Null,
            CellValue::Bool(b) => Kind::Bool(*b),
            CellValue::Int(_) | CellValue::Float(_) | CellValue::Date(_) | CellValue::DateTime(_) => {
                match (self.as_f64(), self.as_datetime()) {
                    (Some(n), _) => Kind::Number(n),
                    (None, Some(dt)) => Kind::Time(dt),
                    (None, None) => Kind::Null,
                }
            }
            CellValue::Text(s) => match (self.numeric_hint(), parse_iso_datetime(s)) {
                (Some(n), _) => Kind::Number(n),
                (None, Some(dt)) => Kind::Time(dt),
                (None, None) => Kind::Text(s),
            },
        }
    }

    // Numbers stored as text (e.g. a filter literal against a numeric column
    // whose accessor returns a formatted string).
    fn numeric_hint(&self) -> Option<f64> {
        match self {
            CellValue::Int(_) | CellValue::Float(_) => self.as_f64(),
            CellValue::Text(s) => {
                let s = s.trim();
                let starts_numeric = s
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
                if starts_numeric {
                    s.parse::<f64>().ok()
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Sort class of a value. Text that reads as a number or an ISO date joins
/// that class, so every value lands in exactly one.
enum Kind<'a> {
    Null,
    Number(f64),
    Time(DateTime<Utc>),
    Bool(bool),
    Text(&'a str),
}

impl Kind<'_> {
    fn rank(&self) -> u8 {
        match self {
            Kind::Null => 0,
            Kind::Number(_) => 1,
            Kind::Time(_) => 2,
            Kind::Bool(_) => 3,
            Kind::Text(_) => 4,
        }
    }

    fn cmp_same(&self, other: &Kind<'_>) -> Ordering {
        match (self, other) {
            (Kind::Number(a), Kind::Number(b)) => a.total_cmp(b),
            (Kind::Time(a), Kind::Time(b)) => a.cmp(b),
            (Kind::Bool(a), Kind::Bool(b)) => a.cmp(b),
            (Kind::Text(a), Kind::Text(b)) => compare_text(a, b),
            _ => Ordering::Equal,
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` or RFC 3339 text.
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.len() < 10 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u64> for CellValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(i as f64))
    }
}

impl From<usize> for CellValue {
    fn from(i: usize) -> Self {
        CellValue::from(i as u64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::Text(s.clone())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(dt: DateTime<Utc>) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_numerically_across_int_and_float() {
        assert_eq!(
            CellValue::Int(9).compare(&CellValue::Float(10.5)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Float(100.0).compare(&CellValue::Int(100)),
            Ordering::Equal
        );
    }

    #[test]
    fn iso_date_strings_compare_chronologically() {
        let a = CellValue::from("2024-02-01");
        let b = CellValue::from("2024-11-30T08:00:00Z");
        assert_eq!(a.compare(&b), Ordering::Less);

        let date = CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(date.compare(&a), Ordering::Greater);
    }

    #[test]
    fn text_compares_case_insensitively() {
        assert_eq!(
            CellValue::from("alpha").compare(&CellValue::from("Beta")),
            Ordering::Less
        );
        assert_eq!(
            CellValue::from("Zoning").compare(&CellValue::from("parks")),
            Ordering::Greater
        );
    }

    #[test]
    fn null_sorts_lowest() {
        assert_eq!(CellValue::Null.compare(&CellValue::Int(-5)), Ordering::Less);
        assert_eq!(CellValue::from("a").compare(&CellValue::Null), Ordering::Greater);
        assert_eq!(CellValue::Null.compare(&CellValue::Null), Ordering::Equal);
    }

    #[test]
    fn incompatible_kinds_have_no_strict_ordering() {
        assert_eq!(CellValue::from("abc").try_compare(&CellValue::Int(5)), None);
        assert_eq!(CellValue::Bool(true).try_compare(&CellValue::Int(1)), None);
        assert_eq!(CellValue::Null.try_compare(&CellValue::Int(1)), None);
    }

    #[test]
    fn mixed_text_sorts_by_kind_then_value() {
        let values: Vec<CellValue> = ["30", "100", "2024-01-01", "alpha", "2023-06-30", "-", "7.5"]
            .into_iter()
            .map(CellValue::from)
            .collect();

        assert_eq!(CellValue::from("30").compare(&CellValue::from("100")), Ordering::Less);
        assert_eq!(
            CellValue::from("100").compare(&CellValue::from("2024-01-01")),
            Ordering::Less
        );
        assert_eq!(
            CellValue::from("2024-01-01").compare(&CellValue::from("30")),
            Ordering::Greater
        );

        for a in &values {
            for b in &values {
                assert_eq!(a.compare(b), b.compare(a).reverse(), "{a} vs {b}");
                for c in &values {
                    if a.compare(b) != Ordering::Greater && b.compare(c) != Ordering::Greater {
                        assert_ne!(a.compare(c), Ordering::Greater, "{a} <= {b} <= {c}");
                    }
                }
            }
        }

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.compare(b));
        let text: Vec<String> = sorted.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            text,
            ["7.5", "30", "100", "2023-06-30", "2024-01-01", "-", "alpha"]
        );
    }

    #[test]
    fn numeric_text_compares_with_numbers() {
        assert_eq!(
            CellValue::from("250").try_compare(&CellValue::Int(100)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn display_uses_placeholder_for_null() {
        assert_eq!(CellValue::Null.display(), PLACEHOLDER);
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(100.0).display(), "100");
        assert_eq!(CellValue::Float(12.5).display(), "12.5");
        assert_eq!(CellValue::Bool(false).display(), "false");
    }

    #[test]
    fn loosely_equals_ignores_text_case() {
        assert!(CellValue::from("Pending").loosely_equals(&CellValue::from("pending")));
        assert!(CellValue::Int(3).loosely_equals(&CellValue::Float(3.0)));
        assert!(!CellValue::from("3").loosely_equals(&CellValue::from("4")));
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<i64> = None;
        assert_eq!(CellValue::from(none), CellValue::Null);
        assert_eq!(CellValue::from(Some("x")), CellValue::Text("x".into()));
    }

    #[test]
    fn parse_iso_rejects_plain_text() {
        assert!(parse_iso_datetime("municipal park").is_none());
        assert!(parse_iso_datetime("2024").is_none());
        assert!(parse_iso_datetime("2024-06-15").is_some());
    }

    #[test]
    fn serde_round_trip_keeps_kind() {
        let json = serde_json::to_string(&CellValue::Int(7)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":7}"#);
        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CellValue::Int(7));
    }
}
