use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;
use super::value::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Ne,
}

/// A per-column filter value. Interpreted by the column's own predicate when
/// it has one, otherwise by [`FilterValue::matches`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValue {
    /// Case-insensitive substring match on the stringified value.
    Contains { text: String },
    Equals { value: CellValue },
    Compare { op: CompareOp, value: CellValue },
    /// Inclusive range; a missing bound is unbounded.
    Range {
        min: Option<CellValue>,
        max: Option<CellValue>,
    },
    OneOf { values: Vec<CellValue> },
    IsNull,
    NotNull,
    /// Every inner filter must pass. Built by [`FilterValue::and`] when one
    /// column carries several clauses.
    All { filters: Vec<FilterValue> },
}

impl FilterValue {
    pub fn contains(text: impl Into<String>) -> Self {
        FilterValue::Contains { text: text.into() }
    }

    pub fn equals(value: impl Into<CellValue>) -> Self {
        FilterValue::Equals {
            value: value.into(),
        }
    }

    pub fn compare(op: CompareOp, value: impl Into<CellValue>) -> Self {
        FilterValue::Compare {
            op,
            value: value.into(),
        }
    }

    pub fn range(min: Option<CellValue>, max: Option<CellValue>) -> Self {
        FilterValue::Range { min, max }
    }

    pub fn one_of<V: Into<CellValue>>(values: impl IntoIterator<Item = V>) -> Self {
        FilterValue::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of two filters on the same column, flattening nested `All`s.
    pub fn and(self, other: FilterValue) -> Self {
        let mut filters = match self {
            FilterValue::All { filters } => filters,
            single => vec![single],
        };
        match other {
            FilterValue::All { filters: more } => filters.extend(more),
            single => filters.push(single),
        }
        FilterValue::All { filters }
    }

    /// Empty filters impose no constraint and are skipped entirely.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Contains { text } => text.trim().is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
            FilterValue::OneOf { values } => values.is_empty(),
            FilterValue::All { filters } => filters.iter().all(FilterValue::is_empty),
            _ => false,
        }
    }

    /// Default predicate. Values whose kind cannot be compared with the
    /// filter operand fail the filter.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            FilterValue::Contains { text } => {
                let needle = text.trim().to_lowercase();
                value.to_string().to_lowercase().contains(&needle)
            }
            FilterValue::Equals { value: target } => value.loosely_equals(target),
            FilterValue::Compare { op, value: target } => {
                let Some(ord) = value.try_compare(target) else {
                    return false;
                };
                match op {
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::Ge => ord != Ordering::Less,
                    CompareOp::Lt => ord == Ordering::Less,
                    CompareOp::Le => ord != Ordering::Greater,
                    CompareOp::Ne => ord != Ordering::Equal,
                }
            }
            FilterValue::Range { min, max } => {
                let above_min = min
                    .as_ref()
                    .is_none_or(|m| matches!(value.try_compare(m), Some(o) if o != Ordering::Less));
                let below_max = max.as_ref().is_none_or(
                    |m| matches!(value.try_compare(m), Some(o) if o != Ordering::Greater),
                );
                above_min && below_max
            }
            FilterValue::OneOf { values } => values.iter().any(|v| value.loosely_equals(v)),
            FilterValue::IsNull => value.is_null(),
            FilterValue::NotNull => !value.is_null(),
            FilterValue::All { filters } => filters.iter().all(|f| f.matches(value)),
        }
    }
}

/// Per-column filters plus the single free-text global filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub columns: BTreeMap<String, FilterValue>,
    pub global: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.global.trim().is_empty() || self.columns.values().any(|f| !f.is_empty())
    }
}

/// Indices of rows that pass every active column filter and, when the global
/// filter is non-empty, contain it in at least one searchable column.
///
/// `searchable` decides which columns take part in the global match; the
/// view passes visible searchable columns.
pub fn filter_indices<T>(
    rows: &[T],
    columns: &[ColumnDef<T>],
    state: &FilterState,
    searchable: impl Fn(&ColumnDef<T>) -> bool,
) -> Vec<usize> {
    let active: Vec<(&ColumnDef<T>, &FilterValue)> = state
        .columns
        .iter()
        .filter(|(_, f)| !f.is_empty())
        .filter_map(|(id, f)| {
            columns
                .iter()
                .find(|c| c.id() == id && c.is_filterable())
                .map(|c| (c, f))
        })
        .collect();

    let needle = state.global.trim().to_lowercase();
    let search_columns: Vec<&ColumnDef<T>> = if needle.is_empty() {
        Vec::new()
    } else {
        columns.iter().filter(|c| searchable(c)).collect()
    };

    let mut failures = 0usize;
    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let passes_columns = active.iter().all(|(column, filter)| match column.value(row) {
                Ok(value) => column.matches(&value, filter),
                Err(_) => {
                    failures += 1;
                    false
                }
            });
            if !passes_columns {
                return false;
            }
            if needle.is_empty() {
                return true;
            }
            search_columns.iter().any(|column| {
                column
                    .search_text(row)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .map(|(i, _)| i)
        .collect();

    if failures > 0 {
        tracing::debug!(failures, "rows excluded by failing column accessors");
    }
    kept
}
