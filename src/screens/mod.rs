//! Column layouts for each admin screen.

pub mod commitments;
pub mod organizations;
pub mod projects;
pub mod questions;

use std::collections::BTreeMap;
use std::hash::Hash;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::loader::Dataset;
use crate::model::filter::parse_filter;
use crate::table::{CellValue, ColumnDef, FilterValue, TableView};

/// A row type that can be shown as one admin screen.
pub trait Screen: Clone + Send + Sync + DeserializeOwned + 'static {
    type Key: Clone + Eq + Hash + Send + Sync + 'static;

    const TITLE: &'static str;
    /// File name inside the data directory.
    const FILE_NAME: &'static str;

    fn key(&self) -> Self::Key;

    fn columns() -> Vec<ColumnDef<Self>>;

    /// Status counts shown in the status bar, over all loaded rows.
    fn tally(rows: &[Self]) -> Vec<(String, usize)>;

    fn rows_from(dataset: &Dataset) -> Vec<Self>;
}

pub fn build_view<S: Screen>(rows: Vec<S>, page_size: usize) -> TableView<S, S::Key> {
    TableView::new(S::columns(), S::key)
        .with_page_size(page_size)
        .with_rows(rows)
}

/// Replace the view's column filters with the clauses of `expr`.
///
/// Every clause is checked against the screen's columns before anything is
/// applied, so a bad expression leaves the current filters untouched.
/// Clauses on the same column are combined with AND. Returns the number of
/// filtered columns.
pub fn apply_filter_expression<S: Screen>(
    view: &mut TableView<S, S::Key>,
    expr: &str,
) -> Result<usize> {
    let filters = parse_filter(expr)?;
    for f in &filters {
        match view.column(&f.column) {
            None => bail!("unknown column '{}' on {}", f.column, S::TITLE),
            Some(col) if !col.is_filterable() => {
                bail!("column '{}' cannot be filtered", f.column)
            }
            Some(_) => {}
        }
    }

    let mut by_column: BTreeMap<String, FilterValue> = BTreeMap::new();
    for f in filters {
        let merged = match by_column.remove(&f.column) {
            Some(existing) => existing.and(f.value),
            None => f.value,
        };
        by_column.insert(f.column, merged);
    }

    view.clear_column_filters();
    for (column, value) in by_column {
        view.set_column_filter(&column, value);
    }
    Ok(view.filters().columns.len())
}

/// Predicate for a boolean column displayed as two labels, so a clause may
/// name either `false` or the label shown in the grid.
pub fn labelled_bool(
    yes: &'static str,
    no: &'static str,
) -> impl Fn(&CellValue, &FilterValue) -> bool + Send + Sync + 'static {
    move |value, filter| {
        let label = match value {
            CellValue::Bool(true) => yes,
            CellValue::Bool(false) => no,
            _ => return filter.matches(value),
        };
        filter.matches(value) || filter.matches(&CellValue::from(label))
    }
}

/// `1234567.5` → `$1,234,567.50`.
pub fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, ProjectStatus};

    fn projects(n: u64) -> Vec<Project> {
        (1..=n)
            .map(|id| Project {
                id,
                title: format!("Project {id}"),
                organization: "Town of Elm".to_string(),
                municipality: None,
                status: ProjectStatus::Pending,
                amount_requested: 100.0 * id as f64,
                amount_committed: 0.0,
                submitted_at: "2024-03-01T09:00:00Z".parse().unwrap(),
            })
            .collect()
    }

    fn ids(view: &TableView<Project, u64>) -> Vec<u64> {
        view.filtered_rows().iter().map(|p| p.id).collect()
    }

    #[test]
    fn clauses_on_one_column_all_apply() {
        let mut view = build_view(projects(10), 10);
        let columns = apply_filter_expression(&mut view, "requested > 300 AND requested < 600").unwrap();
        assert_eq!(columns, 1);
        assert_eq!(ids(&view), vec![4, 5]);

        apply_filter_expression(&mut view, "requested >= 200 AND id != 3 AND requested <= 400").unwrap();
        assert_eq!(ids(&view), vec![2, 4]);
    }

    #[test]
    fn rejected_expression_keeps_previous_filters() {
        let mut view = build_view(projects(10), 10);
        apply_filter_expression(&mut view, "requested > 800").unwrap();
        assert!(apply_filter_expression(&mut view, "requested > 1 AND budget < 5").is_err());
        assert_eq!(ids(&view), vec![9, 10]);
    }

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(999.999), "$1,000.00");
        assert_eq!(format_amount(1234567.5), "$1,234,567.50");
        assert_eq!(format_amount(-42.1), "-$42.10");
    }

    #[test]
    fn dates_are_iso() {
        let ts: DateTime<Utc> = "2024-05-01T23:59:00Z".parse().unwrap();
        assert_eq!(format_date(&ts), "2024-05-01");
    }
}
