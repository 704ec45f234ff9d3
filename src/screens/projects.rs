use crate::loader::Dataset;
use std::cmp::Ordering;

use crate::model::{Project, ProjectStatus};
use crate::table::aggregate::count_by;
use crate::table::{CellError, CellValue, ColumnDef};

use super::{format_amount, format_date, Screen};

impl Screen for Project {
    type Key = u64;

    const TITLE: &'static str = "Projects";
    const FILE_NAME: &'static str = "projects.json";

    fn key(&self) -> u64 {
        self.id
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::new("id", "ID")
                .accessor(|p: &Project| p.id)
                .disable_hiding()
                .width(6),
            ColumnDef::new("title", "Title")
                .accessor(|p: &Project| p.title.clone())
                .width(32),
            ColumnDef::new("organization", "Organization")
                .accessor(|p: &Project| p.organization.clone())
                .width(24),
            ColumnDef::new("municipality", "Municipality")
                .accessor(|p: &Project| p.municipality.clone())
                .width(16),
            ColumnDef::new("status", "Status")
                .accessor(|p: &Project| p.status.as_str())
                .comparator(by_lifecycle)
                .width(10),
            ColumnDef::new("requested", "Requested")
                .accessor(|p: &Project| p.amount_requested)
                .cell(|p| format_amount(p.amount_requested))
                .width(14),
            ColumnDef::new("committed", "Committed")
                .accessor(|p: &Project| p.amount_committed)
                .cell(|p| format_amount(p.amount_committed))
                .width(14),
            ColumnDef::new("progress", "Funded %")
                .try_accessor(|p: &Project| {
                    p.funding_progress()
                        .map(|ratio| (ratio * 1000.0).round() / 10.0)
                        .ok_or_else(|| CellError::Missing("no amount requested".into()))
                })
                .searchable(false)
                .width(9),
            ColumnDef::new("submitted", "Submitted")
                .accessor(|p: &Project| p.submitted_at)
                .cell(|p| format_date(&p.submitted_at))
                .searchable(false)
                .width(11),
        ]
    }

    fn tally(rows: &[Self]) -> Vec<(String, usize)> {
        count_by(rows, |p| p.status)
            .into_iter()
            .map(|(status, n)| (status.to_string(), n))
            .collect()
    }

    fn rows_from(dataset: &Dataset) -> Vec<Self> {
        dataset.projects.clone()
    }
}

fn lifecycle_rank(value: &CellValue) -> Option<usize> {
    let CellValue::Text(text) = value else {
        return None;
    };
    ProjectStatus::ALL
        .iter()
        .position(|status| status.as_str() == text.as_str())
}

/// Status sorts in review order rather than alphabetically.
fn by_lifecycle(a: &CellValue, b: &CellValue) -> Ordering {
    lifecycle_rank(a)
        .cmp(&lifecycle_rank(b))
        .then_with(|| a.compare(b))
}
