use crate::loader::Dataset;
use crate::model::Commitment;
use crate::table::aggregate::count_by;
use crate::table::ColumnDef;

use super::{format_amount, format_date, Screen};

impl Screen for Commitment {
    type Key = u64;

    const TITLE: &'static str = "Commitments";
    const FILE_NAME: &'static str = "commitments.json";

    fn key(&self) -> u64 {
        self.id
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::new("id", "ID")
                .accessor(|c: &Commitment| c.id)
                .disable_hiding()
                .width(6),
            ColumnDef::new("project_id", "Project")
                .accessor(|c: &Commitment| c.project_id)
                .width(8),
            ColumnDef::new("funder", "Funder")
                .accessor(|c: &Commitment| c.funder.clone())
                .width(28),
            ColumnDef::new("amount", "Amount")
                .accessor(|c: &Commitment| c.amount)
                .cell(|c| format_amount(c.amount))
                .width(14),
            ColumnDef::new("status", "Status")
                .accessor(|c: &Commitment| c.status.as_str())
                .width(10),
            ColumnDef::new("committed", "Committed")
                .accessor(|c: &Commitment| c.committed_at)
                .cell(|c| format_date(&c.committed_at))
                .searchable(false)
                .width(11),
        ]
    }

    fn tally(rows: &[Self]) -> Vec<(String, usize)> {
        count_by(rows, |c| c.status)
            .into_iter()
            .map(|(status, n)| (status.to_string(), n))
            .collect()
    }

    fn rows_from(dataset: &Dataset) -> Vec<Self> {
        dataset.commitments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::commitment::CommitmentStatus;
    use crate::screens::build_view;
    use crate::table::{CompareOp, FilterValue};

    fn commitment(id: u64, funder: &str, amount: f64, status: CommitmentStatus) -> Commitment {
        Commitment {
            id,
            project_id: 10 + id,
            funder: funder.to_string(),
            amount,
            status,
            committed_at: "2024-06-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn filter_by_amount_and_status() {
        let mut view = build_view(
            vec![
                commitment(1, "Harbor Trust", 500.0, CommitmentStatus::Approved),
                commitment(2, "City Bank", 5000.0, CommitmentStatus::Approved),
                commitment(3, "Mill Fund", 7500.0, CommitmentStatus::Pending),
            ],
            10,
        );
        view.set_column_filter("amount", FilterValue::compare(CompareOp::Ge, 1000));
        view.set_column_filter("status", FilterValue::equals("approved"));
        let ids: Vec<u64> = view.filtered_rows().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn tally_counts_statuses() {
        let rows = vec![
            commitment(1, "a", 1.0, CommitmentStatus::Cancelled),
            commitment(2, "b", 1.0, CommitmentStatus::Cancelled),
        ];
        assert_eq!(Commitment::tally(&rows), vec![("cancelled".to_string(), 2)]);
    }
}
