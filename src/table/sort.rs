use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

/// At most one active sort column. `None` keeps the input row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub active: Option<SortKey>,
}

impl SortState {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            active: Some(SortKey {
                column_id: column_id.into(),
                direction,
            }),
        }
    }

    pub fn direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    /// Cycle `none → ascending → descending → none` for `column_id`.
    /// Moving to a different column starts over at ascending.
    pub fn toggle(&mut self, column_id: &str) {
        self.active = match self.direction_for(column_id) {
            None => Some(SortKey {
                column_id: column_id.to_string(),
                direction: SortDirection::Ascending,
            }),
            Some(SortDirection::Ascending) => Some(SortKey {
                column_id: column_id.to_string(),
                direction: SortDirection::Descending,
            }),
            Some(SortDirection::Descending) => None,
        };
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

/// Stable sort of `indices` (positions into `rows`) by one column.
///
/// Values are extracted once per row. Rows whose accessor fails order below
/// every real value; descending simply reverses the comparator, so ties keep
/// their original relative order in both directions.
pub fn sort_indices<T>(
    rows: &[T],
    indices: &mut Vec<usize>,
    column: &ColumnDef<T>,
    direction: SortDirection,
) {
    let mut keyed: Vec<(usize, Option<_>)> = indices
        .iter()
        .map(|&i| (i, column.value(&rows[i]).ok()))
        .collect();

    let failures = keyed.iter().filter(|(_, v)| v.is_none()).count();
    if failures > 0 {
        tracing::debug!(
            column = column.id(),
            failures,
            "accessor failed while sorting; rows ordered lowest"
        );
    }

    keyed.sort_by(|(_, a), (_, b)| {
        let ord = match (a, b) {
            (Some(a), Some(b)) => column.compare(a, b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        };
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    indices.clear();
    indices.extend(keyed.into_iter().map(|(i, _)| i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::error::CellError;

    struct Pledge {
        id: u32,
        amount: i64,
    }

    fn pledges() -> Vec<Pledge> {
        vec![
            Pledge { id: 1, amount: 100 },
            Pledge { id: 2, amount: 50 },
            Pledge { id: 3, amount: 100 },
        ]
    }

    fn amount_column() -> ColumnDef<Pledge> {
        ColumnDef::new("amount", "Amount").accessor(|p: &Pledge| p.amount)
    }

    fn sorted_ids(rows: &[Pledge], direction: SortDirection) -> Vec<u32> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        sort_indices(rows, &mut indices, &amount_column(), direction);
        indices.into_iter().map(|i| rows[i].id).collect()
    }

    #[test]
    fn toggle_cycles_through_three_states() {
        let mut state = SortState::default();
        state.toggle("amount");
        assert_eq!(state.direction_for("amount"), Some(SortDirection::Ascending));
        state.toggle("amount");
        assert_eq!(state.direction_for("amount"), Some(SortDirection::Descending));
        state.toggle("amount");
        assert_eq!(state, SortState::default());
    }

    #[test]
    fn toggling_another_column_replaces_the_active_one() {
        let mut state = SortState::new("amount", SortDirection::Descending);
        state.toggle("title");
        assert_eq!(state.direction_for("amount"), None);
        assert_eq!(state.direction_for("title"), Some(SortDirection::Ascending));
    }

    #[test]
    fn ascending_ties_keep_input_order() {
        assert_eq!(sorted_ids(&pledges(), SortDirection::Ascending), vec![2, 1, 3]);
    }

    #[test]
    fn descending_ties_keep_input_order() {
        assert_eq!(sorted_ids(&pledges(), SortDirection::Descending), vec![1, 3, 2]);
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let rows = pledges();
        let column = amount_column();
        let mut once: Vec<usize> = (0..rows.len()).collect();
        sort_indices(&rows, &mut once, &column, SortDirection::Ascending);
        let mut twice = once.clone();
        sort_indices(&rows, &mut twice, &column, SortDirection::Ascending);
        assert_eq!(once, twice);
    }

    #[test]
    fn failing_accessor_sorts_lowest() {
        let rows = pledges();
        let column = ColumnDef::new("amount", "Amount").try_accessor(|p: &Pledge| {
            if p.id == 3 {
                Err(CellError::Missing("amount".into()))
            } else {
                Ok(p.amount)
            }
        });
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        sort_indices(&rows, &mut indices, &column, SortDirection::Ascending);
        let ids: Vec<u32> = indices.iter().map(|&i| rows[i].id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
