//! Small reusable tallies over row slices, so screens don't each re-derive
//! their status counts with ad hoc `filter().count()` chains.

use std::collections::BTreeMap;

pub fn count_where<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    predicate: impl Fn(&T) -> bool,
) -> usize {
    rows.into_iter().filter(|row| predicate(row)).count()
}

pub fn count_by<'a, T: 'a, K: Ord>(
    rows: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> K,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies() {
        let amounts = [5i64, 12, 40, 12];
        assert_eq!(count_where(&amounts, |a| *a > 10), 3);

        let by_size = count_by(&amounts, |a| if *a > 10 { "large" } else { "small" });
        assert_eq!(by_size.get("large"), Some(&3));
        assert_eq!(by_size.get("small"), Some(&1));
    }

    #[test]
    fn empty_input() {
        let none: [i64; 0] = [];
        assert_eq!(count_where(&none, |_| true), 0);
        assert!(count_by(&none, |a| *a).is_empty());
    }
}
