use std::collections::HashSet;
use std::hash::Hash;

/// Tri-state for a "select page" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    pub fn glyph(self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
        }
    }
}

/// Set of selected row identities. Independent of sorting, filtering and
/// paging; only cleared explicitly or pruned when ids stop existing.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    keys: HashSet<K>,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, key: &K) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.clone());
            true
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn set_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>, checked: bool)
    where
        K: 'a,
    {
        for key in keys {
            if checked {
                self.keys.insert(key.clone());
            } else {
                self.keys.remove(key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Drop ids for which `live` returns false.
    pub fn retain(&mut self, live: impl Fn(&K) -> bool) {
        self.keys.retain(|k| live(k));
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn check_state<'a>(&self, page: impl IntoIterator<Item = &'a K>) -> CheckState
    where
        K: 'a,
    {
        let (mut total, mut selected) = (0usize, 0usize);
        for key in page {
            total += 1;
            if self.keys.contains(key) {
                selected += 1;
            }
        }
        match selected {
            0 => CheckState::Unchecked,
            n if n == total => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }
}
