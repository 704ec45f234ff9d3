use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;
use super::error::ExportError;
use super::export::{self, ExportFormat, ExportScope};
use super::filter::{self, FilterState, FilterValue};
use super::pagination::{PageInfo, PaginationState};
use super::selection::{CheckState, Selection};
use super::sort::{self, SortDirection, SortState};
use super::value::PLACEHOLDER;

pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Serializable snapshot of user-adjustable view state, for callers that
/// want to persist preferences or sync them elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub sort: SortState,
    pub filters: FilterState,
    pub pagination: PaginationState,
    pub hidden_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSummary {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub page_rows: usize,
    pub selected: usize,
}

/// Owns rows, column descriptors and all view state, and keeps the derived
/// filtered+sorted row order in sync with them.
///
/// Every mutation rebuilds the derived order from the current rows and state
/// (filter, then sort, then clamp the page). Invalid requests such as sorting
/// an unsortable column are ignored.
pub struct TableView<T, K> {
    rows: Vec<T>,
    columns: Vec<ColumnDef<T>>,
    key_fn: KeyFn<T, K>,
    sort: SortState,
    filters: FilterState,
    pagination: PaginationState,
    visibility: HashMap<String, bool>,
    selection: Selection<K>,
    live_keys: HashSet<K>,
    derived: Vec<usize>,
}

impl<T, K> TableView<T, K>
where
    K: Clone + Eq + Hash,
{
    pub fn new<F>(columns: Vec<ColumnDef<T>>, key_fn: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let visibility = columns.iter().map(|c| (c.id().to_string(), true)).collect();
        Self {
            rows: Vec::new(),
            columns,
            key_fn: Arc::new(key_fn),
            sort: SortState::default(),
            filters: FilterState::default(),
            pagination: PaginationState::default(),
            visibility,
            selection: Selection::new(),
            live_keys: HashSet::new(),
            derived: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.set_rows(rows);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pagination.set_page_size(page_size);
        self.recompute();
        self
    }

    /// Apply a previously captured state. Sort keys and column filters that
    /// reference unknown or incapable columns are dropped.
    pub fn with_state(mut self, state: ViewState) -> Self {
        self.sort = state.sort;
        self.filters = state.filters;
        let columns = &self.columns;
        self.filters.columns.retain(|id, _| {
            columns
                .iter()
                .any(|c| c.id() == id.as_str() && c.is_filterable())
        });
        self.pagination = PaginationState {
            page_index: state.pagination.page_index,
            page_size: state.pagination.page_size.max(1),
        };
        for id in &state.hidden_columns {
            self.apply_visibility(id, false);
        }
        self.sanitize_sort();
        self.recompute();
        self
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            pagination: self.pagination,
            hidden_columns: self
                .columns
                .iter()
                .filter(|c| !self.is_column_visible(c.id()))
                .map(|c| c.id().to_string())
                .collect(),
        }
    }

    // --- rows ---

    /// Replace the row set. Derived state is rebuilt and selected ids that
    /// no longer exist are dropped.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.live_keys = self.rows.iter().map(|r| (self.key_fn)(r)).collect();
        let live = &self.live_keys;
        self.selection.retain(|k| live.contains(k));
        self.recompute();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn key_of(&self, row: &T) -> K {
        (self.key_fn)(row)
    }

    // --- columns ---

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef<T>> {
        self.columns.iter().find(|c| c.id() == id)
    }

    pub fn is_column_visible(&self, id: &str) -> bool {
        self.visibility.get(id).copied().unwrap_or(false)
    }

    /// Display text for one cell; unknown columns render the placeholder.
    pub fn render_cell(&self, row: &T, column_id: &str) -> String {
        self.column(column_id)
            .map(|c| c.display(row))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDef<T>> {
        self.columns
            .iter()
            .filter(|c| self.is_column_visible(c.id()))
            .collect()
    }

    /// Returns whether anything changed. Non-hideable columns stay visible.
    pub fn set_column_visible(&mut self, id: &str, visible: bool) -> bool {
        let changed = self.apply_visibility(id, visible);
        if changed {
            self.recompute();
        }
        changed
    }

    pub fn toggle_column_visibility(&mut self, id: &str) -> bool {
        let visible = self.is_column_visible(id);
        self.set_column_visible(id, !visible)
    }

    fn apply_visibility(&mut self, id: &str, visible: bool) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.id() == id) else {
            return false;
        };
        if !visible && !column.is_hideable() {
            return false;
        }
        let entry = self.visibility.entry(id.to_string()).or_insert(true);
        let changed = *entry != visible;
        *entry = visible;
        changed
    }

    // --- sorting ---

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn toggle_sort(&mut self, column_id: &str) {
        if !self.column(column_id).is_some_and(|c| c.is_sortable()) {
            return;
        }
        self.sort.toggle(column_id);
        self.recompute();
    }

    pub fn set_sort(&mut self, column_id: &str, direction: SortDirection) {
        if !self.column(column_id).is_some_and(|c| c.is_sortable()) {
            return;
        }
        self.sort = SortState::new(column_id, direction);
        self.recompute();
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
        self.recompute();
    }

    fn sanitize_sort(&mut self) {
        let valid = self
            .sort
            .active
            .as_ref()
            .is_none_or(|k| self.column(&k.column_id).is_some_and(|c| c.is_sortable()));
        if !valid {
            self.sort.clear();
        }
    }

    // --- filtering ---

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn global_filter(&self) -> &str {
        &self.filters.global
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.filters.global = text.into();
        self.recompute();
    }

    /// Filters on unknown or non-filterable columns are ignored.
    pub fn set_column_filter(&mut self, column_id: &str, value: FilterValue) {
        if !self.column(column_id).is_some_and(|c| c.is_filterable()) {
            return;
        }
        self.filters.columns.insert(column_id.to_string(), value);
        self.recompute();
    }

    pub fn clear_column_filter(&mut self, column_id: &str) {
        if self.filters.columns.remove(column_id).is_some() {
            self.recompute();
        }
    }

    pub fn clear_column_filters(&mut self) {
        self.filters.columns.clear();
        self.recompute();
    }

    /// Drop every column filter and the global search.
    pub fn clear_filters(&mut self) {
        self.filters.columns.clear();
        self.filters.global.clear();
        self.recompute();
    }

    // --- pagination ---

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn page_info(&self) -> PageInfo {
        self.pagination.info(self.derived.len())
    }

    pub fn set_page_index(&mut self, page_index: usize) {
        self.pagination.page_index = page_index;
        self.pagination.clamp(self.derived.len());
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.set_page_size(page_size);
    }

    pub fn next_page(&mut self) {
        if self.page_info().can_go_next {
            self.pagination.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.pagination.page_index = self.pagination.page_index.saturating_sub(1);
    }

    pub fn first_page(&mut self) {
        self.pagination.page_index = 0;
    }

    pub fn last_page(&mut self) {
        self.pagination.page_index = self.page_info().total_pages.saturating_sub(1);
    }

    // --- derived rows ---

    pub fn filtered_rows(&self) -> Vec<&T> {
        self.derived.iter().map(|&i| &self.rows[i]).collect()
    }

    pub fn page_rows(&self) -> Vec<&T> {
        let range = self.pagination.page_range(self.derived.len());
        self.derived[range].iter().map(|&i| &self.rows[i]).collect()
    }

    pub fn page_keys(&self) -> Vec<K> {
        self.page_rows().into_iter().map(|r| self.key_of(r)).collect()
    }

    pub fn summary(&self) -> ViewSummary {
        let range = self.pagination.page_range(self.derived.len());
        ViewSummary {
            total_rows: self.rows.len(),
            filtered_rows: self.derived.len(),
            page_rows: range.len(),
            selected: self.selected_count(),
        }
    }

    // --- selection ---

    pub fn toggle_row(&mut self, key: &K) {
        if self.live_keys.contains(key) {
            self.selection.toggle(key);
        }
    }

    pub fn toggle_all_on_page(&mut self, checked: bool) {
        let keys = self.page_keys();
        self.selection.set_all(&keys, checked);
    }

    pub fn select_all_filtered(&mut self) {
        let keys: Vec<K> = self
            .filtered_rows()
            .into_iter()
            .map(|r| self.key_of(r))
            .collect();
        self.selection.set_all(&keys, true);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.live_keys.contains(key) && self.selection.contains(key)
    }

    pub fn page_check_state(&self) -> CheckState {
        self.selection.check_state(&self.page_keys())
    }

    pub fn is_all_on_page_selected(&self) -> bool {
        self.page_check_state() == CheckState::Checked
    }

    pub fn is_some_on_page_selected(&self) -> bool {
        self.page_check_state() == CheckState::Indeterminate
    }

    /// Selected ids in row order.
    pub fn selected_keys(&self) -> Vec<K> {
        self.rows
            .iter()
            .map(|r| self.key_of(r))
            .filter(|k| self.selection.contains(k))
            .collect()
    }

    pub fn selected_rows(&self) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|r| self.selection.contains(&self.key_of(r)))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.selected_keys().len()
    }

    // --- export ---

    pub fn export(&self, format: ExportFormat, scope: ExportScope) -> Result<Vec<u8>, ExportError> {
        let rows = match scope {
            ExportScope::CurrentPage => self.page_rows(),
            ExportScope::AllFiltered => self.filtered_rows(),
        };
        export::write_delimited(rows, &self.visible_columns(), format)
    }

    fn recompute(&mut self) {
        let visibility = &self.visibility;
        let mut indices = filter::filter_indices(&self.rows, &self.columns, &self.filters, |c| {
            c.is_searchable() && visibility.get(c.id()).copied().unwrap_or(false)
        });

        if let Some(key) = &self.sort.active {
            if let Some(column) = self.columns.iter().find(|c| c.id() == key.column_id) {
                sort::sort_indices(&self.rows, &mut indices, column, key.direction);
            }
        }

        self.pagination.clamp(indices.len());
        tracing::trace!(
            total = self.rows.len(),
            filtered = indices.len(),
            page = self.pagination.page_index,
            "table view recomputed"
        );
        self.derived = indices;
    }
}
