use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::error::CellError;
use super::filter::FilterValue;
use super::sort::SortDirection;
use super::value::{CellValue, PLACEHOLDER};

pub type Accessor<T> = Arc<dyn Fn(&T) -> Result<CellValue, CellError> + Send + Sync>;
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
pub type FilterFn = Arc<dyn Fn(&CellValue, &FilterValue) -> bool + Send + Sync>;
pub type Comparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// Static description of one column: how to pull a value out of a row, how
/// to render it, and which view features it takes part in.
///
/// ```ignore
/// let amount = ColumnDef::new("amount", "Amount")
///     .accessor(|p: &Project| p.amount_requested)
///     .cell(|p| format!("${:.2}", p.amount_requested))
///     .width(12);
/// ```
pub struct ColumnDef<T> {
    id: String,
    header: String,
    accessor: Option<Accessor<T>>,
    cell: Option<CellRenderer<T>>,
    filter_fn: Option<FilterFn>,
    comparator: Option<Comparator>,
    sortable: bool,
    hideable: bool,
    filterable: bool,
    searchable: bool,
    width: Option<u16>,
}

impl<T> ColumnDef<T> {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: None,
            cell: None,
            filter_fn: None,
            comparator: None,
            sortable: true,
            hideable: true,
            filterable: true,
            searchable: true,
            width: None,
        }
    }

    pub fn accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(move |row: &T| Ok(f(row).into())));
        self
    }

    /// Accessor that may fail for individual rows.
    pub fn try_accessor<V, F>(mut self, f: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> Result<V, CellError> + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(move |row: &T| f(row).map(Into::into)));
        self
    }

    /// Custom display text. Sorting, filtering and export keep using the
    /// accessor value when there is one.
    pub fn cell<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(f));
        self
    }

    pub fn filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellValue, &FilterValue) -> bool + Send + Sync + 'static,
    {
        self.filter_fn = Some(Arc::new(f));
        self
    }

    pub fn comparator<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(f));
        self
    }

    pub fn disable_sorting(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn disable_hiding(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn disable_filter(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Header text with a sort indicator appended when the column is sorted.
    pub fn header_label(&self, direction: Option<SortDirection>) -> String {
        match direction {
            Some(dir) => format!("{} {}", self.header, dir.indicator()),
            None => self.header.clone(),
        }
    }

    pub fn width_hint(&self) -> Option<u16> {
        self.width
    }

    /// Sorting needs a value to compare, so columns without an accessor are
    /// never sortable.
    pub fn is_sortable(&self) -> bool {
        self.sortable && self.accessor.is_some()
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable && (self.accessor.is_some() || self.filter_fn.is_some())
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable && (self.accessor.is_some() || self.cell.is_some())
    }

    pub fn value(&self, row: &T) -> Result<CellValue, CellError> {
        match &self.accessor {
            Some(accessor) => accessor(row),
            None => Err(CellError::NoAccessor(self.id.clone())),
        }
    }

    /// Text shown in the grid: renderer, then accessor, then placeholder.
    pub fn display(&self, row: &T) -> String {
        if let Some(cell) = &self.cell {
            return cell(row);
        }
        self.value(row)
            .map(|v| v.display())
            .unwrap_or_else(|_| PLACEHOLDER.to_string())
    }

    /// Text used for export: accessor value, falling back to the renderer
    /// for display-only columns.
    pub fn export_text(&self, row: &T) -> String {
        match (&self.accessor, &self.cell) {
            (Some(_), _) => self
                .value(row)
                .map(|v| v.display())
                .unwrap_or_else(|_| PLACEHOLDER.to_string()),
            (None, Some(cell)) => cell(row),
            (None, None) => PLACEHOLDER.to_string(),
        }
    }

    /// Text the global filter looks at. `None` when nothing can be extracted.
    pub fn search_text(&self, row: &T) -> Option<String> {
        match self.value(row) {
            Ok(CellValue::Null) => None,
            Ok(value) => Some(value.to_string()),
            Err(_) => self.cell.as_ref().map(|cell| cell(row)),
        }
    }

    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        match &self.comparator {
            Some(cmp) => cmp(a, b),
            None => a.compare(b),
        }
    }

    /// Custom predicates see one clause at a time; `All` is unpacked here.
    pub fn matches(&self, value: &CellValue, filter: &FilterValue) -> bool {
        match (filter, &self.filter_fn) {
            (FilterValue::All { filters }, _) => filters.iter().all(|f| self.matches(value, f)),
            (_, Some(f)) => f(value, filter),
            (_, None) => filter.matches(value),
        }
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            cell: self.cell.clone(),
            filter_fn: self.filter_fn.clone(),
            comparator: self.comparator.clone(),
            sortable: self.sortable,
            hideable: self.hideable,
            filterable: self.filterable,
            searchable: self.searchable,
            width: self.width,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("has_accessor", &self.accessor.is_some())
            .field("has_cell", &self.cell.is_some())
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .field("filterable", &self.filterable)
            .field("searchable", &self.searchable)
            .finish()
    }
}
