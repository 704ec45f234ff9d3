use std::ops::Range;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size.max(1))
    }

    /// Pull `page_index` back onto the last valid page.
    pub fn clamp(&mut self, total_rows: usize) {
        let last = self.total_pages(total_rows).saturating_sub(1);
        if self.page_index > last {
            self.page_index = last;
        }
    }

    /// A zero size is coerced to 1. Always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    pub fn page_range(&self, total_rows: usize) -> Range<usize> {
        let size = self.page_size.max(1);
        let start = self.page_index.saturating_mul(size).min(total_rows);
        let end = start.saturating_add(size).min(total_rows);
        start..end
    }

    pub fn info(&self, total_rows: usize) -> PageInfo {
        let total_pages = self.total_pages(total_rows);
        let range = self.page_range(total_rows);
        PageInfo {
            page_index: self.page_index,
            page_size: self.page_size,
            total_rows,
            total_pages,
            start: range.start,
            end: range.end,
            can_go_previous: self.page_index > 0,
            can_go_next: self.page_index + 1 < total_pages,
        }
    }
}

/// Derived paging metadata for toolbars and footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page_index: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl PageInfo {
    pub fn label(&self) -> String {
        if self.total_pages == 0 {
            return "Page 0/0".to_string();
        }
        format!("Page {}/{}", self.page_index + 1, self.total_pages)
    }
}
