//! Generic table-view engine.
//!
//! A [`TableView`] takes rows of any type plus a list of [`ColumnDef`]s and
//! derives everything a grid needs from them: filtering, sorting, paging,
//! selection, column visibility and delimited-text export. The derived row
//! set is a pure function of the current rows and state and is rebuilt from
//! scratch on every change.

pub mod aggregate;
pub mod column;
pub mod error;
pub mod export;
pub mod filter;
pub mod pagination;
pub mod selection;
pub mod sort;
pub mod value;
pub mod view;

pub use column::ColumnDef;
pub use error::{CellError, ExportError};
pub use export::{ExportFormat, ExportScope};
pub use filter::{CompareOp, FilterValue};
pub use pagination::{PageInfo, DEFAULT_PAGE_SIZE};
pub use sort::SortDirection;
pub use value::{CellValue, PLACEHOLDER};
pub use view::{TableView, ViewState, ViewSummary};
