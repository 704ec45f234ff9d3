pub mod column_selector;
pub mod data_view;
pub mod filter_bar;
pub mod help_popup;
pub mod status_bar;

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::table::{ExportError, ExportFormat, ExportScope, PageInfo, ViewSummary};

use column_selector::ColumnChoice;

/// Trait implemented by all TUI components.
pub trait Component {
    /// Handle a key event. Returns an Action if the component wants the app to do something.
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action>;

    /// Handle a message from a background task.
    fn handle_message(&mut self, msg: &AppMessage) -> Option<Action>;

    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool);

    /// Whether this component is currently in text input mode (captures all keys).
    fn is_input_mode(&self) -> bool {
        false
    }
}

/// A screen tab backed by a table view, independent of its row type.
pub trait GridPanel: Component {
    fn title(&self) -> &'static str;

    fn column_choices(&self) -> Vec<ColumnChoice>;

    /// Returns false if the column cannot be hidden.
    fn toggle_column(&mut self, id: &str) -> bool;

    fn global_filter(&self) -> &str;

    fn set_global_filter(&mut self, text: &str);

    /// Last column filter expression that was applied, if any.
    fn filter_expression(&self) -> Option<&str>;

    /// Replace all column filters with the clauses of `expr`. An empty
    /// expression clears them. Returns the number of filters applied.
    fn apply_column_filters(&mut self, expr: &str) -> Result<usize>;

    /// Drop the column filters and the search text.
    fn clear_filters(&mut self);

    /// Serialized rows plus how many data rows they hold.
    fn export(&self, format: ExportFormat, scope: ExportScope) -> Result<(Vec<u8>, usize), ExportError>;

    fn summary(&self) -> ViewSummary;

    fn page_info(&self) -> PageInfo;

    fn tally(&self) -> Vec<(String, usize)>;

    /// One-line page indicator drawn under the grid.
    fn render_pager(&self, frame: &mut Frame, area: Rect);
}
