use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::screens::{apply_filter_expression, build_view, Screen};
use crate::table::{
    ColumnDef, ExportError, ExportFormat, ExportScope, PageInfo, TableView, ViewSummary,
    PLACEHOLDER,
};
use crate::ui::theme::Theme;

use super::column_selector::ColumnChoice;
use super::{Component, GridPanel};

const DEFAULT_MAX_VISIBLE_COLS: usize = 8;
const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 40;
const CHECKBOX_WIDTH: u16 = 4;
const COLUMN_PADDING: u16 = 1;
const PAGE_SIZE_STEPS: [usize; 6] = [5, 10, 20, 25, 50, 100];

/// Paged grid over one screen's rows.
pub struct DataView<S: Screen> {
    view: TableView<S, S::Key>,
    table_state: TableState,
    /// Index into the visible columns.
    col_cursor: usize,
    h_scroll: usize,
    max_visible_cols: usize,
    filter_expression: Option<String>,
    loaded: bool,
}

impl<S: Screen> DataView<S> {
    pub fn new(page_size: usize) -> Self {
        Self {
            view: build_view(Vec::new(), page_size),
            table_state: TableState::default(),
            col_cursor: 0,
            h_scroll: 0,
            max_visible_cols: DEFAULT_MAX_VISIBLE_COLS,
            filter_expression: None,
            loaded: false,
        }
    }

    pub fn cursor_column(&self) -> Option<String> {
        self.view
            .visible_columns()
            .get(self.col_cursor)
            .map(|c| c.id().to_string())
    }

    /// Keep the row cursor on the current page and the column cursor on a
    /// visible column.
    fn sync_cursor(&mut self) {
        let page_rows = self.view.summary().page_rows;
        if page_rows == 0 {
            self.table_state.select(None);
        } else {
            let row = self.table_state.selected().unwrap_or(0).min(page_rows - 1);
            self.table_state.select(Some(row));
        }

        let visible = self.view.visible_columns().len();
        self.col_cursor = self.col_cursor.min(visible.saturating_sub(1));
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        if self.col_cursor < self.h_scroll {
            self.h_scroll = self.col_cursor;
        } else if self.col_cursor >= self.h_scroll + self.max_visible_cols {
            self.h_scroll = self.col_cursor + 1 - self.max_visible_cols;
        }
    }

    fn page_changed(&mut self) {
        self.table_state.select(Some(0));
        self.sync_cursor();
    }

    fn move_up(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        if i > 0 {
            self.table_state.select(Some(i - 1));
        }
    }

    fn move_down(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        if i + 1 < self.view.summary().page_rows {
            self.table_state.select(Some(i + 1));
        }
    }

    fn move_left(&mut self) {
        if self.col_cursor > 0 {
            self.col_cursor -= 1;
            self.scroll_to_cursor();
        }
    }

    fn move_right(&mut self) {
        if self.col_cursor + 1 < self.view.visible_columns().len() {
            self.col_cursor += 1;
            self.scroll_to_cursor();
        }
    }

    fn toggle_sort_at_cursor(&mut self) -> Option<Action> {
        let id = self.cursor_column()?;
        if !self.view.column(&id).is_some_and(|c| c.is_sortable()) {
            return None;
        }
        self.view.toggle_sort(&id);
        self.sync_cursor();
        let direction = self.view.sort().direction_for(&id);
        Some(Action::SortChanged(id, direction))
    }

    fn step_page_size(&mut self, larger: bool) {
        let current = self.view.pagination().page_size;
        let next = if larger {
            PAGE_SIZE_STEPS.iter().copied().find(|s| *s > current)
        } else {
            PAGE_SIZE_STEPS.iter().rev().copied().find(|s| *s < current)
        };
        if let Some(size) = next {
            self.view.set_page_size(size);
            self.page_changed();
        }
    }

    fn toggle_cursor_row(&mut self) {
        let Some(i) = self.table_state.selected() else {
            return;
        };
        if let Some(key) = self.view.page_keys().get(i) {
            self.view.toggle_row(key);
        }
    }

    fn toggle_page(&mut self) {
        let checked = !self.view.is_all_on_page_selected();
        self.view.toggle_all_on_page(checked);
    }

    fn column_widths(&self, columns: &[&ColumnDef<S>], rows: &[&S]) -> Vec<u16> {
        columns
            .iter()
            .map(|col| {
                if let Some(w) = col.width_hint() {
                    return w;
                }
                let header_width = col.header().chars().count() + 2;
                let data_width = rows
                    .iter()
                    .map(|r| col.display(r).chars().count())
                    .max()
                    .unwrap_or(0);
                header_width
                    .max(data_width)
                    .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as u16
            })
            .collect()
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, block: Block) {
        let message = if !self.loaded {
            "Loading..."
        } else if self.view.rows().is_empty() {
            "No rows in this data file. Press 'r' to reload."
        } else {
            "No rows match the current search and filters. Press 'F' to clear filters."
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
    }
}

impl<S: Screen> Component for DataView<S> {
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_left();
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_right();
                None
            }
            KeyCode::Char('s') => self.toggle_sort_at_cursor(),
            KeyCode::PageDown | KeyCode::Char(']') => {
                self.view.next_page();
                self.page_changed();
                None
            }
            KeyCode::PageUp | KeyCode::Char('[') => {
                self.view.previous_page();
                self.page_changed();
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.view.first_page();
                self.page_changed();
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.view.last_page();
                self.page_changed();
                None
            }
            KeyCode::Char('+') => {
                self.step_page_size(true);
                None
            }
            KeyCode::Char('-') => {
                self.step_page_size(false);
                None
            }
            KeyCode::Char(' ') => {
                self.toggle_cursor_row();
                None
            }
            KeyCode::Char('a') => {
                self.toggle_page();
                None
            }
            KeyCode::Char('A') => {
                self.view.select_all_filtered();
                None
            }
            KeyCode::Char('u') => {
                self.view.clear_selection();
                None
            }
            KeyCode::Char('/') => Some(Action::FocusSearch),
            KeyCode::Char('f') => Some(Action::FocusFilter),
            KeyCode::Char('F') => Some(Action::ClearFilters),
            KeyCode::Char('c') => Some(Action::ToggleColumnSelector),
            KeyCode::Char('x') => Some(Action::Export(ExportScope::AllFiltered)),
            KeyCode::Char('X') => Some(Action::Export(ExportScope::CurrentPage)),
            _ => None,
        }
    }

    fn handle_message(&mut self, msg: &AppMessage) -> Option<Action> {
        match msg {
            AppMessage::DatasetReady(dataset) => {
                self.view.set_rows(S::rows_from(dataset));
                self.loaded = true;
                self.sync_cursor();
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let summary = self.view.summary();
        let title = if summary.filtered_rows == summary.total_rows {
            format!(" {} ({} rows) ", S::TITLE, summary.total_rows)
        } else {
            format!(
                " {} ({} of {} rows) ",
                S::TITLE,
                summary.filtered_rows,
                summary.total_rows
            )
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Theme::border(focused));

        let page_rows = self.view.page_rows();
        if page_rows.is_empty() {
            self.render_empty(frame, area, block);
            return;
        }

        let visible = self.view.visible_columns();
        let end_col = (self.h_scroll + self.max_visible_cols).min(visible.len());
        let shown = &visible[self.h_scroll.min(end_col)..end_col];
        let widths = self.column_widths(shown, &page_rows);

        let mut header_cells =
            vec![Cell::from(self.view.page_check_state().glyph()).style(Theme::header(false))];
        for (offset, col) in shown.iter().enumerate() {
            let style = Theme::header(self.h_scroll + offset == self.col_cursor);
            let label = col.header_label(self.view.sort().direction_for(col.id()));
            header_cells.push(Cell::from(label).style(style));
        }
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = page_rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let checked = self.view.is_selected(&self.view.key_of(row));
                let style = Theme::row(i, checked);
                let glyph = if checked { "[x]" } else { "[ ]" };

                let mut cells = vec![Cell::from(glyph).style(style)];
                for col in shown {
                    let text = col.display(row);
                    let cell_style = if text == PLACEHOLDER {
                        Theme::placeholder()
                    } else {
                        style
                    };
                    cells.push(Cell::from(text).style(cell_style));
                }
                Row::new(cells).height(1)
            })
            .collect();

        let mut constraints = vec![Constraint::Length(CHECKBOX_WIDTH)];
        for w in &widths {
            constraints.push(Constraint::Length(*w + COLUMN_PADDING));
        }

        let table = Table::new(rows, &constraints)
            .header(header)
            .block(block)
            .row_highlight_style(Theme::cursor());

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

impl<S: Screen> GridPanel for DataView<S> {
    fn title(&self) -> &'static str {
        S::TITLE
    }

    fn column_choices(&self) -> Vec<ColumnChoice> {
        self.view
            .columns()
            .iter()
            .map(|c| ColumnChoice {
                id: c.id().to_string(),
                header: c.header().to_string(),
                visible: self.view.is_column_visible(c.id()),
                hideable: c.is_hideable(),
            })
            .collect()
    }

    fn toggle_column(&mut self, id: &str) -> bool {
        let changed = self.view.toggle_column_visibility(id);
        self.sync_cursor();
        changed
    }

    fn global_filter(&self) -> &str {
        self.view.global_filter()
    }

    fn set_global_filter(&mut self, text: &str) {
        self.view.set_global_filter(text.trim());
        self.sync_cursor();
    }

    fn filter_expression(&self) -> Option<&str> {
        self.filter_expression.as_deref()
    }

    fn apply_column_filters(&mut self, expr: &str) -> Result<usize> {
        let expr = expr.trim();
        if expr.is_empty() {
            self.view.clear_column_filters();
            self.filter_expression = None;
            self.sync_cursor();
            return Ok(0);
        }

        let count = apply_filter_expression(&mut self.view, expr)?;
        self.filter_expression = Some(expr.to_string());
        self.sync_cursor();
        tracing::debug!(
            screen = S::TITLE,
            expr,
            matched = self.view.summary().filtered_rows,
            "column filters applied"
        );
        Ok(count)
    }

    fn clear_filters(&mut self) {
        self.view.clear_filters();
        self.filter_expression = None;
        self.sync_cursor();
    }

    fn export(
        &self,
        format: ExportFormat,
        scope: ExportScope,
    ) -> Result<(Vec<u8>, usize), ExportError> {
        let summary = self.view.summary();
        let rows = match scope {
            ExportScope::CurrentPage => summary.page_rows,
            ExportScope::AllFiltered => summary.filtered_rows,
        };
        Ok((self.view.export(format, scope)?, rows))
    }

    fn summary(&self) -> ViewSummary {
        self.view.summary()
    }

    fn page_info(&self) -> PageInfo {
        self.view.page_info()
    }

    fn tally(&self) -> Vec<(String, usize)> {
        S::tally(self.view.rows())
    }

    fn render_pager(&self, frame: &mut Frame, area: Rect) {
        let info = self.view.page_info();
        let summary = self.view.summary();
        let arrow = |enabled: bool, glyph: &'static str| {
            Span::styled(glyph, if enabled { Theme::label() } else { Theme::filter(false) })
        };
        let range = if info.total_rows == 0 {
            "no rows".to_string()
        } else {
            format!("rows {}-{} of {}", info.start + 1, info.end, info.total_rows)
        };
        let mut spans = vec![
            Span::raw(" "),
            arrow(info.can_go_previous, "◀ "),
            Span::styled(info.label(), Theme::value()),
            arrow(info.can_go_next, " ▶"),
            Span::styled(
                format!("  {}  size {}", range, info.page_size),
                Theme::hint(),
            ),
            Span::styled(
                format!("  {} selected", summary.selected),
                Theme::selection_count(summary.selected),
            ),
        ];
        if self.view.filters().is_active() {
            spans.push(Span::styled("  [filtered]", Theme::filter(true)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;
    use crate::model::{Project, ProjectStatus};
    use crate::table::SortDirection;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn project(id: u64, title: &str, requested: f64, status: ProjectStatus) -> Project {
        Project {
            id,
            title: title.to_string(),
            organization: "Town of Elm".to_string(),
            municipality: None,
            status,
            amount_requested: requested,
            amount_committed: 0.0,
            submitted_at: "2024-03-01T09:00:00Z".parse().unwrap(),
        }
    }

    fn loaded(count: u64, page_size: usize) -> DataView<Project> {
        let mut dv = DataView::<Project>::new(page_size);
        let dataset = Dataset {
            projects: (1..=count)
                .map(|i| project(i, &format!("Project {i}"), i as f64 * 100.0, ProjectStatus::Pending))
                .collect(),
            ..Dataset::default()
        };
        dv.handle_message(&AppMessage::DatasetReady(Box::new(dataset)));
        dv
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn dataset_ready_loads_rows_and_selects_first() {
        let dv = loaded(3, 10);
        assert_eq!(dv.summary().total_rows, 3);
        assert_eq!(dv.table_state.selected(), Some(0));
        assert!(dv.loaded);
    }

    #[test]
    fn row_cursor_stays_on_page() {
        let mut dv = loaded(3, 2);
        dv.handle_key(key('j'));
        dv.handle_key(key('j'));
        assert_eq!(dv.table_state.selected(), Some(1));
        dv.handle_key(key(']'));
        assert_eq!(dv.page_info().page_index, 1);
        assert_eq!(dv.table_state.selected(), Some(0));
        dv.handle_key(key('k'));
        assert_eq!(dv.table_state.selected(), Some(0));
    }

    #[test]
    fn sort_key_cycles_cursor_column() {
        let mut dv = loaded(3, 10);
        dv.handle_key(key('l')); // title
        dv.handle_key(key('l')); // organization
        dv.handle_key(key('l')); // municipality
        dv.handle_key(key('l')); // status
        dv.handle_key(key('l')); // requested
        assert_eq!(dv.cursor_column().as_deref(), Some("requested"));

        let action = dv.handle_key(key('s'));
        assert_eq!(
            action,
            Some(Action::SortChanged(
                "requested".into(),
                Some(SortDirection::Ascending)
            ))
        );
        let action = dv.handle_key(key('s'));
        assert_eq!(
            action,
            Some(Action::SortChanged(
                "requested".into(),
                Some(SortDirection::Descending)
            ))
        );
        assert_eq!(dv.view.page_rows()[0].id, 3);
        let action = dv.handle_key(key('s'));
        assert_eq!(action, Some(Action::SortChanged("requested".into(), None)));
        assert_eq!(dv.view.page_rows()[0].id, 1);
    }

    #[test]
    fn selection_keys() {
        let mut dv = loaded(5, 2);
        dv.handle_key(key(' '));
        assert_eq!(dv.summary().selected, 1);
        dv.handle_key(key('a'));
        assert!(dv.view.is_all_on_page_selected());
        dv.handle_key(key('a'));
        assert_eq!(dv.summary().selected, 0);
        dv.handle_key(key('A'));
        assert_eq!(dv.summary().selected, 5);
        dv.handle_key(key('u'));
        assert_eq!(dv.summary().selected, 0);
    }

    #[test]
    fn page_size_steps() {
        let mut dv = loaded(30, 10);
        dv.handle_key(key('+'));
        assert_eq!(dv.page_info().page_size, 20);
        dv.handle_key(key('-'));
        dv.handle_key(key('-'));
        assert_eq!(dv.page_info().page_size, 5);
        dv.handle_key(key('-'));
        assert_eq!(dv.page_info().page_size, 5);
    }

    #[test]
    fn apply_column_filters_replaces_previous() {
        let mut dv = loaded(5, 10);
        assert_eq!(dv.apply_column_filters("requested >= 300").unwrap(), 1);
        assert_eq!(dv.summary().filtered_rows, 3);
        assert_eq!(dv.filter_expression(), Some("requested >= 300"));

        dv.apply_column_filters("id = 1").unwrap();
        assert_eq!(dv.summary().filtered_rows, 1);

        dv.apply_column_filters("").unwrap();
        assert_eq!(dv.summary().filtered_rows, 5);
        assert!(dv.filter_expression().is_none());
    }

    #[test]
    fn apply_column_filters_rejects_unknown_column() {
        let mut dv = loaded(2, 10);
        dv.apply_column_filters("id = 1").unwrap();
        let err = dv.apply_column_filters("budget > 5").unwrap_err();
        assert!(err.to_string().contains("budget"));
        // Previous filters are untouched.
        assert_eq!(dv.summary().filtered_rows, 1);
    }

    #[test]
    fn hiding_cursor_column_keeps_cursor_valid() {
        let mut dv = loaded(2, 10);
        for _ in 0..20 {
            dv.handle_key(key('l'));
        }
        assert_eq!(dv.cursor_column().as_deref(), Some("submitted"));
        assert!(dv.toggle_column("submitted"));
        assert_eq!(dv.cursor_column().as_deref(), Some("progress"));
        assert!(!dv.toggle_column("id"));
    }

    #[test]
    fn export_reports_row_count() {
        let mut dv = loaded(5, 2);
        let (bytes, rows) = dv.export(ExportFormat::Csv, ExportScope::CurrentPage).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 3);
        dv.set_global_filter("project 4");
        let (_, rows) = dv.export(ExportFormat::Csv, ExportScope::AllFiltered).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn render_shows_rows_and_sort_indicator() {
        let mut dv = loaded(3, 10);
        dv.handle_key(key('s'));
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        terminal.draw(|f| dv.render(f, f.area(), true)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Projects (3 rows)"));
        assert!(text.contains("ID ▲"));
        assert!(text.contains("Project 2"));
    }

    #[test]
    fn render_empty_filter_message() {
        let mut dv = loaded(3, 10);
        dv.set_global_filter("zzz");
        let mut terminal = Terminal::new(TestBackend::new(100, 6)).unwrap();
        terminal.draw(|f| dv.render(f, f.area(), false)).unwrap();
        assert!(buffer_text(&terminal).contains("No rows match"));
    }

    #[test]
    fn render_pager_line() {
        let dv = loaded(25, 10);
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| dv.render_pager(f, f.area())).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Page 1/3"));
        assert!(text.contains("rows 1-10 of 25"));
        assert!(!text.contains("[filtered]"));
    }

    #[test]
    fn clear_filters_drops_search_and_expression() {
        let mut dv = loaded(25, 10);
        dv.set_global_filter("Project 1");
        assert_eq!(dv.summary().filtered_rows, 11);
        dv.apply_column_filters("requested >= 1000").unwrap();
        assert_eq!(dv.summary().filtered_rows, 10);

        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal.draw(|f| dv.render_pager(f, f.area())).unwrap();
        assert!(buffer_text(&terminal).contains("[filtered]"));

        dv.clear_filters();
        assert_eq!(dv.global_filter(), "");
        assert_eq!(dv.filter_expression(), None);
        assert_eq!(dv.summary().filtered_rows, 25);
    }
}
