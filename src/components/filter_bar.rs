use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::ui::theme::Theme;

use super::Component;

const SEARCH_LABEL: &str = " Search: ";
const FILTER_LABEL: &str = " Filter: ";
const SEPARATOR: &str = "  │";

/// Which of the two inputs is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Free text matched against every searchable column.
    Search,
    /// Column filter expression such as `amount >= 100`.
    Columns,
}

pub struct FilterBar {
    pub search: String,
    pub expression: String,
    mode: Option<FilterMode>,
    /// Cursor position within the edited text, in chars.
    cursor: usize,
    /// Text before editing started, restored on Esc.
    original: String,
}

impl FilterBar {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            expression: String::new(),
            mode: None,
            cursor: 0,
            original: String::new(),
        }
    }

    /// Show another tab's applied search and filter.
    pub fn load(&mut self, search: &str, expression: Option<&str>) {
        self.mode = None;
        self.search = search.to_string();
        self.expression = expression.unwrap_or_default().to_string();
    }

    pub fn start_editing(&mut self, mode: FilterMode) {
        self.mode = Some(mode);
        self.original = self.text(mode).clone();
        self.cursor = self.original.chars().count();
    }

    fn text(&self, mode: FilterMode) -> &String {
        match mode {
            FilterMode::Search => &self.search,
            FilterMode::Columns => &self.expression,
        }
    }

    fn text_mut(&mut self, mode: FilterMode) -> &mut String {
        match mode {
            FilterMode::Search => &mut self.search,
            FilterMode::Columns => &mut self.expression,
        }
    }

    fn byte_index(text: &str, cursor: usize) -> usize {
        text.char_indices()
            .nth(cursor)
            .map_or(text.len(), |(i, _)| i)
    }
}

impl Component for FilterBar {
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let mode = self.mode?;
        let len = self.text(mode).chars().count();

        match key.code {
            KeyCode::Enter => {
                self.mode = None;
                let submitted = self.text(mode).trim().to_string();
                *self.text_mut(mode) = submitted.clone();
                Some(match mode {
                    FilterMode::Search => Action::SubmitSearch(submitted),
                    FilterMode::Columns => Action::SubmitFilter(submitted),
                })
            }
            KeyCode::Esc => {
                self.mode = None;
                let original = std::mem::take(&mut self.original);
                *self.text_mut(mode) = original;
                None
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let cursor = self.cursor;
                    let text = self.text_mut(mode);
                    let at = Self::byte_index(text, cursor - 1);
                    text.remove(at);
                    self.cursor -= 1;
                }
                None
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let cursor = self.cursor;
                    let text = self.text_mut(mode);
                    let at = Self::byte_index(text, cursor);
                    text.remove(at);
                }
                None
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.cursor < len {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = len;
                None
            }
            KeyCode::Char(c) => {
                let cursor = self.cursor;
                let text = self.text_mut(mode);
                let at = Self::byte_index(text, cursor);
                text.insert(at, c);
                self.cursor += 1;
                None
            }
            _ => None,
        }
    }

    fn handle_message(&mut self, _msg: &AppMessage) -> Option<Action> {
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _focused: bool) {
        let style_for = |mode: FilterMode| Theme::filter(self.mode == Some(mode));

        let search_text = if self.search.is_empty() && self.mode != Some(FilterMode::Search) {
            "(press /)".to_string()
        } else {
            self.search.clone()
        };
        let expression_text =
            if self.expression.is_empty() && self.mode != Some(FilterMode::Columns) {
                "(press f, e.g. amount >= 1000 AND status = 'approved')".to_string()
            } else {
                self.expression.clone()
            };

        let search_width = search_text.chars().count();
        let spans = vec![
            Span::styled(SEARCH_LABEL, Theme::label()),
            Span::styled(search_text, style_for(FilterMode::Search)),
            Span::styled(SEPARATOR, Theme::filter(false)),
            Span::styled(FILTER_LABEL, Theme::label()),
            Span::styled(expression_text, style_for(FilterMode::Columns)),
        ];

        if let Some(mode) = self.mode {
            let offset = match mode {
                FilterMode::Search => SEARCH_LABEL.chars().count(),
                FilterMode::Columns => {
                    SEARCH_LABEL.chars().count()
                        + search_width
                        + SEPARATOR.chars().count()
                        + FILTER_LABEL.chars().count()
                }
            };
            let cursor_x = area.x + (offset + self.cursor) as u16;
            frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn is_input_mode(&self) -> bool {
        self.mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(bar: &mut FilterBar, text: &str) {
        for c in text.chars() {
            bar.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn filter_bar_initial_state() {
        let bar = FilterBar::new();
        assert!(bar.mode.is_none());
        assert!(bar.search.is_empty());
        assert!(!bar.is_input_mode());
    }

    #[test]
    fn typing_and_submitting_search() {
        let mut bar = FilterBar::new();
        bar.start_editing(FilterMode::Search);
        type_text(&mut bar, " park ");
        let action = bar.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(Action::SubmitSearch("park".into())));
        assert_eq!(bar.search, "park");
        assert!(!bar.is_input_mode());
    }

    #[test]
    fn submitting_filter_expression() {
        let mut bar = FilterBar::new();
        bar.start_editing(FilterMode::Columns);
        type_text(&mut bar, "amount > 100");
        let action = bar.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(Action::SubmitFilter("amount > 100".into())));
        assert!(bar.search.is_empty());
    }

    #[test]
    fn escape_reverts() {
        let mut bar = FilterBar::new();
        bar.load("", Some("old filter"));
        bar.start_editing(FilterMode::Columns);
        type_text(&mut bar, " and more");
        bar.handle_key(key(KeyCode::Esc));
        assert_eq!(bar.expression, "old filter");
        assert!(!bar.is_input_mode());
    }

    #[test]
    fn editing_handles_multibyte_text() {
        let mut bar = FilterBar::new();
        bar.start_editing(FilterMode::Search);
        type_text(&mut bar, "café");
        bar.handle_key(key(KeyCode::Left));
        bar.handle_key(key(KeyCode::Backspace));
        assert_eq!(bar.search, "caé");
        bar.handle_key(key(KeyCode::Delete));
        assert_eq!(bar.search, "ca");
    }

    #[test]
    fn keys_ignored_when_not_editing() {
        let mut bar = FilterBar::new();
        assert_eq!(bar.handle_key(key(KeyCode::Char('x'))), None);
        assert!(bar.search.is_empty());
    }
}
