use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::ui::layout;
use crate::ui::theme::Theme;

use super::Component;

const POPUP_WIDTH: u16 = 50;
const POPUP_HEIGHT: u16 = 20;
const POPUP_MARGIN: u16 = 4;

/// One row of the column picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChoice {
    pub id: String,
    pub header: String,
    pub visible: bool,
    pub hideable: bool,
}

pub struct ColumnSelector {
    columns: Vec<ColumnChoice>,
    list_state: ListState,
    pub visible: bool,
}

impl ColumnSelector {
    pub fn new() -> Self {
        Self {
            columns: vec![],
            list_state: ListState::default(),
            visible: false,
        }
    }

    /// Replace the listed columns, keeping the highlighted row where possible.
    pub fn set_columns(&mut self, columns: Vec<ColumnChoice>) {
        self.columns = columns;
        let selected = match self.list_state.selected() {
            _ if self.columns.is_empty() => None,
            Some(i) => Some(i.min(self.columns.len() - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn visible_count(&self) -> usize {
        self.columns.iter().filter(|c| c.visible).count()
    }

    pub fn total_count(&self) -> usize {
        self.columns.len()
    }

    pub fn popup_area(area: Rect) -> Rect {
        layout::centered(area, POPUP_WIDTH, POPUP_HEIGHT, POPUP_MARGIN)
    }
}

impl Component for ColumnSelector {
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if !self.visible {
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('c') => Some(Action::ToggleColumnSelector),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.list_state.selected().unwrap_or(0);
                if i > 0 {
                    self.list_state.select(Some(i - 1));
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.list_state.selected().unwrap_or(0);
                if i + 1 < self.columns.len() {
                    self.list_state.select(Some(i + 1));
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let i = self.list_state.selected()?;
                let choice = self.columns.get_mut(i)?;
                if !choice.hideable {
                    return None;
                }
                choice.visible = !choice.visible;
                Some(Action::ToggleColumn(choice.id.clone()))
            }
            _ => None,
        }
    }

    fn handle_message(&mut self, _msg: &AppMessage) -> Option<Action> {
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _focused: bool) {
        if !self.visible {
            return;
        }

        let popup = Self::popup_area(area);

        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .columns
            .iter()
            .map(|choice| {
                let checkbox = if choice.visible { "[x]" } else { "[ ]" };
                let name_style = if choice.hideable {
                    Theme::value()
                } else {
                    Theme::placeholder()
                };
                let mut spans = vec![
                    Span::styled(format!("{} ", checkbox), Theme::label()),
                    Span::styled(choice.header.clone(), name_style),
                    Span::styled(format!(" ({})", choice.id), Theme::hint()),
                ];
                if !choice.hideable {
                    spans.push(Span::styled(" always shown", Theme::placeholder()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(
            " Columns {}/{} (space=toggle, esc=close) ",
            self.visible_count(),
            self.total_count()
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Theme::border(true));

        let list = List::new(items)
            .block(block)
            .highlight_style(Theme::cursor());

        frame.render_stateful_widget(list, popup, &mut self.list_state);
    }
}
