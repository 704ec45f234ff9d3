use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table};
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::ui::layout;
use crate::ui::theme::Theme;

use super::Component;

const POPUP_WIDTH: u16 = 80;
const POPUP_MARGIN: u16 = 4;
const KEY_WIDTH: u16 = 20;

type Section = (&'static str, &'static [(&'static str, &'static str)]);

/// Key bindings, grouped the way the grid's features are.
const SECTIONS: &[Section] = &[
    (
        "Screens",
        &[
            ("1-4", "Projects / Commitments / Organizations / Questions"),
            ("r", "Reload data files"),
            ("?", "Toggle this help"),
            ("Esc", "Cancel input / close popup"),
            ("q", "Quit"),
        ],
    ),
    (
        "Moving around",
        &[
            ("j/k or Up/Down", "Move row cursor"),
            ("h/l or Left/Right", "Move column cursor"),
            ("] / [ or PgDn/PgUp", "Next / previous page"),
            ("Home / End", "First / last page"),
            ("+ / -", "Larger / smaller pages"),
            ("c", "Show or hide columns"),
        ],
    ),
    (
        "Sort and filter",
        &[
            ("s", "Cycle sort on cursor column (asc/desc/off)"),
            ("/", "Search all columns"),
            ("f", "Column filter, e.g. amount >= 100 AND status = 'funded'"),
            ("F", "Clear search and column filters"),
        ],
    ),
    (
        "Select and export",
        &[
            ("Space", "Select row under cursor"),
            ("a", "Select / unselect whole page"),
            ("A / u", "Select all matching rows / clear selection"),
            ("x / X", "Export matching rows / current page"),
        ],
    ),
];

pub struct HelpPopup {
    pub visible: bool,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// One heading row per section plus a spacer between sections.
    fn rows() -> Vec<Row<'static>> {
        let mut rows = Vec::new();
        for (i, (heading, bindings)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                rows.push(Row::new(Vec::<Cell>::new()));
            }
            rows.push(Row::new([Cell::from(*heading).style(Theme::title())]));
            for (key, desc) in bindings.iter() {
                rows.push(Row::new([
                    Cell::from(format!("  {key}")).style(Theme::label()),
                    Cell::from(*desc).style(Theme::value()),
                ]));
            }
        }
        rows
    }
}

impl Component for HelpPopup {
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if !self.visible {
            return None;
        }
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.visible = false;
        }
        // Everything else is swallowed while the help is open.
        None
    }

    fn handle_message(&mut self, _msg: &AppMessage) -> Option<Action> {
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _focused: bool) {
        if !self.visible {
            return;
        }

        let rows = Self::rows();
        // Rows, borders and the footer hint.
        let height = rows.len() as u16 + 3;
        let popup = layout::centered(area, POPUP_WIDTH, height, POPUP_MARGIN);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" fundgrid keys ")
            .title_bottom(Line::styled(" ? or Esc to close ", Theme::hint()))
            .border_style(Theme::border(true));
        let table = Table::new(rows, [Constraint::Length(KEY_WIDTH), Constraint::Fill(1)]).block(block);
        frame.render_widget(table, popup);
    }
}
