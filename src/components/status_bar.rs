use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::event::{Action, AppMessage};
use crate::table::{PageInfo, ViewSummary};
use crate::ui::theme::Theme;

use super::Component;

const MESSAGE_DISPLAY_MAX_LEN: usize = 60;

pub struct StatusBar {
    pub summary: Option<ViewSummary>,
    pub page: Option<PageInfo>,
    pub visible_columns: usize,
    pub total_columns: usize,
    pub tally: Vec<(String, usize)>,
    pub loading_message: Option<String>,
    pub error_message: Option<String>,
    pub notice: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            summary: None,
            page: None,
            visible_columns: 0,
            total_columns: 0,
            tally: vec![],
            loading_message: None,
            error_message: None,
            notice: None,
        }
    }

    /// Snapshot of the active tab, refreshed before each draw.
    pub fn set_view(&mut self, summary: ViewSummary, page: PageInfo, tally: Vec<(String, usize)>) {
        self.summary = Some(summary);
        self.page = Some(page);
        self.tally = tally;
    }

    pub fn set_columns(&mut self, visible: usize, total: usize) {
        self.visible_columns = visible;
        self.total_columns = total;
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.error_message = None;
    }

    pub fn set_error(&mut self, err: impl Into<String>) {
        self.error_message = Some(err.into());
        self.notice = None;
    }

    fn truncate(text: &str) -> String {
        if text.chars().count() > MESSAGE_DISPLAY_MAX_LEN {
            let kept: String = text.chars().take(MESSAGE_DISPLAY_MAX_LEN - 3).collect();
            format!("{kept}...")
        } else {
            text.to_string()
        }
    }
}

impl Component for StatusBar {
    fn handle_key(&mut self, _key: KeyEvent) -> Option<Action> {
        None
    }

    fn handle_message(&mut self, msg: &AppMessage) -> Option<Action> {
        match msg {
            AppMessage::LoadingStarted(msg) => {
                self.loading_message = Some(msg.clone());
                self.error_message = None;
            }
            AppMessage::LoadingFinished | AppMessage::DatasetReady(_) => {
                self.loading_message = None;
            }
            AppMessage::ExportFinished { path, rows } => {
                self.set_notice(format!("Exported {} rows to {}", rows, path.display()));
            }
            AppMessage::Error(err) => {
                self.set_error(err.clone());
                self.loading_message = None;
            }
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _focused: bool) {
        let mut spans = Vec::new();

        let row_text = match self.summary {
            Some(s) if s.filtered_rows != s.total_rows => {
                format!(" Rows: {}/{} (filtered)", s.filtered_rows, s.total_rows)
            }
            Some(s) => format!(" Rows: {}", s.total_rows),
            None => " Rows: -".to_string(),
        };
        spans.push(Span::styled(row_text, Theme::status_bar()));

        if let Some(page) = self.page {
            spans.push(Span::styled(format!(" | {}", page.label()), Theme::status_bar()));
        }

        if let Some(s) = self.summary.filter(|s| s.selected > 0) {
            spans.push(Span::styled(
                format!(" | Selected: {}", s.selected),
                Theme::status_bar(),
            ));
        }

        if self.total_columns > 0 {
            spans.push(Span::styled(
                format!(" | Cols: {}/{}", self.visible_columns, self.total_columns),
                Theme::status_bar(),
            ));
        }

        if !self.tally.is_empty() {
            let tally = self
                .tally
                .iter()
                .map(|(label, n)| format!("{label} {n}"))
                .collect::<Vec<_>>()
                .join(", ");
            spans.push(Span::styled(format!(" | {}", tally), Theme::status_bar()));
        }

        if let Some(ref err) = self.error_message {
            spans.push(Span::styled(
                format!(" | Error: {}", Self::truncate(err)),
                Theme::status_error(),
            ));
        } else if let Some(ref msg) = self.loading_message {
            spans.push(Span::styled(
                format!(" | Loading: {}", msg),
                Theme::status_loading(),
            ));
        } else if let Some(ref notice) = self.notice {
            spans.push(Span::styled(
                format!(" | {}", Self::truncate(notice)),
                Theme::status_notice(),
            ));
        }

        // Right-aligned key hints
        let hints = " q:quit ?:help ";
        let used_width: usize = spans.iter().map(|s| s.width()).sum();
        let remaining = (area.width as usize).saturating_sub(used_width);
        if remaining > hints.len() {
            let padding = " ".repeat(remaining - hints.len());
            spans.push(Span::styled(padding, Theme::status_bar()));
            spans.push(Span::styled(hints, Theme::hint()));
        }

        let bar = Paragraph::new(Line::from(spans)).style(Theme::status_bar());
        frame.render_widget(bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::pagination::PaginationState;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;

    fn render(bar: &mut StatusBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 1)).unwrap();
        terminal.draw(|f| bar.render(f, f.area(), false)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn new_status_bar_defaults() {
        let bar = StatusBar::new();
        assert!(bar.summary.is_none());
        assert!(bar.loading_message.is_none());
        assert!(bar.error_message.is_none());
    }

    #[test]
    fn handle_loading_messages() {
        let mut bar = StatusBar::new();
        bar.handle_message(&AppMessage::LoadingStarted("reading data...".into()));
        assert_eq!(bar.loading_message.as_deref(), Some("reading data..."));

        bar.handle_message(&AppMessage::LoadingFinished);
        assert!(bar.loading_message.is_none());
    }

    #[test]
    fn handle_error_clears_loading() {
        let mut bar = StatusBar::new();
        bar.handle_message(&AppMessage::LoadingStarted("loading".into()));
        bar.handle_message(&AppMessage::Error("projects.json: expected value".into()));
        assert!(bar.loading_message.is_none());
        assert_eq!(
            bar.error_message.as_deref(),
            Some("projects.json: expected value")
        );
    }

    #[test]
    fn export_finished_sets_notice() {
        let mut bar = StatusBar::new();
        bar.set_error("old");
        bar.handle_message(&AppMessage::ExportFinished {
            path: PathBuf::from("out/projects.csv"),
            rows: 12,
        });
        assert!(bar.error_message.is_none());
        assert_eq!(
            bar.notice.as_deref(),
            Some("Exported 12 rows to out/projects.csv")
        );
    }

    #[test]
    fn renders_rows_page_and_tally() {
        let mut bar = StatusBar::new();
        let summary = ViewSummary {
            total_rows: 25,
            filtered_rows: 12,
            page_rows: 10,
            selected: 3,
        };
        bar.set_view(
            summary,
            PaginationState::new(10).info(12),
            vec![("pending".into(), 20), ("funded".into(), 5)],
        );
        bar.set_columns(7, 9);
        let text = render(&mut bar);
        assert!(text.contains("Rows: 12/25 (filtered)"));
        assert!(text.contains("Page 1/2"));
        assert!(text.contains("Selected: 3"));
        assert!(text.contains("Cols: 7/9"));
        assert!(text.contains("pending 20, funded 5"));
    }

    #[test]
    fn long_errors_are_truncated() {
        let long = "x".repeat(200);
        let shown = StatusBar::truncate(&long);
        assert_eq!(shown.chars().count(), MESSAGE_DISPLAY_MAX_LEN);
        assert!(shown.ends_with("..."));
    }
}
