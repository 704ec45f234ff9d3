use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::Tabs;
use tokio::sync::mpsc;

use crate::cli::ViewConfig;
use crate::components::column_selector::ColumnSelector;
use crate::components::data_view::DataView;
use crate::components::filter_bar::{FilterBar, FilterMode};
use crate::components::help_popup::HelpPopup;
use crate::components::status_bar::StatusBar;
use crate::components::{Component, GridPanel};
use crate::event::{spawn_event_reader, to_key_event, Action, AppMessage};
use crate::loader::load_dataset;
use crate::model::{Commitment, Organization, Project, Question};
use crate::table::{ExportFormat, ExportScope, SortDirection};
use crate::ui::layout::Bands;
use crate::ui::theme::Theme;
use crate::ui::{Focus, Tab};

struct App {
    /// One panel per tab, in `Tab::ALL` order.
    panels: Vec<Box<dyn GridPanel>>,
    filter_bar: FilterBar,
    column_selector: ColumnSelector,
    status_bar: StatusBar,
    help_popup: HelpPopup,
    active_tab: Tab,
    focus: Focus,
    data_dir: PathBuf,
    config: ViewConfig,
}

impl App {
    fn new(data_dir: PathBuf, config: ViewConfig) -> Self {
        let page_size = config.page_size;
        Self {
            panels: vec![
                Box::new(DataView::<Project>::new(page_size)),
                Box::new(DataView::<Commitment>::new(page_size)),
                Box::new(DataView::<Organization>::new(page_size)),
                Box::new(DataView::<Question>::new(page_size)),
            ],
            filter_bar: FilterBar::new(),
            column_selector: ColumnSelector::new(),
            status_bar: StatusBar::new(),
            help_popup: HelpPopup::new(),
            active_tab: Tab::Projects,
            focus: Focus::Grid,
            data_dir,
            config,
        }
    }

    fn panel(&self) -> &dyn GridPanel {
        self.panels[self.active_tab.index()].as_ref()
    }

    fn panel_mut(&mut self) -> &mut dyn GridPanel {
        self.panels[self.active_tab.index()].as_mut()
    }

    fn refresh_status(&mut self) {
        let panel = self.panel();
        let (summary, page, tally) = (panel.summary(), panel.page_info(), panel.tally());
        let choices = panel.column_choices();
        let visible = choices.iter().filter(|c| c.visible).count();
        self.status_bar.set_view(summary, page, tally);
        self.status_bar.set_columns(visible, choices.len());
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.refresh_status();

        let screen = Bands::new(frame.area());

        let tab_titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|t| Line::styled(t.label(), Theme::tab(*t == self.active_tab)))
            .collect();

        let tabs = Tabs::new(tab_titles)
            .select(self.active_tab.index())
            .divider(" │ ")
            .style(Theme::tab_bar());

        frame.render_widget(tabs, screen.header);

        let grid = Bands::new(screen.body);
        self.filter_bar
            .render(frame, grid.header, self.focus == Focus::FilterBar);
        let grid_focused = self.focus == Focus::Grid;
        let panel = self.panel_mut();
        panel.render(frame, grid.body, grid_focused);
        panel.render_pager(frame, grid.footer);

        self.status_bar.render(frame, screen.footer, false);

        self.column_selector
            .render(frame, frame.area(), self.focus == Focus::ColumnSelector);
        self.help_popup.render(frame, frame.area(), true);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.help_popup.visible {
            return self.help_popup.handle_key(key);
        }

        if self.column_selector.visible {
            return self.column_selector.handle_key(key);
        }

        if self.filter_bar.is_input_mode() {
            let action = self.filter_bar.handle_key(key);
            if !self.filter_bar.is_input_mode() {
                self.focus = Focus::Grid;
            }
            return action;
        }

        match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('?') => return Some(Action::ToggleHelp),
            KeyCode::Char('1') => return Some(Action::SwitchTab(0)),
            KeyCode::Char('2') => return Some(Action::SwitchTab(1)),
            KeyCode::Char('3') => return Some(Action::SwitchTab(2)),
            KeyCode::Char('4') => return Some(Action::SwitchTab(3)),
            KeyCode::Char('r') => return Some(Action::Reload),
            _ => {}
        }

        self.panel_mut().handle_key(key)
    }

    async fn handle_action(
        &mut self,
        action: Action,
        msg_tx: &mpsc::UnboundedSender<AppMessage>,
    ) -> Result<bool> {
        match action {
            Action::Quit => return Ok(true),
            Action::SwitchTab(idx) => {
                let Some(tab) = Tab::from_index(idx) else {
                    return Ok(false);
                };
                self.active_tab = tab;
                self.focus = Focus::Grid;
                self.column_selector.hide();
                let (search, expression) = {
                    let panel = self.panel();
                    (
                        panel.global_filter().to_string(),
                        panel.filter_expression().map(str::to_string),
                    )
                };
                self.filter_bar.load(&search, expression.as_deref());
            }
            Action::ToggleHelp => {
                self.help_popup.toggle();
            }
            Action::ToggleColumnSelector => {
                if self.column_selector.visible {
                    self.column_selector.hide();
                    self.focus = Focus::Grid;
                } else {
                    let choices = self.panel().column_choices();
                    self.column_selector.set_columns(choices);
                    self.column_selector.show();
                    self.focus = Focus::ColumnSelector;
                }
            }
            Action::ToggleColumn(id) => {
                if !self.panel_mut().toggle_column(&id) {
                    self.status_bar.set_error(format!("Column '{}' cannot be hidden", id));
                }
                let choices = self.panel().column_choices();
                self.column_selector.set_columns(choices);
            }
            Action::FocusSearch => {
                self.focus = Focus::FilterBar;
                self.filter_bar.start_editing(FilterMode::Search);
            }
            Action::FocusFilter => {
                self.focus = Focus::FilterBar;
                self.filter_bar.start_editing(FilterMode::Columns);
            }
            Action::SubmitSearch(text) => {
                self.focus = Focus::Grid;
                self.panel_mut().set_global_filter(&text);
            }
            Action::SubmitFilter(expr) => {
                self.focus = Focus::Grid;
                match self.panel_mut().apply_column_filters(&expr) {
                    Ok(0) => self.status_bar.set_notice("Column filters cleared"),
                    Ok(n) => self
                        .status_bar
                        .set_notice(format!("{} column filter(s) applied", n)),
                    Err(e) => {
                        self.status_bar.set_error(format!("Filter error: {:#}", e));
                        let previous = self.panel().filter_expression().map(str::to_string);
                        let search = self.panel().global_filter().to_string();
                        self.filter_bar.load(&search, previous.as_deref());
                    }
                }
            }
            Action::ClearFilters => {
                self.panel_mut().clear_filters();
                self.filter_bar.load("", None);
                self.status_bar.set_notice("Search and column filters cleared");
            }
            Action::SortChanged(column, direction) => {
                let notice = match direction {
                    Some(SortDirection::Ascending) => format!("Sorted by {} ascending", column),
                    Some(SortDirection::Descending) => format!("Sorted by {} descending", column),
                    None => "Sort cleared".to_string(),
                };
                self.status_bar.set_notice(notice);
            }
            Action::Export(scope) => {
                let format = self.config.export_format;
                match self.panel().export(format, scope) {
                    Ok((bytes, rows)) => {
                        let path = export_path(
                            &self.config.export_dir,
                            self.active_tab,
                            scope,
                            format,
                            Utc::now(),
                        );
                        tracing::debug!(screen = self.panel().title(), ?scope, rows, "export requested");
                        spawn_export(msg_tx.clone(), path, bytes, rows);
                    }
                    Err(e) => {
                        self.status_bar.set_error(format!("Export error: {}", e));
                    }
                }
            }
            Action::Reload => {
                spawn_load(msg_tx.clone(), self.data_dir.clone());
            }
        }
        Ok(false)
    }

    fn handle_message(&mut self, msg: &AppMessage) {
        for panel in &mut self.panels {
            panel.handle_message(msg);
        }
        self.status_bar.handle_message(msg);

        if let AppMessage::DatasetReady(_) = msg {
            if self.column_selector.visible {
                let choices = self.panel().column_choices();
                self.column_selector.set_columns(choices);
            }
        }
    }
}

/// `<dir>/<screen>[-page]-<timestamp>.<ext>`
fn export_path(
    dir: &Path,
    tab: Tab,
    scope: ExportScope,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> PathBuf {
    let scope_suffix = match scope {
        ExportScope::AllFiltered => "",
        ExportScope::CurrentPage => "-page",
    };
    dir.join(format!(
        "{}{}-{}.{}",
        tab.slug(),
        scope_suffix,
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    ))
}

// --- Terminal setup ---

pub async fn run(data_dir: PathBuf, config: ViewConfig) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));

    enable_raw_mode().context("failed to enable raw mode")?;
    io::stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, data_dir, config).await;

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

// --- Event loop ---

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    data_dir: PathBuf,
    config: ViewConfig,
) -> Result<()> {
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<AppMessage>();

    tracing::info!(data_dir = %data_dir.display(), page_size = config.page_size, "starting viewer");
    let mut app = App::new(data_dir.clone(), config);

    spawn_load(msg_tx.clone(), data_dir);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    spawn_event_reader(event_tx);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        tokio::select! {
            Some(event) = event_rx.recv() => {
                let Some(key) = to_key_event(&event) else { continue };
                let Some(action) = app.handle_key(key) else { continue };
                if app.handle_action(action, &msg_tx).await? {
                    return Ok(());
                }
            }
            Some(msg) = msg_rx.recv() => {
                app.handle_message(&msg);
            }
        }
    }
}

// --- Background tasks ---

fn spawn_load(msg_tx: mpsc::UnboundedSender<AppMessage>, data_dir: PathBuf) {
    tokio::spawn(async move {
        let _ = msg_tx.send(AppMessage::LoadingStarted(format!(
            "Reading {}",
            data_dir.display()
        )));

        match load_dataset(&data_dir).await {
            Ok(report) => {
                tracing::info!(rows = report.dataset.total_rows(), "dataset loaded");
                let _ = msg_tx.send(AppMessage::DatasetReady(Box::new(report.dataset)));
                if !report.errors.is_empty() {
                    let _ = msg_tx.send(AppMessage::Error(report.errors.join("; ")));
                }
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "dataset load failed");
                let _ = msg_tx.send(AppMessage::Error(format!("Load error: {:#}", e)));
            }
        }

        let _ = msg_tx.send(AppMessage::LoadingFinished);
    });
}

fn spawn_export(
    msg_tx: mpsc::UnboundedSender<AppMessage>,
    path: PathBuf,
    bytes: Vec<u8>,
    rows: usize,
) {
    tokio::spawn(async move {
        let result = async {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows, "export written");
                let _ = msg_tx.send(AppMessage::ExportFinished { path, rows });
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "export failed");
                let _ = msg_tx.send(AppMessage::Error(format!("Export error: {:#}", e)));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;
    use crate::model::ProjectStatus;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;

    fn new_app() -> App {
        App::new(PathBuf::from("/tmp/fundgrid-data"), ViewConfig::default())
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::from(KeyCode::Char(c))
    }

    fn dataset() -> Dataset {
        let project = |id: u64, title: &str, status| Project {
            id,
            title: title.to_string(),
            organization: "Town of Elm".to_string(),
            municipality: None,
            status,
            amount_requested: 100.0 * id as f64,
            amount_committed: 0.0,
            submitted_at: "2024-03-01T09:00:00Z".parse().unwrap(),
        };
        Dataset {
            projects: vec![
                project(1, "Riverside park", ProjectStatus::Pending),
                project(2, "Library roof", ProjectStatus::Funded),
                project(3, "Parking lot", ProjectStatus::Pending),
            ],
            ..Dataset::default()
        }
    }

    fn loaded_app() -> App {
        let mut app = new_app();
        app.handle_message(&AppMessage::DatasetReady(Box::new(dataset())));
        app
    }

    #[test]
    fn app_new_default_state() {
        let app = new_app();
        assert_eq!(app.active_tab, Tab::Projects);
        assert_eq!(app.focus, Focus::Grid);
        assert_eq!(app.panels.len(), Tab::ALL.len());
        for (panel, tab) in app.panels.iter().zip(Tab::ALL) {
            assert_eq!(format!("{}:{}", tab.index() + 1, panel.title()), tab.label());
        }
    }

    #[test]
    fn handle_key_global_actions() {
        let mut app = new_app();
        assert_eq!(app.handle_key(key('q')), Some(Action::Quit));
        assert_eq!(app.handle_key(key('?')), Some(Action::ToggleHelp));
        assert_eq!(app.handle_key(key('r')), Some(Action::Reload));
        for (ch, idx) in [('1', 0), ('2', 1), ('3', 2), ('4', 3)] {
            assert_eq!(app.handle_key(key(ch)), Some(Action::SwitchTab(idx)));
        }
    }

    #[test]
    fn handle_key_routes_to_grid() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key(key('/')), Some(Action::FocusSearch));
        assert_eq!(app.handle_key(key('f')), Some(Action::FocusFilter));
        assert_eq!(
            app.handle_key(key('x')),
            Some(Action::Export(ExportScope::AllFiltered))
        );
    }

    #[test]
    fn dataset_ready_populates_panels() {
        let app = loaded_app();
        assert_eq!(app.panel().summary().total_rows, 3);
        assert_eq!(
            app.panel().tally(),
            vec![("pending".to_string(), 2), ("funded".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn search_typed_into_filter_bar_applies_to_panel() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = loaded_app();
        let action = app.handle_key(key('/')).unwrap();
        app.handle_action(action, &tx).await.unwrap();
        assert_eq!(app.focus, Focus::FilterBar);

        for c in "park".chars() {
            assert_eq!(app.handle_key(key(c)), None);
        }
        let action = app.handle_key(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert_eq!(app.focus, Focus::Grid);
        app.handle_action(action, &tx).await.unwrap();
        // "Riverside park" and "Parking lot"
        assert_eq!(app.panel().summary().filtered_rows, 2);
    }

    #[tokio::test]
    async fn invalid_filter_reports_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = loaded_app();
        app.handle_action(Action::SubmitFilter("budget > 5".into()), &tx)
            .await
            .unwrap();
        let err = app.status_bar.error_message.clone().unwrap();
        assert!(err.contains("budget"));
        assert_eq!(app.panel().summary().filtered_rows, 3);
        assert!(app.filter_bar.expression.is_empty());
    }

    #[tokio::test]
    async fn tab_switch_loads_filter_bar_state() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = loaded_app();
        app.handle_action(Action::SubmitFilter("status = 'pending'".into()), &tx)
            .await
            .unwrap();

        app.handle_action(Action::SwitchTab(1), &tx).await.unwrap();
        assert_eq!(app.active_tab, Tab::Commitments);
        assert!(app.filter_bar.expression.is_empty());

        app.handle_action(Action::SwitchTab(0), &tx).await.unwrap();
        assert_eq!(app.filter_bar.expression, "status = 'pending'");
        assert_eq!(app.panel().summary().filtered_rows, 2);
    }

    #[tokio::test]
    async fn column_selector_toggles_visibility() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = loaded_app();
        app.handle_action(Action::ToggleColumnSelector, &tx).await.unwrap();
        assert!(app.column_selector.visible);
        assert_eq!(app.focus, Focus::ColumnSelector);

        app.handle_action(Action::ToggleColumn("municipality".into()), &tx)
            .await
            .unwrap();
        assert_eq!(app.column_selector.visible_count(), 8);

        app.handle_action(Action::ToggleColumn("id".into()), &tx)
            .await
            .unwrap();
        assert!(app.status_bar.error_message.is_some());

        app.handle_action(Action::ToggleColumnSelector, &tx).await.unwrap();
        assert!(!app.column_selector.visible);
        assert_eq!(app.focus, Focus::Grid);
    }

    #[tokio::test]
    async fn export_action_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = ViewConfig {
            export_dir: dir.path().join("exports"),
            ..ViewConfig::default()
        };
        let mut app = App::new(dir.path().to_path_buf(), config);
        app.handle_message(&AppMessage::DatasetReady(Box::new(dataset())));

        app.handle_action(Action::Export(ExportScope::AllFiltered), &tx)
            .await
            .unwrap();
        let Some(AppMessage::ExportFinished { path, rows }) = rx.recv().await else {
            panic!("expected ExportFinished");
        };
        assert_eq!(rows, 3);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("ID,Title,"));
    }

    #[tokio::test]
    async fn reload_sends_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("questions.json"), "[]").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(dir.path().to_path_buf(), ViewConfig::default());
        app.handle_action(Action::Reload, &tx).await.unwrap();

        assert!(matches!(rx.recv().await, Some(AppMessage::LoadingStarted(_))));
        assert!(matches!(rx.recv().await, Some(AppMessage::DatasetReady(_))));
        assert!(matches!(rx.recv().await, Some(AppMessage::LoadingFinished)));
    }

    #[test]
    fn export_path_names() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 5).unwrap();
        assert_eq!(
            export_path(
                Path::new("out"),
                Tab::Commitments,
                ExportScope::AllFiltered,
                ExportFormat::Csv,
                now
            ),
            PathBuf::from("out/commitments-20240501-143005.csv")
        );
        assert_eq!(
            export_path(
                Path::new("out"),
                Tab::Questions,
                ExportScope::CurrentPage,
                ExportFormat::Tsv,
                now
            ),
            PathBuf::from("out/questions-page-20240501-143005.tsv")
        );
    }

    #[test]
    fn draw_renders_tabs_and_status() {
        let mut app = loaded_app();
        let mut terminal = Terminal::new(TestBackend::new(140, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("1:Projects"));
        assert!(text.contains("Riverside park"));
        assert!(text.contains("Rows: 3"));
        assert!(text.contains("Page 1/1"));
    }
}
