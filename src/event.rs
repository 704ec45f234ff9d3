use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;

use crate::loader::Dataset;
use crate::table::{ExportScope, SortDirection};

#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    SwitchTab(usize),
    ToggleHelp,
    ToggleColumnSelector,
    FocusSearch,
    FocusFilter,
    ClearFilters,
    SubmitSearch(String),
    SubmitFilter(String),
    ToggleColumn(String),
    SortChanged(String, Option<SortDirection>),
    Export(ExportScope),
    Reload,
}

/// Messages sent from background tasks back to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    DatasetReady(Box<Dataset>),
    LoadingStarted(String),
    LoadingFinished,
    ExportFinished { path: PathBuf, rows: usize },
    Error(String),
}

pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(50)).unwrap_or(false) {
            if let Ok(ev) = event::read() {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        }
    });
}

pub fn to_key_event(ev: &Event) -> Option<KeyEvent> {
    match ev {
        Event::Key(key) => Some(*key),
        _ => None,
    }
}
