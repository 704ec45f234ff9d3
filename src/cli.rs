use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::logging::LogConfig;
use crate::table::{ExportFormat, ExportScope, SortDirection, DEFAULT_PAGE_SIZE};
use crate::ui::Tab;

#[derive(Parser)]
#[command(name = "fundgrid", about = "Terminal admin console for municipal funding data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub log: LogConfig,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Browse a data directory interactively
    View {
        #[arg(long, env = "FUNDGRID_DATA_DIR")]
        data_dir: PathBuf,

        #[command(flatten)]
        view: ViewConfig,
    },

    /// Write one screen's rows to a delimited file without opening the TUI
    Export(ExportArgs),
}

/// Display and export preferences shared by the interactive views.
#[derive(Args, Clone, Debug)]
pub struct ViewConfig {
    #[arg(long, env = "FUNDGRID_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Directory export files are written to
    #[arg(long, env = "FUNDGRID_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    #[arg(long, value_enum, env = "FUNDGRID_EXPORT_FORMAT", default_value_t = ExportFormat::Csv)]
    pub export_format: ExportFormat,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            export_dir: PathBuf::from("."),
            export_format: ExportFormat::Csv,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    #[arg(long, env = "FUNDGRID_DATA_DIR")]
    pub data_dir: PathBuf,

    #[arg(long, value_enum)]
    pub screen: Tab,

    /// Output file; `-` writes to stdout
    #[arg(short, long)]
    pub out: PathBuf,

    /// Case-insensitive text matched against every searchable column
    #[arg(long)]
    pub search: Option<String>,

    /// Column filter expression, e.g. "amount >= 1000 AND status = 'approved'"
    #[arg(long)]
    pub filter: Option<String>,

    /// Sort column, optionally suffixed with `:desc`
    #[arg(long, value_parser = parse_sort_arg)]
    pub sort: Option<SortArg>,

    /// Only export these columns, in table order
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    #[arg(long, value_enum, default_value_t = ExportScope::AllFiltered)]
    pub scope: ExportScope,

    /// 1-based page for `--scope current-page`
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, env = "FUNDGRID_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Saved view state (JSON) restored before the flags above are applied
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Write the final view state here so a later run can pass it to `--state`
    #[arg(long)]
    pub save_state: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArg {
    pub column: String,
    pub direction: SortDirection,
}

/// `amount` or `amount:desc`.
pub fn parse_sort_arg(raw: &str) -> Result<SortArg> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((col, dir)) => {
            let direction = match dir.to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Ascending,
                "desc" => SortDirection::Descending,
                other => bail!("unknown sort direction '{}', expected asc or desc", other),
            };
            (col, direction)
        }
        None => (raw, SortDirection::Ascending),
    };
    let column = column.trim();
    if column.is_empty() {
        bail!("sort column is empty");
    }
    Ok(SortArg {
        column: column.to_string(),
        direction,
    })
}
