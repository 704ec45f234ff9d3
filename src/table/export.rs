use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::column::ColumnDef;
use super::error::ExportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }
}

/// Which rows an export covers. Visible columns only, in either case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportScope {
    CurrentPage,
    #[default]
    AllFiltered,
}

/// Serialize rows into delimited text: one header line of column labels,
/// then one line per row. Quoting of delimiters, quotes and line breaks is
/// left to the `csv` writer.
pub fn write_delimited<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    columns: &[&ColumnDef<T>],
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.header()))?;

    let mut written = 0usize;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.export_text(row)))?;
        written += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    tracing::debug!(rows = written, columns = columns.len(), bytes = bytes.len(), "export serialized");
    Ok(bytes)
}
