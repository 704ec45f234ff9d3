//! Headless export: the same view pipeline as the TUI, driven by CLI flags.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;

use crate::cli::ExportArgs;
use crate::loader::load_rows;
use crate::model::{Commitment, Organization, Project, Question};
use crate::screens::{apply_filter_expression, build_view, Screen};
use crate::table::{ExportScope, TableView, ViewState};
use crate::ui::Tab;

/// Run `fundgrid export`. Returns the number of data rows written.
pub async fn run(args: &ExportArgs) -> Result<usize> {
    match args.screen {
        Tab::Projects => export_screen::<Project>(args).await,
        Tab::Commitments => export_screen::<Commitment>(args).await,
        Tab::Organizations => export_screen::<Organization>(args).await,
        Tab::Questions => export_screen::<Question>(args).await,
    }
}

async fn export_screen<S: Screen>(args: &ExportArgs) -> Result<usize> {
    let rows = load_rows::<S>(&args.data_dir).await?;
    let saved = match &args.state {
        Some(path) => Some(read_state(path).await?),
        None => None,
    };
    let view = prepare_view::<S>(rows, args, saved)?;

    let summary = view.summary();
    let written = match args.scope {
        ExportScope::CurrentPage => summary.page_rows,
        ExportScope::AllFiltered => summary.filtered_rows,
    };
    let bytes = view
        .export(args.format, args.scope)
        .context("failed to serialize rows")?;
    write_output(&args.out, &bytes).await?;
    if let Some(path) = &args.save_state {
        write_state(path, &view.state()).await?;
    }

    tracing::info!(
        screen = S::TITLE,
        rows = written,
        total = summary.total_rows,
        out = %args.out.display(),
        "export written"
    );
    Ok(written)
}

/// Build a view over `rows` with the search, filter, sort, column and page
/// options from `args` applied. Unknown column names are errors.
///
/// A `saved` state is restored first; flags given in `args` replace the
/// matching parts of it and the page flags always decide pagination.
pub fn prepare_view<S: Screen>(
    rows: Vec<S>,
    args: &ExportArgs,
    saved: Option<ViewState>,
) -> Result<TableView<S, S::Key>> {
    let mut view = build_view(rows, args.page_size);
    if let Some(state) = saved {
        view = view.with_state(state);
        view.set_page_size(args.page_size);
    }

    if let Some(columns) = &args.columns {
        for id in columns {
            if view.column(id).is_none() {
                bail!("unknown column '{}' on {}", id, S::TITLE);
            }
        }
        let hidden: Vec<String> = view
            .columns()
            .iter()
            .map(|c| c.id().to_string())
            .filter(|id| !columns.contains(id))
            .collect();
        for id in hidden {
            if !view.set_column_visible(&id, false) {
                tracing::debug!(column = %id, "column cannot be hidden, keeping it");
            }
        }
    }

    if let Some(search) = &args.search {
        view.set_global_filter(search.trim());
    }

    if let Some(expr) = args.filter.as_deref().filter(|e| !e.trim().is_empty()) {
        apply_filter_expression(&mut view, expr)?;
    }

    if let Some(sort) = &args.sort {
        match view.column(&sort.column) {
            None => bail!("unknown sort column '{}' on {}", sort.column, S::TITLE),
            Some(col) if !col.is_sortable() => bail!("column '{}' cannot be sorted", sort.column),
            Some(_) => view.set_sort(&sort.column, sort.direction),
        }
    }

    if args.page == 0 {
        bail!("--page starts at 1");
    }
    view.set_page_index(args.page - 1);
    if view.pagination().page_index != args.page - 1 {
        tracing::warn!(
            requested = args.page,
            last = view.page_info().total_pages,
            "page out of range, exporting the last page"
        );
    }

    Ok(view)
}

async fn read_state(path: &Path) -> Result<ViewState> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("invalid view state in {}", path.display()))
}

async fn write_state(path: &Path, state: &ViewState) -> Result<()> {
    let json = serde_json::to_vec_pretty(state).context("failed to serialize view state")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "view state saved");
    Ok(())
}

async fn write_output(out: &Path, bytes: &[u8]) -> Result<()> {
    if out == Path::new("-") {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(bytes).await.context("failed to write to stdout")?;
        stdout.flush().await.context("failed to flush stdout")?;
        return Ok(());
    }
    tokio::fs::write(out, bytes)
        .await
        .with_context(|| format!("failed to write {}", out.display()))
}
