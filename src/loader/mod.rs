use std::io::ErrorKind;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::model::{Commitment, Organization, Project, Question};
use crate::screens::Screen;

/// Every screen's rows, as read from one data directory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub projects: Vec<Project>,
    pub commitments: Vec<Commitment>,
    pub organizations: Vec<Organization>,
    pub questions: Vec<Question>,
}

impl Dataset {
    pub fn total_rows(&self) -> usize {
        self.projects.len() + self.commitments.len() + self.organizations.len() + self.questions.len()
    }
}

/// Result of loading a data directory. Files that failed to parse leave their
/// screen empty and are reported in `errors`; the other screens still load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub errors: Vec<String>,
}

/// Read one screen's JSON array from `dir`. A missing file yields no rows.
pub async fn load_rows<S: Screen>(dir: &Path) -> Result<Vec<S>> {
    let path = dir.join(S::FILE_NAME);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "data file not found, screen will be empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let rows: Vec<S> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::info!(screen = S::TITLE, rows = rows.len(), "loaded data file");
    Ok(rows)
}

/// Load all screens concurrently.
pub async fn load_dataset(dir: &Path) -> Result<LoadReport> {
    if !tokio::fs::metadata(dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        bail!("data directory not found: {}", dir.display());
    }

    let (projects, commitments, organizations, questions) = tokio::join!(
        load_rows::<Project>(dir),
        load_rows::<Commitment>(dir),
        load_rows::<Organization>(dir),
        load_rows::<Question>(dir),
    );

    let mut report = LoadReport::default();
    report.dataset.projects = collect(projects, &mut report.errors);
    report.dataset.commitments = collect(commitments, &mut report.errors);
    report.dataset.organizations = collect(organizations, &mut report.errors);
    report.dataset.questions = collect(questions, &mut report.errors);
    Ok(report)
}

fn collect<S>(result: Result<Vec<S>>, errors: &mut Vec<String>) -> Vec<S> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "data file rejected");
            errors.push(format!("{e:#}"));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECTS: &str = r#"[
        {"id":1,"title":"Riverside park","organization":"Town of Elm","status":"pending",
         "amount_requested":1000.0,"submitted_at":"2024-03-01T09:00:00Z"},
        {"id":2,"title":"Library roof","organization":"Friends of the Library",
         "municipality":"Elm","status":"funded","amount_requested":250.0,
         "amount_committed":250.0,"submitted_at":"2024-02-11T09:00:00Z"}
    ]"#;

    #[tokio::test]
    async fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), PROJECTS).unwrap();

        let report = load_dataset(dir.path()).await.unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(report.dataset.projects.len(), 2);
        assert!(report.dataset.commitments.is_empty());
        assert!(report.dataset.questions.is_empty());
        assert_eq!(report.dataset.total_rows(), 2);
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), PROJECTS).unwrap();
        std::fs::write(dir.path().join("questions.json"), "{ not json").unwrap();

        let report = load_dataset(dir.path()).await.unwrap();
        assert_eq!(report.dataset.projects.len(), 2);
        assert!(report.dataset.questions.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("questions.json"));
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_dataset(&missing).await.is_err());
    }

    #[tokio::test]
    async fn load_rows_reads_single_screen() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), PROJECTS).unwrap();
        let rows = load_rows::<Project>(dir.path()).await.unwrap();
        assert_eq!(rows[1].municipality.as_deref(), Some("Elm"));
        assert_eq!(rows[0].amount_committed, 0.0);
    }
}
