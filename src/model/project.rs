use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of a funding project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Approved,
    Rejected,
    Funded,
}

impl ProjectStatus {
    /// Review lifecycle order.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::Approved,
        ProjectStatus::Rejected,
        ProjectStatus::Funded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Rejected => "rejected",
            ProjectStatus::Funded => "funded",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project submitted by an organization for municipal funding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub organization: String,
    #[serde(default)]
    pub municipality: Option<String>,
    pub status: ProjectStatus,
    pub amount_requested: f64,
    #[serde(default)]
    pub amount_committed: f64,
    pub submitted_at: DateTime<Utc>,
}

impl Project {
    /// Committed share of the requested amount, `None` when nothing was requested.
    pub fn funding_progress(&self) -> Option<f64> {
        if self.amount_requested > 0.0 {
            Some(self.amount_committed / self.amount_requested)
        } else {
            None
        }
    }
}
