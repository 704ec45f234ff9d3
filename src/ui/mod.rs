pub mod layout;
pub mod theme;

use clap::ValueEnum;

/// One tab per admin screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tab {
    Projects,
    Commitments,
    Organizations,
    Questions,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Projects,
        Tab::Commitments,
        Tab::Organizations,
        Tab::Questions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Projects => "1:Projects",
            Tab::Commitments => "2:Commitments",
            Tab::Organizations => "3:Organizations",
            Tab::Questions => "4:Questions",
        }
    }

    /// Stem used for export file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Projects => "projects",
            Tab::Commitments => "commitments",
            Tab::Organizations => "organizations",
            Tab::Questions => "questions",
        }
    }

    pub fn from_index(i: usize) -> Option<Tab> {
        Tab::ALL.get(i).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Projects => 0,
            Tab::Commitments => 1,
            Tab::Organizations => 2,
            Tab::Questions => 3,
        }
    }
}

/// Where key events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    FilterBar,
    ColumnSelector,
}
