pub mod commitment;
pub mod filter;
pub mod organization;
pub mod project;
pub mod question;

pub use commitment::Commitment;
pub use organization::Organization;
pub use project::{Project, ProjectStatus};
pub use question::Question;
