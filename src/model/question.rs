use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A public question asked on a project page, with the organization's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub project_id: u64,
    pub asked_by: String,
    pub body: String,
    #[serde(default)]
    pub answer: Option<String>,
    pub asked_at: DateTime<Utc>,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: Option<&str>) -> Question {
        Question {
            id: 1,
            project_id: 2,
            asked_by: "resident".into(),
            body: "When does construction start?".into(),
            answer: answer.map(str::to_string),
            asked_at: "2024-05-01T08:00:00Z".parse().unwrap(),
            answered_at: None,
        }
    }

    #[test]
    fn blank_answer_is_unanswered() {
        assert!(!question(None).answered());
        assert!(!question(Some("   ")).answered());
        assert!(question(Some("In June.")).answered());
    }
}
