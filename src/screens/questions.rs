use crate::loader::Dataset;
use crate::model::Question;
use crate::table::aggregate::count_where;
use crate::table::ColumnDef;

use super::{format_date, labelled_bool, Screen};

impl Screen for Question {
    type Key = u64;

    const TITLE: &'static str = "Questions";
    const FILE_NAME: &'static str = "questions.json";

    fn key(&self) -> u64 {
        self.id
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::new("id", "ID")
                .accessor(|q: &Question| q.id)
                .disable_hiding()
                .width(6),
            ColumnDef::new("project_id", "Project")
                .accessor(|q: &Question| q.project_id)
                .width(8),
            ColumnDef::new("asked_by", "Asked by")
                .accessor(|q: &Question| q.asked_by.clone())
                .width(18),
            ColumnDef::new("body", "Question")
                .accessor(|q: &Question| q.body.clone())
                .disable_sorting()
                .disable_filter()
                .width(40),
            ColumnDef::new("answered", "Answered")
                .accessor(|q: &Question| q.answered())
                .cell(|q| if q.answered() { "yes" } else { "open" }.to_string())
                .filter_fn(labelled_bool("yes", "open"))
                .searchable(false)
                .width(8),
            ColumnDef::new("answer", "Answer")
                .accessor(|q: &Question| q.answer.clone())
                .disable_sorting()
                .width(40),
            ColumnDef::new("asked", "Asked")
                .accessor(|q: &Question| q.asked_at)
                .cell(|q| format_date(&q.asked_at))
                .searchable(false)
                .width(11),
        ]
    }

    fn tally(rows: &[Self]) -> Vec<(String, usize)> {
        let answered = count_where(rows, Question::answered);
        vec![
            ("answered".to_string(), answered),
            ("open".to_string(), rows.len() - answered),
        ]
    }

    fn rows_from(dataset: &Dataset) -> Vec<Self> {
        dataset.questions.clone()
    }
}
