use crate::loader::Dataset;
use crate::model::Organization;
use crate::table::aggregate::{count_by, count_where};
use crate::table::ColumnDef;

use super::{format_date, labelled_bool, Screen};

impl Screen for Organization {
    type Key = u64;

    const TITLE: &'static str = "Organizations";
    const FILE_NAME: &'static str = "organizations.json";

    fn key(&self) -> u64 {
        self.id
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::new("id", "ID")
                .accessor(|o: &Organization| o.id)
                .disable_hiding()
                .width(6),
            ColumnDef::new("name", "Name")
                .accessor(|o: &Organization| o.name.clone())
                .width(30),
            ColumnDef::new("kind", "Kind")
                .accessor(|o: &Organization| o.kind.as_str())
                .width(13),
            ColumnDef::new("email", "Contact")
                .accessor(|o: &Organization| o.contact_email.clone())
                .width(28),
            ColumnDef::new("verified", "Verified")
                .accessor(|o: &Organization| o.verified)
                .cell(|o| if o.verified { "yes" } else { "no" }.to_string())
                .filter_fn(labelled_bool("yes", "no"))
                .searchable(false)
                .width(8),
            ColumnDef::new("created", "Created")
                .accessor(|o: &Organization| o.created_at)
                .cell(|o| format_date(&o.created_at))
                .searchable(false)
                .width(11),
        ]
    }

    fn tally(rows: &[Self]) -> Vec<(String, usize)> {
        let mut tally: Vec<(String, usize)> = count_by(rows, |o| o.kind)
            .into_iter()
            .map(|(kind, n)| (kind.to_string(), n))
            .collect();
        tally.push(("unverified".to_string(), count_where(rows, |o| !o.verified)));
        tally
    }

    fn rows_from(dataset: &Dataset) -> Vec<Self> {
        dataset.organizations.clone()
    }
}
