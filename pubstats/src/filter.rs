use hashbrown::HashSet;
use pubframe::GroupKey;

use crate::{common::Field, PublicationTable};

pub type Selection = HashSet<GroupKey>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub years: Selection,
    pub organizations: Selection,
}

//always from the full table
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<GroupKey>,
    pub organizations: Vec<GroupKey>,
}

impl FilterOptions {
    pub fn from_table(table: &PublicationTable) -> Self {
        Self {
            years: table.distinct(Field::Year),
            organizations: table.distinct(Field::Organization),
        }
    }

    pub fn select_all(&self) -> FilterSelection {
        FilterSelection {
            years: self.years.iter().cloned().collect(),
            organizations: self.organizations.iter().cloned().collect(),
        }
    }

    //submitted values are matched on their option value, unknown ones are dropped
    pub fn select<S: AsRef<str>>(&self, years: &[S], organizations: &[S]) -> FilterSelection {
        FilterSelection {
            years: pick(&self.years, years),
            organizations: pick(&self.organizations, organizations),
        }
    }
}

pub const MISSING_MARKER: &str = "~";

//form value of an option, missing is the bare marker and text already starting
//with it gets the marker doubled, so no value is shared between two keys
pub fn option_value(key: &GroupKey) -> String {
    match key {
        GroupKey::Null => MISSING_MARKER.to_string(),
        GroupKey::Text(s) if s.starts_with(MISSING_MARKER) => format!("{}{}", MISSING_MARKER, s),
        k => k.to_string(),
    }
}

fn pick<S: AsRef<str>>(options: &[GroupKey], chosen: &[S]) -> Selection {
    let chosen: HashSet<&str> = chosen.iter().map(AsRef::as_ref).collect();
    options
        .iter()
        .filter(|o| chosen.contains(option_value(o).as_str()))
        .cloned()
        .collect()
}

pub fn filter_rows(table: &PublicationTable, constraints: &[(Field, &Selection)]) -> PublicationTable {
    let columns: Vec<_> = constraints
        .iter()
        .map(|(field, selection)| (table.column(*field), *selection))
        .collect();
    let frame = table
        .frame()
        .filter(|i| columns.iter().all(|(c, s)| s.contains(&c.key(i))));
    table.with_frame(frame)
}
