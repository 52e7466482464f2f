pub const DEFAULT_DATA_PATH: &str = "data/all_ics.parquet";

pub const PMID: &str = "pmid";
pub const JOURNAL_YEAR: &str = "journal_year";
pub const ORGANIZATION: &str = "organization_name";
pub const LEADER: &str = "contact_pi_project_leader";
pub const OPEN_DATA: &str = "open_data";

pub const REQUIRED_FIELDS: [Field; 5] = [
    Field::Pmid,
    Field::Year,
    Field::Organization,
    Field::Leader,
    Field::OpenData,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pmid,
    Year,
    Organization,
    Leader,
    OpenData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Leader,
    Organization,
}

impl Field {
    pub const fn column_name(&self) -> &'static str {
        match self {
            Field::Pmid => PMID,
            Field::Year => JOURNAL_YEAR,
            Field::Organization => ORGANIZATION,
            Field::Leader => LEADER,
            Field::OpenData => OPEN_DATA,
        }
    }

    pub(crate) const fn slot(&self) -> usize {
        *self as usize
    }
}

impl GroupBy {
    pub const fn field(&self) -> Field {
        match self {
            GroupBy::Leader => Field::Leader,
            GroupBy::Organization => Field::Organization,
        }
    }
}
