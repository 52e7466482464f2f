use std::cmp::Reverse;

use hashbrown::{HashMap, HashSet};
use pubframe::GroupKey;
use serde::Serialize;

use crate::{
    common::{Field, GroupBy},
    PublicationTable,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub group: GroupKey,
    #[serde(rename = "num_pmids")]
    pub count: usize,
    #[serde(rename = "num_unique_pmids")]
    pub unique_count: usize,
    #[serde(rename = "proportion_pmids_open")]
    pub open_proportion: f64,
}

#[derive(Default)]
struct GroupAcc {
    count: usize,
    ids: HashSet<GroupKey>,
    open_ids: HashSet<GroupKey>,
}

impl GroupAcc {
    fn finish(self, group: GroupKey) -> AggregatedRow {
        let unique_count = self.ids.len();
        let open_proportion = if unique_count > 0 {
            self.open_ids.len() as f64 / unique_count as f64
        } else {
            0.0
        };
        AggregatedRow {
            group,
            count: self.count,
            unique_count,
            open_proportion,
        }
    }
}

//null group keys belong to no group, null ids count as rows only
pub fn aggregate(table: &PublicationTable, by: GroupBy) -> Vec<AggregatedRow> {
    let keys = table.column(by.field());
    let ids = table.column(Field::Pmid);
    let open = table.column(Field::OpenData);

    let mut groups: HashMap<GroupKey, GroupAcc> = HashMap::new();
    for i in 0..table.n_rows() {
        let key = keys.key(i);
        if key.is_null() {
            continue;
        }
        let acc = groups.entry(key).or_default();
        acc.count += 1;
        let id = ids.key(i);
        if id.is_null() {
            continue;
        }
        if open.truthy(i) {
            acc.open_ids.insert(id.clone());
        }
        acc.ids.insert(id);
    }

    let mut rows: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|(group, acc)| acc.finish(group))
        .collect();
    rows.sort_by(|a, b| a.group.cmp(&b.group));
    rows.sort_by_key(|r| Reverse(r.unique_count));
    rows
}
