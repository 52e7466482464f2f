use std::{fs::File, sync::Arc};

use arrow::{
    array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;
use rand::{rngs::StdRng, Rng, SeedableRng};

use pubframe::{Column, Frame, GroupKey, MissingPolicy, OptimizeOptions};
use pubstats::{
    aggregate, build_report, ChartColors, DataCache, FilterOptions, GroupBy, Page,
    PublicationTable,
};

const ORGS: [&str; 4] = ["NCI", "NIA", "NHLBI", "NIMH"];
const LEADERS: [&str; 6] = ["Ada", "Bo", "Cy", "Di", "Ed", "Flo"];

fn random_table(rng: &mut StdRng, n: usize) -> PublicationTable {
    let mut pmids = Vec::new();
    let mut years = Vec::new();
    let mut orgs = Vec::new();
    let mut leaders = Vec::new();
    let mut open = Vec::new();
    for _ in 0..n {
        pmids.push(if rng.gen_bool(0.05) { None } else { Some(rng.gen_range(0..40)) });
        years.push(Some(rng.gen_range(2018..2023)));
        orgs.push(Some(ORGS[rng.gen_range(0..ORGS.len())].to_string()));
        leaders.push(Some(LEADERS[rng.gen_range(0..LEADERS.len())].to_string()));
        open.push(if rng.gen_bool(0.1) { None } else { Some(rng.gen_bool(0.4)) });
    }
    let frame = Frame::new(vec![
        ("pmid".to_string(), Column::Int64(pmids)),
        ("journal_year".to_string(), Column::Int64(years)),
        ("organization_name".to_string(), Column::Text(orgs)),
        ("contact_pi_project_leader".to_string(), Column::Text(leaders)),
        ("open_data".to_string(), Column::Boolean(open)),
    ])
    .unwrap();
    PublicationTable::new(frame).unwrap()
}

#[test]
fn aggregation_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [0, 1, 5, 50, 500] {
        let table = random_table(&mut rng, n);
        for by in [GroupBy::Leader, GroupBy::Organization] {
            let rows = aggregate(&table, by);
            let total: usize = rows.iter().map(|r| r.count).sum();
            assert_eq!(total, n, "every row lands in one group");
            for r in rows.iter() {
                assert!(r.unique_count <= r.count);
                assert!((0.0..=1.0).contains(&r.open_proportion));
                if r.unique_count == 0 {
                    assert_eq!(r.open_proportion, 0.0);
                }
            }
            for w in rows.windows(2) {
                assert!(w[0].unique_count >= w[1].unique_count);
            }
        }
    }
}

#[test]
fn narrowing_does_not_change_reports() {
    let mut rng = StdRng::seed_from_u64(7);
    let table = random_table(&mut rng, 300);
    let optimized = PublicationTable::new(pubframe::optimize_frame(
        table.frame().clone(),
        &OptimizeOptions {
            missing: MissingPolicy::KeepNull,
        },
    ))
    .unwrap();
    let options = FilterOptions::from_table(&table);
    assert_eq!(options, FilterOptions::from_table(&optimized));
    let sel = options.select(&["2019", "2020"], &["NCI", "NIMH"]);
    for page in Page::ALL {
        let plain = build_report(&table, page, &sel, &ChartColors::Fixed);
        let narrow = build_report(&optimized, page, &sel, &ChartColors::Fixed);
        assert_eq!(plain.rows, narrow.rows);
    }
}

#[test]
fn float_flags_survive_narrowing() {
    let frame = Frame::new(vec![
        ("pmid".to_string(), Column::Int64(vec![Some(1), Some(2)])),
        ("journal_year".to_string(), Column::Int64(vec![Some(2020), Some(2020)])),
        (
            "organization_name".to_string(),
            Column::Text(vec![Some("NCI".into()), Some("NCI".into())]),
        ),
        (
            "contact_pi_project_leader".to_string(),
            Column::Text(vec![Some("X".into()), Some("X".into())]),
        ),
        ("open_data".to_string(), Column::Float64(vec![Some(1.0), Some(0.0)])),
    ])
    .unwrap();
    let plain = PublicationTable::new(frame.clone()).unwrap();
    let optimized =
        PublicationTable::new(pubframe::optimize_frame(frame, &OptimizeOptions::default())).unwrap();
    let plain_rows = aggregate(&plain, GroupBy::Leader);
    assert_eq!(plain_rows[0].open_proportion, 0.5);
    assert_eq!(plain_rows, aggregate(&optimized, GroupBy::Leader));
}

#[test]
fn cache_reads_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_ics.parquet");
    let batch = RecordBatch::try_from_iter(vec![
        ("pmid", Arc::new(Int64Array::from(vec![1, 1, 2])) as ArrayRef),
        (
            "journal_year",
            Arc::new(Float64Array::from(vec![2020.0, 2020.0, 2020.0])) as ArrayRef,
        ),
        (
            "organization_name",
            Arc::new(StringArray::from(vec!["A", "A", "A"])) as ArrayRef,
        ),
        (
            "contact_pi_project_leader",
            Arc::new(StringArray::from(vec!["X", "X", "X"])) as ArrayRef,
        ),
        (
            "open_data",
            Arc::new(BooleanArray::from(vec![true, true, false])) as ArrayRef,
        ),
    ])
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let cache = DataCache::new(&path, Some(OptimizeOptions::default()));
    let first = cache.get().unwrap();
    std::fs::remove_file(&path).unwrap();
    let second = cache.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let rows = aggregate(&second, GroupBy::Leader);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].group, GroupKey::from("X"));
    assert_eq!((rows[0].count, rows[0].unique_count), (3, 2));
    assert_eq!(rows[0].open_proportion, 0.5);
}

#[test]
fn year_outside_data() {
    let mut rng = StdRng::seed_from_u64(1);
    let table = random_table(&mut rng, 100);
    let options = FilterOptions::from_table(&table);
    let sel = options.select(&["2031"], &["NCI"]);
    assert!(sel.years.is_empty());
    let report = build_report(&table, Page::Organization, &sel, &ChartColors::Fixed);
    assert_eq!(report.filtered_rows, 0);
    assert!(report.rows.is_empty());
}
