use serde::Serialize;
use tracing::debug;

use crate::{
    aggregate,
    common::{Field, GroupBy},
    filter::filter_rows,
    render_bar, AggregatedRow, ChartColors, FilterSelection, Metric, PublicationTable,
};

pub const UNIQUE_CHART_TITLE: &str = "Number of Unique PMIDs";
pub const OPEN_CHART_TITLE: &str = "Proportion of Open Data PMIDs";

const CHARTS: [(Metric, &str); 2] = [
    (Metric::UniqueCount, UNIQUE_CHART_TITLE),
    (Metric::OpenProportion, OPEN_CHART_TITLE),
];

trait ReportPage {
    const NAME: &'static str;
    const SLUG: &'static str;
    const TABLE_TITLE: &'static str;
    const GROUP_BY: GroupBy;
    const FILTER_ORGANIZATIONS: bool;
}

struct LeaderPage;
struct OrganizationPage;

impl ReportPage for LeaderPage {
    const NAME: &'static str = "PI Data";
    const SLUG: &'static str = "leader";
    const TABLE_TITLE: &'static str = "Filtered Data";
    const GROUP_BY: GroupBy = GroupBy::Leader;
    const FILTER_ORGANIZATIONS: bool = true;
}

impl ReportPage for OrganizationPage {
    const NAME: &'static str = "IC Data";
    const SLUG: &'static str = "organization";
    const TABLE_TITLE: &'static str = "Filtered Data by IC";
    const GROUP_BY: GroupBy = GroupBy::Organization;
    const FILTER_ORGANIZATIONS: bool = false;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Leader,
    Organization,
}

macro_rules! page_consts {
    ($($fn_name:ident => $c:ident: $t:ty),*) => {
        $(pub fn $fn_name(&self) -> $t {
            match self {
                Page::Leader => LeaderPage::$c,
                Page::Organization => OrganizationPage::$c,
            }
        })*
    };
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Leader, Page::Organization];

    page_consts!(
        name => NAME: &'static str,
        slug => SLUG: &'static str,
        table_title => TABLE_TITLE: &'static str,
        group_by => GROUP_BY: GroupBy,
        filters_organizations => FILTER_ORGANIZATIONS: bool
    );

    pub fn from_slug(slug: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub title: &'static str,
    #[serde(skip)]
    pub metric: Metric,
    pub svg: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub page: Page,
    pub table_title: &'static str,
    pub filtered_rows: usize,
    pub rows: Vec<AggregatedRow>,
    #[serde(skip)]
    pub charts: Vec<RenderedChart>,
}

pub fn filter_for_page(
    table: &PublicationTable,
    page: Page,
    selection: &FilterSelection,
) -> PublicationTable {
    if page.filters_organizations() {
        filter_rows(
            table,
            &[
                (Field::Year, &selection.years),
                (Field::Organization, &selection.organizations),
            ],
        )
    } else {
        filter_rows(table, &[(Field::Year, &selection.years)])
    }
}

pub fn build_report(
    table: &PublicationTable,
    page: Page,
    selection: &FilterSelection,
    colors: &ChartColors,
) -> Report {
    let filtered = filter_for_page(table, page, selection);
    let rows = aggregate(&filtered, page.group_by());
    let charts = CHARTS
        .iter()
        .map(|&(metric, title)| RenderedChart {
            title,
            metric,
            svg: render_bar(&rows, metric, title, colors),
        })
        .collect();
    debug!(
        "{} report: {} of {} rows, {} groups",
        page.name(),
        filtered.n_rows(),
        table.n_rows(),
        rows.len()
    );
    Report {
        page,
        table_title: page.table_title(),
        filtered_rows: filtered.n_rows(),
        rows,
        charts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterOptions;
    use pubframe::{Column, Frame, GroupKey};

    fn get_test_table() -> PublicationTable {
        let frame = Frame::new(vec![
            (
                "pmid".to_string(),
                Column::Int64(vec![Some(1), Some(1), Some(2), Some(3)]),
            ),
            (
                "journal_year".to_string(),
                Column::Int64(vec![Some(2020), Some(2020), Some(2020), Some(2021)]),
            ),
            (
                "organization_name".to_string(),
                Column::Text(vec![
                    Some("NCI".into()),
                    Some("NIA".into()),
                    Some("NCI".into()),
                    Some("NIA".into()),
                ]),
            ),
            (
                "contact_pi_project_leader".to_string(),
                Column::Text(vec![
                    Some("X".into()),
                    Some("Y".into()),
                    Some("X".into()),
                    Some("Y".into()),
                ]),
            ),
            (
                "open_data".to_string(),
                Column::Boolean(vec![Some(true), Some(true), Some(false), Some(false)]),
            ),
        ])
        .unwrap();
        PublicationTable::new(frame).unwrap()
    }

    #[test]
    fn page_slugs() {
        assert_eq!(Page::from_slug("organization"), Some(Page::Organization));
        assert_eq!(Page::from_slug("nope"), None);
        assert_eq!(Page::default().name(), "PI Data");
        assert_eq!(Page::Organization.table_title(), "Filtered Data by IC");
    }

    #[test]
    fn leader_page_filters_orgs() {
        let table = get_test_table();
        let options = FilterOptions::from_table(&table);
        let sel = options.select(&["2020", "2021"], &["NCI"]);
        let report = build_report(&table, Page::Leader, &sel, &ChartColors::Fixed);
        assert_eq!(report.filtered_rows, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].group, GroupKey::from("X"));
        assert_eq!(report.charts.len(), 2);
        assert_eq!(report.charts[0].title, UNIQUE_CHART_TITLE);
    }

    #[test]
    fn org_page_ignores_org_selection() {
        let table = get_test_table();
        let options = FilterOptions::from_table(&table);
        let sel = options.select::<&str>(&["2020"], &[]);
        let report = build_report(&table, Page::Organization, &sel, &ChartColors::Fixed);
        assert_eq!(report.filtered_rows, 3);
        let groups: Vec<String> = report.rows.iter().map(|r| r.group.to_string()).collect();
        assert_eq!(groups, vec!["NCI", "NIA"]);
        assert_eq!(report.rows[0].unique_count, 2);
        assert_eq!(report.rows[0].open_proportion, 0.5);
    }

    #[test]
    fn missing_year_gives_empty_report() {
        let table = get_test_table();
        let options = FilterOptions::from_table(&table);
        let sel = FilterSelection {
            years: [GroupKey::Int(1999)].into_iter().collect(),
            ..options.select_all()
        };
        for page in Page::ALL {
            let report = build_report(&table, page, &sel, &ChartColors::Fixed);
            assert_eq!(report.filtered_rows, 0);
            assert!(report.rows.is_empty());
            assert!(!report.charts[1].svg.contains(r#"class="bar""#));
        }
    }
}
