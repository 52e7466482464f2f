use std::fmt::Write;

use pubframe::GroupKey;
use pubstats::{
    escape_markup, option_value, ChartColors, FilterOptions, FilterSelection, Metric, Page, Report,
    Selection,
};

use crate::gate::LOGIN_ERROR;

const MISSING_LABEL: &str = "(missing)";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:260px;padding:16px;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:16px 32px}\
select{width:100%}\
table{border-collapse:collapse;font-size:13px}\
td,th{border:1px solid #ddd;padding:3px 8px}\
td.num{text-align:right}\
.scroll{max-height:360px;overflow:auto;margin-bottom:24px}\
.error{color:#b00020;background:#fde7e9;padding:8px}";

fn page_shell(title: &str, background: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}main{{background:{}}}</style></head><body>{}</body></html>",
        escape_markup(title),
        STYLE,
        escape_markup(background),
        body
    )
}

pub fn render_login(show_error: bool, username: Option<&str>) -> String {
    let mut body = String::from("<main><h2>Log in</h2>");
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/login\">\
<p><label>Username<br><input name=\"username\" value=\"{}\" autocomplete=\"username\"></label></p>\
<p><label>Password<br><input name=\"password\" type=\"password\" autocomplete=\"current-password\"></label></p>\
<p><button type=\"submit\">Log in</button></p></form>",
        escape_markup(username.unwrap_or_default())
    );
    if show_error {
        let _ = write!(body, "<p class=\"error\">&#x1F615; {}</p>", LOGIN_ERROR);
    }
    body.push_str("</main>");
    page_shell("Log in", "#ffffff", &body)
}

fn option_label(key: &GroupKey) -> String {
    match key {
        GroupKey::Null => MISSING_LABEL.to_string(),
        k => k.to_string(),
    }
}

fn multiselect(name: &str, label: &str, options: &[GroupKey], chosen: &Selection) -> String {
    let mut out = format!(
        "<p><label>{}<br><select name=\"{}\" multiple size=\"8\">",
        escape_markup(label),
        name
    );
    for o in options {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            escape_markup(&option_value(o)),
            if chosen.contains(o) { " selected" } else { "" },
            escape_markup(&option_label(o))
        );
    }
    out.push_str("</select></label></p>");
    out
}

fn sidebar(page: Page, options: &FilterOptions, selection: &FilterSelection, gated: bool) -> String {
    let mut out = String::from("<aside><form method=\"get\" action=\"/\"><p><label>Select a Page:<br><select name=\"page\" onchange=\"this.form.submit()\">");
    for p in Page::ALL {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            p.slug(),
            if p == page { " selected" } else { "" },
            p.name()
        );
    }
    out.push_str("</select></label></p></form><h3>Filters</h3><form method=\"get\" action=\"/\">");
    let _ = write!(
        out,
        "<input type=\"hidden\" name=\"page\" value=\"{}\"><input type=\"hidden\" name=\"filtered\" value=\"1\">",
        page.slug()
    );
    out.push_str(&multiselect("year", "Year", &options.years, &selection.years));
    if page.filters_organizations() {
        out.push_str(&multiselect(
            "org",
            "IC (Organization)",
            &options.organizations,
            &selection.organizations,
        ));
    }
    out.push_str("<p><button type=\"submit\">Apply</button></p></form>");
    if gated {
        out.push_str("<form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>");
    }
    out.push_str("</aside>");
    out
}

fn report_table(report: &Report) -> String {
    let mut out = format!(
        "<h3>{}</h3><div class=\"scroll\"><table><thead><tr><th>{}</th>",
        report.table_title,
        report.page.group_by().field().column_name()
    );
    for m in [Metric::Count, Metric::UniqueCount, Metric::OpenProportion] {
        let _ = write!(out, "<th>{}</th>", m.column_name());
    }
    out.push_str("</tr></thead><tbody>");
    for row in report.rows.iter() {
        let _ = write!(
            out,
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{:.4}</td></tr>",
            escape_markup(&row.group.to_string()),
            row.count,
            row.unique_count,
            row.open_proportion
        );
    }
    out.push_str("</tbody></table></div>");
    out
}

pub fn render_dashboard(
    report: &Report,
    options: &FilterOptions,
    selection: &FilterSelection,
    colors: &ChartColors,
    gated: bool,
) -> String {
    let mut body = sidebar(report.page, options, selection, gated);
    body.push_str("<main>");
    body.push_str(&report_table(report));
    for chart in report.charts.iter() {
        let _ = write!(body, "<figure>{}</figure>", chart.svg);
    }
    body.push_str("</main>");
    page_shell(report.page.name(), colors.background(), &body)
}
