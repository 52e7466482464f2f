//bar charts as standalone svg markup
//category ticks are left out on purpose, there are too many groups to label,
//every bar carries its category and value as a hover title instead

use std::fmt::Write;

use crate::AggregatedRow;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 20.0;
const Y_TICKS: usize = 4;
const BAR_FILL: f64 = 0.8;

pub const FIXED_BAR_COLOR: &str = "#636efa";
pub const FIXED_BACKGROUND: &str = "#ffffff";
const AXIS_COLOR: &str = "#888888";

#[derive(Debug, Clone, PartialEq)]
pub enum ChartColors {
    Fixed,
    Theme { primary: String, background: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Count,
    UniqueCount,
    OpenProportion,
}

impl ChartColors {
    pub fn bar(&self) -> &str {
        match self {
            ChartColors::Fixed => FIXED_BAR_COLOR,
            ChartColors::Theme { primary, .. } => primary,
        }
    }

    pub fn background(&self) -> &str {
        match self {
            ChartColors::Fixed => FIXED_BACKGROUND,
            ChartColors::Theme { background, .. } => background,
        }
    }
}

impl Metric {
    pub fn value(&self, row: &AggregatedRow) -> f64 {
        match self {
            Metric::Count => row.count as f64,
            Metric::UniqueCount => row.unique_count as f64,
            Metric::OpenProportion => row.open_proportion,
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Count => "num_pmids",
            Metric::UniqueCount => "num_unique_pmids",
            Metric::OpenProportion => "proportion_pmids_open",
        }
    }

    pub fn format(&self, v: f64) -> String {
        match self {
            Metric::OpenProportion => format!("{:.3}", v),
            _ => format!("{}", v as u64),
        }
    }
}

pub fn render_bar(rows: &[AggregatedRow], metric: Metric, title: &str, colors: &ChartColors) -> String {
    let mut bars: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (r.group.to_string(), metric.value(r)))
        .collect();
    bars.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top = bars.iter().map(|b| b.1).fold(0.0, f64::max);
    let top = if top > 0.0 { top } else { 1.0 };
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let base_y = MARGIN_TOP + plot_h;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="100%" role="img">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r#"<rect width="{}" height="{}" fill="{}"/>"#,
        WIDTH,
        HEIGHT,
        escape_markup(colors.background())
    );
    let _ = write!(
        svg,
        r#"<text class="chart-title" x="{}" y="24" font-size="16">{}</text>"#,
        MARGIN_LEFT,
        escape_markup(title)
    );

    for t in 0..=Y_TICKS {
        let v = top * t as f64 / Y_TICKS as f64;
        let y = base_y - plot_h * t as f64 / Y_TICKS as f64;
        let _ = write!(
            svg,
            r#"<line x1="{x0}" x2="{x1}" y1="{y:.1}" y2="{y:.1}" stroke="{c}" stroke-width="0.3"/><text x="{tx}" y="{ty:.1}" font-size="11" text-anchor="end">{label}</text>"#,
            x0 = MARGIN_LEFT,
            x1 = WIDTH - MARGIN_RIGHT,
            y = y,
            c = AXIS_COLOR,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = tick_label(metric, v)
        );
    }
    let _ = write!(
        svg,
        r#"<text x="14" y="{y:.1}" font-size="12" transform="rotate(-90 14 {y:.1})" text-anchor="middle">{t}</text>"#,
        y = MARGIN_TOP + plot_h / 2.0,
        t = escape_markup(title)
    );

    if !bars.is_empty() {
        let slot = plot_w / bars.len() as f64;
        for (i, (label, v)) in bars.iter().enumerate() {
            let h = plot_h * v / top;
            let _ = write!(
                svg,
                r#"<rect class="bar" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{c}"><title>{label}: {value}</title></rect>"#,
                x = MARGIN_LEFT + slot * i as f64 + slot * (1.0 - BAR_FILL) / 2.0,
                y = base_y - h,
                w = slot * BAR_FILL,
                h = h,
                c = escape_markup(colors.bar()),
                label = escape_markup(label),
                value = metric.format(*v)
            );
        }
    }
    let _ = write!(
        svg,
        r#"<line x1="{x0}" x2="{x1}" y1="{y}" y2="{y}" stroke="{c}"/></svg>"#,
        x0 = MARGIN_LEFT,
        x1 = WIDTH - MARGIN_RIGHT,
        y = base_y,
        c = AXIS_COLOR
    );
    svg
}

fn tick_label(metric: Metric, v: f64) -> String {
    match metric {
        Metric::OpenProportion => format!("{:.2}", v),
        _ if v.fract() == 0.0 => format!("{}", v as u64),
        _ => format!("{:.1}", v),
    }
}

pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubframe::GroupKey;

    fn row(name: &str, unique_count: usize, open_proportion: f64) -> AggregatedRow {
        AggregatedRow {
            group: GroupKey::from(name),
            count: unique_count + 1,
            unique_count,
            open_proportion,
        }
    }

    #[test]
    fn empty_chart() {
        let svg = render_bar(&[], Metric::UniqueCount, "Number of Unique PMIDs", &ChartColors::Fixed);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Number of Unique PMIDs"));
        assert!(!svg.contains(r#"class="bar""#));
    }

    #[test]
    fn bars_descend_by_value() {
        let rows = vec![row("low", 1, 0.9), row("high", 5, 0.1), row("mid", 3, 0.5)];
        let svg = render_bar(&rows, Metric::OpenProportion, "Open", &ChartColors::Fixed);
        let pos = |s: &str| svg.find(s).unwrap();
        assert!(pos("<title>low: 0.900") < pos("<title>mid: 0.500"));
        assert!(pos("<title>mid: 0.500") < pos("<title>high: 0.100"));

        let svg = render_bar(&rows, Metric::UniqueCount, "Unique", &ChartColors::Fixed);
        let pos = |s: &str| svg.find(s).unwrap();
        assert!(pos("<title>high: 5") < pos("<title>mid: 3"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 3);
    }

    #[test]
    fn categories_only_in_tooltips() {
        let rows = vec![row("Dr. Who", 2, 0.0)];
        let svg = render_bar(&rows, Metric::UniqueCount, "Unique", &ChartColors::Fixed);
        assert_eq!(svg.matches("Dr. Who").count(), 1);
        assert!(!svg.contains("legend"));
    }

    #[test]
    fn colors_follow_theme() {
        let rows = vec![row("a", 1, 0.0)];
        let theme = ChartColors::Theme {
            primary: "#ff4b4b".to_string(),
            background: "#0e1117".to_string(),
        };
        let svg = render_bar(&rows, Metric::UniqueCount, "t", &theme);
        assert!(svg.contains(r##"fill="#ff4b4b""##));
        assert!(svg.contains(r##"fill="#0e1117""##));
        let fixed = render_bar(&rows, Metric::UniqueCount, "t", &ChartColors::Fixed);
        assert!(fixed.contains(FIXED_BAR_COLOR));
    }

    #[test]
    fn escapes_labels() {
        let rows = vec![row("<A&B>", 1, 0.0)];
        let svg = render_bar(&rows, Metric::UniqueCount, "t", &ChartColors::Fixed);
        assert!(svg.contains("&lt;A&amp;B&gt;"));
    }
}
