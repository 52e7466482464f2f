pub mod aggregate;
pub mod chart;
pub mod common;
mod error;
pub mod filter;
pub mod loader;
pub mod report;

pub use aggregate::{aggregate, AggregatedRow};
pub use chart::{escape_markup, render_bar, ChartColors, Metric};
pub use common::{Field, GroupBy, DEFAULT_DATA_PATH};
pub use error::StatsError;
pub use filter::{option_value, FilterOptions, FilterSelection, Selection, MISSING_MARKER};
pub use loader::{load_data, DataCache, PublicationTable};
pub use report::{build_report, Page, RenderedChart, Report};
