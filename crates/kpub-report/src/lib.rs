//! kpub report - Markdown lists, overview page, CSV spreadsheet, SVG charts

pub mod chart;
pub mod markdown;
pub mod plot;
pub mod spreadsheet;

pub use chart::{
    Series, extrapolate, fraction_of_year_passed, line_chart, pie_chart, publication_rate_chart,
};
pub use markdown::{ListOptions, Overview, Reporter, capitalize, group_label};
pub use plot::{PlotOptions, plot_all};
pub use spreadsheet::{
    SPREADSHEET_NAME, SpreadsheetRow, citations_per_year, parse_pubdate, save_spreadsheet,
    write_spreadsheet,
};
