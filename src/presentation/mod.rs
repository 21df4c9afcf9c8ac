pub mod display;
pub mod report;

pub use display::{
    format_csv_written, format_search_header, format_total, spinner, ConsoleReporter,
};
pub use report::{write_csv, CSV_HEADER};
