pub mod row;
pub mod writer;

pub use row::{header, ReportRow, BUSINESS_COLUMNS};
pub use writer::{write_report, CsvReportWriter};
