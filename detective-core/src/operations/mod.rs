pub mod analyze;
pub mod why;

pub use analyze::{AnalyzeOptions, REPORT_FILE, analyze, write_report};
pub use why::{WhyMatch, WhyResult, why};
