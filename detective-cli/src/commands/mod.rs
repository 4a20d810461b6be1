pub mod analyze;
pub mod why;
