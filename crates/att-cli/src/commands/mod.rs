//! CLI subcommand implementations.

pub mod export;
pub mod mark;
pub mod ocr;
pub mod report;
pub mod subject;
pub mod timetable;
pub mod today;
pub mod util;
