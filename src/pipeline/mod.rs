pub mod extraction;
pub mod risk;
pub mod processor;

pub use processor::{
    process_report, render_display, report_id_from_path, BatchReport, ExtractionResult,
    ProcessingError, ReportProcessor,
};
