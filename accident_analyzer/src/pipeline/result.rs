use crate::file_processor::FileMetadata;
use crate::report::Report;
use std::time::Duration;

/// A report together with what was read to produce it
#[derive(Debug)]
pub struct PipelineResult {
    pub report: Report,
    pub file_metadata: FileMetadata,
    pub record_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        report: Report,
        file_metadata: FileMetadata,
        record_count: usize,
        processing_duration: Duration,
    ) -> Self {
        Self {
            report,
            file_metadata,
            record_count,
            processing_duration,
        }
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Accident file analysis completed",
            "file" => file_path,
            "status" => self.report.status.as_str(),
            "records" => self.record_count,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0),
            "records_per_sec" => format!("{:.0}",
                self.record_count as f64 / self.processing_duration.as_secs_f64().max(f64::EPSILON))
        );
    }
}
