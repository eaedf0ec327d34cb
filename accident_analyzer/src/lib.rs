//! Staged validation and aggregation of traffic accident records
//!
//! Records flow through field classification, format validation, coherence
//! validation with a per-run lookup table, and report generation. The
//! [`batch`] module runs the same pipeline over every file in a directory.

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod semantic_analysis;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use batch::{BatchConfig, BatchError, BatchResults};
pub use pipeline::{analyze_records, AccidentAnalyzer, PipelineError, PipelineResult};
pub use records::RawRecord;
pub use report::{Report, ReportStatus};
