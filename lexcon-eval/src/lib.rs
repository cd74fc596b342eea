//! Offline evaluation of constrained generation runs.
//!
//! Reads the JSON lines result files a generation run writes, checks every
//! output against the constraint it was generated with and reports accuracy
//! and latency per run.

pub mod config;
pub mod descriptor;
pub mod errors;
pub mod evaluator;
pub mod metrics;
pub mod records;


pub use config::LexconEvalConfig;
pub use descriptor::RunDescriptor;
pub use errors::EvalError;
pub use evaluator::Evaluator;
pub use metrics::{evaluate_records, render_table, EvaluationMode, FileMetrics, ReportRow};
pub use records::{parse_records, read_records, GenerationRecord};
