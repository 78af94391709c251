//! Result output port for writing evaluation reports.

use crate::report::EvaluationReport;

/// Port for outputting evaluation reports.
pub trait ResultOutput: Send + Sync {
    /// Writes a single report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &EvaluationReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
