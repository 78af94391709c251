//! Human-readable result card.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use omr_eval_core::report::bar_chart;
use omr_eval_core::{EvaluationReport, ResultOutput, ScoreSummary};

/// Width of a full bar (a score of 20).
const BAR_WIDTH: usize = 20;
/// Answers per row in the answer grid.
const ANSWERS_PER_ROW: usize = 10;

/// Text output adapter: summary card, subject chart, optional answers.
pub struct TextOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    answers: bool,
}

impl TextOutput {
    /// Creates a text output writing to stdout.
    #[must_use]
    pub fn stdout(answers: bool) -> Self {
        Self::new(Box::new(io::stdout()), answers)
    }

    /// Creates a text output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, answers: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            answers,
        }
    }
}

impl ResultOutput for TextOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, report: &EvaluationReport) -> Result<()> {
        let text = render(report, self.answers);
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        write!(writer, "{text}")?;
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

/// Renders the full result card.
#[must_use]
pub fn render(report: &EvaluationReport, answers: bool) -> String {
    let summary = ScoreSummary::from_result(&report.result);
    let mut out = String::new();

    let _ = writeln!(out, "Evaluation Result: {} ({})", report.image, report.model);
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<18}{:>8}", "Total Score", summary.total);
    for cell in &summary.subjects {
        let _ = writeln!(out, "  {:<18}{:>8}", cell.label, cell.display);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Subject-wise Performance");
    for bar in bar_chart(&report.result.subject_scores, BAR_WIDTH) {
        let _ = writeln!(
            out,
            "  {:<6}{}{} {}",
            bar.label,
            "█".repeat(bar.filled),
            "░".repeat(BAR_WIDTH - bar.filled),
            bar.score
        );
    }

    if answers {
        let _ = writeln!(out);
        let _ = writeln!(out, "Detected Answers");
        out.push_str(&render_answers(&report.result.student_answers));
    }

    out
}

/// Renders answers as `q:letter` cells, ten per row.
#[must_use]
pub fn render_answers(answers: &[String]) -> String {
    let mut out = String::new();
    for (row, chunk) in answers.chunks(ANSWERS_PER_ROW).enumerate() {
        out.push(' ');
        for (col, answer) in chunk.iter().enumerate() {
            let question = row * ANSWERS_PER_ROW + col + 1;
            let _ = write!(out, " {:>8}", format!("{question}:{answer}"));
        }
        out.push('\n');
    }
    out
}
