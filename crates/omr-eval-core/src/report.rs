//! View models for presenting an evaluation.

use serde::Serialize;

use crate::domain::{
    subject_questions, EvaluationResult, SubjectScores, QUESTIONS_PER_SUBJECT, QUESTION_COUNT,
};

/// A result together with where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    /// Evaluated image.
    pub image: String,
    /// Model that produced the result.
    pub model: String,
    /// Completion time (RFC 3339).
    pub timestamp: String,
    /// The result itself.
    #[serde(flatten)]
    pub result: EvaluationResult,
}

/// One subject cell of the summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCell {
    /// Long label, e.g. `Subject 1 (1-20)`.
    pub label: String,
    /// Chart axis label, e.g. `Sub 1`.
    pub short_label: String,
    /// Raw subject score.
    pub score: i64,
    /// Score against the subject maximum, e.g. `5/20`.
    pub display: String,
}

/// Summary card: total plus five subject cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Total against the sheet maximum, e.g. `25/100`.
    pub total: String,
    /// Cells in subject order.
    pub subjects: Vec<SubjectCell>,
}

impl ScoreSummary {
    /// Builds the summary for a result.
    #[must_use]
    pub fn from_result(result: &EvaluationResult) -> Self {
        Self {
            total: format!("{}/{QUESTION_COUNT}", result.total_score),
            subjects: subject_cells(&result.subject_scores),
        }
    }
}

fn subject_cells(scores: &SubjectScores) -> Vec<SubjectCell> {
    scores
        .as_array()
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            let range = subject_questions(i);
            SubjectCell {
                label: format!("Subject {} ({}-{})", i + 1, range.start(), range.end()),
                short_label: format!("Sub {}", i + 1),
                score,
                display: format!("{score}/{QUESTIONS_PER_SUBJECT}"),
            }
        })
        .collect()
}

/// One bar of the subject chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// Axis label.
    pub label: String,
    /// Raw score.
    pub score: i64,
    /// Filled cells out of the chart width.
    pub filled: usize,
}

/// Scales subject scores to bars of `width` cells against a fixed max of 20.
///
/// Out-of-range scores are clamped to the axis.
#[must_use]
pub fn bar_chart(scores: &SubjectScores, width: usize) -> Vec<Bar> {
    subject_cells(scores)
        .into_iter()
        .map(|cell| {
            let clamped = usize::try_from(cell.score.max(0))
                .unwrap_or(usize::MAX)
                .min(QUESTIONS_PER_SUBJECT);
            Bar {
                label: cell.short_label,
                score: cell.score,
                filled: clamped * width / QUESTIONS_PER_SUBJECT,
            }
        })
        .collect()
}
