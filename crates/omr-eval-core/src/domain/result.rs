//! Evaluation result returned by the model.

use std::ops::RangeInclusive;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use tracing::warn;

use super::{QUESTIONS_PER_SUBJECT, SUBJECT_COUNT};

/// Field names of the five subtotals, in subject order.
pub const SUBJECT_FIELDS: [&str; SUBJECT_COUNT] =
    ["subject1", "subject2", "subject3", "subject4", "subject5"];

/// Correct-answer counts per subject, each expected in `0..=20`.
///
/// Decoding is lenient: a missing subtotal reads as 0, and any JSON number
/// is accepted (see [`EvaluationResult`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScores {
    /// Questions 1-20.
    #[serde(default, deserialize_with = "lenient_score")]
    pub subject1: i64,
    /// Questions 21-40.
    #[serde(default, deserialize_with = "lenient_score")]
    pub subject2: i64,
    /// Questions 41-60.
    #[serde(default, deserialize_with = "lenient_score")]
    pub subject3: i64,
    /// Questions 61-80.
    #[serde(default, deserialize_with = "lenient_score")]
    pub subject4: i64,
    /// Questions 81-100.
    #[serde(default, deserialize_with = "lenient_score")]
    pub subject5: i64,
}

impl SubjectScores {
    /// Creates scores from five subtotals in subject order.
    #[must_use]
    pub const fn new(scores: [i64; SUBJECT_COUNT]) -> Self {
        let [subject1, subject2, subject3, subject4, subject5] = scores;
        Self {
            subject1,
            subject2,
            subject3,
            subject4,
            subject5,
        }
    }

    /// Subtotals in subject order.
    #[must_use]
    pub const fn as_array(&self) -> [i64; SUBJECT_COUNT] {
        [
            self.subject1,
            self.subject2,
            self.subject3,
            self.subject4,
            self.subject5,
        ]
    }

    /// Sum of all subtotals, or `None` if it does not fit in an `i64`.
    #[must_use]
    pub fn sum(&self) -> Option<i64> {
        self.as_array()
            .iter()
            .try_fold(0_i64, |acc, score| acc.checked_add(*score))
    }
}

/// 1-based question numbers covered by the subject at `index` (0-based).
#[must_use]
pub const fn subject_questions(index: usize) -> RangeInclusive<usize> {
    let first = index * QUESTIONS_PER_SUBJECT + 1;
    first..=first + QUESTIONS_PER_SUBJECT - 1
}

/// Complete, shape-valid evaluation of one answer sheet.
///
/// Deserialization accepts anything the structural check accepts. Scores
/// may be any JSON number: integral floats such as `25.0` are exact,
/// fractional ones are rounded, and values past `i64` saturate. Numeric
/// strings are read as numbers and other values as 0. Answers that are not
/// strings keep their JSON text, so they surface as illegal answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Per-subject subtotals.
    pub subject_scores: SubjectScores,
    /// Overall score, expected in `0..=100`.
    #[serde(deserialize_with = "lenient_score")]
    pub total_score: i64,
    /// Detected mark per question: `A`-`D` or `N/A`.
    #[serde(deserialize_with = "lenient_answers")]
    pub student_answers: Vec<String>,
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Value::deserialize(deserializer).map(|value| score_from_value(&value))
}

fn lenient_answers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| match value {
            Value::String(answer) => answer,
            other => other.to_string(),
        })
        .collect())
}

fn score_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => score_from_number(number),
        Value::String(text) => {
            if let Ok(number) = text.trim().parse::<f64>() {
                score_from_float(number)
            } else {
                warn!(value = %text, "non-numeric score read as 0");
                0
            }
        }
        other => {
            warn!(value = %other, "non-numeric score read as 0");
            0
        }
    }
}

fn score_from_number(number: &Number) -> i64 {
    if let Some(score) = number.as_i64() {
        score
    } else if number.is_u64() {
        i64::MAX
    } else {
        number.as_f64().map_or(0, score_from_float)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn score_from_float(score: f64) -> i64 {
    if score.fract() != 0.0 {
        warn!(score, "fractional score rounded");
    }
    // Float-to-int casts saturate and map NaN to 0.
    score.round() as i64
}
