//! Response parsing and validation.
//!
//! The structural check mirrors the three required top-level fields and is
//! independent of any provider's schema mechanism.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::domain::{
    EvaluationResult, OPTIONS, QUESTIONS_PER_SUBJECT, QUESTION_COUNT, SUBJECT_FIELDS, UNANSWERED,
};
use crate::error::EvaluationError;

/// How much of the result to trust once it has the right shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
    /// Accept any shape-valid result; inconsistencies are only logged.
    #[default]
    Permissive,
    /// Reject results whose scores or answers are inconsistent.
    Strict,
}

/// Parses model output into a result.
///
/// # Errors
///
/// Returns [`EvaluationError::InvalidFormat`] if the text is not JSON of the
/// expected shape, and [`EvaluationError::Inconsistent`] under
/// [`Validation::Strict`] when the numbers do not add up.
pub fn parse_evaluation(
    text: &str,
    validation: Validation,
) -> Result<EvaluationResult, EvaluationError> {
    let text = text.trim();
    let (value, result) = decode(text).map_err(|reason| {
        error!(%reason, response = text, "invalid response format");
        EvaluationError::invalid_format(reason)
    })?;

    let mut issues = missing_subjects(&value);
    issues.extend(consistency_issues(&result));
    if !issues.is_empty() {
        match validation {
            Validation::Permissive => {
                for issue in &issues {
                    warn!("evaluation result inconsistent: {issue}");
                }
            }
            Validation::Strict => {
                error!(?issues, response = text, "evaluation result rejected");
                return Err(EvaluationError::Inconsistent { issues });
            }
        }
    }

    Ok(result)
}

fn decode(text: &str) -> Result<(Value, EvaluationResult), String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("not JSON: {e}"))?;
    check_shape(&value)?;
    let result = EvaluationResult::deserialize(&value)
        .map_err(|e| format!("unexpected field contents: {e}"))?;
    Ok((value, result))
}

/// Subtotals absent from `subjectScores`; they decode as 0.
fn missing_subjects(value: &Value) -> Vec<String> {
    let Some(scores) = value.get("subjectScores").and_then(Value::as_object) else {
        return Vec::new();
    };
    SUBJECT_FIELDS
        .iter()
        .filter(|field| !scores.contains_key(**field))
        .map(|field| format!("{field} missing, read as 0"))
        .collect()
}

/// Checks that the three required fields exist with the right container
/// types.
///
/// # Errors
///
/// Returns a description of the first mismatch.
pub fn check_shape(value: &Value) -> Result<(), String> {
    let object = value
        .as_object()
        .ok_or_else(|| "response is not a JSON object".to_string())?;

    match object.get("subjectScores") {
        Some(Value::Object(_)) => {}
        Some(_) => return Err("subjectScores is not an object".into()),
        None => return Err("subjectScores is missing".into()),
    }
    match object.get("totalScore") {
        Some(Value::Number(_)) => {}
        Some(_) => return Err("totalScore is not a number".into()),
        None => return Err("totalScore is missing".into()),
    }
    match object.get("studentAnswers") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err("studentAnswers is not an array".into()),
        None => return Err("studentAnswers is missing".into()),
    }

    Ok(())
}

/// Lists every way the result departs from the sheet's invariants.
#[must_use]
pub fn consistency_issues(result: &EvaluationResult) -> Vec<String> {
    let mut issues = Vec::new();
    let max_subject = i64::try_from(QUESTIONS_PER_SUBJECT).unwrap_or(i64::MAX);
    let max_total = i64::try_from(QUESTION_COUNT).unwrap_or(i64::MAX);

    for (i, score) in result.subject_scores.as_array().iter().enumerate() {
        if !(0..=max_subject).contains(score) {
            issues.push(format!("subject{} score {score} outside 0..={max_subject}", i + 1));
        }
    }
    if !(0..=max_total).contains(&result.total_score) {
        issues.push(format!(
            "totalScore {} outside 0..={max_total}",
            result.total_score
        ));
    }
    match result.subject_scores.sum() {
        Some(sum) if sum != result.total_score => issues.push(format!(
            "totalScore {} does not equal subject sum {sum}",
            result.total_score
        )),
        Some(_) => {}
        None => issues.push("subject sum overflows".to_string()),
    }
    if result.student_answers.len() != QUESTION_COUNT {
        issues.push(format!(
            "expected {QUESTION_COUNT} answers, got {}",
            result.student_answers.len()
        ));
    }
    let illegal: Vec<String> = result
        .student_answers
        .iter()
        .enumerate()
        .filter(|(_, a)| !is_legal_answer(a))
        .map(|(i, a)| format!("{}:{a}", i + 1))
        .collect();
    if !illegal.is_empty() {
        issues.push(format!("illegal answers {}", illegal.join(",")));
    }

    issues
}

fn is_legal_answer(answer: &str) -> bool {
    answer == UNANSWERED || OPTIONS.contains(&answer)
}
