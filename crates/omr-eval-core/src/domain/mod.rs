//! Core domain types for answer-sheet evaluation.

mod answer_key;
mod image;
mod result;

pub use answer_key::AnswerKey;
pub use image::{EncodedImage, MediaType};
pub use result::{subject_questions, EvaluationResult, SubjectScores, SUBJECT_FIELDS};

/// Questions on one sheet.
pub const QUESTION_COUNT: usize = 100;
/// Subjects on one sheet.
pub const SUBJECT_COUNT: usize = 5;
/// Questions per subject, also the maximum subject score.
pub const QUESTIONS_PER_SUBJECT: usize = 20;
/// Answer options per question.
pub const OPTIONS: [&str; 4] = ["A", "B", "C", "D"];
/// Mark used for blank, multi-marked or unreadable questions.
pub const UNANSWERED: &str = "N/A";
