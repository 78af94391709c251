//! Evaluation request assembly.
//!
//! Builds the instruction text and the provider-neutral response schema sent
//! with every evaluation. Nothing here branches on input or validates it.

use serde_json::{json, Value};

use crate::domain::{
    subject_questions, AnswerKey, EncodedImage, OPTIONS, QUESTIONS_PER_SUBJECT, QUESTION_COUNT,
    SUBJECT_COUNT, UNANSWERED,
};

/// Everything an evaluator needs for one external call.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// Encoded answer-sheet image.
    pub image: EncodedImage,
    /// Natural-language instruction, including the literal answer key.
    pub instruction: String,
    /// Expected response shape.
    pub response_schema: Value,
}

impl EvaluationRequest {
    /// Assembles a request for the given image and key.
    #[must_use]
    pub fn build(image: &EncodedImage, answer_key: &AnswerKey) -> Self {
        Self {
            image: image.clone(),
            instruction: instruction(answer_key),
            response_schema: response_schema(),
        }
    }
}

/// Instruction text for the model.
#[must_use]
pub fn instruction(answer_key: &AnswerKey) -> String {
    let subjects: String = (0..SUBJECT_COUNT)
        .map(|i| {
            let range = subject_questions(i);
            format!(
                "  - Subject {}: Questions {}-{}\n",
                i + 1,
                range.start(),
                range.end()
            )
        })
        .collect();
    let options = OPTIONS.join(", ");

    format!(
        "You are an expert and highly accurate OMR (Optical Mark Recognition) sheet evaluation system. \
Your task is to analyze the provided image of a completed OMR sheet, compare it against the given answer key, and calculate the scores.

OMR Sheet Structure:
- There are {QUESTION_COUNT} multiple-choice questions in total.
- The questions are divided into {SUBJECT_COUNT} subjects, with {QUESTIONS_PER_SUBJECT} questions per subject:
{subjects}- Each question has four options: {options}.

Scoring Rules:
- Each correct answer is worth 1 point.
- There is no negative marking for incorrect answers.
- If a question is unanswered or has multiple bubbles filled, it is worth 0 points.

Your Tasks:
1. Examine the OMR sheet image and identify which bubble ({options}) is filled for each of the {QUESTION_COUNT} questions.
2. For each question, compare the student's marked answer to the correct answer in the answer key.
3. List the student's answers for all {QUESTION_COUNT} questions. If an answer is unclear, multi-marked, or not answered, use '{UNANSWERED}'.
4. Calculate the number of correct answers for each of the {SUBJECT_COUNT} subjects.
5. Calculate the overall total score (correct answers out of {QUESTION_COUNT}).
6. Return the results as JSON with the fields subjectScores (subject1..subject{SUBJECT_COUNT}), totalScore and studentAnswers.

Correct Answer Key:
```
{answer_key}
```

Analyze the image and provide the evaluation result.
"
    )
}

/// JSON-schema description of [`crate::domain::EvaluationResult`].
///
/// Uses lower-case JSON Schema type names; adapters translate to their
/// provider's dialect.
#[must_use]
pub fn response_schema() -> Value {
    let mut subject_properties = serde_json::Map::new();
    for i in 0..SUBJECT_COUNT {
        let range = subject_questions(i);
        subject_properties.insert(
            format!("subject{}", i + 1),
            json!({
                "type": "integer",
                "description": format!("Score for questions {}-{}", range.start(), range.end()),
            }),
        );
    }
    let subject_names: Vec<String> = (1..=SUBJECT_COUNT).map(|i| format!("subject{i}")).collect();
    let mut answer_values: Vec<&str> = OPTIONS.to_vec();
    answer_values.push(UNANSWERED);

    json!({
        "type": "object",
        "properties": {
            "subjectScores": {
                "type": "object",
                "description": format!("Scores for each of the {SUBJECT_COUNT} subjects."),
                "properties": subject_properties,
                "required": subject_names,
            },
            "totalScore": {
                "type": "integer",
                "description": format!("Total score out of {QUESTION_COUNT}."),
            },
            "studentAnswers": {
                "type": "array",
                "description": format!(
                    "The student's marked answer for each question (1-{QUESTION_COUNT}). \
                     Use '{UNANSWERED}' if not answered, multiple answers, or unclear."
                ),
                "items": { "type": "string", "enum": answer_values },
            },
        },
        "required": ["subjectScores", "totalScore", "studentAnswers"],
    })
}
