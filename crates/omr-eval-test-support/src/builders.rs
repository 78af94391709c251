//! Result and image builders for testing.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use omr_eval_core::domain::{
    EvaluationResult, SubjectScores, OPTIONS, QUESTION_COUNT, SUBJECT_COUNT,
};

/// Builder for evaluation results.
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    scores: [i64; SUBJECT_COUNT],
    total: Option<i64>,
    answers: Vec<String>,
}

impl ResultBuilder {
    /// Every subject scored `score`, consistent total, 100 cycling answers.
    #[must_use]
    pub fn uniform(score: i64) -> Self {
        Self::with_scores([score; SUBJECT_COUNT])
    }

    /// Given subject scores, consistent total, 100 cycling answers.
    #[must_use]
    pub fn with_scores(scores: [i64; SUBJECT_COUNT]) -> Self {
        Self {
            scores,
            total: None,
            answers: cycling_answers(QUESTION_COUNT),
        }
    }

    /// Overrides the total, which otherwise equals the subject sum.
    #[must_use]
    pub const fn total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    /// Replaces the answer list.
    #[must_use]
    pub fn answers(mut self, answers: Vec<String>) -> Self {
        self.answers = answers;
        self
    }

    /// Builds the result.
    #[must_use]
    pub fn build(self) -> EvaluationResult {
        let subject_scores = SubjectScores::new(self.scores);
        EvaluationResult {
            total_score: self
                .total
                .or_else(|| subject_scores.sum())
                .unwrap_or(i64::MAX),
            subject_scores,
            student_answers: self.answers,
        }
    }

    /// Builds the result as the JSON text a model would return.
    #[must_use]
    pub fn build_json(self) -> String {
        serde_json::to_string(&self.build()).unwrap_or_default()
    }
}

fn cycling_answers(n: usize) -> Vec<String> {
    (0..n).map(|i| OPTIONS[i % OPTIONS.len()].to_string()).collect()
}

/// Builder for synthetic answer-sheet images.
///
/// Produces encoded file bytes; the content only needs to be a valid image.
pub struct SyntheticSheetBuilder;

impl SyntheticSheetBuilder {
    /// A white sheet with a grid of dark bubbles.
    #[must_use]
    pub fn bubble_grid(width: u32, height: u32) -> DynamicImage {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if x % 16 < 6 && y % 16 < 6 {
                Luma([20u8])
            } else {
                Luma([240u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    /// PNG bytes of a small bubble grid.
    #[must_use]
    pub fn png() -> Vec<u8> {
        Self::encode(&Self::bubble_grid(32, 32), ImageFormat::Png)
    }

    /// JPEG bytes of a small bubble grid.
    #[must_use]
    pub fn jpeg() -> Vec<u8> {
        Self::encode(&Self::bubble_grid(32, 32), ImageFormat::Jpeg)
    }

    /// Encodes `image` in `format`; empty on failure.
    #[must_use]
    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        match image.write_to(&mut buf, format) {
            Ok(()) => buf.into_inner(),
            Err(_) => Vec::new(),
        }
    }
}
