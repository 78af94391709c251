//! Test support utilities for omr-eval.
//!
//! Provides mocks of the core ports, result builders and synthetic
//! answer-sheet images for testing the evaluation flow without a live model.
//!
//! # Example
//!
//! ```
//! use omr_eval_test_support::{MockEvaluator, ResultBuilder, SyntheticSheetBuilder};
//!
//! // Evaluator that always scores 5 per subject
//! let evaluator = MockEvaluator::succeeding(ResultBuilder::uniform(5).build());
//!
//! // PNG bytes to serve as an uploaded sheet
//! let sheet = SyntheticSheetBuilder::png();
//! assert!(!sheet.is_empty());
//! ```

mod builders;
mod mocks;

pub use builders::{ResultBuilder, SyntheticSheetBuilder};
pub use mocks::{MockBehavior, MockEvaluator, MockImageSource, MockProgressSink, MockResultOutput};
