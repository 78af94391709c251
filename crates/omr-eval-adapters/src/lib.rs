//! OMR Eval Adapters - External adapters for omr-eval.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Inline `data:` URL image source
//! - Gemini evaluator

pub mod fs;
pub mod gemini;
pub mod inline;

pub use fs::FsImageSource;
pub use gemini::{GeminiConfig, GeminiEvaluator};
pub use inline::DataUrlImageSource;
