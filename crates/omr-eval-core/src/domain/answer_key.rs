//! Answer key supplied by the examiner.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{OPTIONS, QUESTION_COUNT};

/// The authoritative `question:letter` list, e.g. `"1:A,2:B,3:C"`.
///
/// The key is opaque to this crate: it is never parsed for scoring and is
/// handed to the model verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerKey(String);

impl AnswerKey {
    /// Wraps the given text without validating it.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Built-in key cycling A-D over all 100 questions.
    #[must_use]
    pub fn sample() -> Self {
        let pairs: Vec<String> = (1..=QUESTION_COUNT)
            .map(|q| format!("{q}:{}", OPTIONS[(q - 1) % OPTIONS.len()]))
            .collect();
        Self(pairs.join(","))
    }

    /// Returns the key text exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A key counts as provided once it has non-whitespace content.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AnswerKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AnswerKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_key_shape() {
        let key = AnswerKey::sample();
        let pairs: Vec<&str> = key.as_str().split(',').collect();
        assert_eq!(pairs.len(), 100);
        assert_eq!(pairs[0], "1:A");
        assert_eq!(pairs[3], "4:D");
        assert_eq!(pairs[4], "5:A");
        assert_eq!(pairs[99], "100:D");
    }

    #[test]
    fn test_blank_key_not_present() {
        assert!(!AnswerKey::default().is_present());
        assert!(!AnswerKey::new("  \n\t").is_present());
        assert!(AnswerKey::new("1:A").is_present());
    }

    #[test]
    fn test_key_kept_verbatim() {
        let key = AnswerKey::new(" 1:a , 2:B\n");
        assert_eq!(key.as_str(), " 1:a , 2:B\n");
        assert_eq!(key.to_string(), " 1:a , 2:B\n");
    }
}
