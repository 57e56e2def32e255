//! Shared legal types passed between the classifiers and the advocate.

use serde::{Deserialize, Serialize};

/// One row of the training corpus for the statistical classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: String,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// What the keyword table knows about one practice area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntry {
    pub category: String,
    pub statute: String,
    pub advice: String,
}

/// The label a classifier assigned to a query.
///
/// `confidence` is only set by strategies that produce a probability
/// (naive Bayes). Keyword matches are certain by construction and leave it
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: Option<f32>,
}

impl ClassificationResult {
    pub fn certain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: Some(confidence),
        }
    }
}

/// Result of running a classifier over a valid query.
///
/// `NoMatch` is a legitimate outcome of the keyword strategy, not an error:
/// callers show [`NO_MATCH_MESSAGE`] instead of a category.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched(ClassificationResult),
    NoMatch,
}

impl Outcome {
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Matched(r) => Some(r.label.as_str()),
            Self::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Fallback shown when no category could be assigned.
pub const NO_MATCH_MESSAGE: &str =
    "This issue is not in our legal database. Please consult an advocate for guidance.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_example_json_roundtrip() {
        let ex = TrainingExample::new("Someone hacked my Instagram account", "Cyber Crime");
        let json = serde_json::to_string(&ex).unwrap();
        let parsed: TrainingExample = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ex);
    }

    #[test]
    fn outcome_label() {
        let matched = Outcome::Matched(ClassificationResult::certain("Family Law"));
        assert_eq!(matched.label(), Some("Family Law"));
        assert!(matched.is_match());
        assert_eq!(Outcome::NoMatch.label(), None);
        assert!(!Outcome::NoMatch.is_match());
    }
}
