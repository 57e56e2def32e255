//! Legal category classification: keyword lookup and naive Bayes routing.

pub mod bayes;
pub mod classifier;
pub mod keyword;

pub use bayes::{FitError, ModelSummary, NaiveBayes, tokenize};
pub use classifier::{
    CategoryClassifier, Routing, SharedClassifier, Strategy, build_classifier, route,
};
pub use keyword::KeywordClassifier;
