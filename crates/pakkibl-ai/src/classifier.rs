//! Category classification: the strategy trait, citation routing, and the
//! shared handle that serves requests.
//!
//! Classifiers are built once and never mutated. To refit, build a new model
//! and [`SharedClassifier::swap`] it in; in-flight requests keep the snapshot
//! they started with.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use pakkibl_core::{
    CategoryTable, CitationTable, ClassificationResult, LegalEntry, Outcome, QueryError,
    TrainingExample,
};
use tracing::{debug, info};

use crate::bayes::{FitError, NaiveBayes};
use crate::keyword::KeywordClassifier;

/// A strategy that assigns a legal category to a free-text query.
pub trait CategoryClassifier: Send + Sync {
    /// Short identifier for logs and display.
    fn name(&self) -> &str;

    /// Classify a query. Blank or oversized input is rejected before any
    /// matching happens.
    fn classify(&self, query: &str) -> Result<Outcome, QueryError>;

    /// Full table entry behind a match, for strategies backed by one.
    fn entry_for(&self, _query: &str) -> Option<&LegalEntry> {
        None
    }
}

/// Which classifier to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Keyword,
    NaiveBayes,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::NaiveBayes => "naive-bayes",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a classifier for `strategy`. Only naive Bayes reads the corpus.
pub fn build_classifier(
    strategy: Strategy,
    table: CategoryTable,
    corpus: &[TrainingExample],
) -> Result<Arc<dyn CategoryClassifier>, FitError> {
    Ok(match strategy {
        Strategy::Keyword => Arc::new(KeywordClassifier::new(table)),
        Strategy::NaiveBayes => Arc::new(NaiveBayes::fit(corpus)?),
    })
}

// ── Citation routing ──

/// A classification joined with its citation.
#[derive(Debug, Clone, PartialEq)]
pub enum Routing {
    Routed {
        result: ClassificationResult,
        /// Omitted when the label has no citation.
        citation: Option<String>,
        advice: Option<String>,
    },
    NoMatch,
}

impl Routing {
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Routed { result, .. } => Some(result.label.as_str()),
            Self::NoMatch => None,
        }
    }
}

/// Classify `query` and attach a citation.
///
/// A classifier backed by a table entry supplies its own statute and
/// advice; otherwise the citation comes from `citations`.
pub fn route(
    classifier: &dyn CategoryClassifier,
    citations: &CitationTable,
    query: &str,
) -> Result<Routing, QueryError> {
    let routing = match classifier.classify(query)? {
        Outcome::NoMatch => Routing::NoMatch,
        Outcome::Matched(result) => match classifier.entry_for(query) {
            Some(entry) => Routing::Routed {
                result,
                citation: Some(entry.statute.clone()),
                advice: Some(entry.advice.clone()),
            },
            None => {
                let citation = citations.citation(&result.label).map(str::to_string);
                Routing::Routed {
                    result,
                    citation,
                    advice: None,
                }
            }
        },
    };

    debug!(
        classifier = classifier.name(),
        label = routing.label().unwrap_or("-"),
        "routed query"
    );
    Ok(routing)
}

// ── Shared handle ──

/// Thread-safe handle to the classifier currently serving requests.
#[derive(Clone)]
pub struct SharedClassifier {
    inner: Arc<RwLock<Arc<dyn CategoryClassifier>>>,
}

impl SharedClassifier {
    pub fn new(classifier: Arc<dyn CategoryClassifier>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(classifier)),
        }
    }

    /// Snapshot of the current classifier.
    pub fn current(&self) -> Arc<dyn CategoryClassifier> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the classifier, returning the previous one.
    pub fn swap(&self, classifier: Arc<dyn CategoryClassifier>) -> Arc<dyn CategoryClassifier> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        info!(from = guard.name(), to = classifier.name(), "swapped classifier");
        std::mem::replace(&mut *guard, classifier)
    }

    pub fn classify(&self, query: &str) -> Result<Outcome, QueryError> {
        self.current().classify(query)
    }

    pub fn route(&self, citations: &CitationTable, query: &str) -> Result<Routing, QueryError> {
        route(self.current().as_ref(), citations, query)
    }
}
