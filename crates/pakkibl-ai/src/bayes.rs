//! Multinomial naive Bayes over bag-of-words counts.
//!
//! Fits once over a fixed [`TrainingExample`] corpus: the vocabulary is every
//! token seen in training, and each label keeps per-token counts. Prediction
//! scores each label in log space with Laplace smoothing and ignores tokens
//! outside the fitted vocabulary.
//!
//! The built-in corpus has ten rows, so the model memorises its training
//! data. It is a demo-grade router, not an accuracy claim.

use std::collections::{BTreeMap, HashMap, HashSet};

use pakkibl_core::{ClassificationResult, Outcome, QueryError, TrainingExample, validate_query};
use thiserror::Error;
use tracing::info;

use crate::classifier::CategoryClassifier;

/// Laplace smoothing constant.
const ALPHA: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FitError {
    #[error("cannot fit a classifier on an empty corpus")]
    EmptyCorpus,
}

/// Per-label token statistics.
struct LabelModel {
    log_prior: f64,
    token_counts: HashMap<String, u32>,
    total_tokens: u32,
}

/// Fitted naive Bayes classifier. Immutable once built.
pub struct NaiveBayes {
    // BTreeMap keeps label iteration sorted, which fixes the tie-break.
    labels: BTreeMap<String, LabelModel>,
    vocabulary: HashSet<String>,
    examples: usize,
}

/// Summary of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSummary {
    pub examples: usize,
    pub labels: usize,
    pub vocabulary: usize,
}

impl NaiveBayes {
    /// Fit a model over `corpus`.
    pub fn fit(corpus: &[TrainingExample]) -> Result<Self, FitError> {
        if corpus.is_empty() {
            return Err(FitError::EmptyCorpus);
        }

        // Accumulate: label → (doc_count, token_counts, total_tokens).
        let mut accum: BTreeMap<&str, (usize, HashMap<String, u32>, u32)> = BTreeMap::new();
        let mut vocabulary = HashSet::new();

        for example in corpus {
            let entry = accum
                .entry(example.label.as_str())
                .or_insert_with(|| (0, HashMap::new(), 0));
            entry.0 += 1;
            for token in tokenize(&example.text) {
                *entry.1.entry(token.clone()).or_insert(0) += 1;
                entry.2 += 1;
                vocabulary.insert(token);
            }
        }

        let n = corpus.len() as f64;
        let labels = accum
            .into_iter()
            .map(|(label, (docs, token_counts, total_tokens))| {
                (
                    label.to_string(),
                    LabelModel {
                        log_prior: (docs as f64 / n).ln(),
                        token_counts,
                        total_tokens,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        let model = Self {
            labels,
            vocabulary,
            examples: corpus.len(),
        };
        let summary = model.summary();
        info!(
            examples = summary.examples,
            labels = summary.labels,
            vocabulary = summary.vocabulary,
            "fitted naive Bayes classifier"
        );
        Ok(model)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            examples: self.examples,
            labels: self.labels.len(),
            vocabulary: self.vocabulary.len(),
        }
    }

    /// Log-space score for every label, sorted by label.
    pub fn scores(&self, query: &str) -> Vec<(String, f64)> {
        let tokens: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| self.vocabulary.contains(t))
            .collect();
        let vocab_size = self.vocabulary.len() as f64;

        self.labels
            .iter()
            .map(|(label, model)| {
                let denom = (model.total_tokens as f64 + ALPHA * vocab_size).ln();
                let likelihood: f64 = tokens
                    .iter()
                    .map(|t| {
                        let count = model.token_counts.get(t).copied().unwrap_or(0) as f64;
                        (count + ALPHA).ln() - denom
                    })
                    .sum();
                (label.clone(), model.log_prior + likelihood)
            })
            .collect()
    }

    /// Most probable label and its posterior probability.
    ///
    /// Ties go to the label that sorts first.
    pub fn predict(&self, query: &str) -> ClassificationResult {
        let scores = self.scores(query);

        let mut best = 0;
        for (i, (_, score)) in scores.iter().enumerate() {
            if *score > scores[best].1 {
                best = i;
            }
        }

        // Softmax over log scores, shifted by the max for stability.
        let max = scores[best].1;
        let z: f64 = scores.iter().map(|(_, s)| (s - max).exp()).sum();
        let confidence = (1.0 / z) as f32;

        ClassificationResult::with_confidence(scores[best].0.clone(), confidence)
    }
}

impl CategoryClassifier for NaiveBayes {
    fn name(&self) -> &str {
        "naive-bayes"
    }

    fn classify(&self, query: &str) -> Result<Outcome, QueryError> {
        let query = validate_query(query)?;
        Ok(Outcome::Matched(self.predict(query)))
    }
}

/// Split text into lowercase alphanumeric tokens of two or more characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}
