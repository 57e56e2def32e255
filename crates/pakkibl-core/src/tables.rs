//! Static lookup tables: keyword → legal entry, category → citation, and
//! the training corpus.
//!
//! The built-in tables are small fixtures describing common Indian legal
//! issues. Each table can be replaced at startup from a JSON file; once
//! built, a table is read-only for the life of the process.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::legal::{LegalEntry, TrainingExample};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("keyword at position {0} is empty")]
    EmptyKeyword(usize),

    #[error("keyword '{0}' appears more than once")]
    DuplicateKeyword(String),

    #[error("training example at position {0} has an empty label")]
    EmptyLabel(usize),
}

// ── Keyword table ──

/// One keyword row as stored in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRow {
    pub keyword: String,
    #[serde(flatten)]
    pub entry: LegalEntry,
}

/// Ordered keyword → entry table.
///
/// Iteration order is the insertion order and decides which entry wins when
/// a query contains several keywords. Keywords are stored lowercased.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rows: Vec<(String, LegalEntry)>,
}

impl CategoryTable {
    /// Build a table from ordered rows, lowercasing keywords.
    pub fn from_rows(rows: Vec<KeywordRow>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut out = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            let keyword = row.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(TableError::EmptyKeyword(i));
            }
            if !seen.insert(keyword.clone()) {
                return Err(TableError::DuplicateKeyword(keyword));
            }
            out.push((keyword, row.entry));
        }

        Ok(Self { rows: out })
    }

    /// Load a table from a JSON array of `{keyword, category, statute, advice}`.
    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let rows: Vec<KeywordRow> = read_json(path)?;
        let table = Self::from_rows(rows)?;
        info!(path = %path.display(), keywords = table.len(), "loaded keyword table");
        Ok(table)
    }

    /// The built-in keyword table.
    pub fn builtin() -> Self {
        let rows = BUILTIN_KEYWORDS
            .iter()
            .map(|&(keyword, category, statute, advice)| {
                (
                    keyword.to_string(),
                    LegalEntry {
                        category: category.to_string(),
                        statute: statute.to_string(),
                        advice: advice.to_string(),
                    },
                )
            })
            .collect();
        Self { rows }
    }

    /// Iterate `(keyword, entry)` pairs in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LegalEntry)> {
        self.rows.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Citation table ──

/// Category label → statute reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationTable {
    citations: BTreeMap<String, String>,
}

impl CitationTable {
    pub fn new(citations: BTreeMap<String, String>) -> Self {
        Self { citations }
    }

    /// Load a table from a JSON object of `{"label": "statute"}`.
    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let table: Self = read_json(path)?;
        info!(path = %path.display(), labels = table.len(), "loaded citation table");
        Ok(table)
    }

    /// The built-in citation table.
    pub fn builtin() -> Self {
        let citations = BUILTIN_CITATIONS
            .iter()
            .map(|&(label, statute)| (label.to_string(), statute.to_string()))
            .collect();
        Self { citations }
    }

    /// Statute for a label, if one is known. A missing label is not an error.
    pub fn citation(&self, label: &str) -> Option<&str> {
        self.citations.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.citations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

// ── Training corpus ──

/// The built-in training corpus.
pub fn builtin_corpus() -> Vec<TrainingExample> {
    BUILTIN_CORPUS
        .iter()
        .map(|&(text, label)| TrainingExample::new(text, label))
        .collect()
}

/// Load a corpus from a JSON array of `{text, label}`.
pub fn corpus_from_json_file(path: &Path) -> Result<Vec<TrainingExample>, TableError> {
    let corpus: Vec<TrainingExample> = read_json(path)?;
    if let Some(i) = corpus.iter().position(|ex| ex.label.trim().is_empty()) {
        return Err(TableError::EmptyLabel(i));
    }
    info!(path = %path.display(), examples = corpus.len(), "loaded training corpus");
    Ok(corpus)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

// ── Built-in fixtures ──

const BUILTIN_KEYWORDS: &[(&str, &str, &str, &str)] = &[
    (
        "divorce",
        "Family Law",
        "Hindu Marriage Act, 1955",
        "Divorce may be sought by mutual consent or on grounds such as cruelty or desertion; file a petition in the Family Court.",
    ),
    (
        "custody",
        "Family Law",
        "Guardians and Wards Act, 1890",
        "Custody is decided on the welfare of the child; apply to the Family Court with proof of your care arrangements.",
    ),
    (
        "dowry",
        "Family Law",
        "Dowry Prohibition Act, 1961",
        "Giving or demanding dowry is an offence; report demands to the police or a Dowry Prohibition Officer.",
    ),
    (
        "property",
        "Property Law",
        "Transfer of Property Act, 1882",
        "Collect your title deeds and mutation records before approaching a civil court over a property dispute.",
    ),
    (
        "tenant",
        "Property Law",
        "Rent Control Act (State)",
        "Eviction and rent increases are regulated by your state's rent control law; keep your rent receipts.",
    ),
    (
        "theft",
        "Criminal Law",
        "Indian Penal Code, 1860, Section 378",
        "File an FIR at the nearest police station; the police must register a complaint for a cognisable offence.",
    ),
    (
        "assault",
        "Criminal Law",
        "Indian Penal Code, 1860, Section 351",
        "Get a medical examination and file an FIR as soon as possible.",
    ),
    (
        "cyber",
        "Cyber Crime",
        "Information Technology Act, 2000",
        "Report the incident on the national cyber crime portal and preserve screenshots and transaction records.",
    ),
    (
        "salary",
        "Labour Law",
        "Payment of Wages Act, 1936",
        "Send a written demand to your employer and, if unpaid, complain to the Labour Commissioner.",
    ),
    (
        "consumer",
        "Consumer Protection",
        "Consumer Protection Act, 2019",
        "Keep the bill and warranty, then file a complaint with the District Consumer Commission.",
    ),
];

const BUILTIN_CITATIONS: &[(&str, &str)] = &[
    ("Family Law", "Hindu Marriage Act, 1955"),
    ("Property Law", "Transfer of Property Act, 1882"),
    ("Criminal Law", "Indian Penal Code, 1860"),
    ("Cyber Crime", "Information Technology Act, 2000"),
    ("Labour Law", "Payment of Wages Act, 1936"),
    ("Consumer Protection", "Consumer Protection Act, 2019"),
];

const BUILTIN_CORPUS: &[(&str, &str)] = &[
    ("My wife wants a divorce", "Family Law"),
    ("Dispute over child custody after separation", "Family Law"),
    ("Someone hacked my Instagram account", "Cyber Crime"),
    ("I lost money to an online banking fraud", "Cyber Crime"),
    ("My neighbour has illegally occupied my land", "Property Law"),
    ("Dispute with my brother over ancestral property", "Property Law"),
    ("My phone was stolen on the bus", "Criminal Law"),
    ("I was assaulted by a stranger on the street", "Criminal Law"),
    ("My employer has not paid my salary for three months", "Labour Law"),
    (
        "The shop sold me a defective product and refused a refund",
        "Consumer Protection",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(keyword: &str, category: &str) -> KeywordRow {
        KeywordRow {
            keyword: keyword.into(),
            entry: LegalEntry {
                category: category.into(),
                statute: "Some Act".into(),
                advice: "Some advice".into(),
            },
        }
    }

    #[test]
    fn builtin_keywords_are_lowercase_and_unique() {
        let table = CategoryTable::builtin();
        let mut seen = HashSet::new();
        for (keyword, _) in table.iter() {
            assert_eq!(keyword, keyword.to_lowercase());
            assert!(seen.insert(keyword), "duplicate keyword {keyword}");
        }
        assert_eq!(table.len(), BUILTIN_KEYWORDS.len());
    }

    #[test]
    fn builtin_corpus_labels_have_citations() {
        let citations = CitationTable::builtin();
        for ex in builtin_corpus() {
            assert!(
                citations.citation(&ex.label).is_some(),
                "no citation for {}",
                ex.label
            );
        }
    }

    #[test]
    fn builtin_corpus_is_small() {
        let corpus = builtin_corpus();
        assert_eq!(corpus.len(), 10);
        let labels: HashSet<&str> = corpus.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn missing_citation_is_none() {
        assert_eq!(CitationTable::builtin().citation("Maritime Law"), None);
    }

    #[test]
    fn from_rows_preserves_order_and_lowercases() {
        let table =
            CategoryTable::from_rows(vec![row("Zebra", "Z"), row("apple", "A")]).unwrap();
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zebra", "apple"]);
    }

    #[test]
    fn from_rows_rejects_empty_keyword() {
        let err = CategoryTable::from_rows(vec![row("ok", "A"), row("  ", "B")]).unwrap_err();
        assert!(matches!(err, TableError::EmptyKeyword(1)));
    }

    #[test]
    fn from_rows_rejects_duplicates_case_insensitively() {
        let err = CategoryTable::from_rows(vec![row("Rent", "A"), row("rent", "B")]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateKeyword(k) if k == "rent"));
    }

    #[test]
    fn keyword_table_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"keyword": "bail", "category": "Criminal Law", "statute": "CrPC, 1973", "advice": "Apply to the magistrate."}},
                {{"keyword": "will", "category": "Succession", "statute": "Indian Succession Act, 1925", "advice": "Register the will."}}
            ]"#
        )
        .unwrap();

        let table = CategoryTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        let (keyword, entry) = table.iter().next().unwrap();
        assert_eq!(keyword, "bail");
        assert_eq!(entry.statute, "CrPC, 1973");
    }

    #[test]
    fn citation_table_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Succession": "Indian Succession Act, 1925"}}"#).unwrap();

        let table = CitationTable::from_json_file(file.path()).unwrap();
        assert_eq!(
            table.citation("Succession"),
            Some("Indian Succession Act, 1925")
        );
    }

    #[test]
    fn corpus_from_json_rejects_empty_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"text": "something", "label": " "}}]"#).unwrap();

        let err = corpus_from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, TableError::EmptyLabel(0)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = CategoryTable::from_json_file(Path::new("/nonexistent/keywords.json"))
            .unwrap_err();
        assert!(matches!(err, TableError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = corpus_from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, TableError::Json(_)));
    }
}
