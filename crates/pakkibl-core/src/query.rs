//! Query validation shared by every classifier strategy.
//!
//! A query reaches a classifier only after [`validate_query`] accepts it:
//! blank input is rejected so the caller can re-prompt, and oversized input
//! is rejected before it can reach a paid downstream API.

use thiserror::Error;

/// Upper bound on query length, in characters.
pub const MAX_QUERY_CHARS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("please describe your legal issue")]
    Empty,

    #[error("query is {chars} characters long; the limit is {max}")]
    TooLarge { chars: usize, max: usize },
}

/// Check a raw query and return it trimmed.
pub fn validate_query(query: &str) -> Result<&str, QueryError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Empty);
    }

    let chars = trimmed.chars().count();
    if chars > MAX_QUERY_CHARS {
        return Err(QueryError::TooLarge {
            chars,
            max: MAX_QUERY_CHARS,
        });
    }

    Ok(trimmed)
}

/// Lowercase a validated query for case-insensitive matching.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_rejected() {
        assert_eq!(validate_query(""), Err(QueryError::Empty));
    }

    #[test]
    fn whitespace_only_is_rejected() {
        assert_eq!(validate_query("   \t\n  "), Err(QueryError::Empty));
    }

    #[test]
    fn valid_query_is_trimmed() {
        assert_eq!(validate_query("  my landlord  "), Ok("my landlord"));
    }

    #[test]
    fn limit_is_inclusive() {
        let at_limit = "a".repeat(MAX_QUERY_CHARS);
        assert!(validate_query(&at_limit).is_ok());
    }

    #[test]
    fn oversized_is_rejected() {
        let over = "a".repeat(MAX_QUERY_CHARS + 1);
        assert_eq!(
            validate_query(&over),
            Err(QueryError::TooLarge {
                chars: MAX_QUERY_CHARS + 1,
                max: MAX_QUERY_CHARS,
            })
        );
    }

    #[test]
    fn surrounding_whitespace_is_not_counted() {
        let padded = format!("  {}\n", "a".repeat(MAX_QUERY_CHARS));
        assert_eq!(validate_query(&padded).map(str::len), Ok(MAX_QUERY_CHARS));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // "ह" is three bytes in UTF-8.
        let hindi = "ह".repeat(MAX_QUERY_CHARS);
        assert!(validate_query(&hindi).is_ok());
    }

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize_query("  My DIVORCE case "), "my divorce case");
    }
}
