//! Plain-text cards for classifications, tables and session stats.

use pakkibl_ai::Routing;
use pakkibl_core::{
    CategoryTable, CitationTable, ConversationStats, Faq, NO_MATCH_MESSAGE, ResourceShelf,
    TrainingExample,
};

const MAX_ADVICE_CHARS: usize = 72;

// ── Public API ──

/// Print one classifier's verdict as a card.
pub fn print_routing(classifier: &str, routing: &Routing) {
    println!("=== {classifier} ===");
    for (field, value) in routing_fields(routing) {
        println!("  {field:<12} {value}");
    }
    println!();
}

/// Print the keyword, citation and corpus tables.
pub fn print_tables(
    keywords: &CategoryTable,
    citations: &CitationTable,
    corpus: &[TrainingExample],
) {
    println!("Keywords ({}, in match order)", keywords.len());
    for (keyword, entry) in keywords.iter() {
        println!("  {:<12} {:<22} {}", keyword, entry.category, entry.statute);
        println!("  {:<12} {}", "", truncate(&entry.advice, MAX_ADVICE_CHARS));
    }
    println!();

    println!("Citations ({})", citations.len());
    for (label, statute) in citations.iter() {
        println!("  {label:<22} {statute}");
    }
    println!();

    println!("Training corpus ({})", corpus.len());
    for example in corpus {
        println!("  {:<22} {}", example.label, example.text);
    }
    println!();
}

pub fn print_resources(shelves: &[ResourceShelf], faqs: &[Faq]) {
    for shelf in shelves {
        println!("{}", shelf.area);
        for title in shelf.titles {
            println!("  - {title}");
        }
        println!();
    }
    if !faqs.is_empty() {
        println!("Frequently asked questions");
        for faq in faqs {
            println!("  Q: {}", faq.question);
            println!("  A: {}", faq.answer);
            println!();
        }
    }
}

pub fn print_stats(stats: ConversationStats, total_queries: u64) {
    println!("Statistics");
    println!("  {:<12} {}", "total", stats.total);
    println!("  {:<12} {}", "your qs", stats.user);
    println!("  {:<12} {}", "ai answers", stats.assistant);
    println!("  {:<12} {}", "queries", total_queries);
}

/// One-line summary printed under a generated answer. An unmatched
/// question gets the fallback pointing the user at an advocate.
pub fn citation_footer(routing: &Routing) -> String {
    match routing {
        Routing::Routed {
            result,
            citation: Some(citation),
            ..
        } => format!("[{}: {}]", result.label, citation),
        Routing::Routed { result, .. } => format!("[{}]", result.label),
        Routing::NoMatch => NO_MATCH_MESSAGE.to_string(),
    }
}

// ── Helpers ──

fn routing_fields(routing: &Routing) -> Vec<(&'static str, String)> {
    match routing {
        Routing::NoMatch => vec![("result", NO_MATCH_MESSAGE.to_string())],
        Routing::Routed {
            result,
            citation,
            advice,
        } => {
            let mut fields = vec![("category", result.label.clone())];
            if let Some(c) = result.confidence {
                fields.push(("confidence", format!("{:.1}%", c * 100.0)));
            }
            if let Some(c) = citation {
                fields.push(("statute", c.clone()));
            }
            if let Some(a) = advice {
                fields.push(("advice", a.clone()));
            }
            fields
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max - 3).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakkibl_core::ClassificationResult;

    #[test]
    fn no_match_shows_fallback() {
        let fields = routing_fields(&Routing::NoMatch);
        assert_eq!(fields, vec![("result", NO_MATCH_MESSAGE.to_string())]);
    }

    #[test]
    fn routed_fields_skip_missing_citation() {
        let routing = Routing::Routed {
            result: ClassificationResult::with_confidence("Cyber Crime", 0.447),
            citation: None,
            advice: None,
        };
        let fields = routing_fields(&routing);
        assert_eq!(
            fields,
            vec![
                ("category", "Cyber Crime".to_string()),
                ("confidence", "44.7%".to_string()),
            ]
        );
        assert_eq!(citation_footer(&routing), "[Cyber Crime]");
    }

    #[test]
    fn footer_includes_statute() {
        let routing = Routing::Routed {
            result: ClassificationResult::certain("Family Law"),
            citation: Some("Hindu Marriage Act, 1955".into()),
            advice: Some("File in the Family Court.".into()),
        };
        assert_eq!(
            citation_footer(&routing),
            "[Family Law: Hindu Marriage Act, 1955]"
        );
    }

    #[test]
    fn unmatched_question_footer_is_fallback() {
        let footer = citation_footer(&Routing::NoMatch);
        assert_eq!(footer, NO_MATCH_MESSAGE);
        assert!(footer.contains("consult"));
    }

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
