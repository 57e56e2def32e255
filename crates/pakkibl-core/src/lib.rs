pub mod conversation;
pub mod legal;
pub mod query;
pub mod resources;
pub mod tables;

pub use conversation::{ChatMessage, Conversation, ConversationStats, DocumentInfo, Role};
pub use legal::{ClassificationResult, LegalEntry, NO_MATCH_MESSAGE, Outcome, TrainingExample};
pub use query::{MAX_QUERY_CHARS, QueryError, normalize_query, validate_query};
pub use resources::{FAQS, Faq, RESOURCE_SHELVES, ResourceShelf};
pub use tables::{CategoryTable, CitationTable, KeywordRow, TableError, builtin_corpus};
