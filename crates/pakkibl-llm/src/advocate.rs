//! Advocate orchestration: validate → classify → prompt → generate → speak.
//!
//! The advocate owns no session state. Each call reads the recent history
//! from the caller's [`Conversation`] and appends the exchange to it.

use std::sync::Arc;

use pakkibl_ai::{Routing, SharedClassifier};
use pakkibl_core::{CitationTable, Conversation, DocumentInfo, QueryError, validate_query};
use tracing::{info, warn};

use crate::provider::{GenerateError, Generator, SpeechError, Synthesizer};

/// Messages of history sent with each request.
pub const HISTORY_WINDOW: usize = 10;

pub const DISCLAIMER: &str = "\n\n---\n*Remember: This information is for general guidance only. \
For specific legal advice, please consult with a qualified attorney.*";

/// An answer already mentioning any of these does not get the disclaimer.
const DISCLAIMER_TRIGGERS: &[&str] = &["attorney", "lawyer", "professional", "consult"];

const SYSTEM_PROMPT: &str = "\
You are PakkiBL, an AI legal advocate assistant. Provide helpful, accurate information \
about legal topics in simple, understandable terms.

Key guidelines:
1. Always clarify that you're providing general information, not legal advice
2. Recommend consulting with a qualified attorney for specific cases
3. Focus on general legal principles and common practices
4. Be clear about limitations of your knowledge
5. Use plain language and avoid unnecessary legal jargon
6. If asked about specific cases, explain general principles rather than giving opinions
7. Encourage users to seek professional legal counsel for their specific situation";

/// Outcome of one advocate turn.
#[derive(Debug)]
pub struct Answer {
    pub routing: Routing,
    /// The answer text, or advisory text when generation failed.
    pub text: String,
    pub failure: Option<GenerateError>,
    pub audio: Option<Vec<u8>>,
    pub speech_failure: Option<SpeechError>,
}

pub struct Advocate {
    classifier: SharedClassifier,
    citations: Arc<CitationTable>,
    generator: Arc<dyn Generator>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
}

impl Advocate {
    pub fn new(
        classifier: SharedClassifier,
        citations: Arc<CitationTable>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            classifier,
            citations,
            generator,
            synthesizer: None,
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn classifier(&self) -> &SharedClassifier {
        &self.classifier
    }

    pub async fn answer(
        &self,
        conversation: &mut Conversation,
        query: &str,
    ) -> Result<Answer, QueryError> {
        self.answer_streaming(conversation, query, &mut |_: &str| {})
            .await
    }

    /// Answer `query`, forwarding generated text to `on_delta` as it streams.
    ///
    /// Returns `Err` only for invalid input, in which case the conversation
    /// is left untouched. Provider failures become advisory text in
    /// [`Answer::text`].
    pub async fn answer_streaming(
        &self,
        conversation: &mut Conversation,
        query: &str,
        on_delta: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<Answer, QueryError> {
        let query = validate_query(query)?;

        let routing = self.classifier.route(&self.citations, query)?;
        conversation.record_query();
        conversation.push_user(query);

        let prompt = build_system_prompt(&routing, conversation.latest_document());
        let result = self
            .generator
            .generate_streaming(&prompt, conversation.recent(HISTORY_WINDOW), on_delta)
            .await;

        let (text, failure) = match result {
            Ok(text) => (with_disclaimer(text), None),
            Err(err) => {
                warn!(model = self.generator.model(), error = %err, "generation failed");
                (err.user_message().to_string(), Some(err))
            }
        };
        conversation.push_assistant(text.clone());

        let (audio, speech_failure) = match (&self.synthesizer, &failure) {
            (Some(synth), None) => match synth.synthesize(&text).await {
                Ok(bytes) => (Some(bytes), None),
                Err(err) => {
                    warn!(error = %err, "speech synthesis failed; returning text only");
                    (None, Some(err))
                }
            },
            _ => (None, None),
        };

        info!(
            label = routing.label().unwrap_or("-"),
            failed = failure.is_some(),
            audio = audio.is_some(),
            "answered query"
        );

        Ok(Answer {
            routing,
            text,
            failure,
            audio,
            speech_failure,
        })
    }
}

/// System instruction with the routed category folded in.
pub fn build_system_prompt(routing: &Routing, document: Option<&DocumentInfo>) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();

    match routing {
        Routing::Routed {
            result, citation, ..
        } => {
            prompt.push_str(&format!(
                "\n\nThe user's question appears to concern {}.",
                result.label
            ));
            if let Some(citation) = citation {
                prompt.push_str(&format!(" The most relevant statute is the {citation}."));
            }
        }
        Routing::NoMatch => {
            prompt.push_str(
                "\n\nThe local legal database has no entry for this issue. Answer from general \
                 principles and recommend that the user consult an advocate.",
            );
        }
    }

    if let Some(doc) = document {
        prompt.push_str(&format!(
            "\n\nNote: The user has uploaded a file named '{}'. Consider this in your response if relevant.",
            doc.name
        ));
    }

    prompt
}

/// Append [`DISCLAIMER`] unless the answer already points to professional help.
pub fn with_disclaimer(mut text: String) -> String {
    let lower = text.to_lowercase();
    if !DISCLAIMER_TRIGGERS.iter().any(|w| lower.contains(w)) {
        text.push_str(DISCLAIMER);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pakkibl_ai::{CategoryClassifier, KeywordClassifier, NaiveBayes};
    use pakkibl_core::{ChatMessage, Role, builtin_corpus};
    use std::sync::Mutex;

    /// Records every request and replies with a scripted result.
    struct ScriptedGenerator {
        reply: Result<String, GenerateError>,
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl ScriptedGenerator {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn err(err: GenerateError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            prompt: &str,
            context: &[ChatMessage],
        ) -> Result<String, GenerateError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), context.to_vec()));
            self.reply.clone()
        }
    }

    struct FixedSpeech {
        reply: Result<Vec<u8>, SpeechError>,
        calls: Mutex<usize>,
    }

    impl FixedSpeech {
        fn new(reply: Result<Vec<u8>, SpeechError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl Synthesizer for FixedSpeech {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            *self.calls.lock().unwrap() += 1;
            self.reply.clone()
        }
    }

    fn keyword_advocate(generator: Arc<ScriptedGenerator>) -> Advocate {
        let classifier: Arc<dyn CategoryClassifier> = Arc::new(KeywordClassifier::default());
        Advocate::new(
            SharedClassifier::new(classifier),
            Arc::new(CitationTable::builtin()),
            generator,
        )
    }

    #[tokio::test]
    async fn empty_query_is_rejected_without_side_effects() {
        let generator = ScriptedGenerator::ok("unused");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();

        let err = advocate.answer(&mut conv, "   ").await.unwrap_err();
        assert_eq!(err, QueryError::Empty);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.total_queries(), 0);
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn answer_records_exchange_and_adds_disclaimer() {
        let generator = ScriptedGenerator::ok("Divorce petitions are filed in the Family Court.");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();

        let answer = advocate
            .answer(&mut conv, "My husband is asking for divorce")
            .await
            .unwrap();

        assert_eq!(answer.routing.label(), Some("Family Law"));
        assert!(answer.failure.is_none());
        assert!(answer.text.ends_with(DISCLAIMER));
        assert_eq!(conv.total_queries(), 1);

        let messages = conv.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "My husband is asking for divorce");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, answer.text);
    }

    #[tokio::test]
    async fn answer_mentioning_a_lawyer_skips_disclaimer() {
        let generator = ScriptedGenerator::ok("Please speak to a Lawyer about this.");
        let advocate = keyword_advocate(generator);
        let mut conv = Conversation::new();

        let answer = advocate.answer(&mut conv, "dowry demand").await.unwrap();
        assert_eq!(answer.text, "Please speak to a Lawyer about this.");
    }

    #[tokio::test]
    async fn prompt_carries_category_and_statute() {
        let generator = ScriptedGenerator::ok("ok, consult someone");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();

        advocate
            .answer(&mut conv, "My husband is asking for divorce")
            .await
            .unwrap();

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (prompt, context) = &calls[0];
        assert!(prompt.starts_with("You are PakkiBL"));
        assert!(prompt.contains("concern Family Law"));
        assert!(prompt.contains("Hindu Marriage Act, 1955"));
        assert_eq!(
            context.last().unwrap().content,
            "My husband is asking for divorce"
        );
    }

    #[tokio::test]
    async fn no_match_is_noted_in_prompt() {
        let generator = ScriptedGenerator::ok("consult an advocate");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();

        let answer = advocate
            .answer(&mut conv, "hacked my account")
            .await
            .unwrap();
        assert_eq!(answer.routing, Routing::NoMatch);
        assert!(generator.calls()[0].0.contains("no entry for this issue"));
    }

    #[tokio::test]
    async fn naive_bayes_routing_reaches_prompt() {
        let generator = ScriptedGenerator::ok("consult the cyber cell");
        let classifier: Arc<dyn CategoryClassifier> =
            Arc::new(NaiveBayes::fit(&builtin_corpus()).unwrap());
        let advocate = Advocate::new(
            SharedClassifier::new(classifier),
            Arc::new(CitationTable::builtin()),
            generator.clone(),
        );
        let mut conv = Conversation::new();

        let answer = advocate
            .answer(&mut conv, "hacked my account")
            .await
            .unwrap();
        assert_eq!(answer.routing.label(), Some("Cyber Crime"));
        assert!(
            generator.calls()[0]
                .0
                .contains("Information Technology Act, 2000")
        );
    }

    #[tokio::test]
    async fn history_window_is_bounded() {
        let generator = ScriptedGenerator::ok("see a lawyer");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();

        for i in 0..8 {
            advocate
                .answer(&mut conv, &format!("question {i}"))
                .await
                .unwrap();
        }

        let calls = generator.calls();
        let (_, last_context) = calls.last().unwrap();
        assert_eq!(last_context.len(), HISTORY_WINDOW);
        assert_eq!(last_context.last().unwrap().content, "question 7");
        assert_eq!(conv.total_queries(), 8);
    }

    #[tokio::test]
    async fn provider_error_becomes_advisory_text() {
        let generator = ScriptedGenerator::err(GenerateError::RateLimited("429".into()));
        let speech = FixedSpeech::new(Ok(vec![1, 2, 3]));
        let advocate = keyword_advocate(generator).with_synthesizer(speech.clone());
        let mut conv = Conversation::new();

        let answer = advocate.answer(&mut conv, "salary unpaid").await.unwrap();
        assert_eq!(
            answer.failure,
            Some(GenerateError::RateLimited("429".into()))
        );
        assert_eq!(
            answer.text,
            GenerateError::RateLimited(String::new()).user_message()
        );
        assert_eq!(conv.messages().last().unwrap().content, answer.text);
        // No speech for advisory text.
        assert!(answer.audio.is_none());
        assert_eq!(*speech.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn speech_is_attached_on_success() {
        let generator = ScriptedGenerator::ok("consult a lawyer");
        let speech = FixedSpeech::new(Ok(vec![0xFF, 0xFB]));
        let advocate = keyword_advocate(generator).with_synthesizer(speech);
        let mut conv = Conversation::new();

        let answer = advocate.answer(&mut conv, "tenant rights").await.unwrap();
        assert_eq!(answer.audio, Some(vec![0xFF, 0xFB]));
        assert!(answer.speech_failure.is_none());
    }

    #[tokio::test]
    async fn speech_failure_keeps_text_answer() {
        let generator = ScriptedGenerator::ok("consult a lawyer");
        let speech = FixedSpeech::new(Err(SpeechError::EmptyAudio));
        let advocate = keyword_advocate(generator).with_synthesizer(speech);
        let mut conv = Conversation::new();

        let answer = advocate.answer(&mut conv, "tenant rights").await.unwrap();
        assert_eq!(answer.text, "consult a lawyer");
        assert!(answer.audio.is_none());
        assert_eq!(answer.speech_failure, Some(SpeechError::EmptyAudio));
    }

    #[tokio::test]
    async fn streaming_deltas_reach_sink() {
        let generator = ScriptedGenerator::ok("consult a lawyer");
        let advocate = keyword_advocate(generator);
        let mut conv = Conversation::new();
        let mut seen = String::new();

        advocate
            .answer_streaming(&mut conv, "theft at home", &mut |d: &str| seen.push_str(d))
            .await
            .unwrap();
        assert_eq!(seen, "consult a lawyer");
    }

    #[tokio::test]
    async fn attached_document_is_mentioned() {
        let generator = ScriptedGenerator::ok("consult a lawyer");
        let advocate = keyword_advocate(generator.clone());
        let mut conv = Conversation::new();
        conv.attach_document("lease.pdf", "application/pdf", 2048, Utc::now());

        advocate
            .answer(&mut conv, "tenant eviction")
            .await
            .unwrap();
        assert!(generator.calls()[0].0.contains("'lease.pdf'"));
    }

    #[test]
    fn disclaimer_triggers_are_case_insensitive() {
        assert_eq!(
            with_disclaimer("Talk to a PROFESSIONAL.".into()),
            "Talk to a PROFESSIONAL."
        );
        assert!(with_disclaimer("File an FIR.".into()).ends_with(DISCLAIMER));
    }
}
