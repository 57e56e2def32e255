//! Collaborator traits for the hosted text-generation and speech services.

use async_trait::async_trait;
use pakkibl_core::ChatMessage;
use thiserror::Error;

/// Failure talking to the text-generation service.
///
/// Each variant maps to its own user-facing message via
/// [`GenerateError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("{0}")]
    Other(String),
}

impl GenerateError {
    /// Advisory text shown to the user in place of an answer.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Authentication(_) => {
                "Authentication Error: Invalid API key. Please check your API key and try again."
            }
            Self::RateLimited(_) => {
                "Rate Limit Exceeded: Too many requests. Please wait a moment and try again."
            }
            Self::Connection(_) => {
                "Connection Error: Cannot reach the AI service. Please check your internet connection."
            }
            Self::Other(_) => {
                "I apologize, but I encountered an error. Please try again or check your settings."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech provider: {0}")]
    Provider(#[from] GenerateError),
    #[error("speech provider returned no audio")]
    EmptyAudio,
}

/// Hosted text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Generate a completion. `prompt` is the system instruction; `context`
    /// is the recent history window ending with the user's question.
    async fn generate(&self, prompt: &str, context: &[ChatMessage])
    -> Result<String, GenerateError>;

    /// Generate while forwarding text deltas to `on_delta` as they arrive.
    ///
    /// Providers without streaming deliver the whole answer as one delta.
    async fn generate_streaming(
        &self,
        prompt: &str,
        context: &[ChatMessage],
        on_delta: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<String, GenerateError> {
        let text = self.generate(prompt, context).await?;
        on_delta(&text);
        Ok(text)
    }
}

/// Text-to-speech.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_distinct() {
        let errors = [
            GenerateError::Authentication("401".into()),
            GenerateError::RateLimited("429".into()),
            GenerateError::Connection("refused".into()),
            GenerateError::Other("boom".into()),
        ];
        let messages: std::collections::HashSet<&str> =
            errors.iter().map(GenerateError::user_message).collect();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn connection_message_mentions_ai_service() {
        let msg = GenerateError::Connection("dns".into()).user_message();
        assert!(msg.contains("Cannot reach the AI service"));
    }

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        fn model(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            _prompt: &str,
            context: &[ChatMessage],
        ) -> Result<String, GenerateError> {
            Ok(context
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn default_streaming_emits_one_delta() {
        let mut deltas = Vec::new();
        let text = Echo
            .generate_streaming("sys", &[ChatMessage::user("hello")], &mut |d: &str| {
                deltas.push(d.to_string())
            })
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(deltas, vec!["hello"]);
    }
}
