//! LLM layer: provider traits, OpenAI-compatible HTTP clients, and the advocate
//! that routes a question through classification into a generated answer.

pub mod advocate;
pub mod config;
pub mod provider;

#[cfg(feature = "http")]
pub mod http;

pub use advocate::{Advocate, Answer, DISCLAIMER, HISTORY_WINDOW, build_system_prompt};
pub use config::{ConfigError, LlmConfig, SpeechConfig};
pub use provider::{GenerateError, Generator, SpeechError, Synthesizer};

#[cfg(feature = "http")]
pub use http::{OpenAiClient, OpenAiSpeech};
