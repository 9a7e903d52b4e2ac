//! LLM interaction: the chat seam and the two calls the orchestrator makes.
//!
//! [`ChatBackend`] is the only thing the orchestrator knows about the model:
//! one system prompt and one user message in, one reply out. Production code
//! uses [`ProviderBackend`], a thin wrapper over an `edgequake_llm` provider;
//! tests substitute a scripted backend. All prompt text lives in
//! [`crate::prompts`].
//!
//! Calls are never retried. A failed extraction call drops its chunk; a
//! failed report call fails the analysis.

use crate::config::AnalysisConfig;
use crate::error::{AnalyzerError, ChunkError};
use crate::model::{ExtractedInformation, ExtractionResult};
use crate::pipeline::response::parse_extraction_reply;
use crate::prompts::{extraction_message, report_message, EXTRACTION_PROMPT, REPORT_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One model reply with its token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl ChatReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// A chat-completion endpoint taking a system prompt and a user message.
pub trait ChatBackend: Send + Sync {
    fn invoke(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> impl Future<Output = Result<ChatReply, AnalyzerError>> + Send;
}

/// [`ChatBackend`] over any `edgequake_llm` provider.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalysisConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

impl ChatBackend for ProviderBackend {
    async fn invoke(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<ChatReply, AnalyzerError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_message),
        ];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| AnalyzerError::LlmApiError {
                message: e.to_string(),
            })?;
        Ok(ChatReply {
            content: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// Build `CompletionOptions` from the analysis config.
fn build_options(config: &AnalysisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Result of one extraction call, successful or not.
#[derive(Debug)]
pub struct ChunkExtraction {
    pub result: Result<ExtractionResult, ChunkError>,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Ask the model to extract the eleven fields from one chunk.
///
/// Never returns `Err`: call and parse failures are captured as a
/// [`ChunkError`] so the caller can drop the chunk and continue.
pub async fn extract_chunk<B: ChatBackend>(
    backend: &B,
    chunk_num: usize,
    chunk: &str,
) -> ChunkExtraction {
    let start = Instant::now();
    let reply = backend
        .invoke(EXTRACTION_PROMPT, &extraction_message(chunk))
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match reply {
        Ok(reply) => {
            debug!(
                "Chunk {}: {} input tokens, {} output tokens, {}ms",
                chunk_num, reply.input_tokens, reply.output_tokens, duration_ms
            );
            let result = parse_extraction_reply(&reply.content, chunk_num);
            if let Err(ref e) = result {
                warn!("{}", e);
            }
            ChunkExtraction {
                result,
                input_tokens: reply.input_tokens,
                output_tokens: reply.output_tokens,
                duration_ms,
            }
        }
        Err(e) => {
            let err = ChunkError::LlmFailed {
                chunk: chunk_num,
                detail: e.to_string(),
            };
            warn!("{}", err);
            ChunkExtraction {
                result: Err(err),
                input_tokens: 0,
                output_tokens: 0,
                duration_ms,
            }
        }
    }
}

/// Ask the model for the investment report. Failure is fatal.
pub async fn generate_report_text<B: ChatBackend>(
    backend: &B,
    info: &ExtractedInformation,
) -> Result<ChatReply, AnalyzerError> {
    let reply = backend
        .invoke(REPORT_PROMPT, &report_message(info))
        .await?;
    debug!(
        "Report: {} input tokens, {} output tokens, {} chars",
        reply.input_tokens,
        reply.output_tokens,
        reply.content.len()
    );
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    /// Replies with a fixed string, or fails when `reply` is `None`.
    struct FixedBackend {
        reply: Option<&'static str>,
    }

    impl ChatBackend for FixedBackend {
        async fn invoke(&self, system: &str, user: &str) -> Result<ChatReply, AnalyzerError> {
            assert!(!system.is_empty());
            assert!(!user.is_empty());
            match self.reply {
                Some(r) => Ok(ChatReply {
                    content: r.to_string(),
                    input_tokens: 10,
                    output_tokens: 5,
                }),
                None => Err(AnalyzerError::LlmApiError {
                    message: "503 overloaded".into(),
                }),
            }
        }
    }

    #[test]
    fn build_options_defaults() {
        let config = AnalysisConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(2000));
    }

    #[tokio::test]
    async fn extract_chunk_parses_reply() {
        let backend = FixedBackend {
            reply: Some(r#"{"company_name": "Acme", "confidence_scores": {"company_name": 0.9}}"#),
        };
        let out = extract_chunk(&backend, 1, "Acme makes robots.").await;
        let result = out.result.unwrap();
        assert_eq!(result.value(Field::CompanyName), Some("Acme"));
        assert_eq!(out.input_tokens, 10);
        assert_eq!(out.output_tokens, 5);
    }

    #[tokio::test]
    async fn extract_chunk_captures_call_failure() {
        let backend = FixedBackend { reply: None };
        let out = extract_chunk(&backend, 2, "text").await;
        match out.result {
            Err(ChunkError::LlmFailed { chunk, detail }) => {
                assert_eq!(chunk, 2);
                assert!(detail.contains("503"));
            }
            other => panic!("expected LlmFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn extract_chunk_captures_bad_json() {
        let backend = FixedBackend {
            reply: Some("Sorry, I cannot help with that."),
        };
        let out = extract_chunk(&backend, 1, "text").await;
        assert!(matches!(out.result, Err(ChunkError::InvalidJson { chunk: 1, .. })));
        // Tokens are still accounted for.
        assert_eq!(out.output_tokens, 5);
    }

    #[tokio::test]
    async fn report_failure_propagates() {
        let backend = FixedBackend { reply: None };
        let info = ExtractedInformation::not_provided();
        let err = generate_report_text(&backend, &info).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::LlmApiError { .. }));
    }
}
