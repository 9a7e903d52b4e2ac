//! Configuration types for executive-summary analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. The defaults are 2 000-character chunks
//! with 200 characters of overlap, at most three chunks sent for
//! extraction, temperature 0.1 and 2 000 output tokens per call.

use crate::error::AnalyzerError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Configuration for one executive-summary analysis.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use exec_summary_analyzer::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4.1-mini")
///     .max_chunks(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// LLM model identifier, e.g. "gpt-4", "claude-sonnet-4-20250514".
    /// If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for every call. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens generated per call. Default: 2000.
    pub max_tokens: usize,

    /// Target chunk length in characters. Default: 2000.
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks. Default: 200.
    pub chunk_overlap: usize,

    /// Upper bound on chunks sent for extraction. Default: 3.
    ///
    /// Bounds cost, not correctness: text beyond the first chunks of a long
    /// document is never seen by the model.
    pub max_chunks: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Largest accepted input file in bytes. Default: 16 MiB.
    pub max_file_bytes: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-chunk progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 2000,
            chunk_size: 2000,
            chunk_overlap: 200,
            max_chunks: 3,
            password: None,
            max_file_bytes: 16 * 1024 * 1024,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("max_chunks", &self.max_chunks)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_file_bytes", &self.max_file_bytes)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will be requested from the provider.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n;
        self
    }

    pub fn chunk_overlap(mut self, n: usize) -> Self {
        self.config.chunk_overlap = n;
        self
    }

    pub fn max_chunks(mut self, n: usize) -> Self {
        self.config.max_chunks = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalyzerError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "Chunk size must be ≥ 1".into(),
            ));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(AnalyzerError::InvalidConfig(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.max_chunks == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "At least one chunk must be processed".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_three_chunks_of_two_thousand_chars() {
        let c = AnalysisConfig::default();
        assert_eq!(c.chunk_size, 2000);
        assert_eq!(c.chunk_overlap, 200);
        assert_eq!(c.max_chunks, 3);
        assert_eq!(c.max_tokens, 2000);
        assert_eq!(c.temperature, 0.1);
        assert_eq!(c.max_file_bytes, 16 * 1024 * 1024);
        assert_eq!(c.model_or_default(), "gpt-4");
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AnalysisConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let err = AnalysisConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn zero_chunks_rejected() {
        assert!(AnalysisConfig::builder().max_chunks(0).build().is_err());
        assert!(AnalysisConfig::builder().chunk_size(0).build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = AnalysisConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
