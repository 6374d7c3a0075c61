use std::error::Error;
use std::sync::Arc;

use llama_cpp::standard_sampler::StandardSampler;
use llama_cpp::SessionParams;
use tracing::{info, warn};

use crate::config::Settings;
use super::loader::LoadedModel;
use super::prompt::{self, SummaryType};

/// Truthful snapshot of the engine's model state, derived from the live
/// fields on every call rather than cached at startup.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub primary_loaded: bool,
    pub fallback_loaded: bool,
    pub current_model: String,
    pub device: String,
    pub gpu_available: bool,
}

/// Result of a single summarization run.
pub struct SummaryOutput {
    pub summary: String,
    /// Display name of the model that actually produced the summary
    pub model_used: String,
    /// Whether a pretrained fallback answered instead of the fine-tuned model
    pub fallback_used: bool,
}

/// The summarization engine.
///
/// Holds whichever model survived the startup fallback chain. At most one
/// of `primary` / `fallback` is populated; both slots exist because the
/// per-request path prefers the fine-tuned model and retries once on a
/// pretrained fallback if generation fails at runtime. Model state is
/// read-only after construction, so requests share the engine through an
/// `Arc` without locking.
pub struct SummaryEngine {
    primary: Option<LoadedModel>,
    fallback: Option<LoadedModel>,
    settings: Settings,
}

impl SummaryEngine {
    /// Creates an engine around the model the loader chain produced.
    pub fn new(loaded: LoadedModel, settings: Settings) -> Self {
        if loaded.tier.is_primary() {
            Self { primary: Some(loaded), fallback: None, settings }
        } else {
            Self { primary: None, fallback: Some(loaded), settings }
        }
    }

    /// Engine with no models loaded, for exercising handler error paths.
    #[cfg(test)]
    pub fn without_models(settings: Settings) -> Self {
        Self { primary: None, fallback: None, settings }
    }

    /// Reports which model tier is active and the device in use.
    pub fn status(&self) -> EngineStatus {
        let current_model = self
            .primary
            .as_ref()
            .or(self.fallback.as_ref())
            .map(|m| m.display_name())
            .unwrap_or_else(|| "No model available".to_string());
        let gpu_available = self.settings.generation.n_gpu_layers > 0;

        EngineStatus {
            primary_loaded: self.primary.is_some(),
            fallback_loaded: self.fallback.is_some(),
            current_model,
            device: if gpu_available { "gpu".to_string() } else { "cpu".to_string() },
            gpu_available,
        }
    }

    /// Generates a summary of `text`, trying the fine-tuned model first and
    /// falling back to the pretrained model on a runtime failure.
    ///
    /// Generation is CPU-bound and can run for seconds, so it is moved off
    /// the async runtime onto a blocking thread; `/health` stays responsive
    /// while a summary is being produced.
    ///
    /// # Arguments
    ///
    /// * `text` - The transcript to summarize (already validated by the caller)
    /// * `context` - Optional meeting context folded into the prompt
    /// * `max_length` - Requested token budget, clamped to the configured maximum
    /// * `summary_type` - Prompt strategy for the fine-tuned model
    ///
    /// # Errors
    ///
    /// Returns an error if no loaded model produced a summary.
    pub async fn summarize(
        self: Arc<Self>,
        text: &str,
        context: Option<&str>,
        max_length: usize,
        summary_type: SummaryType,
    ) -> Result<SummaryOutput, Box<dyn Error + Send + Sync>> {
        let text = text.to_string();
        let context = context.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            self.summarize_blocking(&text, context.as_deref(), max_length, summary_type)
        })
        .await
        .map_err(|e| format!("Summarization task failed: {}", e))?
    }

    fn summarize_blocking(
        &self,
        text: &str,
        context: Option<&str>,
        max_length: usize,
        summary_type: SummaryType,
    ) -> Result<SummaryOutput, Box<dyn Error + Send + Sync>> {
        let max_tokens = max_length.min(self.settings.generation.max_tokens);

        if let Some(primary) = &self.primary {
            let prompt = prompt::build_primary_prompt(text, context, summary_type);
            match self.run_generation(primary, &prompt, max_tokens) {
                Ok(summary) => {
                    return Ok(SummaryOutput {
                        summary,
                        model_used: primary.display_name(),
                        fallback_used: false,
                    });
                }
                Err(e) => {
                    warn!("Fine-tuned model failed during generation: {}", e);
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            let prompt = prompt::build_fallback_prompt(text, context);
            let summary = self.run_generation(fallback, &prompt, max_tokens)?;
            return Ok(SummaryOutput {
                summary,
                model_used: fallback.display_name(),
                fallback_used: true,
            });
        }

        Err("No models available for summarization".into())
    }

    /// Runs one generation pass on the given model.
    ///
    /// A fresh session is created per request so transcripts never share
    /// context across requests.
    fn run_generation(
        &self,
        loaded: &LoadedModel,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let session_params = SessionParams {
            n_ctx: self.settings.generation.context_size as u32,
            n_batch: 512,
            ..Default::default()
        };

        let mut session = loaded
            .model
            .create_session(session_params)
            .map_err(|e| format!("Failed to create session: {}", e))?;

        session
            .advance_context(prompt)
            .map_err(|e| format!("Failed to advance context: {}", e))?;
        info!("Context advanced, generating up to {} tokens", max_tokens);

        let sampler = StandardSampler::default();
        let completions = session
            .start_completing_with(sampler, max_tokens)
            .map_err(|e| format!("Failed to start completion: {}", e))?;

        let mut summary = String::new();
        let mut generated = 0;
        for token in completions {
            summary.push_str(&loaded.model.token_to_piece(token));
            generated += 1;
            if generated >= max_tokens {
                break;
            }
        }
        info!("Generation finished after {} tokens", generated);

        Ok(summary.trim().to_string())
    }
}
