use std::path::PathBuf;

use llama_cpp::{LlamaModel, LlamaParams};
use tracing::{info, warn};

use crate::config::Settings;

/// Position of a model in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// The fine-tuned meeting summarization model
    Primary,
    /// The general-purpose pretrained summarization model
    Fallback,
    /// The smaller pretrained summarization model
    SmallFallback,
}

impl ModelTier {
    pub fn label(&self) -> &'static str {
        match self {
            ModelTier::Primary => "fine-tuned",
            ModelTier::Fallback => "fallback",
            ModelTier::SmallFallback => "small fallback",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, ModelTier::Primary)
    }
}

/// One entry in the ordered fallback chain: which tier it is, what to call
/// it, and where its weights live.
#[derive(Debug, Clone)]
pub struct ModelCandidate {
    pub tier: ModelTier,
    pub name: String,
    pub path: PathBuf,
}

/// A candidate that failed to load, with the reason kept for logging and
/// the startup banner.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub name: String,
    pub reason: String,
}

/// Typed outcome of walking the fallback chain.
pub enum LoadOutcome<M> {
    /// The first candidate that loaded, plus the failures that preceded it.
    Loaded {
        candidate: ModelCandidate,
        model: M,
        skipped: Vec<LoadFailure>,
    },
    /// Every candidate failed.
    AllFailed(Vec<LoadFailure>),
}

/// A model that made it through the chain, ready for inference.
pub struct LoadedModel {
    pub tier: ModelTier,
    pub name: String,
    pub model: LlamaModel,
}

impl LoadedModel {
    /// Human-readable name including the tier, e.g. "meeting-summarizer (fine-tuned)".
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.tier.label())
    }
}

/// Builds the fallback chain from settings, in load order.
pub fn candidates_from_settings(settings: &Settings) -> Vec<ModelCandidate> {
    let models = &settings.models;
    vec![
        ModelCandidate {
            tier: ModelTier::Primary,
            name: models.primary_name.clone(),
            path: models.directory.join(&models.primary_file),
        },
        ModelCandidate {
            tier: ModelTier::Fallback,
            name: models.fallback_name.clone(),
            path: models.directory.join(&models.fallback_file),
        },
        ModelCandidate {
            tier: ModelTier::SmallFallback,
            name: models.small_fallback_name.clone(),
            path: models.directory.join(&models.small_fallback_file),
        },
    ]
}

/// Walks the candidate list in order, returning the first success along
/// with the failures encountered before it. The load step is injected so
/// the chain logic stays independent of the inference backend.
pub fn load_first_with<M, F>(candidates: Vec<ModelCandidate>, mut load: F) -> LoadOutcome<M>
where
    F: FnMut(&ModelCandidate) -> Result<M, String>,
{
    let mut failures = Vec::new();
    for candidate in candidates {
        match load(&candidate) {
            Ok(model) => {
                return LoadOutcome::Loaded {
                    candidate,
                    model,
                    skipped: failures,
                };
            }
            Err(reason) => {
                failures.push(LoadFailure {
                    name: candidate.name.clone(),
                    reason,
                });
            }
        }
    }
    LoadOutcome::AllFailed(failures)
}

/// Loads the first available model in the fallback chain via llama_cpp.
///
/// Each failed candidate is logged and skipped; the first successful load
/// wins and no further candidates are tried. If all three fail the error
/// carries every reason, and startup is expected to abort.
pub fn load_first_available(
    settings: &Settings,
) -> Result<LoadedModel, Box<dyn std::error::Error + Send + Sync>> {
    let n_gpu_layers = settings.generation.n_gpu_layers;
    let use_mmap = settings.generation.use_mmap;
    let use_mlock = settings.generation.use_mlock;

    let outcome = load_first_with(candidates_from_settings(settings), |candidate| {
        info!(
            "Loading {} model '{}' from {}",
            candidate.tier.label(),
            candidate.name,
            candidate.path.display()
        );
        let llama_params = LlamaParams { n_gpu_layers, use_mmap, use_mlock, ..Default::default() };
        LlamaModel::load_from_file(&candidate.path, llama_params)
            .map_err(|e| format!("Failed to load model with llama_cpp: {}", e))
    });

    match outcome {
        LoadOutcome::Loaded { candidate, model, skipped } => {
            for failure in &skipped {
                warn!("Model '{}' failed to load: {}", failure.name, failure.reason);
            }
            info!(
                "Loaded {} model '{}' successfully",
                candidate.tier.label(),
                candidate.name
            );
            Ok(LoadedModel {
                tier: candidate.tier,
                name: candidate.name,
                model,
            })
        }
        LoadOutcome::AllFailed(failures) => {
            let reasons: Vec<String> = failures
                .iter()
                .map(|f| format!("{}: {}", f.name, f.reason))
                .collect();
            Err(format!("All models failed to load ({})", reasons.join("; ")).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<ModelCandidate> {
        vec![
            ModelCandidate {
                tier: ModelTier::Primary,
                name: "meeting-summarizer".to_string(),
                path: PathBuf::from("models/meeting-summarizer.gguf"),
            },
            ModelCandidate {
                tier: ModelTier::Fallback,
                name: "summarizer-large".to_string(),
                path: PathBuf::from("models/summarizer-large.gguf"),
            },
            ModelCandidate {
                tier: ModelTier::SmallFallback,
                name: "summarizer-small".to_string(),
                path: PathBuf::from("models/summarizer-small.gguf"),
            },
        ]
    }

    #[test]
    fn first_success_wins_and_stops_the_chain() {
        let mut attempts = Vec::new();
        let outcome = load_first_with(chain(), |candidate| {
            attempts.push(candidate.name.clone());
            Ok(())
        });

        match outcome {
            LoadOutcome::Loaded { candidate, skipped, .. } => {
                assert_eq!(candidate.tier, ModelTier::Primary);
                assert!(skipped.is_empty());
            }
            LoadOutcome::AllFailed(_) => panic!("expected a successful load"),
        }
        // Only the first candidate should have been attempted
        assert_eq!(attempts, vec!["meeting-summarizer"]);
    }

    #[test]
    fn failures_fall_through_in_order() {
        let outcome = load_first_with(chain(), |candidate| {
            if candidate.tier.is_primary() {
                Err("weights missing".to_string())
            } else {
                Ok(())
            }
        });

        match outcome {
            LoadOutcome::Loaded { candidate, skipped, .. } => {
                assert_eq!(candidate.tier, ModelTier::Fallback);
                assert_eq!(skipped.len(), 1);
                assert_eq!(skipped[0].name, "meeting-summarizer");
                assert_eq!(skipped[0].reason, "weights missing");
            }
            LoadOutcome::AllFailed(_) => panic!("expected the fallback to load"),
        }
    }

    #[test]
    fn all_failures_are_collected_in_chain_order() {
        let outcome = load_first_with::<(), _>(chain(), |candidate| {
            Err(format!("no such file: {}", candidate.path.display()))
        });

        match outcome {
            LoadOutcome::AllFailed(failures) => {
                assert_eq!(failures.len(), 3);
                assert_eq!(failures[0].name, "meeting-summarizer");
                assert_eq!(failures[1].name, "summarizer-large");
                assert_eq!(failures[2].name, "summarizer-small");
            }
            LoadOutcome::Loaded { .. } => panic!("expected every candidate to fail"),
        }
    }

    #[test]
    fn candidates_follow_settings_order() {
        let settings = crate::config::tests_support::sample_settings();
        let candidates = candidates_from_settings(&settings);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].tier, ModelTier::Primary);
        assert_eq!(candidates[1].tier, ModelTier::Fallback);
        assert_eq!(candidates[2].tier, ModelTier::SmallFallback);
        assert!(candidates[0].path.ends_with("meeting-summarizer.Q4_K_M.gguf"));
    }

    #[test]
    fn display_name_includes_tier_label() {
        assert_eq!(ModelTier::Primary.label(), "fine-tuned");
        assert_eq!(ModelTier::Fallback.label(), "fallback");
        assert_eq!(ModelTier::SmallFallback.label(), "small fallback");
    }
}
