// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

/// Configuration for the summarization model candidates.
///
/// The three entries describe the fallback chain in load order:
/// the fine-tuned meeting summarizer, a general-purpose summarization
/// model, and a smaller summarization model.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Directory where model files are stored
    pub directory: PathBuf,
    /// Filename of the fine-tuned meeting summarization model
    pub primary_file: String,
    /// Human-readable name of the fine-tuned model
    pub primary_name: String,
    /// Filename of the general-purpose fallback model
    pub fallback_file: String,
    /// Human-readable name of the fallback model
    pub fallback_name: String,
    /// Filename of the small fallback model
    pub small_fallback_file: String,
    /// Human-readable name of the small fallback model
    pub small_fallback_name: String,
}

/// Configuration for summary generation parameters
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Size of the context window for inference
    pub context_size: usize,
    /// Upper bound on generated tokens, regardless of what a request asks for
    pub max_tokens: usize,
    /// Number of model layers to offload to the GPU (0 = CPU only)
    pub n_gpu_layers: u32,
    /// Whether to memory-map model files
    pub use_mmap: bool,
    /// Whether to lock model memory
    pub use_mlock: bool,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log file directory
    pub directory: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Model-related settings
    pub models: ModelsConfig,
    /// Generation-related settings
    pub generation: GenerationConfig,
    /// Server-related settings
    pub server: ServerConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with BRIEFER_
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    ///
    /// # Arguments
    ///
    /// * `config_dir` - Optional config directory; defaults to ./config
    pub fn new(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let config_dir = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()
                .map_err(|e| ConfigError::Message(
                    format!("Failed to get current directory: {}", e)
                ))?
                .join("config"),
        };

        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        // Create the local config path
        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        // Load and validate configuration
        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(Environment::with_prefix("BRIEFER").separator("_"))
            .build()?
            .try_deserialize::<Settings>()?;

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Create models directory if it doesn't exist
        if !self.models.directory.exists() {
            std::fs::create_dir_all(&self.models.directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create models directory at {}: {}",
                    self.models.directory.display(), e
                ))
            })?;
        }

        // All three candidate filenames must be set
        for (field, value) in [
            ("models.primary_file", &self.models.primary_file),
            ("models.fallback_file", &self.models.fallback_file),
            ("models.small_fallback_file", &self.models.small_fallback_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(
                    format!("{} must not be empty", field)
                ));
            }
        }

        // Validate max_tokens
        if self.generation.max_tokens == 0 {
            return Err(ConfigError::Message(
                "max_tokens must be greater than 0".to_string()
            ));
        }

        // Validate context_size
        if self.generation.context_size == 0 {
            return Err(ConfigError::Message(
                "context_size must be greater than 0".to_string()
            ));
        }

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.directory {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::tests_support::sample_settings;

    #[test]
    fn valid_settings_pass_validation() {
        assert!(sample_settings().validate().is_ok());
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let mut settings = sample_settings();
        settings.generation.max_tokens = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn zero_context_size_is_rejected() {
        let mut settings = sample_settings();
        settings.generation.context_size = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("context_size"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut settings = sample_settings();
        settings.logging.level = "verbose".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid logging level"));
    }

    #[test]
    fn empty_candidate_filename_is_rejected() {
        let mut settings = sample_settings();
        settings.models.fallback_file = "  ".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_file"));
    }
}
