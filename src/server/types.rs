use serde::{Deserialize, Serialize};

/// Token budget used when a request does not specify `max_length`.
pub const DEFAULT_MAX_LENGTH: usize = 128;

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_summary_type() -> String {
    "standard".to_string()
}

/// Request for single-transcript summarization
#[derive(Deserialize, Debug)]
pub struct SummarizeRequest {
    /// The transcript to summarize; validated by the handler so a missing
    /// field yields a 400 rather than a deserialization rejection
    pub text: Option<String>,
    /// Optional meeting context folded into the prompt
    pub context: Option<String>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_summary_type")]
    pub summary_type: String,
}

/// Response for single-transcript summarization
#[derive(Serialize, Debug)]
pub struct SummarizeResponse {
    pub summary: String,
    pub input_length: usize,
    pub summary_length: usize,
    pub model_used: String,
    pub primary_model_loaded: bool,
    pub fallback_used: bool,
    pub summary_type: String,
    pub max_length_requested: usize,
}

/// Request for batch summarization. `texts` is kept as raw JSON so the
/// handler can answer "missing" and "not a list" with a 400 body of its own.
#[derive(Deserialize, Debug)]
pub struct BatchSummarizeRequest {
    pub texts: Option<serde_json::Value>,
    pub context: Option<String>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_summary_type")]
    pub summary_type: String,
}

/// Per-item result in a batch response: either a summary or an error,
/// never both.
#[derive(Serialize, Debug)]
pub struct BatchItemResult {
    pub summary: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// Response for batch summarization
#[derive(Serialize, Debug)]
pub struct BatchSummarizeResponse {
    pub results: Vec<BatchItemResult>,
    pub total_processed: usize,
    pub primary_model_loaded: bool,
    pub model_used: String,
}

/// Request for multi-strategy summarization
#[derive(Deserialize, Debug)]
pub struct DetailedSummarizeRequest {
    pub text: Option<String>,
    pub context: Option<String>,
}

/// One strategy's result in a detailed response
#[derive(Serialize, Debug)]
pub struct DetailedEntry {
    pub summary_type: String,
    pub summary: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// Response for multi-strategy summarization
#[derive(Serialize, Debug)]
pub struct DetailedSummarizeResponse {
    pub summaries: Vec<DetailedEntry>,
    pub input_length: usize,
    pub primary_model_loaded: bool,
}

/// Health check response
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub primary_model_loaded: bool,
    pub fallback_model_loaded: bool,
    pub current_model: String,
    pub device: String,
    pub gpu_available: bool,
}

/// Error payload for 400/500 responses
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
