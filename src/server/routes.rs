use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::summarizer::{SummaryEngine, SummaryType};
use super::types::{
    BatchItemResult, BatchSummarizeRequest, BatchSummarizeResponse, DetailedEntry,
    DetailedSummarizeRequest, DetailedSummarizeResponse, ErrorResponse, HealthResponse,
    SummarizeRequest, SummarizeResponse, DEFAULT_MAX_LENGTH,
};

/// Minimum number of non-whitespace characters a transcript must contain.
const MIN_TEXT_CHARS: usize = 10;

/// Checks that a transcript is present and long enough to summarize.
fn validate_text(text: Option<&str>) -> Result<&str, &'static str> {
    let text = match text {
        Some(text) => text,
        None => return Err("No text provided"),
    };
    if text.chars().filter(|c| !c.is_whitespace()).count() < MIN_TEXT_CHARS {
        return Err("Text too short for summarization");
    }
    Ok(text)
}

/// Checks that the batch payload carries a JSON list of texts.
fn parse_texts(texts: Option<&serde_json::Value>) -> Result<&Vec<serde_json::Value>, &'static str> {
    match texts {
        None => Err("No texts provided"),
        Some(serde_json::Value::Array(items)) => Ok(items),
        Some(_) => Err("texts must be a list"),
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Returns the health of the service and which model tier is active.
/// Always 200; the body reflects the live engine state.
pub async fn health(State(engine): State<Arc<SummaryEngine>>) -> impl IntoResponse {
    info!("Health check endpoint called");
    let status = engine.status();
    Json(HealthResponse {
        status: "healthy".to_string(),
        primary_model_loaded: status.primary_loaded,
        fallback_model_loaded: status.fallback_loaded,
        current_model: status.current_model,
        device: status.device,
        gpu_available: status.gpu_available,
    })
}

/// Summarizes a single transcript.
pub async fn summarize(
    State(engine): State<Arc<SummaryEngine>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    // A malformed body still gets the contractual {error} JSON, not the
    // extractor's plain-text rejection
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!(
        "Summarize endpoint called (max_length: {}, summary_type: {})",
        request.max_length, request.summary_type
    );

    let text = match validate_text(request.text.as_deref()) {
        Ok(text) => text,
        Err(message) => return bad_request(message),
    };
    let summary_type: SummaryType = match request.summary_type.parse() {
        Ok(summary_type) => summary_type,
        Err(message) => return bad_request(message),
    };

    match engine
        .clone()
        .summarize(text, request.context.as_deref(), request.max_length, summary_type)
        .await
    {
        Ok(output) => {
            info!("Summary generated by {}", output.model_used);
            let status = engine.status();
            Json(SummarizeResponse {
                input_length: text.chars().count(),
                summary_length: output.summary.chars().count(),
                summary: output.summary,
                model_used: output.model_used,
                primary_model_loaded: status.primary_loaded,
                fallback_used: output.fallback_used,
                summary_type: summary_type.as_str().to_string(),
                max_length_requested: request.max_length,
            })
            .into_response()
        }
        Err(e) => {
            error!("Summarization failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response()
        }
    }
}

/// Summarizes a list of transcripts, one result entry per input item in
/// input order. A failing item never aborts the rest of the batch.
pub async fn batch_summarize(
    State(engine): State<Arc<SummaryEngine>>,
    payload: Result<Json<BatchSummarizeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!("Batch summarize endpoint called");

    let items = match parse_texts(request.texts.as_ref()) {
        Ok(items) => items,
        Err(message) => return bad_request(message),
    };
    let summary_type: SummaryType = match request.summary_type.parse() {
        Ok(summary_type) => summary_type,
        Err(message) => return bad_request(message),
    };

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let entry = match item.as_str() {
            None => BatchItemResult {
                summary: None,
                error: Some("Text item must be a string".to_string()),
                model_used: None,
            },
            Some(text) => match validate_text(Some(text)) {
                Err(message) => BatchItemResult {
                    summary: None,
                    error: Some(message.to_string()),
                    model_used: None,
                },
                Ok(text) => match engine
                    .clone()
                    .summarize(text, request.context.as_deref(), request.max_length, summary_type)
                    .await
                {
                    Ok(output) => BatchItemResult {
                        summary: Some(output.summary),
                        error: None,
                        model_used: Some(output.model_used),
                    },
                    Err(e) => {
                        error!("Batch item failed: {}", e);
                        BatchItemResult {
                            summary: None,
                            error: Some(e.to_string()),
                            model_used: None,
                        }
                    }
                },
            },
        };
        results.push(entry);
    }

    let status = engine.status();
    info!("Batch complete: {} items processed", results.len());
    Json(BatchSummarizeResponse {
        total_processed: results.len(),
        results,
        primary_model_loaded: status.primary_loaded,
        model_used: status.current_model,
    })
    .into_response()
}

/// Runs the three non-standard prompt strategies against one transcript
/// and reports each result independently.
pub async fn summarize_detailed(
    State(engine): State<Arc<SummaryEngine>>,
    payload: Result<Json<DetailedSummarizeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!("Detailed summarize endpoint called");

    let text = match validate_text(request.text.as_deref()) {
        Ok(text) => text,
        Err(message) => return bad_request(message),
    };

    let strategies = [
        SummaryType::Comprehensive,
        SummaryType::Detailed,
        SummaryType::ActionFocused,
    ];

    let mut summaries = Vec::with_capacity(strategies.len());
    for summary_type in strategies {
        let entry = match engine
            .clone()
            .summarize(text, request.context.as_deref(), DEFAULT_MAX_LENGTH, summary_type)
            .await
        {
            Ok(output) => DetailedEntry {
                summary_type: summary_type.as_str().to_string(),
                summary: Some(output.summary),
                error: None,
                model_used: Some(output.model_used),
            },
            Err(e) => {
                error!("Strategy '{}' failed: {}", summary_type.as_str(), e);
                DetailedEntry {
                    summary_type: summary_type.as_str().to_string(),
                    summary: None,
                    error: Some(e.to_string()),
                    model_used: None,
                }
            }
        };
        summaries.push(entry);
    }

    let status = engine.status();
    Json(DetailedSummarizeResponse {
        summaries,
        input_length: text.chars().count(),
        primary_model_loaded: status.primary_loaded,
    })
    .into_response()
}
