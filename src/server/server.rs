use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use axum::{Router, routing::{get, post}};
use tracing::info;

use crate::summarizer::SummaryEngine;
use super::routes;

/// API Server for handling summarization requests
pub struct ApiServer {
    engine: Arc<SummaryEngine>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(engine: SummaryEngine, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self {
            engine: Arc::new(engine),
            host,
            port,
        }
    }

    pub fn router(&self) -> Router {
        let app_state = Arc::clone(&self.engine);

        Router::new()
            .route("/health", get(routes::health))
            .route("/summarize", post(routes::summarize))
            .route("/batch_summarize", post(routes::batch_summarize))
            .route("/summarize_detailed", post(routes::summarize_detailed))
            .with_state(app_state)
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = self.router();

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully\n");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::tests_support::sample_settings;

    fn make_server() -> ApiServer {
        // No models loaded, so every generation attempt reports an error;
        // handler structure is observable without model weights
        let engine = SummaryEngine::without_models(sample_settings());
        ApiServer::new(engine, "127.0.0.1".to_string(), 0)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_live_model_state() {
        let app = make_server().router();

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = body_json(resp).await;
        assert_eq!(parsed["status"], "healthy");
        assert_eq!(parsed["primary_model_loaded"], false);
        assert_eq!(parsed["fallback_model_loaded"], false);
        assert_eq!(parsed["current_model"], "No model available");
        assert_eq!(parsed["device"], "cpu");
    }

    #[tokio::test]
    async fn batch_yields_one_ordered_entry_per_item_with_errors_contained() {
        let app = make_server().router();

        let req = post_json(
            "/batch_summarize",
            r#"{"texts": ["too short", 42, "the weekly sync covered hiring and the roadmap"]}"#,
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = body_json(resp).await;
        let results = parsed["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(parsed["total_processed"], 3);

        // Entries come back in input order, each failure contained to its item
        assert_eq!(results[0]["error"], "Text too short for summarization");
        assert!(results[0]["summary"].is_null());
        assert_eq!(results[1]["error"], "Text item must be a string");
        let last_error = results[2]["error"].as_str().unwrap();
        assert!(last_error.contains("No models available"));
    }

    #[tokio::test]
    async fn batch_rejects_non_list_texts_with_json_error() {
        let app = make_server().router();

        let req = post_json("/batch_summarize", r#"{"texts": "just one transcript"}"#);
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = body_json(resp).await;
        assert_eq!(parsed["error"], "texts must be a list");
    }

    #[tokio::test]
    async fn detailed_returns_exactly_three_tagged_entries() {
        let app = make_server().router();

        let req = post_json(
            "/summarize_detailed",
            r#"{"text": "the weekly sync covered hiring and the roadmap"}"#,
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = body_json(resp).await;
        let summaries = parsed["summaries"].as_array().unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0]["summary_type"], "comprehensive");
        assert_eq!(summaries[1]["summary_type"], "detailed");
        assert_eq!(summaries[2]["summary_type"], "action_focused");
        // Each entry is tagged independently
        for entry in summaries {
            assert!(entry["summary"].is_null());
            assert!(entry["error"].as_str().unwrap().contains("No models available"));
        }
    }

    #[tokio::test]
    async fn detailed_rejects_short_text() {
        let app = make_server().router();

        let req = post_json("/summarize_detailed", r#"{"text": "too short"}"#);
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = body_json(resp).await;
        assert_eq!(parsed["error"], "Text too short for summarization");
    }

    #[tokio::test]
    async fn non_string_text_gets_json_error_body() {
        let app = make_server().router();

        let req = post_json("/summarize", r#"{"text": 123}"#);
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = body_json(resp).await;
        assert!(parsed["error"].is_string());
    }

    #[tokio::test]
    async fn negative_max_length_gets_json_error_body() {
        let app = make_server().router();

        let req = post_json(
            "/summarize",
            r#"{"text": "the weekly sync covered hiring and the roadmap", "max_length": -5}"#,
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = body_json(resp).await;
        assert!(parsed["error"].is_string());
    }

    #[tokio::test]
    async fn syntactically_invalid_body_gets_json_error_body() {
        let app = make_server().router();

        let req = post_json("/summarize", "not json at all");
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = body_json(resp).await;
        assert!(parsed["error"].is_string());
    }

    #[tokio::test]
    async fn summarize_without_models_is_a_server_error() {
        let app = make_server().router();

        let req = post_json(
            "/summarize",
            r#"{"text": "the weekly sync covered hiring and the roadmap"}"#,
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parsed = body_json(resp).await;
        assert!(parsed["error"].as_str().unwrap().contains("No models available"));
    }
}
