//! Search execution and orchestration

use super::models::{Credential, SearchRequest};
use crate::error::{Result, ToolError};
use crate::network::RetryingDispatcher;
use crate::query::RequestBuilder;
use crate::results::{FormattedResponse, RawResult, ResponseFormatter, ResultClassifier};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Successful tool content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolContent {
    /// Classified and rendered results
    Formatted(FormattedResponse),
    /// Backend payload, untouched
    Raw(RawResult),
}

/// Outcome of one `search` tool invocation.
///
/// Serializes as `{"content": ...}` or `{"error": {"kind", "message"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutput {
    Content(ToolContent),
    Error(ToolError),
}

impl ToolOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn content(&self) -> Option<&ToolContent> {
        match self {
            Self::Content(content) => Some(content),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            Self::Content(_) => None,
            Self::Error(err) => Some(err),
        }
    }
}

/// Search executor driving one request through the full pipeline
pub struct Search {
    builder: RequestBuilder,
    dispatcher: RetryingDispatcher,
    classifier: ResultClassifier,
    formatter: ResponseFormatter,
}

impl Search {
    /// Create a new search executor
    pub fn new(builder: RequestBuilder, dispatcher: RetryingDispatcher) -> Self {
        Self {
            builder,
            dispatcher,
            classifier: ResultClassifier::new(),
            formatter: ResponseFormatter::new(),
        }
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Run the `search` tool for raw caller arguments
    pub async fn execute(&self, arguments: &Value, credential: &Credential) -> ToolOutput {
        let span = info_span!("search", invocation = %Uuid::new_v4());

        async move {
            match self.run(arguments, credential).await {
                Ok(content) => ToolOutput::Content(content),
                Err(err) => {
                    warn!(kind = %err.kind(), "Search failed: {}", err);
                    ToolOutput::Error(ToolError::from(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, arguments: &Value, credential: &Credential) -> Result<ToolContent> {
        let start = Instant::now();
        let request = self.builder.build(arguments)?;
        debug!(
            engine = request.params.engine(),
            mode = %request.mode,
            raw = request.raw,
            "Built search request"
        );

        let content = self.execute_request(&request, credential).await?;

        info!(
            engine = request.params.engine(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(content)
    }

    /// Dispatch an already built request and render the payload
    pub async fn execute_request(
        &self,
        request: &SearchRequest,
        credential: &Credential,
    ) -> Result<ToolContent> {
        let raw = self.dispatcher.execute(request, credential).await?;

        if request.raw {
            return Ok(ToolContent::Raw(raw));
        }

        let classified = self.classifier.classify(&raw);
        debug!(categories = ?classified.category_names(), "Classified payload");

        Ok(ToolContent::Formatted(
            self.formatter.format(&classified, request.mode),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SearchError};
    use crate::network::{Backend, ManualClock, RetryPolicy};
    use crate::results::ResultCategory;
    use crate::search::{ResponseMode, SearchParams};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<RawResult>>>,
        seen: Mutex<Vec<SearchParams>>,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self, params: &SearchParams, _credential: &Credential) -> Result<RawResult> {
            self.seen.lock().unwrap().push(params.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SearchError::TransientNetwork("script exhausted".into())))
        }
    }

    fn search(script: Vec<Result<RawResult>>) -> (Search, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        });
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter_fraction: 0.0,
            deadline: Duration::from_secs(30),
        };
        let dispatcher =
            RetryingDispatcher::with_clock(backend.clone(), policy, Arc::new(ManualClock::new()));
        (Search::new(RequestBuilder::default(), dispatcher), backend)
    }

    fn credential() -> Credential {
        Credential::new("test-key")
    }

    fn weather_payload() -> Value {
        json!({
            "search_metadata": {"id": "abc", "status": "Success"},
            "answer_box": {
                "type": "weather_result",
                "temperature": "18",
                "unit": "Celsius",
                "precipitation": "10%",
                "humidity": "72%",
                "location": "London",
                "weather": "Cloudy"
            },
            "organic_results": [
                {"position": 1, "title": "London weather", "link": "https://example.com", "snippet": "Forecast", "favicon": "x"}
            ]
        })
    }

    #[tokio::test]
    async fn test_compact_weather_search() {
        let (search, backend) = search(vec![Ok(RawResult::new(weather_payload()))]);

        let output = search
            .execute(
                &json!({"params": {"q": "weather in London", "engine": "google"}, "mode": "compact"}),
                &credential(),
            )
            .await;

        let Some(ToolContent::Formatted(formatted)) = output.content() else {
            panic!("expected formatted content, got {output:?}");
        };
        assert_eq!(formatted.mode, ResponseMode::Compact);

        let answer = formatted.section(ResultCategory::AnswerBox).unwrap();
        assert_eq!(answer.items[0]["temperature"], "18");
        assert!(answer.items[0].get("humidity").is_none());

        let organic = formatted.section(ResultCategory::Organic).unwrap();
        assert!(organic.items[0].get("favicon").is_none());

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].engine(), "google");
        assert!(seen[0].get("api_key").is_none());
    }

    #[tokio::test]
    async fn test_raw_mode_returns_payload_untouched() {
        let (search, _) = search(vec![Ok(RawResult::new(weather_payload()))]);

        let output = search
            .execute(&json!({"params": {"q": "weather"}, "raw": true}), &credential())
            .await;

        assert_eq!(
            output,
            ToolOutput::Content(ToolContent::Raw(RawResult::new(weather_payload())))
        );
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"content": weather_payload()})
        );
    }

    #[tokio::test]
    async fn test_default_engine_applied() {
        let (search, backend) = search(vec![Ok(RawResult::new(json!({})))]);

        let output = search
            .execute(&json!({"params": {"q": "coffee"}}), &credential())
            .await;
        assert!(!output.is_error());
        assert_eq!(backend.seen.lock().unwrap()[0].engine(), "google_light");
    }

    #[tokio::test]
    async fn test_validation_error_never_reaches_backend() {
        let (search, backend) = search(vec![]);

        let output = search
            .execute(&json!({"params": {"engine": "google"}}), &credential())
            .await;

        let err = output.error().unwrap();
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert!(err.message.contains('q'));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auth_error_serializes_tagged() {
        let (search, backend) = search(vec![Err(SearchError::Auth("Invalid API key.".into()))]);

        let output = search
            .execute(&json!({"params": {"q": "coffee"}}), &credential())
            .await;

        assert_eq!(backend.seen.lock().unwrap().len(), 1);
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"error": {
                "kind": "AuthError",
                "message": "credential rejected by backend: Invalid API key."
            }})
        );
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let limited = || {
            Err(SearchError::RateLimited {
                message: "Too many requests".into(),
                retry_after: None,
            })
        };
        let (search, backend) = search(vec![
            limited(),
            limited(),
            Ok(RawResult::new(json!({"organic_results": [{"title": "ok"}]}))),
        ]);

        let output = search
            .execute(&json!({"params": {"q": "coffee"}}), &credential())
            .await;

        assert!(!output.is_error());
        assert_eq!(backend.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_payload_is_unstructured() {
        let (search, _) = search(vec![Ok(RawResult::new(json!({"local_map": {"gps": [1, 2]}})))]);

        let output = search
            .execute(&json!({"params": {"q": "map"}}), &credential())
            .await;

        let Some(ToolContent::Formatted(formatted)) = output.content() else {
            panic!("expected formatted content");
        };
        assert_eq!(formatted.sections.len(), 1);
        assert_eq!(formatted.sections[0].category, ResultCategory::Unstructured);
    }
}
