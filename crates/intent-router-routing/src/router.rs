use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use intent_router_core::{Intent, Result, RouteStage, RouterError};
use intent_router_llm::LLMRegistry;

use crate::classifier::Classifier;
use crate::config::RouterConfig;
use crate::handler::{ChunkStream, Handler};
use crate::route_table::RouteTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRequest {
    /// Correlation id for tracing only
    pub id: Uuid,
    pub raw_input: String,
}

impl RoutingRequest {
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_input: raw_input.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResponse {
    pub output_text: String,
    pub matched_intent: Intent,
    pub handler: String,
}

/// Streaming counterpart of [`RoutingResponse`]
pub struct RoutedStream {
    pub matched_intent: Intent,
    pub handler: String,
    pub stream: ChunkStream,
}

impl RoutedStream {
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(chunk) = self.stream.next().await {
            let chunk = chunk?;
            text.push_str(&chunk.delta);
            if chunk.is_final {
                break;
            }
        }
        Ok(text)
    }
}

impl std::fmt::Debug for RoutedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutedStream")
            .field("matched_intent", &self.matched_intent)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// Classify, resolve, handle.
///
/// Holds no per-request state, so one router can serve any number of
/// concurrent calls and dropping a call midway leaves nothing behind.
pub struct IntentRouter {
    classifier: Classifier,
    table: Arc<RouteTable>,
    timeout: Option<Duration>,
}

impl IntentRouter {
    pub fn new(classifier: Classifier, table: RouteTable) -> Self {
        Self {
            classifier,
            table: Arc::new(table),
            timeout: None,
        }
    }

    /// Classifier on the registry's classifier provider, the standard table
    /// on its handler provider.
    pub fn from_registry(registry: &LLMRegistry, config: &RouterConfig) -> Result<Self> {
        config.validate()?;

        let classifier = Classifier::from_config(registry.classifier()?, &config.classifier)?;
        let table = RouteTable::standard(registry.handlers()?, config)?;

        let mut router = Self::new(classifier, table);
        router.timeout = config.timeout();
        Ok(router)
    }

    /// Bound each collaborator call, not the whole request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn route(&self, request: &RoutingRequest) -> Result<RoutingResponse> {
        let span = info_span!("route", request_id = %request.id);
        async {
            let result = self.run(request).await;
            if let Err(ref e) = result {
                log_failure(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    pub async fn route_text(&self, raw_input: &str) -> Result<RoutingResponse> {
        self.route(&RoutingRequest::new(raw_input)).await
    }

    /// Same classification and resolution as [`route`](Self::route), then
    /// hands back the handler's output as a stream.
    pub async fn route_stream(&self, request: &RoutingRequest) -> Result<RoutedStream> {
        let span = info_span!("route_stream", request_id = %request.id);
        async {
            let result = self.open_stream(request).await;
            if let Err(ref e) = result {
                log_failure(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn open_stream(&self, request: &RoutingRequest) -> Result<RoutedStream> {
        let (intent, handler) = self.classify_and_resolve(request).await?;

        debug!(stage = %RouteStage::Handling, handler = handler.name(), "Opening handler stream");
        let stream = self
            .bounded(RouteStage::Handling, handler.handle_stream(&request.raw_input))
            .await?;

        Ok(RoutedStream {
            matched_intent: intent,
            handler: handler.name().to_string(),
            stream,
        })
    }

    async fn run(&self, request: &RoutingRequest) -> Result<RoutingResponse> {
        let (intent, handler) = self.classify_and_resolve(request).await?;

        debug!(stage = %RouteStage::Handling, handler = handler.name(), "Running handler");
        let output_text = self
            .bounded(RouteStage::Handling, handler.handle(&request.raw_input))
            .await?;

        debug!(stage = %RouteStage::Done, intent = %intent, handler = handler.name(), "Routed");
        Ok(RoutingResponse {
            output_text,
            matched_intent: intent,
            handler: handler.name().to_string(),
        })
    }

    async fn classify_and_resolve(
        &self,
        request: &RoutingRequest,
    ) -> Result<(Intent, Arc<dyn Handler>)> {
        if request.raw_input.trim().is_empty() {
            return Err(RouterError::EmptyInput);
        }

        debug!(stage = %RouteStage::Classifying, "Classifying input");
        let intent = self
            .bounded(
                RouteStage::Classifying,
                self.classifier.classify(&request.raw_input),
            )
            .await?;

        let route = self.table.resolve(intent);
        debug!(
            stage = %RouteStage::Resolving,
            intent = %intent,
            route = route.name,
            is_default = route.is_default,
            "Resolved route"
        );
        Ok((intent, Arc::clone(route.handler)))
    }

    async fn bounded<T, F>(&self, stage: RouteStage, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| RouterError::Timeout {
                    stage,
                    after: limit,
                })?,
            None => fut.await,
        }
    }
}

fn log_failure(error: &RouterError) {
    let retryable = error.llm_error().is_some_and(|e| e.is_retryable());
    warn!(
        stage = %RouteStage::Failed,
        failed_at = ?error.stage(),
        retryable,
        error = %error,
        "Routing failed"
    );
}
