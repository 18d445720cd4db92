//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use toolsmith_completions::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse,
};

/// Wrap `source` the way a model answers.
pub(crate) fn fenced(source: &str) -> String {
    format!("Here is the tool:\n```rhai\n{source}\n```\n")
}

type ErrorFactory = Arc<dyn Fn() -> CompletionError + Send + Sync>;

/// Canned completion provider that records what it was asked.
#[derive(Clone)]
pub(crate) struct StubProvider {
    replies: Vec<String>,
    error: Option<ErrorFactory>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubProvider {
    pub(crate) fn replying(reply: impl Into<String>) -> Self {
        Self::sequence(vec![reply.into()])
    }

    /// Answer the n-th call with the n-th reply, repeating the last one.
    pub(crate) fn sequence(replies: Vec<String>) -> Self {
        Self {
            replies,
            error: None,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing(error: impl Fn() -> CompletionError + Send + Sync + 'static) -> Self {
        Self {
            error: Some(Arc::new(error)),
            ..Self::sequence(Vec::new())
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// User prompts received so far.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|request| request.messages.last().map(|m| m.content.clone()))
            .collect()
    }

    /// Models requested so far.
    pub(crate) fn models(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.model.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> toolsmith_completions::Result<CompletionResponse> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request);
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.error {
            return Err(error());
        }

        let content = self
            .replies
            .get(index)
            .or(self.replies.last())
            .cloned()
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: Some(content),
            function_call: None,
            model: "stub-model".to_string(),
            tokens_used: None,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
