//! Tool request handler for the app-server.
//!
//! Wraps the tool executor with the two request flows the server exposes:
//! direct execution by name, and model-driven selection from a prompt.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use toolsmith_completions::{ChatMessage, CompletionProvider, CompletionRequest};
use toolsmith_tool_gen::{
    ToolDescriptor, ToolExecutor, ToolLoader, ToolRuntime, ToolStore, ToolSynthesizer,
};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};

/// System prompt for tool selection.
pub const FUNCTION_CALL_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Reply when the model answers without selecting a tool.
pub const NO_FUNCTION_CALL_MESSAGE: &str = "No function call detected.";

/// Body of `POST /execute-function`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteFunctionParams {
    #[serde(alias = "functionName")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameters: Map<String, Value>,
}

/// Treat an explicit `null` like an omitted field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /openai-function-call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallParams {
    pub user_prompt: String,
}

/// Outcome of a prompt-driven call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionCallResponse {
    /// The model selected a tool and it ran.
    Called { result: Value },
    /// The model answered without selecting a tool.
    NotCalled { message: String },
}

/// Body of `GET /tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<Value>,
}

/// Handler for tool operations.
pub struct ToolHandler {
    executor: ToolExecutor,
    provider: Arc<dyn CompletionProvider>,
    function_call_model: Option<String>,
}

impl ToolHandler {
    pub fn new(executor: ToolExecutor, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            executor,
            provider,
            function_call_model: None,
        }
    }

    /// Use `model` for tool selection instead of the provider default.
    pub fn with_function_call_model(mut self, model: impl Into<String>) -> Self {
        self.function_call_model = Some(model.into());
        self
    }

    /// Build the full tool pipeline described by `config`.
    ///
    /// Creates the tools directory; failing to do so is a startup error.
    pub async fn from_config(
        config: &ServerConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> anyhow::Result<Self> {
        let store = ToolStore::new(&config.tools_dir).await?;
        info!("Tools directory: {}", store.root().display());

        let loader = Arc::new(ToolLoader::new(store, ToolRuntime::new(&config.limits)));
        let synthesizer = ToolSynthesizer::new(Arc::clone(&loader), Arc::clone(&provider))
            .with_model(&config.llm.synthesis_model);
        let executor = ToolExecutor::new(loader, synthesizer);

        Ok(Self::new(executor, provider)
            .with_function_call_model(&config.llm.function_call_model))
    }

    /// Execute a tool by name, synthesizing it first when missing.
    ///
    /// Returns whatever the tool returned.
    pub async fn execute_function(&self, params: ExecuteFunctionParams) -> ApiResult<Value> {
        let result = self
            .executor
            .execute(&params.tool_name, params.parameters)
            .await?;
        Ok(result.output)
    }

    /// Let the model pick a tool for `params.user_prompt` and run it.
    pub async fn function_call(
        &self,
        params: FunctionCallParams,
    ) -> ApiResult<FunctionCallResponse> {
        let tools: Vec<Value> = self
            .executor
            .descriptors()
            .await?
            .iter()
            .map(ToolDescriptor::to_function_tool)
            .collect();
        debug!("Offering {} tools for prompt", tools.len());

        let mut request = CompletionRequest::new(vec![
            ChatMessage::system(FUNCTION_CALL_SYSTEM_PROMPT),
            ChatMessage::user(params.user_prompt),
        ])
        .with_tools(tools);
        if let Some(model) = &self.function_call_model {
            request = request.with_model(model);
        }

        let response = self.provider.complete(request).await.map_err(ApiError::llm)?;

        let Some(call) = response.function_call else {
            return Ok(FunctionCallResponse::NotCalled {
                message: NO_FUNCTION_CALL_MESSAGE.to_string(),
            });
        };

        info!("Model selected tool {}", call.name);
        let parameters = call.parse_arguments().map_err(ApiError::llm)?;
        let result = self.executor.execute(&call.name, parameters).await?;

        Ok(FunctionCallResponse::Called {
            result: result.output,
        })
    }

    /// Function-calling definitions of every installed tool.
    pub async fn list_tools(&self) -> ApiResult<ListToolsResponse> {
        let tools = self
            .executor
            .descriptors()
            .await?
            .iter()
            .map(ToolDescriptor::to_function_tool)
            .collect();
        Ok(ListToolsResponse { tools })
    }
}
