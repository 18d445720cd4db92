//! Tool synthesis from an LLM.
//!
//! The `ToolSynthesizer` asks a completion model to write a missing tool,
//! persists the returned source and loads it straight back.

use std::sync::Arc;

use regex_lite::Regex;
use toolsmith_completions::{ChatMessage, CompletionProvider, CompletionRequest};
use tracing::{debug, info};

use crate::error::{LoadError, SynthesisError};
use crate::loader::ToolLoader;
use crate::tool::ToolRecord;

/// Fence tag the model must use for generated source.
pub const CODE_FENCE_LANGUAGE: &str = "rhai";

/// Worked example included in every generation prompt.
///
/// The shape is fixed; only the tool name is substituted.
pub fn example_tool_source(name: &str) -> String {
    format!(
        r#"fn execute(params) {{
    let number1 = params["number1"];
    let number2 = params["number2"];
    let t1 = type_of(number1);
    let t2 = type_of(number2);
    if (t1 != "i64" && t1 != "f64") || (t2 != "i64" && t2 != "f64") {{
        throw "Both parameters must be numbers.";
    }}
    #{{ "result": number1 * number2 }}
}}

let details = #{{
    "type": "function",
    "function": #{{
        "name": "{name}",
        "description": "A function that performs the {name} operation.",
        "parameters": #{{
            "type": "object",
            "properties": #{{
                "number1": #{{ "type": "number", "description": "The first number" }},
                "number2": #{{ "type": "number", "description": "The second number" }}
            }},
            "required": ["number1", "number2"]
        }}
    }}
}};
"#
    )
}

/// Build the generation prompt for `name`.
pub fn build_prompt(name: &str) -> String {
    let example = example_tool_source(name);
    format!(
        r#"Write a Rhai script for a tool that performs the operation "{name}".
Define a function named "execute" that takes a single object map argument "params"
(parameter name to value) and returns an object map with the result.
Inside "execute", check that every required parameter is present and has the right
type using type_of, and throw a descriptive message string when one is not.
Also define a variable named "details" that describes the tool and its parameters.
The script runs in a sandbox: only the Rhai standard library is available, with no
imports, files, network or system access.
Your response should contain exactly one fenced code block tagged {CODE_FENCE_LANGUAGE},
following this exact format:

```{CODE_FENCE_LANGUAGE}
{example}```

Adjust the parameters, validation, result and description to the "{name}" operation,
keeping "name" set to "{name}".
Provide a working implementation for "{name}".
"#
    )
}

/// Extract the first fenced code block tagged [`CODE_FENCE_LANGUAGE`].
///
/// Returns `None` when there is no such block or it is blank.
pub fn extract_code_block(response: &str) -> Option<String> {
    let pattern = format!(r"(?s)```{CODE_FENCE_LANGUAGE}[ \t]*\r?\n(.*?)```");
    let regex = Regex::new(&pattern).ok()?;
    let code = regex.captures(response)?.get(1)?.as_str().trim();

    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

/// Generates missing tools through a completion provider.
pub struct ToolSynthesizer {
    loader: Arc<ToolLoader>,
    provider: Arc<dyn CompletionProvider>,
    model: Option<String>,
}

impl ToolSynthesizer {
    /// Create a synthesizer persisting through `loader`'s store.
    pub fn new(loader: Arc<ToolLoader>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            loader,
            provider,
            model: None,
        }
    }

    /// Use `model` instead of the provider default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Generate, persist and load the tool `name`.
    ///
    /// No retry happens at any stage; the first failure is returned with its
    /// stage. Unparsed model output never reaches the store.
    pub async fn synthesize(&self, name: &str) -> Result<ToolRecord, SynthesisError> {
        info!("Generating tool {name} via {}", self.provider.name());

        let mut request = CompletionRequest::new(vec![ChatMessage::user(build_prompt(name))]);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self.provider.complete(request).await?;
        let content = response.content.unwrap_or_default();
        debug!("Model {} answered with {} bytes", response.model, content.len());

        let source = extract_code_block(&content).ok_or(SynthesisError::Extraction)?;

        self.loader
            .store()
            .save(name, &source)
            .await
            .map_err(SynthesisError::Persistence)?;

        let record = self.loader.load_one(name).await.map_err(|e| match e {
            LoadError::NotFound(name) => SynthesisError::NotFound(name),
            other => SynthesisError::Reload(other),
        })?;

        info!("Generated tool: {name}");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ToolRuntime;
    use crate::storage::ToolStore;
    use crate::test_support::{StubProvider, fenced};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use toolsmith_completions::CompletionError;

    async fn synthesizer(
        temp_dir: &TempDir,
        provider: StubProvider,
    ) -> (ToolSynthesizer, Arc<ToolLoader>) {
        let store = ToolStore::new(temp_dir.path()).await.unwrap();
        let loader = Arc::new(ToolLoader::new(store, ToolRuntime::default()));
        let synthesizer = ToolSynthesizer::new(Arc::clone(&loader), Arc::new(provider));
        (synthesizer, loader)
    }

    #[test]
    fn test_prompt_contains_worked_example() {
        let prompt = build_prompt("AddNumbers");
        assert!(prompt.contains("```rhai\nfn execute(params)"));
        assert!(prompt.contains(r#""name": "AddNumbers""#));
        assert!(prompt.contains("Both parameters must be numbers."));
    }

    #[test]
    fn test_extract_code_block() {
        let response = "Here you go:\n```rhai\nfn execute(p) { p }\n```\nEnjoy.";
        assert_eq!(
            extract_code_block(response),
            Some("fn execute(p) { p }".to_string())
        );

        let two_blocks = "```rhai\nfirst\n```\n```rhai\nsecond\n```";
        assert_eq!(extract_code_block(two_blocks), Some("first".to_string()));

        assert_eq!(extract_code_block("fn execute(p) { p }"), None);
        assert_eq!(extract_code_block("```python\nprint(1)\n```"), None);
        assert_eq!(extract_code_block("```rhai\n   \n```"), None);
    }

    #[tokio::test]
    async fn test_synthesize_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let source = example_tool_source("TimesTable");
        let provider = StubProvider::replying(fenced(&source));
        let (synthesizer, loader) = synthesizer(&temp_dir, provider.clone()).await;

        let record = synthesizer.synthesize("TimesTable").await.unwrap();
        assert_eq!(record.descriptor.name, "TimesTable");

        assert!(loader.store().exists("TimesTable").await);
        let reloaded = loader.load_one("TimesTable").await.unwrap();
        let mut params = serde_json::Map::new();
        params.insert("number1".to_string(), json!(6));
        params.insert("number2".to_string(), json!(7));
        assert_eq!(reloaded.implementation.call(&params).unwrap(), json!({"result": 42}));

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("TimesTable"));
    }

    #[tokio::test]
    async fn test_synthesize_uses_configured_model() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StubProvider::replying(fenced(&example_tool_source("Mul")));
        let (synthesizer, _loader) = synthesizer(&temp_dir, provider.clone()).await;

        synthesizer.with_model("gpt-4o").synthesize("Mul").await.unwrap();
        assert_eq!(provider.models(), vec![Some("gpt-4o".to_string())]);
    }

    #[tokio::test]
    async fn test_extraction_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StubProvider::replying("I cannot write that tool.");
        let (synthesizer, loader) = synthesizer(&temp_dir, provider).await;

        let err = synthesizer.synthesize("Mystery").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Extraction));
        assert_eq!(err.stage(), "extraction");
        assert!(!loader.store().exists("Mystery").await);
        assert!(loader.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StubProvider::failing(|| CompletionError::RateLimited {
            retry_after_secs: 30,
        });
        let (synthesizer, loader) = synthesizer(&temp_dir, provider).await;

        let err = synthesizer.synthesize("Mystery").await.unwrap_err();
        assert_eq!(err.stage(), "generation");
        assert!(!loader.store().exists("Mystery").await);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StubProvider::replying(fenced("fn execute(params) { 1 }"));
        let (synthesizer, loader) = synthesizer(&temp_dir, provider).await;

        let err = synthesizer.synthesize("NoDetails").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Reload(LoadError::MissingDetails(_))));
        assert!(loader.store().exists("NoDetails").await);
    }

    #[tokio::test]
    async fn test_invalid_name_fails_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StubProvider::replying(fenced(&example_tool_source("x")));
        let (synthesizer, _loader) = synthesizer(&temp_dir, provider).await;

        let err = synthesizer.synthesize("../x").await.unwrap_err();
        assert_eq!(err.stage(), "persistence");
    }
}
