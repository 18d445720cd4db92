//! Sandboxed tool runtime.
//!
//! Tool sources are Rhai scripts. Each source must define a `details` value
//! (see [`ToolDetails`]) and a single-argument `execute` function:
//!
//! ```text
//! fn execute(params) {
//!     if type_of(params["text"]) != "string" {
//!         throw "Parameter text must be a string.";
//!     }
//!     #{ "result": params["text"].to_upper() }
//! }
//!
//! let details = #{
//!     "type": "function",
//!     "function": #{
//!         "name": "ToUpper",
//!         "description": "Uppercases text.",
//!         "parameters": #{
//!             "type": "object",
//!             "properties": #{ "text": #{ "type": "string" } },
//!             "required": ["text"]
//!         }
//!     }
//! };
//! ```
//!
//! The engine has no module resolver and no `eval`, and every evaluation is
//! bounded by [`RuntimeLimits`]. Scripts get no filesystem, network or
//! process access.

use std::fmt;
use std::sync::Arc;

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{AST, Dynamic, Engine, EvalAltResult, Scope};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, ToolError};
use crate::tool::{ToolDetails, ToolRecord};

/// Name of the entry point every tool defines.
pub const ENTRY_POINT: &str = "execute";

/// Name of the descriptor value every tool defines.
pub const DETAILS_VARIABLE: &str = "details";

/// Capability limits applied to every script evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeLimits {
    /// Maximum interpreter operations per evaluation.
    pub max_operations: u64,

    /// Maximum function call nesting.
    pub max_call_levels: usize,

    /// Maximum expression nesting at global level.
    pub max_expr_depth: usize,

    /// Maximum expression nesting inside functions.
    pub max_function_expr_depth: usize,

    /// Maximum string length in bytes.
    pub max_string_size: usize,

    /// Maximum array length.
    pub max_array_size: usize,

    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_call_levels: 32,
            max_expr_depth: 64,
            max_function_expr_depth: 32,
            max_string_size: 64 * 1024,
            max_array_size: 10_000,
            max_map_size: 10_000,
        }
    }
}

/// Compiles tool sources into [`ToolRecord`]s.
#[derive(Clone)]
pub struct ToolRuntime {
    engine: Arc<Engine>,
}

impl ToolRuntime {
    /// Build a runtime enforcing `limits`.
    pub fn new(limits: &RuntimeLimits) -> Self {
        let mut engine = Engine::new();

        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        engine.set_max_operations(limits.max_operations);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_function_expr_depth);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);

        engine.on_print(|text| debug!("tool print: {text}"));
        engine.on_debug(|text, source, pos| {
            debug!("tool debug [{}] {pos}: {text}", source.unwrap_or("-"));
        });

        Self {
            engine: Arc::new(engine),
        }
    }

    /// Evaluate `source` as the tool `name`.
    ///
    /// Always compiles from scratch; nothing is cached between calls.
    pub fn load(&self, name: &str, source: &str) -> Result<ToolRecord, LoadError> {
        let mut ast = self
            .engine
            .compile(source)
            .map_err(|e| LoadError::Evaluate {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        ast.set_source(name);

        let has_entry_point = ast
            .iter_functions()
            .any(|f| f.name == ENTRY_POINT && f.params.len() == 1);
        if !has_entry_point {
            return Err(LoadError::MissingExecute(name.to_string()));
        }

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| LoadError::Evaluate {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let details = scope
            .get_value::<Dynamic>(DETAILS_VARIABLE)
            .ok_or_else(|| LoadError::MissingDetails(name.to_string()))?;

        let invalid = |message: String| LoadError::InvalidDetails {
            name: name.to_string(),
            message,
        };
        let details: ToolDetails =
            rhai::serde::from_dynamic(&details).map_err(|e| invalid(e.to_string()))?;
        let descriptor = details.into_descriptor().map_err(invalid)?;

        Ok(ToolRecord {
            descriptor,
            implementation: ToolImplementation {
                engine: Arc::clone(&self.engine),
                ast: Arc::new(ast),
            },
        })
    }
}

impl Default for ToolRuntime {
    fn default() -> Self {
        Self::new(&RuntimeLimits::default())
    }
}

impl fmt::Debug for ToolRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRuntime").finish_non_exhaustive()
    }
}

/// A compiled tool entry point.
#[derive(Clone)]
pub struct ToolImplementation {
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl ToolImplementation {
    /// Run `execute(params)` with the caller's parameters.
    ///
    /// A script `throw` becomes [`ToolError::Rejected`] carrying the thrown
    /// value verbatim; any other interpreter failure is
    /// [`ToolError::ExecutionFailed`].
    pub fn call(
        &self,
        parameters: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ToolError> {
        let params = rhai::serde::to_dynamic(parameters)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let output: Dynamic = self
            .engine
            .call_fn(&mut Scope::new(), &self.ast, ENTRY_POINT, (params,))
            .map_err(|err| match thrown_message(&err) {
                Some(message) => ToolError::Rejected(message),
                None => ToolError::ExecutionFailed(err.to_string()),
            })?;

        rhai::serde::from_dynamic(&output).map_err(|e| {
            ToolError::ExecutionFailed(format!("result is not JSON-representable: {e}"))
        })
    }
}

impl fmt::Debug for ToolImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolImplementation").finish_non_exhaustive()
    }
}

/// The value passed to `throw`, looking through function-call frames.
fn thrown_message(err: &EvalAltResult) -> Option<String> {
    match err {
        EvalAltResult::ErrorRuntime(value, _) => Some(value.to_string()),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => thrown_message(inner),
        _ => None,
    }
}
