//! Tool discovery and loading.
//!
//! The `ToolLoader` bridges persisted sources and in-memory records. Every
//! call evaluates source afresh; there is no cache to go stale after a
//! synthesis rewrites a file.

use tracing::{debug, info, warn};

use crate::error::{LoadError, StorageError};
use crate::registry::ToolRegistry;
use crate::runtime::ToolRuntime;
use crate::storage::ToolStore;
use crate::tool::ToolRecord;

/// Loads tools from a [`ToolStore`] through a [`ToolRuntime`].
#[derive(Debug, Clone)]
pub struct ToolLoader {
    store: ToolStore,
    runtime: ToolRuntime,
}

impl ToolLoader {
    /// Create a loader over `store`.
    pub fn new(store: ToolStore, runtime: ToolRuntime) -> Self {
        Self { store, runtime }
    }

    /// The underlying store.
    pub fn store(&self) -> &ToolStore {
        &self.store
    }

    /// Load every persisted tool into a fresh registry.
    ///
    /// Tools whose source fails to load are skipped with a warning; only a
    /// failure to list the store itself is an error.
    pub async fn discover_all(&self) -> Result<ToolRegistry, StorageError> {
        let names = self.store.list().await?;
        let mut registry = ToolRegistry::new();

        for name in names {
            match self.load_one(&name).await {
                Ok(record) => {
                    debug!("Loaded tool: {name}");
                    registry.insert(name, record);
                }
                Err(e) => warn!("Skipping tool {name}: {e}"),
            }
        }

        info!("Discovered {} tools", registry.len());
        Ok(registry)
    }

    /// Read and evaluate the source persisted for `name`.
    ///
    /// Evaluation runs on the blocking pool; a script's top level may spend
    /// its whole operation budget.
    pub async fn load_one(&self, name: &str) -> Result<ToolRecord, LoadError> {
        let source = match self.store.read(name).await {
            Ok(source) => source,
            Err(StorageError::NotFound(_)) => return Err(LoadError::NotFound(name.to_string())),
            Err(e) => return Err(e.into()),
        };

        let runtime = self.runtime.clone();
        let tool_name = name.to_string();
        let record = tokio::task::spawn_blocking(move || runtime.load(&tool_name, &source))
            .await
            .map_err(|e| LoadError::Evaluate {
                name: name.to_string(),
                message: format!("load task failed: {e}"),
            })??;

        if record.descriptor.name != name {
            warn!(
                "Tool {name} declares descriptor name {}; it stays registered as {name}",
                record.descriptor.name
            );
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::example_tool_source;
    use crate::runtime::RuntimeLimits;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn loader(temp_dir: &TempDir) -> ToolLoader {
        let store = ToolStore::new(temp_dir.path()).await.unwrap();
        ToolLoader::new(store, ToolRuntime::default())
    }

    #[tokio::test]
    async fn test_discover_one_record_per_tool() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(&temp_dir).await;
        for name in ["MultiplyNumbers", "Product", "Times"] {
            loader
                .store()
                .save(name, &example_tool_source(name))
                .await
                .unwrap();
        }

        let registry = loader.discover_all().await.unwrap();
        assert_eq!(registry.names(), vec!["MultiplyNumbers", "Product", "Times"]);
        for name in registry.names() {
            assert_eq!(registry.get(name).unwrap().descriptor.name, name);
        }
    }

    #[tokio::test]
    async fn test_malformed_tool_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(&temp_dir).await;
        let store = loader.store();
        store
            .save("MultiplyNumbers", &example_tool_source("MultiplyNumbers"))
            .await
            .unwrap();
        store.save("Broken", "fn execute(params) {").await.unwrap();
        store.save("NoDetails", "fn execute(params) { 1 }").await.unwrap();

        let registry = loader.discover_all().await.unwrap();
        assert_eq!(registry.names(), vec!["MultiplyNumbers"]);
        assert!(!registry.contains("Broken"));
    }

    #[tokio::test]
    async fn test_load_one_missing() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(&temp_dir).await;

        let err = loader.load_one("Missing").await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(name) if name == "Missing"));
    }

    #[tokio::test]
    async fn test_load_one_sees_rewritten_source() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(&temp_dir).await;
        let store = loader.store();

        store
            .save("Calc", &example_tool_source("Calc"))
            .await
            .unwrap();
        let first = loader.load_one("Calc").await.unwrap();

        let adding = example_tool_source("Calc").replace("number1 * number2", "number1 + number2");
        store.save("Calc", &adding).await.unwrap();
        let second = loader.load_one("Calc").await.unwrap();

        let mut params = serde_json::Map::new();
        params.insert("number1".to_string(), json!(3));
        params.insert("number2".to_string(), json!(4));
        assert_eq!(first.implementation.call(&params).unwrap(), json!({"result": 12}));
        assert_eq!(second.implementation.call(&params).unwrap(), json!({"result": 7}));
    }

    #[tokio::test]
    async fn test_descriptor_name_mismatch_keeps_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let loader = loader(&temp_dir).await;
        loader
            .store()
            .save("Alias", &example_tool_source("Original"))
            .await
            .unwrap();

        let registry = loader.discover_all().await.unwrap();
        let record = registry.get("Alias").unwrap();
        assert_eq!(record.descriptor.name, "Original");
        assert!(registry.get("Original").is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_discovery_does_not_stall_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let store = ToolStore::new(temp_dir.path()).await.unwrap();
        let limits = RuntimeLimits {
            max_operations: 2_000_000,
            ..RuntimeLimits::default()
        };
        let loader = ToolLoader::new(store, ToolRuntime::new(&limits));
        for name in ["SpinA", "SpinB", "SpinC"] {
            loader
                .store()
                .save(name, "fn execute(params) { 1 }\nloop {}")
                .await
                .unwrap();
        }

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let registry = loader.discover_all().await.unwrap();
        ticker.abort();

        assert!(registry.is_empty());
        assert!(
            ticks.load(Ordering::Relaxed) > 0,
            "runtime made no progress while scripts were evaluated"
        );
    }
}
