//! Scripts registered in code.

use std::sync::Arc;

use super::{DiscoveredScript, ScriptSource};
use crate::error::MigrateResult;
use crate::script::Script;

/// Explicit list of compiled-in scripts.
///
/// Registration order does not matter; the engine orders scripts by
/// identifier. Scripts are shared, so every discovery yields the full list
/// and one registry can back several engines. Registering an identifier
/// twice is reported as a duplicate when the engine is built.
///
/// ```rust,ignore
/// let registry = ScriptRegistry::new()
///     .with("Version20240101120000", CreateUsers)
///     .with("Version20240102090000", AddPosts);
/// let engine = MigrationEngine::new(registry, MemoryCache::created()).await?;
/// ```
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: Vec<(String, Arc<dyn Script>)>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script.
    pub fn register(&mut self, id: impl Into<String>, script: impl Script + 'static) {
        self.scripts.push((id.into(), Arc::new(script)));
    }

    /// Builder-style [`ScriptRegistry::register`].
    pub fn with(mut self, id: impl Into<String>, script: impl Script + 'static) -> Self {
        self.register(id, script);
        self
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[async_trait::async_trait]
impl ScriptSource for ScriptRegistry {
    fn location(&self) -> String {
        "compiled script registry".to_string()
    }

    async fn discover(&self) -> MigrateResult<Vec<DiscoveredScript>> {
        Ok(self
            .scripts
            .iter()
            .map(|(id, script)| DiscoveredScript::new(id.clone(), Box::new(Arc::clone(script))))
            .collect())
    }
}
