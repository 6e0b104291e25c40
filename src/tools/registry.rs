//! Tool registry.
//!
//! Built mutably at startup, then frozen behind an `Arc` and shared
//! read-only between requests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::tools::builtin::{
    BatchCalculatorTool, CalculatorTool, DataSummaryTool, MultiWeatherTool, TextProcessorTool,
    WeatherTool,
};
use crate::tools::tool::{Tool, ToolDescriptor};

/// Name → tool mapping that preserves registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in tool.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_builtin_tools()?;
        Ok(registry)
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register the built-in tools.
    pub fn register_builtin_tools(&mut self) -> Result<(), RegistryError> {
        self.register(Arc::new(CalculatorTool))?;
        self.register(Arc::new(WeatherTool))?;
        self.register(Arc::new(TextProcessorTool))?;
        self.register(Arc::new(MultiWeatherTool))?;
        self.register(Arc::new(BatchCalculatorTool))?;
        self.register(Arc::new(DataSummaryTool))?;
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| RegistryError::UnknownTool {
                name: name.to_string(),
            })
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    /// Describe every tool, in registration order.
    ///
    /// The iterator is lazy; call again to start over.
    pub fn describe_all(&self) -> impl Iterator<Item = ToolDescriptor> + '_ {
        self.tools.iter().map(|t| t.descriptor())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
