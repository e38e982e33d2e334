use async_trait::async_trait;
use pptmaker_protocol::{schemas, FunctionCall, FunctionDeclaration, Tool};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{FlowError, Result};
use crate::web_search::WebSearch;

/// A function the model may call while answering a prompt.
#[async_trait]
pub trait ModelTool: Send + Sync {
    fn declaration(&self) -> FunctionDeclaration;
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Tools advertised to one prompt.
#[derive(Clone, Default)]
pub struct ToolBox {
    tools: Vec<Arc<dyn ModelTool>>,
}

impl ToolBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<dyn ModelTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Wire form: a single tool entry carrying every declaration.
    pub fn declarations(&self) -> Vec<Tool> {
        if self.tools.is_empty() {
            return Vec::new();
        }
        vec![Tool {
            function_declarations: self.tools.iter().map(|t| t.declaration()).collect(),
        }]
    }

    pub async fn invoke(&self, call: &FunctionCall) -> Result<Value> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.declaration().name == call.name)
            .ok_or_else(|| FlowError::UnknownTool(call.name.clone()))?;
        tool.call(call.args.clone()).await
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
}

/// Exposes a [`WebSearch`] backend as the `webSearch` tool.
pub struct WebSearchTool {
    search: Arc<dyn WebSearch>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl ModelTool for WebSearchTool {
    fn declaration(&self) -> FunctionDeclaration {
        schemas::web_search_declaration()
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: WebSearchArgs = serde_json::from_value(args).map_err(|e| FlowError::Tool {
            tool: schemas::WEB_SEARCH_TOOL.to_string(),
            reason: format!("invalid arguments: {e}"),
        })?;
        let results = self.search.search(&args.query).await?;
        Ok(json!({ "results": results }))
    }
}
