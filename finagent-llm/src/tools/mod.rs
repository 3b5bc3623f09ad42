use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// A tool that can be called by an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    name: String,
    description: String,
    parameters: RootSchema,
}

impl Tool {
    /// Create a tool from a type that implements JsonSchema
    pub fn from_type<T: schemars::JsonSchema>() -> ToolBuilder<T> {
        ToolBuilder {
            name: None,
            description: None,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &RootSchema {
        &self.parameters
    }
}

/// Builder for type-safe tools
pub struct ToolBuilder<T> {
    name: Option<String>,
    description: Option<String>,
    _phantom: PhantomData<T>,
}

impl<T: schemars::JsonSchema> ToolBuilder<T> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn build(self) -> Tool {
        // Inline subschemas: allOf/$ref have limited support in provider APIs
        use schemars::gen::SchemaSettings;

        let settings = SchemaSettings::draft07().with(|s| {
            s.inline_subschemas = true;
        });
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<T>();

        Tool {
            name: self.name.expect("Tool name is required"),
            description: self.description.unwrap_or_default(),
            parameters: schema,
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    id: String,
    name: String,
    arguments: Value,
}

impl ToolCall {
    pub fn new(id: String, name: String, arguments: Value) -> Self {
        Self {
            id,
            name,
            arguments,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse arguments into a strongly-typed struct
    pub fn parse_arguments<T>(&self) -> Result<T, crate::error::LlmError>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_value(self.arguments.clone()).map_err(|e| {
            crate::error::LlmError::ToolArgumentParse {
                tool_name: self.name.clone(),
                source: e,
            }
        })
    }

    /// Get raw JSON arguments
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// Tool execution result to send back to the LLM
#[derive(Debug, Clone)]
pub struct ToolResult {
    tool_call_id: String,
    content: String,
}

impl ToolResult {
    /// Create a tool result from a plain text string
    pub fn text(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: text.into(),
        }
    }

    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Force the model to use at least one tool
    Required,
    /// Disable tool use
    None,
    /// Force a specific tool by name
    Specific { name: String },
}

/// Convert unified Tool to provider-specific format
pub trait ProviderToolFormat {
    type ProviderTool: Serialize;

    fn to_provider_tool(tool: &Tool) -> Self::ProviderTool;
    fn to_provider_tool_choice(choice: &ToolChoice) -> Value;
}
