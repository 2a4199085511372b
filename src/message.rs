//! Chat request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Result of a function the model asked to call
    Function,
}

/// A function invocation produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to trigger
    pub name: String,

    /// Arguments as JSON text
    pub arguments: String,

    /// Model reasoning behind the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<String>,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message; may be absent on function messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Author name; the called function's name for function messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Function call carried by this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Message {
    /// Create a new message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Message {
            role,
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Message::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::new(MessageRole::Assistant, content)
    }

    /// Create a function message reporting `function_call`, with no content
    pub fn function(function_call: FunctionCall) -> Self {
        Message {
            role: MessageRole::Function,
            content: None,
            name: Some(function_call.name.clone()),
            function_call: Some(function_call),
        }
    }

    /// Attach content to the message
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Message text, or an empty string when absent
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// A function the model may choose to call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,

    /// What the function does
    pub description: String,

    /// Parameters as JSON Schema; `{"type":"object","properties":{}}` when none
    pub parameters: Value,

    /// Response shape as JSON Schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Value>,

    /// Example exchanges that used this function
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Message>,
}

impl Function {
    /// Declare a function taking `parameters`
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Function {
            name: name.into(),
            description: description.into(),
            parameters,
            responses: None,
            examples: Vec::new(),
        }
    }
}

/// Body of a chat completion request
///
/// Value ranges are enforced by the service, not here:
/// - `messages` must be non-empty with an odd number of members; the last
///   one is the current turn
/// - `temperature` in (0, 1.0], default 0.95
/// - `top_p` in [0, 1.0], default 0.8
/// - `penalty_score` in [1.0, 2.0], default 1.0
/// - `system` up to 1024 characters, not allowed together with `functions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far
    pub messages: Vec<Message>,

    /// Streaming mode; only `false` or unset is accepted by this client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Stable identifier of the end user, for abuse monitoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Sampling randomness, higher is more random
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling mass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Penalty applied to already generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_score: Option<f32>,

    /// Persona prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Functions the model may call (extended-family models only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
}

impl ChatRequest {
    /// Create a request for `messages` with service defaults
    pub fn new(messages: Vec<Message>) -> Self {
        ChatRequest {
            messages,
            ..Default::default()
        }
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the nucleus sampling mass
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the repetition penalty
    pub fn penalty_score(mut self, penalty_score: f32) -> Self {
        self.penalty_score = Some(penalty_score);
        self
    }

    /// Set the persona prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Tag the request with an end-user id
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Declare a callable function
    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}

/// Per-plugin token usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginUsage {
    /// Plugin name, e.g. `chatFile`
    pub name: String,

    /// Tokens spent parsing the plugin input
    pub parse_tokens: u32,

    /// Tokens spent summarizing it
    pub abstract_tokens: u32,

    /// Tokens spent on search
    pub search_tokens: u32,

    /// Sum of the plugin's tokens
    pub total_tokens: u32,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens
    pub total_tokens: u32,

    /// Plugin accounting, reported by extended-family models only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginUsage>,
}

/// Successful chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Id of this turn
    pub id: String,

    /// Payload type, `chat.completion`
    pub object: String,

    /// Unix timestamp
    pub created: i64,

    /// Chunk index, set in streaming responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_id: Option<u32>,

    /// Whether this is the last chunk, set in streaming responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_end: Option<bool>,

    /// Whether the result was cut short
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_truncated: Option<bool>,

    /// Generated text
    pub result: String,

    /// The input was flagged; the caller should drop the conversation history
    #[serde(default)]
    pub need_clear_history: bool,

    /// Round containing the flagged content when `need_clear_history` is set; -1 means the current one
    #[serde(default)]
    pub ban_round: i32,

    /// Token accounting for this turn
    pub usage: Usage,

    /// Function the model wants to call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatResponse {
    /// Assistant message to append to the history for the next turn
    pub fn to_message(&self) -> Message {
        Message {
            role: MessageRole::Assistant,
            content: Some(self.result.clone()),
            name: None,
            function_call: self.function_call.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text(), "Hello");
        assert_eq!(serde_json::to_value(&msg).unwrap(), json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_function_message_omits_content() {
        let msg = Message::function(FunctionCall {
            name: "get_weather".to_string(),
            arguments: r#"{"city":"Beijing"}"#.to_string(),
            thoughts: None,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "function");
        assert_eq!(value["name"], "get_weather");
        assert!(value.get("content").is_none());
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn test_minimal_request_serialization() {
        let request = ChatRequest::new(vec![Message::user("hi")]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    fn test_request_builder_fields() {
        let request = ChatRequest::new(vec![Message::user("hi")])
            .temperature(0.5)
            .system("你是一个助手")
            .user_id("u-1")
            .function(Function::new("f", "does f", json!({"type": "object", "properties": {}})));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["system"], "你是一个助手");
        assert_eq!(value["user_id"], "u-1");
        assert_eq!(value["functions"][0]["name"], "f");
        assert!(value["functions"][0].get("examples").is_none());
    }

    #[test]
    fn test_parse_chat_response_keeps_all_fields() {
        let body = json!({
            "id": "as-1",
            "object": "chat.completion",
            "created": 1700000000,
            "result": "hello",
            "is_truncated": false,
            "need_clear_history": false,
            "ban_round": -1,
            "usage": {
                "prompt_tokens": 1,
                "completion_tokens": 1,
                "total_tokens": 2,
                "plugins": [{
                    "name": "chatFile",
                    "parse_tokens": 3,
                    "abstract_tokens": 4,
                    "search_tokens": 5,
                    "total_tokens": 12
                }]
            },
            "function_call": {"name": "f", "arguments": "{}", "thoughts": "call f"},
            "search_info": {"is_beset": 0}
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.result, "hello");
        assert_eq!(response.ban_round, -1);
        assert_eq!(response.is_truncated, Some(false));
        assert_eq!(response.usage.plugins[0].search_tokens, 5);
        assert_eq!(response.function_call.as_ref().unwrap().thoughts.as_deref(), Some("call f"));
        assert_eq!(response.extra["search_info"], json!({"is_beset": 0}));
    }

    #[test]
    fn test_to_message_carries_function_call() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "x",
            "object": "chat.completion",
            "created": 0,
            "result": "",
            "need_clear_history": false,
            "ban_round": -1,
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2},
            "function_call": {"name": "f", "arguments": "{}"}
        }))
        .unwrap();
        let msg = response.to_message();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.function_call.unwrap().name, "f");
    }
}
