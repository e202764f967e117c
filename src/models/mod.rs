//! Wire types of the GigaChat REST API and the known model names.

use serde::{Deserialize, Serialize};

pub const GIGACHAT_2: &str = "GigaChat-2";
pub const GIGACHAT_2_PRO: &str = "GigaChat-2-Pro";
pub const GIGACHAT_2_MAX: &str = "GigaChat-2-Max";
pub const GIGACHAT: &str = "GigaChat";
pub const GIGACHAT_PRO: &str = "GigaChat-Pro";
pub const GIGACHAT_MAX: &str = "GigaChat-Max";

pub const EMBEDDINGS: &str = "Embeddings";
pub const EMBEDDINGS_GIGA_R: &str = "EmbeddingsGigaR";

const GENERATION_MODELS: [&str; 6] = [GIGACHAT_2, GIGACHAT_2_PRO, GIGACHAT_2_MAX, GIGACHAT, GIGACHAT_PRO, GIGACHAT_MAX];
const EMBEDDING_MODELS: [&str; 2] = [EMBEDDINGS, EMBEDDINGS_GIGA_R];

pub fn generation_models() -> &'static [&'static str] {
    &GENERATION_MODELS
}

pub fn embedding_models() -> &'static [&'static str] {
    &EMBEDDING_MODELS
}

pub fn is_valid_generation_model(model: &str) -> bool {
    GENERATION_MODELS.contains(&model)
}

pub fn is_valid_embedding_model(model: &str) -> bool {
    EMBEDDING_MODELS.contains(&model)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    /// result of a function call, only seen in responses
    Function,
    /// intermediate state while the model runs a function, only seen in responses
    FunctionInProgress,
}

impl Role {
    /// Roles a caller may send in a chat request.
    pub fn is_request_role(&self) -> bool {
        matches!(self, Role::System | Role::User | Role::Assistant)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
            Role::FunctionInProgress => "function_in_progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Incremental message fragment of a streamed choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub delta: Option<Delta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Response of a chat completion, and of every chunk of a streamed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub object: String,
}

impl ChatResponse {
    /// Content of the first choice's message, or of its delta for stream chunks.
    pub fn content(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        choice
            .message
            .as_ref()
            .map(|m| m.content.as_str())
            .or_else(|| choice.delta.as_ref().map(|d| d.content.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<Model>,
    #[serde(default)]
    pub object: String,
}

/// Generated image together with the chat response that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResult {
    /// base64-encoded image bytes
    pub content: String,
    pub file_id: String,
    pub response: ChatResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_lists() {
        assert!(is_valid_generation_model(GIGACHAT_2_PRO));
        assert!(!is_valid_generation_model(EMBEDDINGS));
        assert!(is_valid_embedding_model(EMBEDDINGS_GIGA_R));
        assert!(!is_valid_embedding_model("gpt-4"));
        assert_eq!(generation_models().len(), 6);
        assert_eq!(embedding_models(), &["Embeddings", "EmbeddingsGigaR"]);
    }

    #[test]
    fn unset_options_are_not_serialized() {
        let request = ChatRequest {
            model: GIGACHAT.into(),
            messages: vec![Message::user("hi")],
            temperature: Some(0.7),
            top_p: None,
            max_tokens: None,
            repetition_penalty: None,
            update_interval: None,
            stream: false,
            function_call: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "GigaChat",
                "messages": [{"role": "user", "content": "hi"}],
                "temperature": 0.7,
                "stream": false
            })
        );
    }

    #[test]
    fn stream_chunk_decodes_with_delta_only() {
        let chunk: ChatResponse = serde_json::from_value(json!({
            "choices": [{"delta": {"content": "Hel", "role": "assistant"}, "index": 0}],
            "created": 1700000000,
            "model": "GigaChat:1.0.26.20",
            "object": "chat.completion"
        }))
        .unwrap();

        assert_eq!(chunk.content(), Some("Hel"));
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn function_in_progress_role_is_accepted_in_responses() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "function_in_progress", "content": ""},
                "index": 0,
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let message = response.choices[0].message.as_ref().unwrap();
        assert_eq!(message.role, Role::FunctionInProgress);
        assert!(!message.role.is_request_role());
    }
}
