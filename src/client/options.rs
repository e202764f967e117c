use crate::models::{ChatRequest, Message};

/// Per-request chat settings. Unset fields fall back to the API defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// overrides the client's default model
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub repetition_penalty: Option<f64>,
    /// seconds between streamed chunks
    pub update_interval: Option<u32>,
    /// `"auto"` lets the model call built-in functions such as image generation
    pub function_call: Option<String>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn repetition_penalty(mut self, penalty: f64) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }

    pub fn update_interval(mut self, interval: u32) -> Self {
        self.update_interval = Some(interval);
        self
    }

    pub fn function_call(mut self, function_call: impl Into<String>) -> Self {
        self.function_call = Some(function_call.into());
        self
    }

    pub(crate) fn build_request(&self, default_model: &str, messages: Vec<Message>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone().unwrap_or_else(|| default_model.to_owned()),
            messages,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            repetition_penalty: self.repetition_penalty,
            update_interval: self.update_interval,
            stream,
            function_call: self.function_call.clone(),
        }
    }
}

/// Settings for image generation through chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    /// sent as a leading system message, e.g. an art style
    pub system_message: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Messages and chat options that ask the model to draw `prompt`.
    pub(crate) fn to_chat(&self, prompt: &str) -> (Vec<Message>, ChatOptions) {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_message.as_deref().filter(|s| !s.is_empty()) {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        let options = ChatOptions {
            model: self.model.clone().filter(|m| !m.is_empty()),
            temperature: self.temperature,
            function_call: Some("auto".to_owned()),
            ..ChatOptions::default()
        };
        (messages, options)
    }
}
