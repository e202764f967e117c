use std::sync::{Arc, LazyLock};

use base64::Engine;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use regex::Regex;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::cache::token_manager::TokenManager;
use crate::client::options::{ChatOptions, ImageOptions};
use crate::client::validation::{validate_messages, validate_non_empty};
use crate::config::settings::{ApiConfig, ClientConfig};
use crate::error::{Error, Result};
use crate::models::{ChatResponse, ImageResult, Message, ModelsResponse};
use crate::observability::metrics::get_metrics;
use crate::stream::decoder::decode;
use crate::stream::event::StreamEvent;
use crate::utils::constants::{CHAT_COMPLETIONS_PATH, FILES_PATH, MODELS_PATH};

static MODELS_ENDPOINT: &str = "models";
static CHAT_ENDPOINT: &str = "chat";
static CHAT_STREAM_ENDPOINT: &str = "chat_stream";
static FILES_ENDPOINT: &str = "files";

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*>"#).expect("valid regex"));

/// GigaChat API client.
///
/// Every call first asks the shared [`TokenManager`] for a bearer token.
#[derive(Debug, Clone)]
pub struct Client {
    token_manager: Arc<TokenManager>,
    base_uri: String,
    default_model: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(token_manager: Arc<TokenManager>, cfg: &ApiConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            token_manager,
            base_uri: cfg.base_uri().to_owned(),
            default_model: cfg.default_model.clone(),
            http: cfg.http_client()?,
        })
    }

    /// Build the token manager and the client from one configuration.
    pub fn from_config(cfg: &ClientConfig) -> Result<Self> {
        let token_manager = Arc::new(TokenManager::new(&cfg.auth)?);
        Self::new(token_manager, &cfg.api)
    }

    /// Use a caller-supplied HTTP client for API calls.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// List the models available to the account.
    pub async fn models(&self) -> Result<ModelsResponse> {
        let token = self.token_manager.get_token().await?;
        let request = self
            .http
            .get(self.url(MODELS_PATH))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, bearer(&token));

        let response = self.send(MODELS_ENDPOINT, request).await?;
        self.read_json(MODELS_ENDPOINT, response).await
    }

    /// Run a chat completion and wait for the whole answer.
    pub async fn chat(&self, messages: Vec<Message>, options: &ChatOptions) -> Result<ChatResponse> {
        validate_messages(&messages)?;
        let token = self.token_manager.get_token().await?;

        let body = options.build_request(&self.default_model, messages, false);
        debug!(model = %body.model, messages = body.messages.len(), "sending chat request");

        let request = self
            .http
            .post(self.url(CHAT_COMPLETIONS_PATH))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, bearer(&token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body);

        let response = self.send(CHAT_ENDPOINT, request).await?;
        self.read_json(CHAT_ENDPOINT, response).await
    }

    /// Run a streamed chat completion, pushing every event into `handler`.
    ///
    /// `handler` sees the chunks in arrival order, followed by exactly one
    /// [`StreamEvent::Done`] when the server ends the stream gracefully.
    /// Chunks that fail to decode arrive as [`StreamEvent::Failed`] without
    /// ending the stream. A broken connection is returned as the error.
    pub async fn chat_stream<F>(&self, messages: Vec<Message>, options: &ChatOptions, mut handler: F) -> Result<()>
    where
        F: FnMut(StreamEvent<ChatResponse>),
    {
        validate_messages(&messages)?;
        let token = self.token_manager.get_token().await?;

        let body = options.build_request(&self.default_model, messages, true);
        debug!(model = %body.model, messages = body.messages.len(), "sending streaming chat request");

        let request = self
            .http
            .post(self.url(CHAT_COMPLETIONS_PATH))
            .header(ACCEPT, "text/event-stream")
            .header(AUTHORIZATION, bearer(&token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body);

        let response = self.send(CHAT_STREAM_ENDPOINT, request).await?;
        let metrics = get_metrics().await;

        let result = decode(response.bytes_stream(), |event: StreamEvent<ChatResponse>| {
            metrics.stream_events.with_label_values(&[event.kind()]).inc();
            handler(event)
        })
        .await;

        if result.is_err() {
            metrics.api_failures.with_label_values(&[CHAT_STREAM_ENDPOINT, "stream"]).inc();
        }
        result
    }

    /// Ask the model to draw `prompt`. The answer references the image by id.
    pub async fn generate_image(&self, prompt: &str, options: &ImageOptions) -> Result<ChatResponse> {
        validate_non_empty(prompt, "image prompt")?;
        let (messages, chat_options) = options.to_chat(prompt);
        self.chat(messages, &chat_options).await
    }

    /// Download a generated file and return its bytes base64-encoded.
    pub async fn download_image(&self, file_id: &str) -> Result<String> {
        validate_non_empty(file_id, "file ID")?;
        let token = self.token_manager.get_token().await?;

        let request = self
            .http
            .get(self.url(&format!("{}/{}/content", FILES_PATH, file_id)))
            .header(ACCEPT, "application/jpg")
            .header(AUTHORIZATION, bearer(&token));

        let response = self.send(FILES_ENDPOINT, request).await?;
        let bytes = response.bytes().await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }

    /// Generate an image and download it in one go.
    pub async fn create_image(&self, prompt: &str, options: &ImageOptions) -> Result<ImageResult> {
        let response = self.generate_image(prompt, options).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.as_str())
            .ok_or_else(|| Error::Missing("no choices in response".to_owned()))?;

        let file_id = extract_image_id(content)
            .ok_or_else(|| Error::Missing("could not extract image ID from response".to_owned()))?;
        info!(file_id = %file_id, "image generated");

        let image = self.download_image(&file_id).await?;
        Ok(ImageResult { content: image, file_id, response })
    }

    /// Single-question shortcut returning the answer text.
    pub async fn ask(&self, question: &str, options: &ChatOptions) -> Result<String> {
        let response = self.chat(vec![Message::user(question)], options).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| Error::Missing("no choices in response".to_owned()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let metrics = get_metrics().await;
        metrics.api_requests.with_label_values(&[endpoint]).inc();

        let response = request.send().await.inspect_err(|_| {
            metrics.api_failures.with_label_values(&[endpoint, "transport"]).inc();
        })?;

        let status = response.status();
        if !status.is_success() {
            metrics.api_failures.with_label_values(&[endpoint, "status"]).inc();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(&self, endpoint: &str, response: Response) -> Result<T> {
        let body = response.text().await?;
        let metrics = get_metrics().await;
        serde_json::from_str(&body).map_err(|e| {
            metrics.api_failures.with_label_values(&[endpoint, "decode"]).inc();
            Error::Decode(e)
        })
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// First `<img src="...">` reference in a model answer.
pub fn extract_image_id(content: &str) -> Option<String> {
    IMG_SRC_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}
