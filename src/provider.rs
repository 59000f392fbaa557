use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::key_pool::{ApiKey, KeyPool};
use crate::models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse,
};

pub const MAX_SUGGESTIONS: usize = 5;

// Turns an idea into suggestions or a picture
#[async_trait]
pub trait IdeaProvider: Send + Sync {
    async fn suggest(&self, idea: &str) -> Result<Vec<String>, GatewayError>;

    async fn generate_image(&self, idea: &str) -> Result<String, GatewayError>;
}

pub fn suggestion_prompt(idea: &str) -> String {
    format!("Give me {} one-line project ideas about {}.", MAX_SUGGESTIONS, idea)
}

pub fn image_prompt(idea: &str) -> String {
    format!("Simple concept art of: {}", idea)
}

// One suggestion per non-blank line, at most MAX_SUGGESTIONS
pub fn parse_suggestions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(String::from)
        .collect()
}

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub referer: String,
    pub app_title: String,
}

// OpenRouter (OpenAI-compatible) client rotating over a key pool
pub struct OpenRouterClient {
    client: reqwest::Client,
    keys: Arc<KeyPool>,
    settings: ProviderSettings,
}

impl OpenRouterClient {
    pub fn new(client: reqwest::Client, keys: Arc<KeyPool>, settings: ProviderSettings) -> Self {
        Self {
            client,
            keys,
            settings,
        }
    }

    fn pick_key(&self) -> Result<Arc<ApiKey>, GatewayError> {
        self.keys.next_key().ok_or(GatewayError::NoHealthyKey)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned + Send,
    {
        let key = self.pick_key()?;
        let url = format!("{}{}", self.settings.base_url, path);
        debug!("POST {} with key {}", url, key.label());

        let res = match self
            .client
            .post(&url)
            .bearer_auth(key.secret())
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.app_title)
            .json(body)
            .send()
            .await
        {
            Ok(res) => res,
            // Marking key as unhealthy on transport error
            Err(e) => {
                key.set_healthy(false);
                warn!("Provider call with key {} failed, marked unhealthy", key.label());
                return Err(e.into());
            }
        };

        let status = res.status();
        if !status.is_success() {
            if matches!(
                status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            ) {
                key.set_healthy(false);
                warn!("API key {} rejected with {}, marked unhealthy", key.label(), status);
            }
            let message = res.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        res.json::<R>()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

#[async_trait]
impl IdeaProvider for OpenRouterClient {
    async fn suggest(&self, idea: &str) -> Result<Vec<String>, GatewayError> {
        let request = ChatCompletionRequest {
            model: self.settings.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: suggestion_prompt(idea),
            }],
            max_tokens: 150,
            temperature: 0.7,
        };

        let response: ChatCompletionResponse = self.post("/chat/completions", &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(GatewayError::NoSuggestions)?;

        Ok(parse_suggestions(&content))
    }

    async fn generate_image(&self, idea: &str) -> Result<String, GatewayError> {
        let request = ImageGenerationRequest {
            model: self.settings.image_model.clone(),
            prompt: image_prompt(idea),
            size: "512x512".to_string(),
            n: 1,
        };

        let response: ImageGenerationResponse =
            self.post("/images/generations", &request).await?;

        response
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(GatewayError::NoImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode as HttpStatus, header},
        response::{IntoResponse, Response},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::Mutex;

    type Seen = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

    // sk-bad gets a 401, sk-empty gets a well-formed but empty answer
    fn stub_reply(headers: &HeaderMap, ok: Value, empty: Value) -> Response {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        match auth {
            "Bearer sk-bad" => (HttpStatus::UNAUTHORIZED, "invalid key").into_response(),
            "Bearer sk-empty" => Json(empty).into_response(),
            _ => Json(ok).into_response(),
        }
    }

    async fn stub_chat(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        seen.lock().unwrap().push((headers.clone(), body));
        stub_reply(
            &headers,
            json!({"choices": [{"message": {"role": "assistant", "content": "Kite\n\nBoat"}}]}),
            json!({"choices": []}),
        )
    }

    async fn stub_images(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        seen.lock().unwrap().push((headers.clone(), body));
        stub_reply(
            &headers,
            json!({"data": [{"url": "https://img.test/kite.png"}]}),
            json!({"data": []}),
        )
    }

    async fn start_stub() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/chat/completions", post(stub_chat))
            .route("/images/generations", post(stub_images))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn client_for(base_url: &str, keys: &str) -> (OpenRouterClient, Arc<KeyPool>) {
        let pool = Arc::new(KeyPool::new(keys).unwrap());
        let settings = ProviderSettings {
            base_url: base_url.to_string(),
            chat_model: "chat-model".into(),
            image_model: "image-model".into(),
            referer: "http://localhost:8000".into(),
            app_title: "Craft Innovation Hub".into(),
        };
        let client = OpenRouterClient::new(reqwest::Client::new(), Arc::clone(&pool), settings);
        (client, pool)
    }

    #[tokio::test]
    async fn suggest_sends_headers_and_prompt() {
        let (base, seen) = start_stub().await;
        let (client, _pool) = client_for(&base, "sk-good");

        let suggestions = client.suggest("kites").await.unwrap();
        assert_eq!(suggestions, ["Kite", "Boat"]);

        let seen = seen.lock().unwrap();
        let (headers, body) = &seen[0];
        assert_eq!(headers[header::AUTHORIZATION], "Bearer sk-good");
        assert_eq!(headers["http-referer"], "http://localhost:8000");
        assert_eq!(headers["x-title"], "Craft Innovation Hub");
        assert_eq!(body["model"], "chat-model");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(
            body["messages"][0]["content"],
            "Give me 5 one-line project ideas about kites."
        );
    }

    #[tokio::test]
    async fn generate_image_returns_first_url() {
        let (base, seen) = start_stub().await;
        let (client, _pool) = client_for(&base, "sk-good");

        let url = client.generate_image("kites").await.unwrap();
        assert_eq!(url, "https://img.test/kite.png");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1["size"], "512x512");
        assert_eq!(seen[0].1["prompt"], "Simple concept art of: kites");
    }

    #[tokio::test]
    async fn rejected_key_is_marked_unhealthy_and_skipped() {
        let (base, _seen) = start_stub().await;
        let (client, pool) = client_for(&base, "sk-bad,sk-good");

        let err = client.suggest("kites").await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { status: 401, .. }));
        assert!(!pool.all_keys()[0].is_healthy());
        assert_eq!(pool.healthy_count(), 1);

        // rotation now only lands on the good key
        for _ in 0..2 {
            assert!(client.suggest("kites").await.is_ok());
        }
    }

    #[tokio::test]
    async fn no_healthy_key_is_service_unavailable() {
        let (base, _seen) = start_stub().await;
        let (client, _pool) = client_for(&base, "sk-bad");

        assert!(client.generate_image("kites").await.is_err());

        let err = client.generate_image("kites").await.unwrap_err();
        assert!(matches!(err, GatewayError::NoHealthyKey));
        assert_eq!(err.status_code(), HttpStatus::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn transport_failure_marks_key_unhealthy() {
        // bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (client, pool) = client_for(&format!("http://{}", addr), "sk-good");

        let err = client.suggest("kites").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(!pool.all_keys()[0].is_healthy());
    }

    #[tokio::test]
    async fn empty_answers_map_to_missing_output_errors() {
        let (base, _seen) = start_stub().await;
        let (client, _pool) = client_for(&base, "sk-empty");

        assert!(matches!(
            client.suggest("kites").await,
            Err(GatewayError::NoSuggestions)
        ));
        assert!(matches!(
            client.generate_image("kites").await,
            Err(GatewayError::NoImage)
        ));
    }

    #[test]
    fn prompts_embed_the_idea() {
        assert_eq!(
            suggestion_prompt("paper robots"),
            "Give me 5 one-line project ideas about paper robots."
        );
        assert_eq!(image_prompt("paper robots"), "Simple concept art of: paper robots");
    }

    #[test]
    fn suggestions_drop_blank_lines_and_cap_at_five() {
        let content = "1. Kite\n\n  2. Boat  \n3. Lamp\n4. Desk\n \n5. Clock\n6. Extra\n";
        assert_eq!(
            parse_suggestions(content),
            ["1. Kite", "2. Boat", "3. Lamp", "4. Desk", "5. Clock"]
        );
    }

    #[test]
    fn empty_completion_yields_no_suggestions() {
        assert!(parse_suggestions("\n  \n").is_empty());
    }

    #[test]
    fn chat_response_parses_openai_shape() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"a\nb"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "a\nb");
    }

    #[test]
    fn image_response_tolerates_missing_url() {
        let body = r#"{"data":[{"b64_json":"..."}]}"#;
        let parsed: ImageGenerationResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.data[0].url.is_none());
    }
}
