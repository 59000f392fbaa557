use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::GatewayError;

// Body of POST /suggest and POST /generate-image
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct IdeaRequest {
    pub idea: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ImageResponse {
    pub success: bool,
    pub image: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

// What the worker is asked to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    Suggest { idea: String },
    Image { idea: String },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::Suggest { .. } => "suggest",
            Job::Image { .. } => "image",
        }
    }

    pub fn idea(&self) -> &str {
        match self {
            Job::Suggest { idea } | Job::Image { idea } => idea,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutput {
    Suggestions(Vec<String>),
    ImageUrl(String),
}

// Queued job - holds the job + response channel
pub struct BatchedRequest {
    pub job: Job,
    pub response_tx: oneshot::Sender<Result<JobOutput, GatewayError>>, // one-time channel to send back the result
}

// OpenAI-compatible wire format spoken by the provider

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Serialize, Debug)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub n: u32,
}

#[derive(Deserialize, Debug)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
pub struct ImageData {
    pub url: Option<String>,
}
