//! Gemini API client
//!
//! Analysis and chat calls against the `generateContent` endpoint. The
//! analysis call sends the recorded clip inline (base64 WAV) with a fixed
//! response schema so the model returns structured JSON; the chat call
//! forwards the running transcript plus the new message.
//!
//! Absence of a valid credential degrades gracefully to a clearly-labeled
//! placeholder result rather than failing.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vibesync_common::{AnalysisReport, ChatMessage, ChatRole, Language};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Reply used when no API key is configured
pub const NO_KEY_CHAT_REPLY: &str = "Please configure your GEMINI_API_KEY to chat.";

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned no response text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, GEMINI_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classify a recorded clip and recommend matching tracks.
    ///
    /// Without a key this returns the placeholder report; the caller
    /// persists it like any other result.
    pub async fn analyze_audio(
        &self,
        base64_wav: &str,
        language: Language,
    ) -> Result<AnalysisReport, GeminiError> {
        let Some(key) = &self.api_key else {
            debug!("Gemini API key missing, returning placeholder analysis");
            return Ok(placeholder_report());
        };

        let request = build_analysis_request(base64_wav, language);
        let text = self.generate(key, &request).await?;

        serde_json::from_str(&text).map_err(|e| GeminiError::Parse(e.to_string()))
    }

    /// Continue the assistant conversation.
    ///
    /// `history` is the prior transcript; `message` is the new user turn.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, GeminiError> {
        let Some(key) = &self.api_key else {
            return Ok(NO_KEY_CHAT_REPLY.to_string());
        };

        let request = build_chat_request(history, message, language);
        self.generate(key, &request).await
    }

    async fn generate(
        &self,
        key: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, GEMINI_MODEL);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { c.remove(0).content })
            .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
            .ok_or(GeminiError::EmptyResponse)
    }
}

/// Placeholder result when no API key is configured
pub fn placeholder_report() -> AnalysisReport {
    AnalysisReport {
        detected_genre: "Unknown (No API Key)".to_string(),
        mood: "N/A".to_string(),
        tempo: "0 BPM".to_string(),
        key_elements: vec!["Missing API Key".to_string()],
        vibe_description:
            "Please add a valid GEMINI_API_KEY to your environment to enable AI analysis."
                .to_string(),
        recommendations: vec![],
    }
}

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::En => "in English",
        Language::Es => "in Spanish (Español)",
    }
}

fn chat_language_instruction(language: Language) -> &'static str {
    match language {
        Language::En => "Speak in English.",
        Language::Es => "Speak in Spanish (Español).",
    }
}

fn build_analysis_request(base64_wav: &str, language: Language) -> GenerateContentRequest {
    let lang = language_instruction(language);

    let prompt = format!(
        "Listen to this audio. Analyze its tempo, rhythm, style, and flow. If it's music, \
         identify the genre and mood. Then, recommend 4 real, existing songs that have the \
         exact same 'vibe', 'flow' or 'groove'. Ensure these songs exist on YouTube. For \
         example, if it's funky with a specific vocal style, find matches. Provide a JSON \
         response. IMPORTANT: Provide all text fields (mood, detectedGenre, vibeDescription, \
         reasons) {lang}."
    );

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: "audio/wav".to_string(),
                        data: base64_wav.to_string(),
                    }),
                },
                Part {
                    text: Some(prompt),
                    inline_data: None,
                },
            ],
        }],
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(format!(
                    "You are a world-class musicologist and DJ. You specialize in finding deep \
                     cuts and perfect matches based on rhythm, production style, and emotional \
                     context. You must respond {lang}."
                )),
                inline_data: None,
            }],
        },
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_schema(),
        }),
    }
}

fn build_chat_request(
    history: &[ChatMessage],
    message: &str,
    language: Language,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| Content {
            role: Some(match msg.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "model".to_string(),
            }),
            parts: vec![Part {
                text: Some(msg.content.clone()),
                inline_data: None,
            }],
        })
        .collect();

    contents.push(Content {
        role: Some("user".to_string()),
        parts: vec![Part {
            text: Some(message.to_string()),
            inline_data: None,
        }],
    });

    GenerateContentRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(format!(
                    "You are VibeBot, a cool, energetic music assistant embedded in the \
                     VibeSync app. Keep answers short, punchy, and helpful. {}",
                    chat_language_instruction(language)
                )),
                inline_data: None,
            }],
        },
        generation_config: None,
    }
}

/// Response schema for structured analysis output
fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "detectedGenre": { "type": "STRING" },
            "mood": { "type": "STRING" },
            "tempo": { "type": "STRING" },
            "keyElements": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "vibeDescription": { "type": "STRING" },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "artist": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "reason": { "type": "STRING" },
                        "similarityScore": { "type": "NUMBER" }
                    },
                    "required": ["artist", "title", "reason", "similarityScore"]
                }
            }
        },
        "required": [
            "detectedGenre", "mood", "tempo", "keyElements",
            "vibeDescription", "recommendations"
        ]
    })
}
