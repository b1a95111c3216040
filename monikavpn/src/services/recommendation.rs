use crate::config::RecommendationSettings;
use crate::error::AppError;
use crate::models::{RecommendationResult, Server, ServerSummary};
use crate::services::ServerCatalog;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

pub const FALLBACK_REASON: &str = "Default recommendation.";

#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        task: &str,
        servers: &[ServerSummary],
    ) -> Result<RecommendationResult, AppError>;
}

/// Calls the Gemini `generateContent` endpoint with a JSON response schema.
pub struct GeminiRecommender {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiRecommender {
    pub fn new(settings: &RecommendationSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        if settings.api_key.is_none() {
            warn!("No recommendation API key configured; requests will fall back");
        }
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn recommend(
        &self,
        task: &str,
        servers: &[ServerSummary],
    ) -> Result<RecommendationResult, AppError> {
        let prompt = build_prompt(task, servers)?;
        let mut req = self.client.post(self.endpoint()).json(&request_body(&prompt));
        if let Some(key) = &self.api_key {
            req = req.header("x-goog-api-key", key);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(AppError::Api { status, message });
        }

        let body = res.text().await?;
        parse_generate_response(&body)
    }
}

pub fn build_prompt(task: &str, servers: &[ServerSummary]) -> Result<String, AppError> {
    let listing = serde_json::to_string(servers)?;
    Ok(format!(
        "Recommend the best VPN server from this list for the user's task: \"{}\".\n\
         Available servers: {}",
        task, listing
    ))
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "serverId": {
                        "type": "STRING",
                        "description": "The ID of the recommended server"
                    },
                    "reason": {
                        "type": "STRING",
                        "description": "A short explanation for why this server was chosen"
                    }
                },
                "required": ["serverId", "reason"]
            }
        }
    })
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extracts the `{serverId, reason}` object from a `generateContent` reply.
pub fn parse_generate_response(body: &str) -> Result<RecommendationResult, AppError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::Recommendation(
            "response contained no text".to_string(),
        ));
    }

    Ok(serde_json::from_str(text.trim())?)
}

pub fn fallback_recommendation(first: &Server) -> RecommendationResult {
    RecommendationResult {
        server_id: first.id.clone(),
        reason: FALLBACK_REASON.to_string(),
    }
}

/// Asks the recommender, substituting the fallback result on any failure.
/// Only a blank task or an empty catalog is reported as an error.
pub async fn recommend_or_default(
    recommender: &dyn Recommender,
    task: &str,
    catalog: &ServerCatalog,
) -> Result<RecommendationResult, AppError> {
    let task = task.trim();
    if task.is_empty() {
        return Err(AppError::Validation("task description is empty".to_string()));
    }
    let first = catalog
        .first()
        .ok_or_else(|| AppError::Validation("server catalog is empty".to_string()))?;

    let summaries = catalog.summaries();
    info!("Requesting server recommendation for {:?}", task);

    match recommender.recommend(task, &summaries).await {
        Ok(result) => {
            info!("Recommended server {}: {}", result.server_id, result.reason);
            Ok(result)
        }
        Err(e) => {
            warn!("Recommendation failed, using default: {}", e);
            Ok(fallback_recommendation(first))
        }
    }
}
