//! Chat-completion client (Groq-compatible OpenAI-style endpoint)
//!
//! Produces the raw candidate list for a survey: builds a
//! category-specific system prompt and a user prompt from the flattened
//! answers, requests a completion at elevated temperature, and runs the
//! normalizer over the returned text. Any failure here is terminal for
//! the orchestration call; without the model there is nothing to enrich.

use crate::config::ChatConfig;
use crate::error::RecError;
use crate::services::normalizer;
use apphub_common::config::is_valid_key;
use apphub_common::types::{Answers, Category, RawCandidate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    error: Option<ChatErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
}

/// Chat-completion client
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, config: ChatConfig) -> Self {
        Self { http, config }
    }

    /// Request candidate recommendations for a completed survey
    pub async fn get_candidates(
        &self,
        category: Category,
        answers: &Answers,
    ) -> Result<Vec<RawCandidate>, RecError> {
        if !is_valid_key(&self.config.api_key) {
            return Err(RecError::Config(
                "chat API key not set; configure APPHUB_CHAT_API_KEY or the [chat] \
                 section of apphub-rec.toml"
                    .to_string(),
            ));
        }

        let system_prompt = system_prompt(category);
        let user_prompt = build_user_prompt(answers, &freshness_nonce());

        debug!(category = category.as_str(), "Requesting chat completion");

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .header("Cache-Control", "no-cache")
            .json(&request)
            .send()
            .await
            .map_err(|e| RecError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ChatErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(RecError::Service(reason));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| RecError::Service(format!("malformed completion body: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RecError::Service("no completion content returned".to_string()))?;

        let candidates = normalizer::parse_candidates(&content)?;

        info!(
            category = category.as_str(),
            count = candidates.len(),
            "Chat completion parsed"
        );

        Ok(candidates)
    }
}

/// Millisecond timestamp plus a random value, appended to the user
/// prompt so repeated surveys do not converge on cached answers.
fn freshness_nonce() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let salt: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}.{:06}", millis, salt)
}

/// Flatten answers to `key: value` lines; lists are comma-joined
fn build_user_prompt(answers: &Answers, nonce: &str) -> String {
    let answers_text = answers
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value.joined()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on these preferences:\n{}\n\nProvide 8 personalized recommendations. \
         Respond ONLY with a valid JSON array, no other text.\n\n\
         IMPORTANT: Provide fresh, diverse recommendations. Session ID: {}. \
         Avoid repetitive suggestions.",
        answers_text, nonce
    )
}

/// Fixed per-category instructions describing the required JSON shape
fn system_prompt(category: Category) -> &'static str {
    match category {
        Category::Entertainment => {
            r#"You are an expert entertainment recommendation assistant. You provide personalized movie, TV show, game, book, and music recommendations based on user preferences. Respond ONLY with a valid JSON array of exactly 8 recommendations. Each recommendation must have this structure:
{
  "title": "exact title",
  "description": "brief 1-2 sentence description",
  "reason": "why this matches their preferences",
  "searchQuery": "title with release year (e.g., 'Inception 2010') for accurate TMDB matching"
}
IMPORTANT: Always include the release year in searchQuery for movies/TV shows to ensure correct matches on TMDB."#
        }
        Category::Eat => {
            r#"You are an expert food and dining recommendation assistant. You provide personalized restaurant and recipe recommendations based on cuisine preferences, dining type, and price range. Respond ONLY with a valid JSON array of exactly 8 recommendations. Each recommendation must have:
{
  "title": "restaurant or recipe name",
  "description": "cuisine type and signature dishes",
  "reason": "why this matches their preferences",
  "searchQuery": "search term for finding this on Yelp or food sites"
}"#
        }
        Category::Travel => {
            r#"You are an expert travel recommendation assistant. You provide personalized destination and activity recommendations based on trip type, duration, and budget. Respond ONLY with a valid JSON array of exactly 8 recommendations. Each recommendation must have:
{
  "title": "destination or activity name",
  "description": "brief overview of the place or experience",
  "reason": "why this matches their travel preferences",
  "searchQuery": "search term for finding travel information"
}"#
        }
        Category::Gift => {
            r#"You are an expert gift recommendation assistant. You provide personalized gift ideas based on recipient, occasion, budget, and interests. Respond ONLY with a valid JSON array of exactly 8 recommendations. Each recommendation must have:
{
  "title": "gift idea name",
  "description": "what it is and why it's special",
  "reason": "why this is perfect for the recipient",
  "searchQuery": "search term for finding this gift online"
}"#
        }
        Category::Buy => {
            r#"You are an expert shopping recommendation assistant. You provide personalized product recommendations based on category, use case, and budget. Respond ONLY with a valid JSON array of exactly 8 recommendations. Each recommendation must have:
{
  "title": "product name",
  "description": "key features and benefits",
  "reason": "why this product matches their needs",
  "searchQuery": "search term for finding this product"
}"#
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apphub_common::types::AnswerValue;

    #[test]
    fn user_prompt_flattens_answers() {
        let mut answers = Answers::new();
        answers.insert(
            "cuisine".into(),
            AnswerValue::List(vec!["italian".into(), "asian".into()]),
        );
        answers.insert("diningType".into(), AnswerValue::Text("dineIn".into()));

        let prompt = build_user_prompt(&answers, "12345.000001");
        assert!(prompt.contains("cuisine: italian, asian"));
        assert!(prompt.contains("diningType: dineIn"));
        assert!(prompt.contains("Session ID: 12345.000001"));
        assert!(prompt.contains("valid JSON array"));
    }

    #[test]
    fn system_prompts_demand_json_arrays() {
        for category in [
            Category::Entertainment,
            Category::Eat,
            Category::Travel,
            Category::Gift,
            Category::Buy,
        ] {
            let prompt = system_prompt(category);
            assert!(prompt.contains("JSON array of exactly 8"));
            assert!(prompt.contains("searchQuery"));
        }
    }

    #[test]
    fn entertainment_prompt_asks_for_release_years() {
        assert!(system_prompt(Category::Entertainment).contains("release year"));
    }

    #[test]
    fn nonces_differ_between_calls() {
        assert_ne!(freshness_nonce(), freshness_nonce());
    }

    #[tokio::test]
    async fn missing_key_is_a_config_error() {
        let client = ChatClient::new(
            reqwest::Client::new(),
            ChatConfig {
                api_key: String::new(),
                ..ChatConfig::default()
            },
        );
        let answers = Answers::new();
        let err = client.get_candidates(Category::Travel, &answers).await;
        assert!(matches!(err.unwrap_err(), RecError::Config(_)));
    }
}
