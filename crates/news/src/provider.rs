//! Sentiment scoring providers (§4.3 News): an LLM delegate when configured,
//! falling back to the deterministic keyword bag otherwise (§9 "Lazy imports
//! and fallbacks" re-architected as an ordered provider list, capability-
//! probed once at startup).

use crate::sentiment::score_headline_keywords;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub struct HeadlineScore {
    pub score: f64,
    pub reasoning: String,
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn score(&self, headline: &str) -> Result<HeadlineScore, String>;
    fn name(&self) -> &'static str;
}

#[derive(Default)]
pub struct KeywordFallbackProvider;

#[async_trait]
impl SentimentProvider for KeywordFallbackProvider {
    async fn score(&self, headline: &str) -> Result<HeadlineScore, String> {
        let result = score_headline_keywords(headline);
        Ok(HeadlineScore {
            score: result.score,
            reasoning: result.reasoning,
        })
    }

    fn name(&self) -> &'static str {
        "keyword_bag"
    }
}

/// Delegates per-headline sentiment to an external LLM capability (§4.3
/// News path (a)): returns a three-label sentiment + score + reasoning.
/// `OPENAI_API_KEY`/`OPENAI_MODEL` configure the provider; absence disables
/// it per §6 ("Absent configuration disables the corresponding capability").
pub struct LlmSentimentProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmSentimentProvider {
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let http = reqwest::Client::builder().timeout(timeout).build().ok()?;
        Some(Self { http, api_key, model })
    }
}

#[async_trait]
impl SentimentProvider for LlmSentimentProvider {
    async fn score(&self, headline: &str) -> Result<HeadlineScore, String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "Classify the financial headline's sentiment. Respond with JSON only: {\"label\":\"POSITIVE|NEUTRAL|NEGATIVE\",\"score\":<0..1>,\"reasoning\":\"<one sentence>\"}.",
                },
                { "role": "user", "content": headline },
            ],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("LLM transport error: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("LLM call failed with status {}", response.status()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("malformed LLM response: {e}"))?;

        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| "LLM response missing content".to_string())?;

        let parsed: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("LLM content not JSON: {e}"))?;

        let score = parsed
            .get("score")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| "LLM response missing score".to_string())?;
        let reasoning = parsed
            .get("reasoning")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .to_string();

        Ok(HeadlineScore {
            score: score.clamp(0.0, 1.0),
            reasoning,
        })
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
