//! `analyze_news` tool (§4.3 News): mean of per-headline sentiment scores,
//! with the preferred provider (LLM when configured) falling back to the
//! keyword bag per-headline if it errors (§9 ordered provider list,
//! "selection is recomputed per call only if the preferred provider fails").

use crate::headlines::HeadlineSource;
use crate::provider::{HeadlineScore, KeywordFallbackProvider, SentimentProvider};
use rpc_core::error::ToolError;
use rpc_core::registry::ToolRegistry;
use serde_json::{json, Value};
use shared_models::signal::{Signal, Verdict};
use shared_models::time::now_iso;
use std::collections::HashMap;
use std::sync::Arc;

pub struct NewsState {
    pub headlines: Arc<dyn HeadlineSource>,
    pub preferred: Option<Arc<dyn SentimentProvider>>,
    pub fallback: Arc<dyn SentimentProvider>,
}

impl NewsState {
    pub fn new(headlines: Arc<dyn HeadlineSource>, preferred: Option<Arc<dyn SentimentProvider>>) -> Self {
        Self {
            headlines,
            preferred,
            fallback: Arc::new(KeywordFallbackProvider),
        }
    }

    async fn score_headline(&self, headline: &str) -> (HeadlineScore, &'static str) {
        if let Some(preferred) = &self.preferred {
            if let Ok(scored) = preferred.score(headline).await {
                return (scored, preferred.name());
            }
        }
        // Preferred provider absent or failed this call; the keyword bag
        // never fails, so this always produces a score (§9).
        let scored = self
            .fallback
            .score(headline)
            .await
            .expect("keyword fallback never errors");
        (scored, self.fallback.name())
    }
}

pub async fn analyze_news(state: Arc<NewsState>, symbol: &str) -> Result<Value, ToolError> {
    let headlines = state.headlines.headlines(symbol);

    // No headlines at all: UNKNOWN regardless of provider availability,
    // distinct from a NEUTRAL score (§4.3 News, §8 invariant).
    if headlines.is_empty() {
        return Ok(json!({
            "symbol": symbol,
            "verdict": "UNKNOWN",
            "confidence": 0.0,
            "headline_count": 0,
            "headlines": [],
            "timestamp": now_iso(),
        }));
    }

    let mut scores = Vec::with_capacity(headlines.len());
    let mut per_headline = Vec::with_capacity(headlines.len());
    let mut provider_used = "keyword_bag";

    for headline in &headlines {
        let (scored, provider) = state.score_headline(headline).await;
        provider_used = provider;
        scores.push(scored.score);
        per_headline.push(json!({
            "headline": headline,
            "score": scored.score,
            "reasoning": scored.reasoning,
            "provider": provider,
        }));
    }

    let mean_score = scores.iter().sum::<f64>() / scores.len() as f64;
    let label = crate::sentiment::label_for(mean_score);
    let verdict = match label {
        "POSITIVE" => Verdict::Positive,
        "NEGATIVE" => Verdict::Negative,
        _ => Verdict::Neutral,
    };

    let mut indicators = HashMap::new();
    indicators.insert("mean_score".to_string(), json!(mean_score));
    indicators.insert("headline_count".to_string(), json!(headlines.len()));
    indicators.insert("headlines".to_string(), json!(per_headline));
    indicators.insert("provider".to_string(), json!(provider_used));

    let signal = Signal::new(symbol, verdict, mean_score, indicators, "news");
    Ok(serde_json::to_value(signal).unwrap_or(Value::Null))
}

pub fn register_tools(registry: &mut ToolRegistry, state: Arc<NewsState>) {
    registry.register(
        "analyze_news",
        "Score recent headlines for a symbol into a POSITIVE/NEUTRAL/NEGATIVE sentiment signal.",
        json!({
            "type": "object",
            "properties": { "symbol": { "type": "string" } },
            "required": ["symbol"],
        }),
        move |args| {
            let state = state.clone();
            async move {
                let symbol = args
                    .get("symbol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::new("symbol must be a string"))?;
                analyze_news(state, symbol).await
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headlines::SyntheticHeadlineSource;

    fn state() -> Arc<NewsState> {
        Arc::new(NewsState::new(Arc::new(SyntheticHeadlineSource::new()), None))
    }

    #[tokio::test]
    async fn produces_a_labeled_signal_for_known_symbol() {
        let result = analyze_news(state(), "AAPL").await.unwrap();
        assert!(result.get("error").is_none());
        assert!(result["verdict"].is_string());
        assert_ne!(result["verdict"], "UNKNOWN");
    }

    #[tokio::test]
    async fn empty_symbol_yields_unknown_not_neutral() {
        let result = analyze_news(state(), "").await.unwrap();
        assert_eq!(result["verdict"], "UNKNOWN");
    }
}
