//! Deterministic keyword-bag sentiment scoring (§4.3 News, fallback path
//! (b)), grounded on a `score_headline_keywords`-style keyword bag: each matching
//! keyword nudges the score by +/-0.1 off a neutral 0.5 baseline, clamped
//! to [0,1].

const POSITIVE_KEYWORDS: &[&str] = &[
    "surge", "rally", "bullish", "breakthrough", "record", "profit", "adoption", "growth",
    "upgrade", "partnership", "innovation", "outperform", "optimistic", "gain", "rise", "soar",
    "beat", "strong",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "crash", "plunge", "bearish", "decline", "loss", "concern", "risk", "fear", "regulatory",
    "ban", "hack", "vulnerability", "underperform", "pessimistic", "fall", "drop", "tumble",
    "miss", "weak",
];

pub struct HeadlineScore {
    pub score: f64,
    pub reasoning: String,
}

/// Scores a single headline in [0,1]; 0.5 is neutral.
pub fn score_headline_keywords(headline: &str) -> HeadlineScore {
    let lower = headline.to_lowercase();
    let positive_count = POSITIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    let negative_count = NEGATIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    let score = if positive_count > negative_count {
        0.5 + positive_count as f64 * 0.1
    } else if negative_count > positive_count {
        0.5 - negative_count as f64 * 0.1
    } else {
        0.5
    };

    HeadlineScore {
        score: score.clamp(0.0, 1.0),
        reasoning: format!("keyword analysis: {positive_count} positive, {negative_count} negative signals"),
    }
}

/// Label bands per §4.3: POSITIVE>0.6, NEGATIVE<0.4, else NEUTRAL.
pub fn label_for(score: f64) -> &'static str {
    if score > 0.6 {
        "POSITIVE"
    } else if score < 0.4 {
        "NEGATIVE"
    } else {
        "NEUTRAL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_keywords_push_score_above_neutral() {
        let result = score_headline_keywords("Company reports record profit and strong growth");
        assert!(result.score > 0.5);
        assert_eq!(label_for(result.score), "POSITIVE");
    }

    #[test]
    fn negative_keywords_push_score_below_neutral() {
        let result = score_headline_keywords("Stock plunges on regulatory crackdown fear");
        assert!(result.score < 0.5);
        assert_eq!(label_for(result.score), "NEGATIVE");
    }

    #[test]
    fn no_keywords_is_neutral() {
        let result = score_headline_keywords("Company holds annual shareholder meeting");
        assert_eq!(result.score, 0.5);
        assert_eq!(label_for(result.score), "NEUTRAL");
    }
}
