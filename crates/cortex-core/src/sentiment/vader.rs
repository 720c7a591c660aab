//! VADER compound scorer

use super::SentimentScorer;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Lexicon and rule based scorer backed by the VADER word list
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        let analyzer = SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}
