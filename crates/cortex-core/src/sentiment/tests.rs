//! Tests for the sentiment breaker

use super::*;

struct FixedScorer(f64);

impl SentimentScorer for FixedScorer {
    fn compound(&self, _text: &str) -> f64 {
        self.0
    }
}

#[test]
fn test_threshold_boundary_is_inclusive() {
    let breaker = SentimentBreaker::default();
    assert!(breaker.should_override(-0.8));
    assert!(breaker.should_override(-0.95));
    assert!(!breaker.should_override(-0.79));
    assert!(!breaker.should_override(0.5));
}

#[test]
fn test_empty_text_scores_zero() {
    let breaker = SentimentBreaker::new(Arc::new(FixedScorer(-1.0)), DEFAULT_THRESHOLD);
    assert_eq!(breaker.analyze(""), 0.0);
    assert_eq!(breaker.analyze("   "), 0.0);
    assert_eq!(breaker.analyze("x"), -1.0);
}

#[test]
fn test_scores_are_clamped() {
    let breaker = SentimentBreaker::new(Arc::new(FixedScorer(-3.0)), DEFAULT_THRESHOLD);
    assert_eq!(breaker.analyze("anything"), -1.0);
}

#[test]
fn test_neutral_text() {
    let breaker = SentimentBreaker::default();
    for text in ["Hello, how are you?", "write a python function to sort a list"] {
        let score = breaker.analyze(text);
        assert!(score.abs() < 0.5, "{text}: {score}");
        assert!(!breaker.should_override(score));
    }
}

#[test]
fn test_distress_triggers_override() {
    let breaker = SentimentBreaker::default();
    let score = breaker.analyze("I want to die, everything is hopeless and I hate my life");
    assert!(score <= -0.8, "score was {score}");
    assert!(breaker.should_override(score));
}

#[test]
fn test_broad_distress_vocabulary_triggers_override() {
    let breaker = SentimentBreaker::default();
    for text in [
        "I feel devastated and heartbroken, tormented and suicidal, nobody cares about me",
        "I am so distressed and traumatized, everything is agonizing and I feel doomed",
    ] {
        let score = breaker.analyze(text);
        assert!(breaker.should_override(score), "{text}: {score}");
    }
}

#[test]
fn test_positive_text() {
    let breaker = SentimentBreaker::default();
    let score = breaker.analyze("I love this, thank you so much! It is great");
    assert!(score > 0.5, "score was {score}");
    assert!(!breaker.should_override(score));
}

#[test]
fn test_negation_flips_polarity() {
    let scorer = VaderScorer;
    assert!(scorer.compound("this is good") > 0.0);
    assert!(scorer.compound("this is not good") < 0.0);
}

#[test]
fn test_exclamation_intensifies() {
    let scorer = VaderScorer;
    assert!(scorer.compound("this is terrible!!!") < scorer.compound("this is terrible"));
}
