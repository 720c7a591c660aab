//! Task classifier
//!
//! Regex scoring is separated from the precedence rules: [`ScoreCard`]
//! holds what matched, [`resolve`] turns it into a category without any
//! I/O or regex work.

use super::patterns::{
    ARCHITECTURE_TRIGGERS, CODE_GENERATION, CODE_TRIGGERS, COMPLEX_REASONING, IMAGE_ANALYSIS,
    MATH_CALCULATION, MATH_TRIGGERS,
};
use super::TaskCategory;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

struct CompiledPattern {
    source: &'static str,
    regex: Regex,
}

fn compile(patterns: &'static [&'static str]) -> Vec<CompiledPattern> {
    patterns
        .iter()
        .map(|source| CompiledPattern {
            source,
            regex: Regex::new(source).expect("classifier patterns are compile-time constants"),
        })
        .collect()
}

/// Scored categories, in tie-break order
static CATEGORY_TABLE: LazyLock<Vec<(TaskCategory, Vec<CompiledPattern>)>> = LazyLock::new(|| {
    vec![
        (TaskCategory::CodeGeneration, compile(CODE_GENERATION)),
        (TaskCategory::MathCalculation, compile(MATH_CALCULATION)),
        (TaskCategory::ImageAnalysis, compile(IMAGE_ANALYSIS)),
        (TaskCategory::ComplexReasoning, compile(COMPLEX_REASONING)),
    ]
});

static MATH_TRIGGER_SET: LazyLock<Vec<CompiledPattern>> = LazyLock::new(|| compile(MATH_TRIGGERS));
static ARCHITECTURE_TRIGGER_SET: LazyLock<Vec<CompiledPattern>> =
    LazyLock::new(|| compile(ARCHITECTURE_TRIGGERS));
static CODE_TRIGGER_SET: LazyLock<Vec<CompiledPattern>> = LazyLock::new(|| compile(CODE_TRIGGERS));

fn any_match(patterns: &[CompiledPattern], text: &str) -> bool {
    patterns.iter().any(|p| p.regex.is_match(text))
}

/// Score of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    /// Category
    pub category: TaskCategory,
    /// Number of distinct patterns that matched
    pub score: usize,
    /// The patterns that matched
    pub matched: Vec<&'static str>,
}

/// Everything the precedence rules look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    /// Per-category scores in tie-break order
    pub scores: Vec<CategoryScore>,
    /// A math trigger matched
    pub math_trigger: bool,
    /// An architecture trigger matched
    pub architecture_trigger: bool,
    /// A coding trigger matched
    pub code_trigger: bool,
}

impl ScoreCard {
    /// Score of `category` (0 when absent)
    #[must_use]
    pub fn score(&self, category: TaskCategory) -> usize {
        self.scores
            .iter()
            .find(|s| s.category == category)
            .map_or(0, |s| s.score)
    }

    /// First category with the highest score
    #[must_use]
    pub fn best(&self) -> Option<&CategoryScore> {
        self.scores.iter().fold(None, |best: Option<&CategoryScore>, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(s),
        })
    }
}

/// Which rule decided the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Image content present
    ImagePresent,
    /// Nothing scored
    NoSignal,
    /// Math score ≥ 2 or math trigger
    MathPrecedence,
    /// Reasoning score ≥ 1 or architecture trigger
    ReasoningPrecedence,
    /// Code score ≥ 2 or coding trigger
    CodePrecedence,
    /// Highest raw score
    HighestScore,
    /// Fallthrough
    Default,
}

/// Classification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// Assigned category
    pub category: TaskCategory,
    /// Rule that assigned it
    pub rule: DecisionRule,
    /// Raw scores and triggers
    pub card: ScoreCard,
}

/// Apply the fixed precedence rules to a score card
#[must_use]
pub fn resolve(card: &ScoreCard, has_image: bool) -> (TaskCategory, DecisionRule) {
    if has_image {
        return (TaskCategory::ImageAnalysis, DecisionRule::ImagePresent);
    }
    if card.scores.iter().all(|s| s.score == 0) {
        return (TaskCategory::SimpleChat, DecisionRule::NoSignal);
    }
    if card.score(TaskCategory::MathCalculation) >= 2 || card.math_trigger {
        return (TaskCategory::MathCalculation, DecisionRule::MathPrecedence);
    }
    if card.score(TaskCategory::ComplexReasoning) >= 1 || card.architecture_trigger {
        return (TaskCategory::ComplexReasoning, DecisionRule::ReasoningPrecedence);
    }
    if card.score(TaskCategory::CodeGeneration) >= 2 || card.code_trigger {
        return (TaskCategory::CodeGeneration, DecisionRule::CodePrecedence);
    }
    match card.best() {
        Some(best) if best.score >= 1 => (best.category, DecisionRule::HighestScore),
        _ => (TaskCategory::SimpleChat, DecisionRule::Default),
    }
}

/// Pattern-based task classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskClassifier;

impl TaskClassifier {
    /// Create a classifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score `message` against every table
    #[must_use]
    pub fn score(&self, message: &str) -> ScoreCard {
        let text = message.to_lowercase();
        let scores = CATEGORY_TABLE
            .iter()
            .map(|(category, patterns)| {
                let matched: Vec<&'static str> = patterns
                    .iter()
                    .filter(|p| p.regex.is_match(&text))
                    .map(|p| p.source)
                    .collect();
                CategoryScore {
                    category: *category,
                    score: matched.len(),
                    matched,
                }
            })
            .collect();

        ScoreCard {
            scores,
            math_trigger: any_match(&MATH_TRIGGER_SET, &text),
            architecture_trigger: any_match(&ARCHITECTURE_TRIGGER_SET, &text),
            code_trigger: any_match(&CODE_TRIGGER_SET, &text),
        }
    }

    /// Classify a user message
    #[must_use]
    pub fn classify(&self, message: &str, has_image: bool) -> ClassificationResult {
        let card = if has_image {
            ScoreCard {
                scores: Vec::new(),
                math_trigger: false,
                architecture_trigger: false,
                code_trigger: false,
            }
        } else {
            self.score(message)
        };
        let (category, rule) = resolve(&card, has_image);

        if matches!(rule, DecisionRule::NoSignal | DecisionRule::Default) {
            debug!(rule = ?rule, "classification_defaulted");
        }
        debug!(category = %category, rule = ?rule, "Task classified");

        ClassificationResult {
            category,
            rule,
            card,
        }
    }
}
