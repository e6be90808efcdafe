//! Solution Evaluator
//!
//! Scores a final approach on four independent dimensions and folds them
//! into one overall quality figure:
//!
//! | Dimension  | Driven by                                         |
//! |------------|---------------------------------------------------|
//! | validity   | step count + problem-type keywords                |
//! | efficiency | complexity tier + efficiency keywords - step bloat |
//! | robustness | validation / error-handling keywords              |
//! | bias       | bias reduction record (lower is better)           |
//!
//! Keyword heuristics live in `ScoringRules` and are swappable; the
//! aggregation arithmetic and the overall weights are fixed.

use crate::types::{Approach, BiasReductionRecord, Complexity, EvaluationResult, ProblemType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall quality weights, fixed
pub const VALIDITY_WEIGHT: f64 = 0.4;
pub const EFFICIENCY_WEIGHT: f64 = 0.25;
pub const ROBUSTNESS_WEIGHT: f64 = 0.25;
pub const BIAS_WEIGHT: f64 = 0.1;

pub const MIN_BIAS_SCORE: f64 = 0.05;
pub const MAX_BIAS_SCORE: f64 = 0.5;

const BASE_CORRECTNESS: f64 = 0.7;
const COMPLETE_AT_STEPS: f64 = 5.0;
const BASE_ROBUSTNESS: f64 = 0.6;
const BLOAT_THRESHOLD: usize = 7;

pub const RECOMMEND_COMPLETENESS: &str =
    "Improve solution completeness by addressing all aspects of the problem";
pub const RECOMMEND_EFFICIENCY: &str = "Enhance solution efficiency by reducing unnecessary steps";
pub const RECOMMEND_ROBUSTNESS: &str =
    "Increase solution robustness by adding validation and error handling";
pub const RECOMMEND_DEBIASING: &str =
    "Reduce cognitive bias by applying additional debiasing techniques";
pub const RECOMMEND_BALANCE: &str =
    "Fine-tune the balance between validity, efficiency, and robustness";

/// Lower-cased text of each step, scanned per step
#[derive(Debug, Clone)]
pub struct StepCorpus {
    texts: Vec<String>,
}

impl StepCorpus {
    pub fn from_approach(approach: &Approach) -> Self {
        Self {
            texts: approach.steps.iter().map(|s| s.text_lower()).collect(),
        }
    }

    /// True if any single step mentions `needle` (already lower-case)
    pub fn mentions(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.contains(needle))
    }

    pub fn step_count(&self) -> usize {
        self.texts.len()
    }
}

/// A heuristic that turns step text into a score bonus
pub trait ScoringRule {
    fn bonus(&self, corpus: &StepCorpus) -> f64;
}

/// Flat bonus for each distinct keyword mentioned by some step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub bonus_per_keyword: f64,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], bonus_per_keyword: f64) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            bonus_per_keyword,
        }
    }

    pub fn hits(&self, corpus: &StepCorpus) -> usize {
        self.keywords
            .iter()
            .filter(|k| corpus.mentions(&k.to_lowercase()))
            .count()
    }
}

impl ScoringRule for KeywordRule {
    fn bonus(&self, corpus: &StepCorpus) -> f64 {
        self.hits(corpus) as f64 * self.bonus_per_keyword
    }
}

/// One-off bonus when any step contains a marker substring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRule {
    pub marker: String,
    pub bonus: f64,
}

impl ScoringRule for MarkerRule {
    fn bonus(&self, corpus: &StepCorpus) -> f64 {
        if corpus.mentions(&self.marker.to_lowercase()) {
            self.bonus
        } else {
            0.0
        }
    }
}

/// Swappable keyword lists and bonus weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Correctness keywords per problem type; types without a rule get no bonus
    pub validity: BTreeMap<ProblemType, KeywordRule>,
    pub efficiency: KeywordRule,
    pub robustness: KeywordRule,
    /// Extra robustness credit for an explicit validation step
    pub validation: MarkerRule,
}

impl Default for ScoringRules {
    fn default() -> Self {
        let mut validity = BTreeMap::new();
        validity.insert(
            ProblemType::Optimization,
            KeywordRule::new(&["constraint", "objective"], 0.1),
        );
        validity.insert(
            ProblemType::LogicalReasoning,
            KeywordRule::new(&["premise", "conclusion"], 0.1),
        );
        validity.insert(
            ProblemType::SequentialDecision,
            KeywordRule::new(&["sequence", "outcome"], 0.1),
        );

        Self {
            validity,
            efficiency: KeywordRule::new(
                &["efficient", "optimize", "streamline", "simplify", "reduce"],
                0.02,
            ),
            robustness: KeywordRule::new(
                &[
                    "validate",
                    "verify",
                    "check",
                    "handle",
                    "robust",
                    "error",
                    "exception",
                    "edge case",
                ],
                0.025,
            ),
            validation: MarkerRule {
                marker: "validat".to_string(),
                bonus: 0.1,
            },
        }
    }
}

// ============================================================================
// AGGREGATION ARITHMETIC
// ============================================================================

/// 0.6 * correctness + 0.4 * completeness, clamped to [0, 1]
///
/// Configured bonuses may be negative, so the floor matters too.
pub fn validity_score(step_count: usize, correctness_bonus: f64) -> f64 {
    let completeness = (step_count as f64 / COMPLETE_AT_STEPS).min(1.0);
    let correctness = BASE_CORRECTNESS + correctness_bonus;
    (0.6 * correctness + 0.4 * completeness).clamp(0.0, 1.0)
}

/// Tier base + keyword bonus - bloat penalty, clamped to [0, 1]
pub fn efficiency_score(complexity: Complexity, step_count: usize, keyword_bonus: f64) -> f64 {
    let base = match complexity {
        Complexity::High => 0.7,
        Complexity::Medium => 0.8,
        Complexity::Low | Complexity::Unspecified => 0.9,
    };

    let penalty = if step_count > BLOAT_THRESHOLD {
        0.05 * ((step_count - BLOAT_THRESHOLD) as f64 / 3.0)
    } else {
        0.0
    };

    (base + keyword_bonus - penalty).clamp(0.0, 1.0)
}

pub fn robustness_score(bonus: f64) -> f64 {
    (BASE_ROBUSTNESS + bonus).clamp(0.0, 1.0)
}

/// Residual bias after reduction, in [0.05, 0.5]
pub fn bias_score(record: Option<&BiasReductionRecord>) -> f64 {
    let Some(record) = record.filter(|r| !r.identified_biases.is_empty()) else {
        return MIN_BIAS_SCORE;
    };

    let base = (0.2 + 0.05 * record.identified_biases.len() as f64).min(MAX_BIAS_SCORE);
    let reduced = base * (1.0 - record.reduction_effectiveness);
    reduced.clamp(MIN_BIAS_SCORE, MAX_BIAS_SCORE)
}

/// Fixed-weight combination; bias enters inverted
pub fn overall_quality(validity: f64, efficiency: f64, robustness: f64, bias: f64) -> f64 {
    let quality = VALIDITY_WEIGHT * validity
        + EFFICIENCY_WEIGHT * efficiency
        + ROBUSTNESS_WEIGHT * robustness
        + BIAS_WEIGHT * (1.0 - bias);
    quality.clamp(0.0, 1.0)
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Scores final approaches
#[derive(Debug, Clone, Default)]
pub struct SolutionEvaluator {
    rules: ScoringRules,
}

impl SolutionEvaluator {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn evaluate(
        &self,
        approach: &Approach,
        problem_type: ProblemType,
        complexity: Complexity,
    ) -> EvaluationResult {
        let corpus = StepCorpus::from_approach(approach);

        let validity_score = self.evaluate_validity(&corpus, problem_type);
        let efficiency_score = self.evaluate_efficiency(&corpus, complexity);
        let robustness_score = self.evaluate_robustness(&corpus);
        let bias_score = bias_score(approach.bias_reduction.as_ref());
        let overall_quality =
            overall_quality(validity_score, efficiency_score, robustness_score, bias_score);

        tracing::debug!(
            "Evaluated solution: validity={:.2} efficiency={:.2} robustness={:.2} bias={:.2} overall_quality={:.2}",
            validity_score,
            efficiency_score,
            robustness_score,
            bias_score,
            overall_quality
        );

        EvaluationResult {
            validity_score,
            efficiency_score,
            robustness_score,
            bias_score,
            overall_quality,
        }
    }

    pub fn evaluate_validity(&self, corpus: &StepCorpus, problem_type: ProblemType) -> f64 {
        let bonus = self
            .rules
            .validity
            .get(&problem_type)
            .map(|rule| rule.bonus(corpus))
            .unwrap_or(0.0);
        validity_score(corpus.step_count(), bonus)
    }

    pub fn evaluate_efficiency(&self, corpus: &StepCorpus, complexity: Complexity) -> f64 {
        efficiency_score(
            complexity,
            corpus.step_count(),
            self.rules.efficiency.bonus(corpus),
        )
    }

    pub fn evaluate_robustness(&self, corpus: &StepCorpus) -> f64 {
        robustness_score(self.rules.robustness.bonus(corpus) + self.rules.validation.bonus(corpus))
    }

    /// Improvement suggestions, in fixed order
    pub fn recommend(&self, result: &EvaluationResult) -> Vec<String> {
        recommendations(result)
    }
}

pub fn recommendations(result: &EvaluationResult) -> Vec<String> {
    let mut out = Vec::new();

    if result.validity_score < 0.7 {
        out.push(RECOMMEND_COMPLETENESS.to_string());
    }
    if result.efficiency_score < 0.7 {
        out.push(RECOMMEND_EFFICIENCY.to_string());
    }
    if result.robustness_score < 0.7 {
        out.push(RECOMMEND_ROBUSTNESS.to_string());
    }
    if result.bias_score > 0.2 {
        out.push(RECOMMEND_DEBIASING.to_string());
    }
    if out.is_empty() && result.overall_quality < 0.85 {
        out.push(RECOMMEND_BALANCE.to_string());
    }

    out
}
