//! Strategy Selector
//!
//! A strategy is a technique category viewed as a unit of reasoning: it has
//! a display name, a list of member techniques, and a per-problem confidence.
//! The selector maps problem characteristics (type, complexity, domain) to a
//! confidence-ranked list of strategies and a ranked list of concrete
//! techniques.

use crate::techniques::{TechniqueCategory, TechniqueId};
use crate::types::{Complexity, ProblemType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STRATEGY_CONFIDENCE: f64 = 0.6;

impl TechniqueCategory {
    pub const ALL: [TechniqueCategory; 5] = [
        TechniqueCategory::MathematicalOptimization,
        TechniqueCategory::HeuristicOptimization,
        TechniqueCategory::NumericalMethods,
        TechniqueCategory::ReinforcementLearning,
        TechniqueCategory::LogicalReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueCategory::MathematicalOptimization => "mathematical_optimization",
            TechniqueCategory::HeuristicOptimization => "heuristic_optimization",
            TechniqueCategory::NumericalMethods => "numerical_methods",
            TechniqueCategory::ReinforcementLearning => "reinforcement_learning",
            TechniqueCategory::LogicalReasoning => "logical_reasoning",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TechniqueCategory::MathematicalOptimization => "Mathematical Optimization",
            TechniqueCategory::HeuristicOptimization => "Heuristic Optimization",
            TechniqueCategory::NumericalMethods => "Numerical Methods",
            TechniqueCategory::ReinforcementLearning => "Reinforcement Learning",
            TechniqueCategory::LogicalReasoning => "Logical Reasoning",
        }
    }

    /// Member techniques in catalog order
    pub fn techniques(&self) -> Vec<TechniqueId> {
        TechniqueId::ALL
            .into_iter()
            .filter(|t| t.category() == *self)
            .collect()
    }

    /// First member technique, used when a strategy must contribute exactly one
    pub fn lead_technique(&self) -> TechniqueId {
        match self {
            TechniqueCategory::MathematicalOptimization => TechniqueId::LinearProgramming,
            TechniqueCategory::HeuristicOptimization => TechniqueId::GeneticAlgorithms,
            TechniqueCategory::NumericalMethods => TechniqueId::GradientDescent,
            TechniqueCategory::ReinforcementLearning => TechniqueId::QLearning,
            TechniqueCategory::LogicalReasoning => TechniqueId::Deduction,
        }
    }

    /// Look up a strategy by its display name (as recorded in reports)
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl FromStr for TechniqueCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown strategy: {}", s))
    }
}

impl fmt::Display for TechniqueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy chosen for a problem, with its applicability confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedStrategy {
    pub strategy: TechniqueCategory,
    pub confidence: f64,
}

impl SelectedStrategy {
    pub fn name(&self) -> &'static str {
        self.strategy.display_name()
    }
}

/// Confidence in a strategy selection of `count` strategies
///
/// More strategies means less confidence in any one of them.
pub fn strategy_selection_confidence(count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (0.9 - 0.05 * (count - 1) as f64).max(0.5)
}

/// Picks strategies and techniques for a problem
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategySelector;

impl StrategySelector {
    pub fn new() -> Self {
        Self
    }

    /// Strategies for a problem, highest confidence first (ties keep selection order)
    pub fn select_strategies(
        &self,
        problem_type: ProblemType,
        complexity: Complexity,
        domain: Option<&str>,
    ) -> Vec<SelectedStrategy> {
        use TechniqueCategory::*;

        let mut strategies: Vec<TechniqueCategory> = match problem_type {
            ProblemType::Optimization => vec![MathematicalOptimization, HeuristicOptimization],
            ProblemType::LogicalReasoning => vec![LogicalReasoning],
            ProblemType::SequentialDecision => vec![ReinforcementLearning],
            ProblemType::ConstraintSatisfaction => vec![MathematicalOptimization],
            ProblemType::GeneralReasoning => vec![LogicalReasoning, NumericalMethods],
            ProblemType::ContinuousOptimization | ProblemType::ComplexSearch => {
                vec![LogicalReasoning]
            }
        };

        if complexity == Complexity::High {
            add_if_absent(&mut strategies, HeuristicOptimization);
        }

        if let Some(extra) = domain.and_then(domain_strategy) {
            add_if_absent(&mut strategies, extra);
        }

        let mut selected: Vec<SelectedStrategy> = strategies
            .into_iter()
            .map(|strategy| SelectedStrategy {
                strategy,
                confidence: self.confidence(strategy, problem_type, complexity),
            })
            .collect();
        selected.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        tracing::debug!(
            "Selected {} strategies for problem type {} (complexity: {})",
            selected.len(),
            problem_type,
            complexity
        );
        selected
    }

    /// How well a strategy fits a problem, capped at 1.0
    pub fn confidence(
        &self,
        strategy: TechniqueCategory,
        problem_type: ProblemType,
        complexity: Complexity,
    ) -> f64 {
        use TechniqueCategory::*;

        let base = match (strategy, problem_type) {
            (MathematicalOptimization, ProblemType::Optimization) => 0.9,
            (MathematicalOptimization, ProblemType::ConstraintSatisfaction) => 0.85,
            (HeuristicOptimization, ProblemType::Optimization) => 0.8,
            (HeuristicOptimization, ProblemType::ComplexSearch) => 0.9,
            (NumericalMethods, ProblemType::ContinuousOptimization) => 0.9,
            (ReinforcementLearning, ProblemType::SequentialDecision) => 0.95,
            (LogicalReasoning, ProblemType::LogicalReasoning) => 0.9,
            (LogicalReasoning, ProblemType::GeneralReasoning) => 0.8,
            _ => DEFAULT_STRATEGY_CONFIDENCE,
        };

        let adjustment = match (strategy, complexity) {
            (HeuristicOptimization, Complexity::High) => 0.1,
            (MathematicalOptimization, Complexity::Low) => 0.05,
            _ => 0.0,
        };

        (base + adjustment).min(1.0)
    }

    /// Recommended techniques for a problem type, best first
    ///
    /// Empty for problem types without a recommendation table.
    pub fn ranked_techniques(
        &self,
        problem_type: ProblemType,
        complexity: Complexity,
    ) -> Vec<(TechniqueId, f64)> {
        use TechniqueId::*;

        let table: &[(TechniqueId, f64)] = match problem_type {
            ProblemType::Optimization => {
                &[(LinearProgramming, 0.9), (GeneticAlgorithms, 0.75), (GradientDescent, 0.7)]
            }
            ProblemType::LogicalReasoning => {
                &[(Deduction, 0.9), (CaseBasedReasoning, 0.8), (Abduction, 0.7)]
            }
            ProblemType::SequentialDecision => &[(QLearning, 0.85), (PolicyGradients, 0.8)],
            ProblemType::ConstraintSatisfaction => &[
                (ConstraintSatisfaction, 0.95),
                (IntegerProgramming, 0.85),
                (SimulatedAnnealing, 0.7),
            ],
            ProblemType::GeneralReasoning => &[
                (Deduction, 0.8),
                (GradientDescent, 0.7),
                (ConstraintSatisfaction, 0.65),
            ],
            ProblemType::ContinuousOptimization | ProblemType::ComplexSearch => &[],
        };

        let mut ranked: Vec<(TechniqueId, f64)> = table
            .iter()
            .map(|&(technique, confidence)| {
                if complexity == Complexity::High && technique.is_heuristic_search() {
                    (technique, (confidence + 0.1).min(1.0))
                } else {
                    (technique, confidence)
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

fn add_if_absent(strategies: &mut Vec<TechniqueCategory>, strategy: TechniqueCategory) {
    if !strategies.contains(&strategy) {
        strategies.push(strategy);
    }
}

fn domain_strategy(domain: &str) -> Option<TechniqueCategory> {
    match domain.trim().to_lowercase().as_str() {
        "finance" => Some(TechniqueCategory::MathematicalOptimization),
        "healthcare" => Some(TechniqueCategory::LogicalReasoning),
        "robotics" | "control_systems" => Some(TechniqueCategory::ReinforcementLearning),
        _ => None,
    }
}
