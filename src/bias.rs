//! Bias Analyzer
//!
//! Derives plausible cognitive biases for an approach from two sources:
//! 1. A fixed per-problem-type table of typical biases
//! 2. Structural gaps in the approach's step names (too few steps, no
//!    alternatives considered, no treatment of uncertainty)
//!
//! Results are `BTreeSet`s: duplicates vanish and iteration order is
//! lexicographic by identifier, so downstream audit trails are reproducible.

use crate::types::{Approach, ProblemType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named cognitive-bias risk pattern
///
/// Variants are declared in identifier order; `Ord` follows it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BiasId {
    AnchoringBias,
    AuthorityBias,
    AvailabilityBias,
    BandwagonEffect,
    BaseRateNeglect,
    BeliefBias,
    ConfirmationBias,
    FramingEffect,
    GamblerFallacy,
    Groupthink,
    HindsightBias,
    HotHandFallacy,
    NeglectOfProbability,
    OverconfidenceBias,
    RecencyBias,
    StatusQuoBias,
    SunkCostFallacy,
}

impl BiasId {
    pub const ALL: [BiasId; 17] = [
        BiasId::AnchoringBias,
        BiasId::AuthorityBias,
        BiasId::AvailabilityBias,
        BiasId::BandwagonEffect,
        BiasId::BaseRateNeglect,
        BiasId::BeliefBias,
        BiasId::ConfirmationBias,
        BiasId::FramingEffect,
        BiasId::GamblerFallacy,
        BiasId::Groupthink,
        BiasId::HindsightBias,
        BiasId::HotHandFallacy,
        BiasId::NeglectOfProbability,
        BiasId::OverconfidenceBias,
        BiasId::RecencyBias,
        BiasId::StatusQuoBias,
        BiasId::SunkCostFallacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BiasId::AnchoringBias => "anchoring_bias",
            BiasId::AuthorityBias => "authority_bias",
            BiasId::AvailabilityBias => "availability_bias",
            BiasId::BandwagonEffect => "bandwagon_effect",
            BiasId::BaseRateNeglect => "base_rate_neglect",
            BiasId::BeliefBias => "belief_bias",
            BiasId::ConfirmationBias => "confirmation_bias",
            BiasId::FramingEffect => "framing_effect",
            BiasId::GamblerFallacy => "gambler_fallacy",
            BiasId::Groupthink => "groupthink",
            BiasId::HindsightBias => "hindsight_bias",
            BiasId::HotHandFallacy => "hot_hand_fallacy",
            BiasId::NeglectOfProbability => "neglect_of_probability",
            BiasId::OverconfidenceBias => "overconfidence_bias",
            BiasId::RecencyBias => "recency_bias",
            BiasId::StatusQuoBias => "status_quo_bias",
            BiasId::SunkCostFallacy => "sunk_cost_fallacy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BiasId::AnchoringBias => "Relying too heavily on the first piece of information encountered (the anchor)",
            BiasId::AuthorityBias => "The tendency to attribute greater accuracy to the opinion of an authority figure",
            BiasId::AvailabilityBias => "Overestimating the likelihood of events based on how easily examples come to mind",
            BiasId::BandwagonEffect => "The tendency to do or believe things because others do or believe them",
            BiasId::BaseRateNeglect => "Ignoring general information in favor of specific information",
            BiasId::BeliefBias => "Evaluating logical strength based on whether the conclusion is believable",
            BiasId::ConfirmationBias => "The tendency to search for, interpret, and recall information that confirms existing beliefs",
            BiasId::FramingEffect => "Drawing different conclusions from the same information presented differently",
            BiasId::GamblerFallacy => "Believing that past events affect the probability of future events in random processes",
            BiasId::Groupthink => "Conforming to group consensus at the expense of critical evaluation",
            BiasId::HindsightBias => "The tendency to perceive past events as having been predictable",
            BiasId::HotHandFallacy => "Believing that a person who has experienced success has a higher chance of success in further attempts",
            BiasId::NeglectOfProbability => "The tendency to disregard probability when making decisions",
            BiasId::OverconfidenceBias => "Excessive confidence in one's own answers to questions",
            BiasId::RecencyBias => "Placing greater importance on recent events than those in the past",
            BiasId::StatusQuoBias => "Preference for the current state of affairs",
            BiasId::SunkCostFallacy => "Continuing a behavior based on previously invested resources",
        }
    }
}

impl FromStr for BiasId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown bias: {}", s))
    }
}

impl fmt::Display for BiasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approaches with fewer steps than this neglect probability
const MIN_STEPS: usize = 3;

/// Typical biases for a problem type, before structural inspection
pub fn default_biases(problem_type: ProblemType) -> BTreeSet<BiasId> {
    use BiasId::*;
    let biases: &[BiasId] = match problem_type {
        ProblemType::Optimization => &[AnchoringBias, SunkCostFallacy, AvailabilityBias],
        ProblemType::LogicalReasoning => &[ConfirmationBias, BeliefBias, FramingEffect],
        ProblemType::SequentialDecision => &[RecencyBias, GamblerFallacy, HotHandFallacy],
        ProblemType::ConstraintSatisfaction => &[AnchoringBias, BaseRateNeglect],
        ProblemType::GeneralReasoning => &[ConfirmationBias, AvailabilityBias, AuthorityBias],
        ProblemType::ContinuousOptimization | ProblemType::ComplexSearch => &[ConfirmationBias],
    };
    biases.iter().copied().collect()
}

/// Identifies likely biases in an approach
#[derive(Debug, Clone, Copy, Default)]
pub struct BiasAnalyzer;

impl BiasAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn identify(&self, approach: &Approach, problem_type: ProblemType) -> BTreeSet<BiasId> {
        let mut biases = default_biases(problem_type);
        let names = approach.step_names_lower();

        if approach.steps.len() < MIN_STEPS {
            biases.insert(BiasId::NeglectOfProbability);
        }

        if !names.iter().any(|n| n.contains("alternative")) {
            biases.insert(BiasId::ConfirmationBias);
        }

        if !names
            .iter()
            .any(|n| n.contains("probability") || n.contains("uncertain"))
        {
            biases.insert(BiasId::OverconfidenceBias);
        }

        tracing::debug!(
            "Identified {} potential biases for {} approach with {} steps",
            biases.len(),
            problem_type,
            approach.steps.len()
        );
        biases
    }
}
