//! Core data model for the reasoning optimization stage
//!
//! Data flows one way through these types:
//! - `ProblemDescriptor` comes in from the preceding pipeline stage
//! - `Approach` is built by synthesis and replaced (never edited) by bias reduction
//! - `EvaluationResult` is the terminal scoring of the final approach

use crate::bias::BiasId;
use crate::reduction::ReductionMethodId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Opaque problem data handed to technique transformations
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Kind of problem being reasoned about
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Optimization,
    LogicalReasoning,
    SequentialDecision,
    ConstraintSatisfaction,
    #[default]
    GeneralReasoning,
    ContinuousOptimization,
    ComplexSearch,
}

impl ProblemType {
    pub const ALL: [ProblemType; 7] = [
        ProblemType::Optimization,
        ProblemType::LogicalReasoning,
        ProblemType::SequentialDecision,
        ProblemType::ConstraintSatisfaction,
        ProblemType::GeneralReasoning,
        ProblemType::ContinuousOptimization,
        ProblemType::ComplexSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Optimization => "optimization",
            ProblemType::LogicalReasoning => "logical_reasoning",
            ProblemType::SequentialDecision => "sequential_decision",
            ProblemType::ConstraintSatisfaction => "constraint_satisfaction",
            ProblemType::GeneralReasoning => "general_reasoning",
            ProblemType::ContinuousOptimization => "continuous_optimization",
            ProblemType::ComplexSearch => "complex_search",
        }
    }
}

impl FromStr for ProblemType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown problem type: {}", s))
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem complexity tier
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
    /// Missing or unrecognized - scored like low, never like high
    #[default]
    Unspecified,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
            Complexity::Unspecified => "unspecified",
        }
    }
}

impl FromStr for Complexity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            "unspecified" => Ok(Complexity::Unspecified),
            other => anyhow::bail!("Unknown complexity: {}", other),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input from the preceding pipeline stage
///
/// Deserialization never fails on a bad `problem_type` or `complexity`:
/// unknown or missing values fall back to `general_reasoning` / `unspecified`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemDescriptor {
    #[serde(default, deserialize_with = "deserialize_problem_type")]
    pub problem_type: ProblemType,
    #[serde(default, deserialize_with = "deserialize_complexity")]
    pub complexity: Complexity,
    #[serde(default)]
    pub payload: Payload,
}

impl ProblemDescriptor {
    pub fn new(problem_type: ProblemType, complexity: Complexity) -> Self {
        Self {
            problem_type,
            complexity,
            payload: Payload::new(),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

fn deserialize_problem_type<'de, D>(deserializer: D) -> Result<ProblemType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let parsed = raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<ProblemType>().ok());

    Ok(match parsed {
        Some(t) => t,
        None => {
            tracing::debug!("Unrecognized problem_type {:?}, using general_reasoning", raw);
            ProblemType::GeneralReasoning
        }
    })
}

fn deserialize_complexity<'de, D>(deserializer: D) -> Result<Complexity, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Complexity>().ok())
        .unwrap_or_default())
}

/// One named step of an approach
///
/// Steps with the same name are duplicates regardless of description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachStep {
    pub name: String,
    pub description: String,
}

impl ApproachStep {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Name and description, lower-cased, for keyword scans
    ///
    /// Joined by a newline so no keyword matches across the two fields.
    pub fn text_lower(&self) -> String {
        format!("{}\n{}", self.name, self.description).to_lowercase()
    }
}

/// What a single technique contributes before synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachFragment {
    pub steps: Vec<ApproachStep>,
    pub rationale: String,
    pub implementation_guide: String,
    /// Asymptotic cost note, informational only
    pub complexity: String,
}

/// A reasoning approach: ordered steps plus rationale and audit metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    pub steps: Vec<ApproachStep>,
    pub rationale: String,
    pub implementation_guide: String,
    /// Technique ids in application order, no repeats
    pub applied_techniques: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_reduction: Option<BiasReductionRecord>,
}

impl Approach {
    pub fn step_names_lower(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.to_lowercase()).collect()
    }

    /// Identified biases from the reduction record, empty if never reduced
    pub fn identified_biases(&self) -> BTreeSet<BiasId> {
        self.bias_reduction
            .as_ref()
            .map(|r| r.identified_biases.clone())
            .unwrap_or_default()
    }
}

/// Audit trail of a bias reduction pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReductionRecord {
    pub identified_biases: BTreeSet<BiasId>,
    pub applied_methods: BTreeSet<ReductionMethodId>,
    pub reduction_details: Vec<ReductionDetail>,
    /// Coverage estimate in [0, 1]
    pub reduction_effectiveness: f64,
}

/// One applied method and the identified biases it targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionDetail {
    pub method_id: ReductionMethodId,
    pub method: String,
    pub targeted_biases: BTreeSet<BiasId>,
    pub description: String,
}

/// Multi-criteria score of a final approach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub validity_score: f64,
    pub efficiency_score: f64,
    pub robustness_score: f64,
    /// Lower is better
    pub bias_score: f64,
    pub overall_quality: f64,
}
