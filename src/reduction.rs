//! Bias Reducer
//!
//! Maps identified biases onto reduction methods, appends each method's
//! canonical mitigating step to a copy of the approach, and attaches an
//! audit record with a coverage-based effectiveness estimate.
//!
//! The input approach is never touched; `reduce` returns a new value.

use crate::bias::BiasId;
use crate::types::{Approach, ApproachStep, BiasReductionRecord, ReductionDetail};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A named countermeasure for one or more biases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMethodId {
    CounterfactualReasoning,
    DebiasingTechniques,
    PerspectiveDiversification,
    ProbabilisticReasoning,
    StructuredAnalysis,
}

impl ReductionMethodId {
    pub const ALL: [ReductionMethodId; 5] = [
        ReductionMethodId::CounterfactualReasoning,
        ReductionMethodId::DebiasingTechniques,
        ReductionMethodId::PerspectiveDiversification,
        ReductionMethodId::ProbabilisticReasoning,
        ReductionMethodId::StructuredAnalysis,
    ];

    /// Used when no catalog method targets any identified bias
    pub const DEFAULT: ReductionMethodId = ReductionMethodId::StructuredAnalysis;

    pub fn as_str(&self) -> &'static str {
        match self {
            ReductionMethodId::CounterfactualReasoning => "counterfactual_reasoning",
            ReductionMethodId::DebiasingTechniques => "debiasing_techniques",
            ReductionMethodId::PerspectiveDiversification => "perspective_diversification",
            ReductionMethodId::ProbabilisticReasoning => "probabilistic_reasoning",
            ReductionMethodId::StructuredAnalysis => "structured_analysis",
        }
    }

    /// The step this method contributes to an approach
    pub fn canonical_step(&self) -> ApproachStep {
        match self {
            ReductionMethodId::CounterfactualReasoning => ApproachStep::new(
                "Consider alternative scenarios",
                "Generate and evaluate counterfactual scenarios to challenge assumptions",
            ),
            ReductionMethodId::DebiasingTechniques => ApproachStep::new(
                "Apply debiasing techniques",
                "Explicitly counter cognitive biases in the reasoning process",
            ),
            ReductionMethodId::PerspectiveDiversification => ApproachStep::new(
                "Incorporate diverse perspectives",
                "Consider the problem from multiple stakeholder viewpoints",
            ),
            ReductionMethodId::ProbabilisticReasoning => ApproachStep::new(
                "Apply probabilistic analysis",
                "Quantify uncertainty and update beliefs based on evidence",
            ),
            ReductionMethodId::StructuredAnalysis => ApproachStep::new(
                "Apply structured analytical framework",
                "Use a comprehensive framework to ensure thorough analysis",
            ),
        }
    }

    fn builtin_descriptor(&self) -> MethodDescriptor {
        use BiasId::*;
        let (name, targets, description): (&str, &[BiasId], &str) = match self {
            ReductionMethodId::CounterfactualReasoning => (
                "Counterfactual Reasoning",
                &[ConfirmationBias, HindsightBias],
                "Generates alternative scenarios to challenge assumptions",
            ),
            ReductionMethodId::PerspectiveDiversification => (
                "Perspective Diversification",
                &[AnchoringBias, AuthorityBias, Groupthink],
                "Incorporates diverse viewpoints to broaden reasoning",
            ),
            ReductionMethodId::ProbabilisticReasoning => (
                "Probabilistic Reasoning",
                &[NeglectOfProbability, GamblerFallacy, BaseRateNeglect],
                "Applies Bayesian reasoning to update beliefs with evidence",
            ),
            ReductionMethodId::DebiasingTechniques => (
                "Debiasing Techniques",
                &[AvailabilityBias, RecencyBias, SunkCostFallacy],
                "Explicit techniques to counter specific cognitive biases",
            ),
            ReductionMethodId::StructuredAnalysis => (
                "Structured Analysis",
                &[FramingEffect, BandwagonEffect, StatusQuoBias],
                "Uses frameworks to ensure comprehensive analysis",
            ),
        };
        MethodDescriptor {
            id: *self,
            name: name.to_string(),
            description: description.to_string(),
            target_biases: targets.iter().copied().collect(),
        }
    }
}

impl FromStr for ReductionMethodId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown bias reduction method: {}", s))
    }
}

impl fmt::Display for ReductionMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for a reduction method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub id: ReductionMethodId,
    pub name: String,
    pub description: String,
    pub target_biases: BTreeSet<BiasId>,
}

impl MethodDescriptor {
    pub fn canonical_step(&self) -> ApproachStep {
        self.id.canonical_step()
    }

    /// Identified biases this method addresses
    pub fn targeted(&self, identified: &BTreeSet<BiasId>) -> BTreeSet<BiasId> {
        self.target_biases.intersection(identified).copied().collect()
    }
}

/// Immutable method id -> descriptor mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReductionCatalog {
    methods: BTreeMap<ReductionMethodId, MethodDescriptor>,
}

impl ReductionCatalog {
    pub fn builtin() -> Self {
        Self::from_descriptors(ReductionMethodId::ALL.iter().map(|m| m.builtin_descriptor()))
    }

    /// Later descriptors with the same id replace earlier ones
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        let methods = descriptors.into_iter().map(|d| (d.id, d)).collect();
        Self { methods }
    }

    /// Load descriptors from a JSON array
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<MethodDescriptor> =
            serde_json::from_str(json).context("Invalid bias reduction method catalog")?;
        Ok(Self::from_descriptors(descriptors))
    }

    pub fn get(&self, id: ReductionMethodId) -> Option<&MethodDescriptor> {
        self.methods.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Display name for a method, falling back to its id
    pub fn display_name(&self, id: ReductionMethodId) -> String {
        self.get(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.as_str().to_string())
    }
}

/// Applies bias reduction methods to approaches
#[derive(Debug, Clone)]
pub struct BiasReducer {
    catalog: ReductionCatalog,
}

impl BiasReducer {
    pub fn new(catalog: ReductionCatalog) -> Self {
        tracing::info!("Bias reducer initialized with {} methods", catalog.len());
        Self { catalog }
    }

    pub fn catalog(&self) -> &ReductionCatalog {
        &self.catalog
    }

    /// Every catalog method targeting an identified bias, or the default method
    ///
    /// Empty input selects nothing.
    pub fn select_methods(&self, identified: &BTreeSet<BiasId>) -> BTreeSet<ReductionMethodId> {
        if identified.is_empty() {
            return BTreeSet::new();
        }

        let mut selected: BTreeSet<ReductionMethodId> = self
            .catalog
            .iter()
            .filter(|d| !d.target_biases.is_disjoint(identified))
            .map(|d| d.id)
            .collect();

        if selected.is_empty() {
            selected.insert(ReductionMethodId::DEFAULT);
        }

        tracing::debug!(
            "Selected {} bias reduction methods for {} identified biases",
            selected.len(),
            identified.len()
        );
        selected
    }

    /// Return a copy of `approach` with mitigating steps and an audit record
    pub fn reduce(&self, approach: &Approach, identified: &BTreeSet<BiasId>) -> Approach {
        let methods = self.select_methods(identified);
        let mut steps = approach.steps.clone();
        let mut details = Vec::with_capacity(methods.len());

        for &method in &methods {
            let Some(descriptor) = self.catalog.get(method) else {
                tracing::warn!("Bias reduction method not in catalog: {}", method);
                continue;
            };

            details.push(ReductionDetail {
                method_id: method,
                method: descriptor.name.clone(),
                targeted_biases: descriptor.targeted(identified),
                description: descriptor.description.clone(),
            });
            steps.push(descriptor.canonical_step());
        }

        let reduction_effectiveness = self.estimate_effectiveness(&methods, identified);

        Approach {
            steps,
            bias_reduction: Some(BiasReductionRecord {
                identified_biases: identified.clone(),
                applied_methods: methods,
                reduction_details: details,
                reduction_effectiveness,
            }),
            ..approach.clone()
        }
    }

    /// Coverage-based estimate in [0, 1]
    pub fn estimate_effectiveness(
        &self,
        methods: &BTreeSet<ReductionMethodId>,
        identified: &BTreeSet<BiasId>,
    ) -> f64 {
        if identified.is_empty() {
            return 1.0;
        }
        if methods.is_empty() {
            return 0.0;
        }

        let covered: BTreeSet<BiasId> = methods
            .iter()
            .filter_map(|m| self.catalog.get(*m))
            .flat_map(|d| d.targeted(identified))
            .collect();

        let coverage_ratio = covered.len() as f64 / identified.len() as f64;
        let method_factor = (methods.len() as f64 / 3.0).min(1.0);

        (0.5 + coverage_ratio * 0.3 + method_factor * 0.2).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::fallback_approach;
    use BiasId::*;
    use ReductionMethodId::*;

    fn set(ids: &[BiasId]) -> BTreeSet<BiasId> {
        ids.iter().copied().collect()
    }

    fn reducer() -> BiasReducer {
        BiasReducer::new(ReductionCatalog::builtin())
    }

    #[test]
    fn test_selects_every_targeting_method() {
        let methods = reducer().select_methods(&set(&[
            ConfirmationBias,
            AnchoringBias,
            SunkCostFallacy,
        ]));
        let expected: BTreeSet<_> = [
            CounterfactualReasoning,
            PerspectiveDiversification,
            DebiasingTechniques,
        ]
        .into_iter()
        .collect();
        assert_eq!(methods, expected);
    }

    #[test]
    fn test_untargeted_biases_get_default_method() {
        // Nothing in the built-in catalog targets overconfidence
        let methods = reducer().select_methods(&set(&[OverconfidenceBias]));
        assert_eq!(methods.into_iter().collect::<Vec<_>>(), vec![StructuredAnalysis]);
    }

    #[test]
    fn test_no_biases_is_a_no_op() {
        let approach = fallback_approach();
        let reduced = reducer().reduce(&approach, &BTreeSet::new());

        assert_eq!(reduced.steps, approach.steps);
        let record = reduced.bias_reduction.unwrap();
        assert!(record.applied_methods.is_empty());
        assert!(record.reduction_details.is_empty());
        assert_eq!(record.reduction_effectiveness, 1.0);
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let approach = fallback_approach();
        let before = approach.clone();
        let reduced = reducer().reduce(&approach, &set(&[ConfirmationBias, GamblerFallacy]));

        assert_eq!(approach, before);
        assert_eq!(reduced.steps.len(), approach.steps.len() + 2);
        assert_eq!(reduced.rationale, approach.rationale);
        assert_eq!(reduced.applied_techniques, approach.applied_techniques);
    }

    #[test]
    fn test_canonical_steps_appended_in_method_order() {
        let reduced = reducer().reduce(
            &fallback_approach(),
            &set(&[GamblerFallacy, ConfirmationBias, AnchoringBias]),
        );
        let appended: Vec<&str> = reduced.steps[3..].iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            appended,
            vec![
                "Consider alternative scenarios",
                "Incorporate diverse perspectives",
                "Apply probabilistic analysis",
            ]
        );
    }

    #[test]
    fn test_details_record_intersection_only() {
        let identified = set(&[ConfirmationBias, OverconfidenceBias]);
        let reduced = reducer().reduce(&fallback_approach(), &identified);
        let record = reduced.bias_reduction.unwrap();

        assert_eq!(record.reduction_details.len(), 1);
        let detail = &record.reduction_details[0];
        assert_eq!(detail.method, "Counterfactual Reasoning");
        assert_eq!(detail.method_id, CounterfactualReasoning);
        // hindsight_bias is a target but was not identified
        assert_eq!(detail.targeted_biases, set(&[ConfirmationBias]));
        assert_eq!(record.identified_biases, identified);
    }

    #[test]
    fn test_effectiveness_formula() {
        let r = reducer();
        // optimization defaults + confirmation + overconfidence
        let identified = set(&[
            AnchoringBias,
            SunkCostFallacy,
            AvailabilityBias,
            ConfirmationBias,
            OverconfidenceBias,
        ]);
        let methods = r.select_methods(&identified);
        assert_eq!(methods.len(), 3);

        // 4 of 5 covered, 3 methods: 0.5 + 0.3 * 0.8 + 0.2 * 1.0
        let eff = r.estimate_effectiveness(&methods, &identified);
        assert!((eff - 0.94).abs() < 1e-9, "got {}", eff);
    }

    #[test]
    fn test_effectiveness_edge_cases() {
        let r = reducer();
        assert_eq!(r.estimate_effectiveness(&BTreeSet::new(), &BTreeSet::new()), 1.0);
        assert_eq!(
            r.estimate_effectiveness(&BTreeSet::new(), &set(&[ConfirmationBias])),
            0.0
        );

        // Default method covering nothing: 0.5 + 0 + 0.2 / 3
        let identified = set(&[OverconfidenceBias]);
        let eff = r.estimate_effectiveness(&r.select_methods(&identified), &identified);
        assert!((eff - (0.5 + 0.2 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_effectiveness_bounded_for_all_single_biases() {
        let r = reducer();
        for bias in BiasId::ALL {
            let identified = set(&[bias]);
            let reduced = r.reduce(&fallback_approach(), &identified);
            let record = reduced.bias_reduction.unwrap();
            assert!(!record.applied_methods.is_empty());
            assert!((0.0..=1.0).contains(&record.reduction_effectiveness));
        }

        let all: BTreeSet<BiasId> = BiasId::ALL.into_iter().collect();
        let record = r.reduce(&fallback_approach(), &all).bias_reduction.unwrap();
        assert_eq!(record.applied_methods.len(), 5);
        assert!(record.reduction_effectiveness <= 1.0);
    }

    #[test]
    fn test_default_method_missing_from_catalog() {
        // Minimal catalog: only counterfactual reasoning
        let catalog = ReductionCatalog::from_descriptors([CounterfactualReasoning.builtin_descriptor()]);
        let r = BiasReducer::new(catalog);

        let identified = set(&[SunkCostFallacy]);
        let reduced = r.reduce(&fallback_approach(), &identified);
        let record = reduced.bias_reduction.unwrap();

        assert_eq!(
            record.applied_methods.into_iter().collect::<Vec<_>>(),
            vec![StructuredAnalysis]
        );
        assert!(record.reduction_details.is_empty());
        assert_eq!(reduced.steps.len(), 3);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[
            {
                "id": "probabilistic_reasoning",
                "name": "Bayesian Check",
                "description": "Update on evidence",
                "target_biases": ["overconfidence_bias"]
            }
        ]"#;
        let catalog = ReductionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.display_name(ProbabilisticReasoning), "Bayesian Check");
        assert_eq!(catalog.display_name(StructuredAnalysis), "structured_analysis");

        let r = BiasReducer::new(catalog);
        let reduced = r.reduce(&fallback_approach(), &set(&[OverconfidenceBias]));
        assert_eq!(
            reduced.steps.last().unwrap().name,
            "Apply probabilistic analysis"
        );

        assert!(ReductionCatalog::from_json(r#"[{"id": "prayer"}]"#).is_err());
    }

    #[test]
    fn test_method_ids_parse() {
        for m in ReductionMethodId::ALL {
            assert_eq!(m.as_str().parse::<ReductionMethodId>().unwrap(), m);
        }
        assert!("groupthink_prevention".parse::<ReductionMethodId>().is_err());
    }
}
