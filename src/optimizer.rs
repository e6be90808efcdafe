//! Reasoning Optimizer
//!
//! Runs the full stage for one problem:
//!
//! 1. Select strategies for the problem type, complexity and domain
//! 2. Pick techniques (ranked recommendations, capped by config)
//! 3. Synthesize one approach from the techniques
//! 4. Identify likely biases and reduce them
//! 5. Evaluate the result and derive recommendations
//!
//! Every stage is a pure function of its inputs and the two read-only
//! catalogs, so one optimizer can serve many threads behind an `Arc`.

use crate::bias::BiasAnalyzer;
use crate::config::OptimizerConfig;
use crate::evaluator::SolutionEvaluator;
use crate::reduction::{BiasReducer, ReductionCatalog};
use crate::strategy::{strategy_selection_confidence, SelectedStrategy, StrategySelector};
use crate::synthesis::TechniqueSynthesizer;
use crate::techniques::{TechniqueCatalog, TechniqueCategory, TechniqueId};
use crate::types::{Approach, Complexity, EvaluationResult, ProblemDescriptor, ProblemType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// What a refinement request asks to improve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RefinementFocus {
    BiasReduction,
    Efficiency,
    OptimizationTechnique,
    StrategySelection,
    GeneralImprovement,
}

/// Keyword scan of a free-text refinement request
pub fn parse_refinement_focus(request: &str) -> Vec<RefinementFocus> {
    let text = request.to_lowercase();
    let mut focus = Vec::new();

    if text.contains("bias") {
        focus.push(RefinementFocus::BiasReduction);
    }
    if text.contains("efficien") {
        focus.push(RefinementFocus::Efficiency);
    }
    if text.contains("optim") {
        focus.push(RefinementFocus::OptimizationTechnique);
    }
    if text.contains("strateg") {
        focus.push(RefinementFocus::StrategySelection);
    }
    if focus.is_empty() {
        focus.push(RefinementFocus::GeneralImprovement);
    }

    focus
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub processing_time_ms: u64,
    pub strategy_selection_confidence: f64,
    /// 0 for a first pass, +1 per refinement
    pub refinement_iteration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinement_focus: Vec<RefinementFocus>,
    /// Mean metric delta against the previous pass (refinements only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_score: Option<f64>,
}

/// Everything one optimization pass produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub problem_type: ProblemType,
    pub complexity: Complexity,
    pub approach: Approach,
    pub evaluation: EvaluationResult,
    pub recommendations: Vec<String>,
    /// Strategy display names, highest confidence first
    pub applied_strategies: Vec<String>,
    /// Reduction method display names, canonical order
    pub bias_reduction_methods: Vec<String>,
    pub confidence_score: f64,
    /// SHA-256 of the serialized approach
    pub fingerprint: String,
    pub metadata: ReportMetadata,
}

/// Result confidence, weighted differently from overall quality
pub fn confidence_score(evaluation: &EvaluationResult) -> f64 {
    let confidence = 0.4 * evaluation.validity_score
        + 0.2 * evaluation.efficiency_score
        + 0.3 * evaluation.robustness_score
        + 0.1 * (1.0 - evaluation.bias_score);
    confidence.clamp(0.0, 1.0)
}

/// Mean improvement across the four scores and inverted bias, in [-1, 1]
pub fn improvement_score(current: &EvaluationResult, previous: &EvaluationResult) -> f64 {
    let deltas = [
        current.validity_score - previous.validity_score,
        current.efficiency_score - previous.efficiency_score,
        current.robustness_score - previous.robustness_score,
        current.overall_quality - previous.overall_quality,
        previous.bias_score - current.bias_score,
    ];
    deltas.iter().sum::<f64>() / deltas.len() as f64
}

/// Hex SHA-256 of the approach's JSON form
pub fn fingerprint(approach: &Approach) -> Result<String> {
    let bytes = serde_json::to_vec(approach).context("Failed to serialize approach")?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// The reasoning optimization stage
#[derive(Debug, Clone)]
pub struct ReasoningOptimizer {
    selector: StrategySelector,
    synthesizer: TechniqueSynthesizer,
    analyzer: BiasAnalyzer,
    reducer: BiasReducer,
    evaluator: SolutionEvaluator,
    max_techniques: usize,
}

impl ReasoningOptimizer {
    pub fn new(
        techniques: TechniqueCatalog,
        reduction_methods: ReductionCatalog,
        config: &OptimizerConfig,
    ) -> Self {
        Self {
            selector: StrategySelector::new(),
            synthesizer: TechniqueSynthesizer::new(techniques),
            analyzer: BiasAnalyzer::new(),
            reducer: BiasReducer::new(reduction_methods),
            evaluator: SolutionEvaluator::new(config.scoring_rules.clone()),
            max_techniques: config.max_techniques.max(1),
        }
    }

    /// Built-in techniques, reduction methods per config
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(TechniqueCatalog::builtin(), config.reduction_catalog(), config)
    }

    pub fn with_defaults() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }

    pub fn reducer(&self) -> &BiasReducer {
        &self.reducer
    }

    pub fn synthesizer(&self) -> &TechniqueSynthesizer {
        &self.synthesizer
    }

    /// Techniques `optimize` would apply for this problem
    pub fn plan_techniques(
        &self,
        descriptor: &ProblemDescriptor,
        strategies: &[SelectedStrategy],
    ) -> Vec<TechniqueId> {
        let ranked = self
            .selector
            .ranked_techniques(descriptor.problem_type, descriptor.complexity);

        if ranked.is_empty() {
            return strategies.iter().map(|s| s.strategy.lead_technique()).collect();
        }

        ranked
            .into_iter()
            .take(self.max_techniques)
            .map(|(technique, _)| technique)
            .collect()
    }

    pub fn optimize(&self, descriptor: &ProblemDescriptor, domain: Option<&str>) -> OptimizationReport {
        let started = Instant::now();
        let strategies =
            self.selector
                .select_strategies(descriptor.problem_type, descriptor.complexity, domain);
        let techniques = self.plan_techniques(descriptor, &strategies);

        self.run(descriptor, &strategies, &techniques, started)
    }

    /// Same pipeline on caller-chosen techniques; unknown ids are skipped
    pub fn optimize_with<S: AsRef<str>>(
        &self,
        descriptor: &ProblemDescriptor,
        technique_ids: &[S],
    ) -> OptimizationReport {
        let started = Instant::now();
        let techniques: Vec<TechniqueId> = technique_ids
            .iter()
            .filter_map(|raw| match raw.as_ref().parse::<TechniqueId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!("Requested technique not available: {}", e);
                    None
                }
            })
            .collect();

        let mut categories = Vec::new();
        for category in techniques.iter().map(|t| t.category()) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        let strategies = self.rank(categories, descriptor);

        self.run(descriptor, &strategies, &techniques, started)
    }

    /// Re-run the pipeline steered by a free-text request
    pub fn refine(
        &self,
        descriptor: &ProblemDescriptor,
        previous: &OptimizationReport,
        request: &str,
    ) -> OptimizationReport {
        let started = Instant::now();
        let focus = parse_refinement_focus(request);

        let previous_strategies: BTreeSet<TechniqueCategory> = previous
            .applied_strategies
            .iter()
            .filter_map(|name| TechniqueCategory::from_display_name(name))
            .collect();
        let adjusted = adjust_strategies(descriptor.problem_type, &focus, &previous_strategies);

        // Previous techniques first, then one per newly added strategy
        let mut techniques: Vec<TechniqueId> = previous
            .approach
            .applied_techniques
            .iter()
            .filter_map(|t| t.parse().ok())
            .collect();
        for added in adjusted.difference(&previous_strategies) {
            push_unique(&mut techniques, added.lead_technique());
        }

        if focus.contains(&RefinementFocus::OptimizationTechnique) {
            let next = self
                .selector
                .ranked_techniques(descriptor.problem_type, descriptor.complexity)
                .into_iter()
                .map(|(t, _)| t)
                .find(|t| !techniques.contains(t));
            if let Some(next) = next {
                techniques.push(next);
            }
        }

        if techniques.is_empty() {
            techniques = adjusted.iter().map(|s| s.lead_technique()).collect();
        }

        let strategies = self.rank(adjusted.into_iter().collect(), descriptor);
        let mut report = self.run(descriptor, &strategies, &techniques, started);

        report.metadata.refinement_iteration = previous.metadata.refinement_iteration + 1;
        report.metadata.improvement_score =
            Some(improvement_score(&report.evaluation, &previous.evaluation));
        report.metadata.refinement_focus = focus;

        tracing::info!(
            "Refinement {} for report {}: improvement {:.3}",
            report.metadata.refinement_iteration,
            previous.id,
            report.metadata.improvement_score.unwrap_or_default()
        );
        report
    }

    fn rank(
        &self,
        categories: Vec<TechniqueCategory>,
        descriptor: &ProblemDescriptor,
    ) -> Vec<SelectedStrategy> {
        let mut strategies: Vec<SelectedStrategy> = categories
            .into_iter()
            .map(|strategy| SelectedStrategy {
                strategy,
                confidence: self.selector.confidence(
                    strategy,
                    descriptor.problem_type,
                    descriptor.complexity,
                ),
            })
            .collect();
        strategies.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        strategies
    }

    fn run(
        &self,
        descriptor: &ProblemDescriptor,
        strategies: &[SelectedStrategy],
        techniques: &[TechniqueId],
        started: Instant,
    ) -> OptimizationReport {
        let synthesized = self.synthesizer.apply_ids(&descriptor.payload, techniques);
        let biases = self.analyzer.identify(&synthesized, descriptor.problem_type);
        let approach = self.reducer.reduce(&synthesized, &biases);

        let evaluation =
            self.evaluator
                .evaluate(&approach, descriptor.problem_type, descriptor.complexity);
        let recommendations = self.evaluator.recommend(&evaluation);

        let bias_reduction_methods = approach
            .bias_reduction
            .iter()
            .flat_map(|r| r.applied_methods.iter())
            .map(|m| self.reducer.catalog().display_name(*m))
            .collect();

        let fingerprint = fingerprint(&approach).unwrap_or_else(|e| {
            tracing::warn!("Could not fingerprint approach: {:#}", e);
            String::new()
        });

        let report = OptimizationReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            problem_type: descriptor.problem_type,
            complexity: descriptor.complexity,
            recommendations,
            applied_strategies: strategies.iter().map(|s| s.name().to_string()).collect(),
            bias_reduction_methods,
            confidence_score: confidence_score(&evaluation),
            fingerprint,
            evaluation,
            approach,
            metadata: ReportMetadata {
                processing_time_ms: started.elapsed().as_millis() as u64,
                strategy_selection_confidence: strategy_selection_confidence(strategies.len()),
                ..Default::default()
            },
        };

        tracing::info!(
            "Optimized {} problem with {} techniques: quality {:.2}, confidence {:.2}",
            report.problem_type,
            report.approach.applied_techniques.len(),
            report.evaluation.overall_quality,
            report.confidence_score
        );
        report
    }
}

fn push_unique(techniques: &mut Vec<TechniqueId>, technique: TechniqueId) {
    if !techniques.contains(&technique) {
        techniques.push(technique);
    }
}

fn adjust_strategies(
    problem_type: ProblemType,
    focus: &[RefinementFocus],
    previous: &BTreeSet<TechniqueCategory>,
) -> BTreeSet<TechniqueCategory> {
    use TechniqueCategory::*;
    let mut adjusted = previous.clone();

    if focus.contains(&RefinementFocus::StrategySelection) {
        if previous.contains(&MathematicalOptimization) {
            adjusted.insert(HeuristicOptimization);
        } else if previous.contains(&HeuristicOptimization) {
            adjusted.insert(MathematicalOptimization);
        }
        if problem_type == ProblemType::GeneralReasoning {
            adjusted.insert(LogicalReasoning);
        }
    }

    if focus.contains(&RefinementFocus::BiasReduction) {
        adjusted.insert(LogicalReasoning);
    }

    adjusted
}

/// Optimize many problems concurrently on one shared optimizer
///
/// One result per descriptor, in input order. A task that dies is reported
/// in its own slot; the rest of the batch still comes back.
pub async fn run_batch(
    optimizer: Arc<ReasoningOptimizer>,
    descriptors: Vec<ProblemDescriptor>,
    domain: Option<String>,
) -> Vec<Result<OptimizationReport>> {
    tracing::info!("Running batch of {} problems", descriptors.len());

    let handles: Vec<_> = descriptors
        .into_iter()
        .map(|descriptor| {
            let optimizer = Arc::clone(&optimizer);
            let domain = domain.clone();
            tokio::task::spawn_blocking(move || optimizer.optimize(&descriptor, domain.as_deref()))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle
            .await
            .with_context(|| format!("Batch task {} failed", i));
        if let Err(e) = &result {
            tracing::error!("{:#}", e);
        }
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::ReductionMethodId;
    use crate::synthesis::FALLBACK_TECHNIQUE;
    use crate::types::{ApproachFragment, Payload};

    fn descriptor(problem_type: ProblemType, complexity: Complexity) -> ProblemDescriptor {
        ProblemDescriptor::new(problem_type, complexity)
    }

    #[test]
    fn test_optimize_uses_top_ranked_techniques() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let report =
            optimizer.optimize(&descriptor(ProblemType::Optimization, Complexity::Low), None);

        assert_eq!(
            report.approach.applied_techniques,
            vec!["linear_programming".to_string(), "genetic_algorithms".to_string()]
        );
        assert_eq!(
            report.approach.rationale,
            "Integrated approach combining linear_programming and genetic_algorithms"
        );
        assert_eq!(
            report.applied_strategies,
            vec!["Mathematical Optimization", "Heuristic Optimization"]
        );
        assert!((report.metadata.strategy_selection_confidence - 0.85).abs() < 1e-9);
        assert_eq!(report.metadata.refinement_iteration, 0);
        assert!(report.metadata.improvement_score.is_none());
    }

    #[test]
    fn test_report_is_consistent() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let report = optimizer.optimize(
            &descriptor(ProblemType::LogicalReasoning, Complexity::High),
            Some("healthcare"),
        );

        let record = report.approach.bias_reduction.as_ref().unwrap();
        assert!(!record.identified_biases.is_empty());
        assert!(!record.applied_methods.is_empty());
        assert_eq!(report.bias_reduction_methods.len(), record.applied_methods.len());
        assert!((0.0..=1.0).contains(&report.confidence_score));
        assert!((report.confidence_score - confidence_score(&report.evaluation)).abs() < 1e-12);

        assert_eq!(report.fingerprint.len(), 64);
        assert_eq!(report.fingerprint, fingerprint(&report.approach).unwrap());
        assert!(Uuid::parse_str(&report.id).is_ok());

        // Reduction steps follow the synthesized ones
        let last = report.approach.steps.last().unwrap();
        let last_method = *record.applied_methods.iter().last().unwrap();
        assert_eq!(*last, last_method.canonical_step());
    }

    #[test]
    fn test_unranked_type_uses_strategy_leads() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let report = optimizer.optimize(
            &descriptor(ProblemType::ContinuousOptimization, Complexity::High),
            None,
        );
        // logical (0.6) + heuristic for high complexity (0.7)
        assert_eq!(
            report.approach.applied_techniques,
            vec!["genetic_algorithms".to_string(), "deduction".to_string()]
        );
    }

    #[test]
    fn test_max_techniques_from_config() {
        let config = OptimizerConfig {
            max_techniques: 1,
            ..Default::default()
        };
        let optimizer = ReasoningOptimizer::from_config(&config);
        let report = optimizer.optimize(
            &descriptor(ProblemType::ConstraintSatisfaction, Complexity::Medium),
            None,
        );
        assert_eq!(
            report.approach.applied_techniques,
            vec!["constraint_satisfaction".to_string()]
        );
    }

    #[test]
    fn test_optimize_with_unknown_ids_falls_back() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let report = optimizer.optimize_with(
            &descriptor(ProblemType::GeneralReasoning, Complexity::Medium),
            &["monte_carlo_tree_search"],
        );

        assert_eq!(
            report.approach.applied_techniques,
            vec![FALLBACK_TECHNIQUE.to_string()]
        );
        // 3 fallback steps + reduction steps
        assert_eq!(report.approach.steps[0].name, "Problem analysis");
        assert!(report.applied_strategies.is_empty());
        assert_eq!(report.metadata.strategy_selection_confidence, 0.0);
    }

    #[test]
    fn test_optimize_with_derives_strategies() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let report = optimizer.optimize_with(
            &descriptor(ProblemType::LogicalReasoning, Complexity::Medium),
            &["abduction", "q_learning", "deduction"],
        );
        assert_eq!(
            report.applied_strategies,
            vec!["Logical Reasoning", "Reinforcement Learning"]
        );
        assert_eq!(report.approach.applied_techniques.len(), 3);
    }

    #[test]
    fn test_failing_techniques_do_not_fail_the_stage() {
        let catalog = TechniqueCatalog::builtin().with(
            TechniqueId::LinearProgramming,
            |_: &Payload| -> Result<Option<ApproachFragment>> { anyhow::bail!("solver missing") },
        );
        let config = OptimizerConfig::default();
        let optimizer =
            ReasoningOptimizer::new(catalog, ReductionCatalog::builtin(), &config);

        let report =
            optimizer.optimize(&descriptor(ProblemType::Optimization, Complexity::Medium), None);
        assert_eq!(
            report.approach.applied_techniques,
            vec!["genetic_algorithms".to_string()]
        );
    }

    #[test]
    fn test_minimal_reduction_catalog() {
        let config = OptimizerConfig::default();
        let optimizer =
            ReasoningOptimizer::new(TechniqueCatalog::builtin(), ReductionCatalog::default(), &config);
        let report =
            optimizer.optimize(&descriptor(ProblemType::Optimization, Complexity::Low), None);

        let record = report.approach.bias_reduction.as_ref().unwrap();
        assert_eq!(
            record.applied_methods,
            [ReductionMethodId::StructuredAnalysis].into_iter().collect()
        );
        assert!(record.reduction_details.is_empty());
        assert_eq!(report.bias_reduction_methods, vec!["structured_analysis"]);
    }

    #[test]
    fn test_parse_refinement_focus() {
        use RefinementFocus::*;
        assert_eq!(parse_refinement_focus("Please reduce BIAS"), vec![BiasReduction]);
        assert_eq!(
            parse_refinement_focus("more efficient optimization strategy"),
            vec![Efficiency, OptimizationTechnique, StrategySelection]
        );
        assert_eq!(parse_refinement_focus("make it better"), vec![GeneralImprovement]);
        assert_eq!(parse_refinement_focus(""), vec![GeneralImprovement]);
    }

    #[test]
    fn test_refine_for_bias_adds_logical_strategy() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let d = descriptor(ProblemType::Optimization, Complexity::Low);
        let first = optimizer.optimize(&d, None);
        let refined = optimizer.refine(&d, &first, "reduce bias please");

        assert!(refined
            .applied_strategies
            .contains(&"Logical Reasoning".to_string()));
        assert_eq!(
            refined.approach.applied_techniques,
            vec![
                "linear_programming".to_string(),
                "genetic_algorithms".to_string(),
                "deduction".to_string()
            ]
        );
        assert_eq!(refined.metadata.refinement_iteration, 1);
        assert_eq!(
            refined.metadata.refinement_focus,
            vec![RefinementFocus::BiasReduction]
        );
        assert_eq!(
            refined.metadata.improvement_score,
            Some(improvement_score(&refined.evaluation, &first.evaluation))
        );

        let again = optimizer.refine(&d, &refined, "anything else");
        assert_eq!(again.metadata.refinement_iteration, 2);
        assert_eq!(again.applied_strategies.len(), refined.applied_strategies.len());
    }

    #[test]
    fn test_refine_optimization_technique_adds_next_ranked() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let d = descriptor(ProblemType::Optimization, Complexity::Medium);
        let first = optimizer.optimize(&d, None);
        let refined = optimizer.refine(&d, &first, "optimize harder");

        assert_eq!(
            refined.approach.applied_techniques.last().map(String::as_str),
            Some("gradient_descent")
        );
    }

    #[test]
    fn test_refine_strategy_selection_swaps_in_heuristic() {
        let optimizer = ReasoningOptimizer::with_defaults();
        let d = descriptor(ProblemType::SequentialDecision, Complexity::Low);
        let first = optimizer.optimize(&d, Some("finance"));
        assert!(first
            .applied_strategies
            .contains(&"Mathematical Optimization".to_string()));

        let refined = optimizer.refine(&d, &first, "try another strategy");
        assert!(refined
            .applied_strategies
            .contains(&"Heuristic Optimization".to_string()));
        assert!(refined
            .approach
            .applied_techniques
            .contains(&"genetic_algorithms".to_string()));
    }

    #[test]
    fn test_adjust_strategies() {
        use TechniqueCategory::*;
        let prev: BTreeSet<_> = [HeuristicOptimization].into_iter().collect();

        let adjusted = adjust_strategies(
            ProblemType::GeneralReasoning,
            &[RefinementFocus::StrategySelection],
            &prev,
        );
        assert_eq!(
            adjusted,
            [MathematicalOptimization, HeuristicOptimization, LogicalReasoning]
                .into_iter()
                .collect()
        );

        let untouched = adjust_strategies(
            ProblemType::Optimization,
            &[RefinementFocus::Efficiency],
            &prev,
        );
        assert_eq!(untouched, prev);
    }

    #[test]
    fn test_improvement_score() {
        let prev = EvaluationResult {
            validity_score: 0.7,
            efficiency_score: 0.8,
            robustness_score: 0.6,
            bias_score: 0.3,
            overall_quality: 0.7,
        };
        let better = EvaluationResult {
            validity_score: 0.8,
            efficiency_score: 0.8,
            robustness_score: 0.7,
            bias_score: 0.2,
            overall_quality: 0.8,
        };
        assert!((improvement_score(&better, &prev) - 0.08).abs() < 1e-9);
        assert!((improvement_score(&prev, &better) + 0.08).abs() < 1e-9);
        assert_eq!(improvement_score(&prev, &prev), 0.0);
    }

    #[test]
    fn test_confidence_score_weights() {
        let e = EvaluationResult {
            validity_score: 1.0,
            efficiency_score: 1.0,
            robustness_score: 1.0,
            bias_score: 0.05,
            overall_quality: 1.0,
        };
        assert!((confidence_score(&e) - 0.995).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes() {
        let report = ReasoningOptimizer::with_defaults()
            .optimize(&descriptor(ProblemType::Optimization, Complexity::Low), None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["problem_type"], "optimization");
        assert_eq!(json["complexity"], "low");
        assert!(json["metadata"].get("refinement_focus").is_none());
        assert!(json["approach"]["bias_reduction"]["applied_methods"].is_array());

        let back: OptimizationReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.fingerprint, report.fingerprint);
    }

    #[test]
    fn test_recommendations_come_from_evaluation() {
        let report = ReasoningOptimizer::with_defaults()
            .optimize(&descriptor(ProblemType::GeneralReasoning, Complexity::Medium), None);
        let expected = crate::evaluator::recommendations(&report.evaluation);
        assert_eq!(report.recommendations, expected);
    }

    #[test]
    fn test_run_batch_keeps_input_order() {
        let optimizer = Arc::new(ReasoningOptimizer::with_defaults());
        let inputs = vec![
            descriptor(ProblemType::SequentialDecision, Complexity::Low),
            descriptor(ProblemType::Optimization, Complexity::High),
            descriptor(ProblemType::LogicalReasoning, Complexity::Medium),
            descriptor(ProblemType::ConstraintSatisfaction, Complexity::Unspecified),
        ];
        let expected: Vec<ProblemType> = inputs.iter().map(|d| d.problem_type).collect();

        let reports =
            tokio_test::block_on(run_batch(Arc::clone(&optimizer), inputs, None))
                .into_iter()
                .collect::<Result<Vec<_>>>()
                .unwrap();

        let got: Vec<ProblemType> = reports.iter().map(|r| r.problem_type).collect();
        assert_eq!(got, expected);

        // Same input, same approach, whichever thread ran it
        let direct = optimizer.optimize(
            &descriptor(ProblemType::Optimization, Complexity::High),
            None,
        );
        assert_eq!(reports[1].fingerprint, direct.fingerprint);
        assert_ne!(reports[1].id, direct.id);
    }

    #[test]
    fn test_run_batch_survives_panicking_technique() {
        let catalog = TechniqueCatalog::builtin().with(
            TechniqueId::QLearning,
            |p: &Payload| -> Result<Option<ApproachFragment>> {
                let episodes = p["episodes"].as_u64().unwrap_or(0);
                Ok(Some(ApproachFragment {
                    steps: vec![],
                    rationale: format!("{} episodes", episodes),
                    implementation_guide: String::new(),
                    complexity: "O(1)".to_string(),
                }))
            },
        );
        let optimizer = Arc::new(ReasoningOptimizer::new(
            catalog,
            ReductionCatalog::builtin(),
            &OptimizerConfig::default(),
        ));
        let inputs = vec![
            descriptor(ProblemType::Optimization, Complexity::Low),
            descriptor(ProblemType::SequentialDecision, Complexity::Low),
        ];

        let results = tokio_test::block_on(run_batch(optimizer, inputs, None));
        assert_eq!(results.len(), 2);

        let first = results[0].as_ref().unwrap();
        assert_eq!(
            first.approach.applied_techniques,
            vec!["linear_programming".to_string(), "genetic_algorithms".to_string()]
        );
        let second = results[1].as_ref().unwrap();
        assert_eq!(
            second.approach.applied_techniques,
            vec!["policy_gradients".to_string()]
        );
    }

    #[test]
    fn test_negative_scoring_rules_keep_report_in_range() {
        let config: OptimizerConfig = serde_json::from_value(serde_json::json!({
            "scoring_rules": {
                "validity": {
                    "optimization": { "keywords": ["constraint", "objective"], "bonus_per_keyword": -2.0 }
                },
                "efficiency": { "keywords": ["efficient", "reduce"], "bonus_per_keyword": -1.0 },
                "robustness": { "keywords": ["validate", "check"], "bonus_per_keyword": -1.0 },
                "validation": { "marker": "validat", "bonus": -1.0 }
            }
        }))
        .unwrap();
        let optimizer = ReasoningOptimizer::from_config(&config);

        for problem_type in [
            ProblemType::Optimization,
            ProblemType::SequentialDecision,
            ProblemType::LogicalReasoning,
            ProblemType::GeneralReasoning,
        ] {
            let report = optimizer.optimize(&descriptor(problem_type, Complexity::Medium), None);
            let e = &report.evaluation;
            for score in [
                e.validity_score,
                e.efficiency_score,
                e.robustness_score,
                e.bias_score,
                e.overall_quality,
                report.confidence_score,
            ] {
                assert!((0.0..=1.0).contains(&score), "{} out of range", score);
            }
        }
    }

    #[test]
    fn test_run_batch_empty() {
        let optimizer = Arc::new(ReasoningOptimizer::with_defaults());
        let reports = tokio_test::block_on(run_batch(optimizer, vec![], None));
        assert!(reports.is_empty());
    }
}
