//! Reasoning Optimizer
//!
//! Turns a classified problem into an optimized, bias-reduced reasoning
//! approach and scores it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reasoning_optimizer::{ReasoningOptimizer, ProblemDescriptor, ProblemType, Complexity};
//!
//! let optimizer = ReasoningOptimizer::with_defaults();
//! let descriptor = ProblemDescriptor::new(ProblemType::Optimization, Complexity::Low);
//!
//! let report = optimizer.optimize(&descriptor, Some("finance"));
//! println!("{:.2}", report.evaluation.overall_quality);
//!
//! // Steer a second pass
//! let refined = optimizer.refine(&descriptor, &report, "reduce bias");
//! ```
//!
//! # Architecture
//!
//! ```text
//! ProblemDescriptor
//!        │
//!        ▼
//! ┌──────────────────┐   strategies + ranked techniques
//! │ StrategySelector │──────────────────────────────┐
//! └──────────────────┘                              ▼
//!                                   ┌──────────────────────┐
//!                                   │ TechniqueSynthesizer │ ← TechniqueCatalog
//!                                   └──────────┬───────────┘
//!                                              ▼ Approach
//!                                   ┌──────────────────────┐
//!                                   │ BiasAnalyzer         │
//!                                   └──────────┬───────────┘
//!                                              ▼ biases
//!                                   ┌──────────────────────┐
//!                                   │ BiasReducer          │ ← ReductionCatalog
//!                                   └──────────┬───────────┘
//!                                              ▼ Approach + audit trail
//!                                   ┌──────────────────────┐
//!                                   │ SolutionEvaluator    │ ← ScoringRules
//!                                   └──────────┬───────────┘
//!                                              ▼
//!                                     OptimizationReport
//! ```

pub mod bias;
pub mod config;
pub mod evaluator;
pub mod optimizer;
pub mod reduction;
pub mod strategy;
pub mod synthesis;
pub mod techniques;
pub mod types;

// Core types
pub use types::*;

// Stage components
pub use bias::{BiasAnalyzer, BiasId};
pub use evaluator::{KeywordRule, MarkerRule, ScoringRule, ScoringRules, SolutionEvaluator};
pub use reduction::{BiasReducer, MethodDescriptor, ReductionCatalog, ReductionMethodId};
pub use strategy::{SelectedStrategy, StrategySelector};
pub use synthesis::TechniqueSynthesizer;
pub use techniques::{Technique, TechniqueCatalog, TechniqueCategory, TechniqueId};

// Orchestration
pub use config::OptimizerConfig;
pub use optimizer::{run_batch, OptimizationReport, ReasoningOptimizer, RefinementFocus};
