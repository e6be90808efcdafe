//! Technique Selector / Synthesizer
//!
//! Applies requested techniques in order, isolating per-technique failures,
//! and merges the surviving fragments into one `Approach`:
//! - steps concatenated in application order, deduplicated by name (first wins)
//! - one rationale naming every technique that succeeded
//! - a fixed three-step fallback when nothing succeeded

use crate::techniques::{Technique, TechniqueCatalog, TechniqueId};
use crate::types::{Approach, ApproachFragment, ApproachStep, Payload};
use anyhow::Result;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

pub const FALLBACK_TECHNIQUE: &str = "general_problem_solving";

const SYNTHESIZED_GUIDE: &str =
    "Follow the steps in sequence, applying the appropriate technique at each stage";

/// Merges technique fragments into a single approach
#[derive(Debug, Clone)]
pub struct TechniqueSynthesizer {
    catalog: TechniqueCatalog,
}

impl TechniqueSynthesizer {
    pub fn new(catalog: TechniqueCatalog) -> Self {
        tracing::info!("Technique synthesizer initialized with {} techniques", catalog.len());
        Self { catalog }
    }

    pub fn catalog(&self) -> &TechniqueCatalog {
        &self.catalog
    }

    /// Apply string technique identifiers, skipping any that don't parse
    pub fn apply<S: AsRef<str>>(&self, payload: &Payload, technique_ids: &[S]) -> Approach {
        let ids: Vec<TechniqueId> = technique_ids
            .iter()
            .filter_map(|raw| match raw.as_ref().parse::<TechniqueId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!("Requested technique not available: {}", e);
                    None
                }
            })
            .collect();
        self.apply_ids(payload, &ids)
    }

    /// Apply typed technique identifiers in order
    pub fn apply_ids(&self, payload: &Payload, ids: &[TechniqueId]) -> Approach {
        let mut fragments: Vec<(TechniqueId, ApproachFragment)> = Vec::new();
        let mut seen = HashSet::new();

        for &id in ids {
            if !seen.insert(id) {
                tracing::debug!("Technique {} requested more than once, applying once", id);
                continue;
            }

            let Some(technique) = self.catalog.get(id) else {
                tracing::warn!("Requested technique not in catalog: {}", id);
                continue;
            };

            tracing::debug!("Applying optimization technique: {}", id);
            match invoke(technique.as_ref(), payload) {
                Ok(Some(fragment)) => fragments.push((id, fragment)),
                Ok(None) => tracing::warn!("Technique {} produced no fragment", id),
                Err(e) => tracing::warn!("Error applying technique {}: {:#}", id, e),
            }
        }

        if fragments.is_empty() {
            tracing::warn!("No optimization techniques were successfully applied");
            return fallback_approach();
        }

        synthesize(fragments)
    }
}

/// Run one technique, turning a panic into an ordinary failure
fn invoke(technique: &dyn Technique, payload: &Payload) -> Result<Option<ApproachFragment>> {
    panic::catch_unwind(AssertUnwindSafe(|| technique.apply(payload))).unwrap_or_else(|cause| {
        let message = cause
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| cause.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(anyhow::anyhow!("technique panicked: {}", message))
    })
}

fn synthesize(fragments: Vec<(TechniqueId, ApproachFragment)>) -> Approach {
    let mut steps = Vec::new();
    let mut names = HashSet::new();
    let mut techniques = Vec::with_capacity(fragments.len());

    for (id, fragment) in fragments {
        for step in fragment.steps {
            if names.insert(step.name.clone()) {
                steps.push(step);
            }
        }
        techniques.push(id.as_str().to_string());
    }

    Approach {
        steps,
        rationale: combined_rationale(&techniques),
        implementation_guide: SYNTHESIZED_GUIDE.to_string(),
        applied_techniques: techniques,
        bias_reduction: None,
    }
}

/// "Integrated approach combining a, b and c" (no Oxford comma)
fn combined_rationale(techniques: &[String]) -> String {
    let joined = match techniques {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    format!("Integrated approach combining {}", joined)
}

/// Deterministic approach used when no technique could be applied
pub fn fallback_approach() -> Approach {
    Approach {
        steps: vec![
            ApproachStep::new("Problem analysis", "Analyze the structure of the problem"),
            ApproachStep::new("Solution generation", "Generate potential solutions"),
            ApproachStep::new("Solution evaluation", "Evaluate and select the best solution"),
        ],
        rationale: "Basic problem-solving approach when specific optimization techniques cannot be applied"
            .to_string(),
        implementation_guide: "Follow the general problem-solving steps".to_string(),
        applied_techniques: vec![FALLBACK_TECHNIQUE.to_string()],
        bias_reduction: None,
    }
}
