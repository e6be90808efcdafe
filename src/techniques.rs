//! Technique Catalog
//!
//! A technique is a named transformation from problem payload to an
//! approach fragment (steps + rationale + cost note). Identifiers form a
//! closed set; the catalog is an explicit value handed to the synthesizer,
//! so tests can build catalogs with only the techniques they need.

use crate::types::{ApproachFragment, ApproachStep, Payload};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Documentation grouping of techniques, also used to expand strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueCategory {
    MathematicalOptimization,
    HeuristicOptimization,
    NumericalMethods,
    ReinforcementLearning,
    LogicalReasoning,
}

/// Every technique the engine knows how to describe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueId {
    LinearProgramming,
    ConstraintSatisfaction,
    IntegerProgramming,
    GeneticAlgorithms,
    SimulatedAnnealing,
    ParticleSwarm,
    GradientDescent,
    NewtonMethod,
    QuasiNewton,
    QLearning,
    PolicyGradients,
    DeepQNetworks,
    Deduction,
    Induction,
    Abduction,
    CaseBasedReasoning,
}

impl TechniqueId {
    pub const ALL: [TechniqueId; 16] = [
        TechniqueId::LinearProgramming,
        TechniqueId::ConstraintSatisfaction,
        TechniqueId::IntegerProgramming,
        TechniqueId::GeneticAlgorithms,
        TechniqueId::SimulatedAnnealing,
        TechniqueId::ParticleSwarm,
        TechniqueId::GradientDescent,
        TechniqueId::NewtonMethod,
        TechniqueId::QuasiNewton,
        TechniqueId::QLearning,
        TechniqueId::PolicyGradients,
        TechniqueId::DeepQNetworks,
        TechniqueId::Deduction,
        TechniqueId::Induction,
        TechniqueId::Abduction,
        TechniqueId::CaseBasedReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueId::LinearProgramming => "linear_programming",
            TechniqueId::ConstraintSatisfaction => "constraint_satisfaction",
            TechniqueId::IntegerProgramming => "integer_programming",
            TechniqueId::GeneticAlgorithms => "genetic_algorithms",
            TechniqueId::SimulatedAnnealing => "simulated_annealing",
            TechniqueId::ParticleSwarm => "particle_swarm",
            TechniqueId::GradientDescent => "gradient_descent",
            TechniqueId::NewtonMethod => "newton_method",
            TechniqueId::QuasiNewton => "quasi_newton",
            TechniqueId::QLearning => "q_learning",
            TechniqueId::PolicyGradients => "policy_gradients",
            TechniqueId::DeepQNetworks => "deep_q_networks",
            TechniqueId::Deduction => "deduction",
            TechniqueId::Induction => "induction",
            TechniqueId::Abduction => "abduction",
            TechniqueId::CaseBasedReasoning => "case_based_reasoning",
        }
    }

    pub fn category(&self) -> TechniqueCategory {
        use TechniqueCategory::*;
        match self {
            TechniqueId::LinearProgramming
            | TechniqueId::ConstraintSatisfaction
            | TechniqueId::IntegerProgramming => MathematicalOptimization,
            TechniqueId::GeneticAlgorithms
            | TechniqueId::SimulatedAnnealing
            | TechniqueId::ParticleSwarm => HeuristicOptimization,
            TechniqueId::GradientDescent | TechniqueId::NewtonMethod | TechniqueId::QuasiNewton => {
                NumericalMethods
            }
            TechniqueId::QLearning | TechniqueId::PolicyGradients | TechniqueId::DeepQNetworks => {
                ReinforcementLearning
            }
            TechniqueId::Deduction
            | TechniqueId::Induction
            | TechniqueId::Abduction
            | TechniqueId::CaseBasedReasoning => LogicalReasoning,
        }
    }

    /// Whether this is a stochastic search heuristic (favoured for hard problems)
    pub fn is_heuristic_search(&self) -> bool {
        self.category() == TechniqueCategory::HeuristicOptimization
    }

    /// The built-in fragment for this technique
    pub fn builtin_fragment(&self) -> ApproachFragment {
        match self {
            // Mathematical optimization
            TechniqueId::LinearProgramming => fragment(
                &[
                    ("Define decision variables", "Identify and define the decision variables"),
                    ("Formulate objective function", "Create a linear objective function to optimize"),
                    ("Define constraints", "Identify and formulate linear constraints"),
                    ("Solve LP model", "Apply simplex method or interior point method"),
                    ("Interpret solution", "Translate mathematical solution to problem context"),
                ],
                "Linear programming is effective for problems with linear objectives and constraints",
                "Implement using standard LP solvers like GLPK, CPLEX, or PuLP",
                "O(n²m) where n is variables and m is constraints",
            ),
            TechniqueId::ConstraintSatisfaction => fragment(
                &[
                    ("Define variables and domains", "Identify variables and their possible values"),
                    ("Define constraints", "Specify constraints between variables"),
                    ("Apply constraint propagation", "Reduce domains based on constraints"),
                    ("Perform backtracking search", "Search for solutions with backtracking"),
                    ("Apply heuristics", "Use variable and value ordering heuristics"),
                ],
                "Constraint satisfaction is suitable for problems with discrete variables and constraints",
                "Implement using CSP libraries like python-constraint or OR-Tools",
                "O(d^n) worst case, where d is domain size and n is variables",
            ),
            TechniqueId::IntegerProgramming => fragment(
                &[
                    ("Define integer variables", "Identify variables requiring integer values"),
                    ("Formulate objective function", "Create objective function to optimize"),
                    ("Define constraints", "Identify and formulate constraints"),
                    ("Apply branch and bound", "Use branch and bound algorithm"),
                    ("Verify integer solution", "Check solution meets integer requirements"),
                ],
                "Integer programming handles problems requiring discrete or binary decisions",
                "Implement using MIP solvers like CBC, Gurobi, or CPLEX",
                "NP-hard in general, exponential worst case",
            ),

            // Heuristic optimization
            TechniqueId::GeneticAlgorithms => fragment(
                &[
                    ("Define chromosome representation", "Encode solutions as chromosomes"),
                    ("Create initial population", "Generate diverse initial population"),
                    ("Define fitness function", "Create function to evaluate solution quality"),
                    ("Apply selection", "Select individuals for reproduction"),
                    ("Apply crossover and mutation", "Generate new solutions through genetic operators"),
                    ("Iterate generations", "Repeat process for multiple generations"),
                ],
                "Genetic algorithms excel at complex problems with large search spaces",
                "Implement using libraries like DEAP or PyGAD",
                "O(g×p×f) where g is generations, p is population size, f is fitness evaluation cost",
            ),
            TechniqueId::SimulatedAnnealing => fragment(
                &[
                    ("Define solution representation", "Determine how to represent solutions"),
                    ("Define energy function", "Create function to evaluate solution quality"),
                    ("Generate initial solution", "Create initial random solution"),
                    ("Define neighbor generation", "Create method to generate neighboring solutions"),
                    ("Define cooling schedule", "Specify how temperature decreases over time"),
                    ("Run annealing process", "Iterate through temperature schedule"),
                ],
                "Simulated annealing can escape local optima and works well for combinatorial problems",
                "Implement using libraries like simanneal or scikit-opt",
                "O(i×n) where i is iterations and n is neighbor generation cost",
            ),
            TechniqueId::ParticleSwarm => fragment(
                &[
                    ("Define particle representation", "Determine how to represent solutions as particles"),
                    ("Define fitness function", "Create function to evaluate solution quality"),
                    ("Initialize particle swarm", "Generate initial particles with random positions and velocities"),
                    ("Define update equations", "Specify how particles update position and velocity"),
                    ("Set inertia and acceleration parameters", "Configure algorithm parameters"),
                    ("Iterate particle updates", "Run algorithm for multiple iterations"),
                ],
                "Particle swarm optimization is effective for continuous optimization problems",
                "Implement using libraries like pyswarms or OptimLib",
                "O(i×p×d×f) where i is iterations, p is particles, d is dimensions, f is fitness cost",
            ),

            // Numerical methods
            TechniqueId::GradientDescent => fragment(
                &[
                    ("Define objective function", "Create differentiable function to minimize"),
                    ("Compute gradient function", "Derive or approximate gradient of objective"),
                    ("Select initial point", "Choose starting point for optimization"),
                    ("Set learning rate", "Determine step size for gradient updates"),
                    ("Update iteratively", "Move in direction of negative gradient"),
                    ("Check convergence", "Stop when gradient is near zero or iterations limit reached"),
                ],
                "Gradient descent works well for smooth, continuous optimization problems",
                "Implement using numerical libraries or optimization frameworks",
                "O(i×g) where i is iterations and g is gradient computation cost",
            ),
            TechniqueId::NewtonMethod => fragment(
                &[
                    ("Define objective function", "Create twice-differentiable function to minimize"),
                    ("Compute gradient", "Derive or approximate first derivatives"),
                    ("Compute Hessian", "Derive or approximate second derivatives"),
                    ("Select initial point", "Choose starting point for optimization"),
                    ("Update using Newton step", "Compute step direction using Hessian inverse"),
                    ("Check convergence", "Stop when gradient is near zero or iterations limit reached"),
                ],
                "Newton's method converges quadratically for smooth, well-behaved functions",
                "Implement using scientific computing libraries",
                "O(i×(g+h)) where i is iterations, g is gradient cost, h is Hessian cost",
            ),
            TechniqueId::QuasiNewton => fragment(
                &[
                    ("Define objective function", "Create differentiable function to minimize"),
                    ("Compute gradient", "Derive or approximate first derivatives"),
                    ("Select initial point", "Choose starting point for optimization"),
                    ("Initialize approximate Hessian", "Start with identity matrix or approximation"),
                    ("Update using BFGS formula", "Update approximate Hessian iteratively"),
                    ("Compute search direction", "Determine step direction using approximate Hessian"),
                    ("Perform line search", "Find appropriate step size"),
                    ("Check convergence", "Stop when gradient is near zero or iterations limit reached"),
                ],
                "Quasi-Newton methods combine Newton's efficiency without requiring second derivatives",
                "Implement using an L-BFGS implementation from an optimization library",
                "O(i×g×n²) where i is iterations, g is gradient cost, n is dimensions",
            ),

            // Reinforcement learning
            TechniqueId::QLearning => fragment(
                &[
                    ("Define state space", "Identify all possible states in the problem"),
                    ("Define action space", "Identify all possible actions"),
                    ("Define reward function", "Specify rewards for state-action pairs"),
                    ("Initialize Q-table", "Create table for all state-action pairs"),
                    ("Set learning parameters", "Configure learning rate, discount factor, and exploration rate"),
                    ("Implement exploration strategy", "Use epsilon-greedy or other exploration method"),
                    ("Update Q-values", "Apply Q-learning update rule during episodes"),
                    ("Extract policy", "Determine optimal actions from trained Q-table"),
                ],
                "Q-learning is effective for sequential decision problems with discrete states and actions",
                "Implement using an RL environment toolkit and tabular learner",
                "O(e×s×a) where e is episodes, s is states, a is actions",
            ),
            TechniqueId::PolicyGradients => fragment(
                &[
                    ("Define state space", "Identify state representation"),
                    ("Define action space", "Identify possible actions"),
                    ("Design policy network", "Create neural network to represent policy"),
                    ("Define objective function", "Use expected return or advantage function"),
                    ("Sample trajectories", "Generate experience by interacting with environment"),
                    ("Estimate policy gradient", "Calculate gradient of objective with respect to policy parameters"),
                    ("Update policy parameters", "Apply gradient ascent to improve policy"),
                    ("Implement baseline", "Use value function to reduce variance"),
                ],
                "Policy gradients work well for continuous action spaces and stochastic policies",
                "Implement using a deep learning framework with RL extensions",
                "Depends on neural network architecture and sample complexity",
            ),
            TechniqueId::DeepQNetworks => fragment(
                &[
                    ("Define state representation", "Create feature representation of states"),
                    ("Define action space", "Identify possible actions"),
                    ("Design Q-network", "Create neural network to approximate Q-function"),
                    ("Implement experience replay", "Store and sample past experiences"),
                    ("Implement target network", "Use separate network for stable target values"),
                    ("Define loss function", "Use mean squared error between predicted and target Q-values"),
                    ("Train network", "Update network parameters using gradient descent"),
                    ("Extract policy", "Select actions with highest Q-values"),
                ],
                "Deep Q-networks handle high-dimensional state spaces through function approximation",
                "Implement using deep learning frameworks with RL extensions",
                "Depends on neural network architecture and sample complexity",
            ),

            // Logical reasoning
            TechniqueId::Deduction => fragment(
                &[
                    ("Identify premises", "Establish known facts and axioms"),
                    ("Apply logical rules", "Use modus ponens, modus tollens, etc."),
                    ("Construct proof", "Build logical chain from premises to conclusion"),
                    ("Verify logical validity", "Ensure all inferences are valid"),
                    ("Draw conclusion", "Determine the logically necessary result"),
                ],
                "Deductive reasoning provides certainty when premises are true and logic is valid",
                "Implement using logical programming or theorem provers",
                "Depends on the complexity of the logical system",
            ),
            TechniqueId::Induction => fragment(
                &[
                    ("Collect observations", "Gather relevant data points"),
                    ("Identify patterns", "Recognize recurring patterns in data"),
                    ("Formulate hypothesis", "Create general rule explaining observations"),
                    ("Test hypothesis", "Verify rule against additional data"),
                    ("Refine hypothesis", "Modify rule based on testing results"),
                ],
                "Inductive reasoning discovers general principles from specific observations",
                "Implement using statistical learning or pattern recognition algorithms",
                "O(n log n) where n is the number of observations",
            ),
            TechniqueId::Abduction => fragment(
                &[
                    ("Identify surprising observation", "Recognize phenomenon requiring explanation"),
                    ("Generate potential hypotheses", "Create multiple plausible explanations"),
                    ("Evaluate explanatory power", "Assess how well each hypothesis explains observation"),
                    ("Apply simplicity criteria", "Prefer simpler explanations (Occam's razor)"),
                    ("Select best explanation", "Choose hypothesis with best explanatory power and simplicity"),
                ],
                "Abductive reasoning finds the most likely explanation for observations",
                "Implement using Bayesian inference or explanation-based reasoning",
                "O(h) where h is the number of candidate hypotheses",
            ),
            TechniqueId::CaseBasedReasoning => fragment(
                &[
                    ("Retrieve similar cases", "Find similar problems and their solutions"),
                    ("Evaluate case relevance", "Assess similarity to current problem"),
                    ("Adapt solutions", "Modify previous solutions to fit current problem"),
                    ("Test adapted solution", "Verify that solution works for current problem"),
                    ("Store new case", "Add current problem and solution to case library"),
                ],
                "Case-based reasoning leverages previous experience to solve new problems",
                "Implement using case libraries and similarity metrics",
                "O(c×s) where c is number of cases and s is similarity computation cost",
            ),
        }
    }
}

impl FromStr for TechniqueId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown technique: {}", s))
    }
}

impl fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn fragment(
    steps: &[(&str, &str)],
    rationale: &str,
    implementation_guide: &str,
    complexity: &str,
) -> ApproachFragment {
    ApproachFragment {
        steps: steps
            .iter()
            .map(|(name, description)| ApproachStep::new(*name, *description))
            .collect(),
        rationale: rationale.to_string(),
        implementation_guide: implementation_guide.to_string(),
        complexity: complexity.to_string(),
    }
}

/// A transformation from problem payload to an approach fragment
///
/// `Err` and `Ok(None)` both mean "this technique failed"; the synthesizer
/// skips it and carries on with the rest of the batch.
pub trait Technique: Send + Sync {
    fn apply(&self, payload: &Payload) -> Result<Option<ApproachFragment>>;
}

impl<F> Technique for F
where
    F: Fn(&Payload) -> Result<Option<ApproachFragment>> + Send + Sync,
{
    fn apply(&self, payload: &Payload) -> Result<Option<ApproachFragment>> {
        self(payload)
    }
}

/// Built-in technique: ignores the payload and returns its canonical fragment
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTechnique(pub TechniqueId);

impl Technique for BuiltinTechnique {
    fn apply(&self, _payload: &Payload) -> Result<Option<ApproachFragment>> {
        Ok(Some(self.0.builtin_fragment()))
    }
}

/// Immutable technique id -> transformation mapping
#[derive(Clone, Default)]
pub struct TechniqueCatalog {
    techniques: BTreeMap<TechniqueId, Arc<dyn Technique>>,
}

impl TechniqueCatalog {
    /// Catalog with every built-in technique
    pub fn builtin() -> Self {
        TechniqueId::ALL
            .into_iter()
            .fold(Self::default(), |catalog, id| catalog.with(id, BuiltinTechnique(id)))
    }

    /// Add or replace a technique (builder style, used at construction only)
    pub fn with(mut self, id: TechniqueId, technique: impl Technique + 'static) -> Self {
        self.techniques.insert(id, Arc::new(technique));
        self
    }

    pub fn get(&self, id: TechniqueId) -> Option<&Arc<dyn Technique>> {
        self.techniques.get(&id)
    }

    pub fn contains(&self, id: TechniqueId) -> bool {
        self.techniques.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TechniqueId> + '_ {
        self.techniques.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}

impl fmt::Debug for TechniqueCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TechniqueCatalog")
            .field("techniques", &self.techniques.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_has_all_16() {
        let catalog = TechniqueCatalog::builtin();
        assert_eq!(catalog.len(), 16);
        for id in TechniqueId::ALL {
            assert!(catalog.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn test_builtin_fragments_well_formed() {
        for id in TechniqueId::ALL {
            let frag = id.builtin_fragment();
            assert!(frag.steps.len() >= 5, "{} has too few steps", id);
            assert!(!frag.rationale.is_empty());
            assert!(!frag.implementation_guide.is_empty());
            assert!(!frag.complexity.is_empty());

            let names: HashSet<_> = frag.steps.iter().map(|s| &s.name).collect();
            assert_eq!(names.len(), frag.steps.len(), "{} repeats a step name", id);
        }
    }

    #[test]
    fn test_id_round_trips_through_str() {
        for id in TechniqueId::ALL {
            assert_eq!(id.as_str().parse::<TechniqueId>().unwrap(), id);
            assert_eq!(
                serde_json::to_string(&id).unwrap(),
                format!("\"{}\"", id.as_str())
            );
        }
        assert!("monte_carlo_tree_search".parse::<TechniqueId>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            TechniqueId::LinearProgramming.category(),
            TechniqueCategory::MathematicalOptimization
        );
        assert_eq!(
            TechniqueId::QuasiNewton.category(),
            TechniqueCategory::NumericalMethods
        );
        assert_eq!(
            TechniqueId::CaseBasedReasoning.category(),
            TechniqueCategory::LogicalReasoning
        );
        assert!(TechniqueId::ParticleSwarm.is_heuristic_search());
        assert!(!TechniqueId::Deduction.is_heuristic_search());
    }

    #[test]
    fn test_closure_technique_can_replace_builtin() {
        let catalog = TechniqueCatalog::default().with(
            TechniqueId::Deduction,
            |_: &Payload| -> Result<Option<ApproachFragment>> { anyhow::bail!("solver offline") },
        );
        let technique = catalog.get(TechniqueId::Deduction).unwrap();
        assert!(technique.apply(&Payload::new()).is_err());
        assert!(catalog.get(TechniqueId::Induction).is_none());
    }
}
