//! CP solver interface.

use super::model::CpModel;
use super::variables::VarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Search space exhausted; the last solution is optimal.
    Optimal,
    /// Solutions found, but the search stopped before proving optimality.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Time limit reached before any solution was found.
    Timeout,
    /// Node limit reached before any solution was found.
    Unknown,
}

/// One feasible assignment of every model variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    /// Objective value (0 when the model has no objective).
    pub objective_value: i64,
    /// Value per variable, indexed by [`VarId::index`].
    pub values: Vec<i64>,
    /// Search nodes visited when this solution was found.
    pub nodes: u64,
}

impl CpSolution {
    /// Value of an integer or boolean variable.
    ///
    /// A variable past the end of `values` reads as 0.
    pub fn value(&self, var: VarId) -> i64 {
        self.values.get(var.index()).copied().unwrap_or(0)
    }

    /// Whether a boolean variable is true.
    pub fn is_true(&self, var: VarId) -> bool {
        self.value(var) != 0
    }
}

/// Ordered sequence of improving solutions produced by one solve.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Solver status.
    pub status: SolverStatus,
    /// Solutions in emission order; each is strictly better than the previous.
    pub solutions: Vec<CpSolution>,
    /// Total search nodes visited.
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl SolveResult {
    /// Creates an empty result with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            solutions: Vec::new(),
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// The last (best) solution.
    pub fn best(&self) -> Option<&CpSolution> {
        self.solutions.last()
    }
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_lineup::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_solution_limit(5)
///     .with_seed(7)
///     .without_time_limit();
/// assert_eq!(config.solution_limit, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Stop after emitting this many improving solutions.
    pub solution_limit: usize,
    /// Seed for value choices not covered by a decision strategy.
    pub seed: u64,
    /// Maximum number of search nodes. `None` = unbounded.
    pub node_limit: Option<u64>,
    /// Maximum solve time in milliseconds. `None` = unbounded.
    ///
    /// Unlike the other limits this one is not reproducible across runs.
    pub time_limit_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solution_limit: 10,
            seed: 42,
            node_limit: Some(1_000_000),
            time_limit_ms: Some(30_000),
        }
    }
}

impl SolverConfig {
    pub fn with_solution_limit(mut self, n: usize) -> Self {
        self.solution_limit = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_node_limit(mut self, n: u64) -> Self {
        self.node_limit = Some(n);
        self
    }

    pub fn without_node_limit(mut self) -> Self {
        self.node_limit = None;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    /// Validates the limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.solution_limit == 0 {
            return Err("solution_limit must be at least 1".into());
        }
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive or None".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// A conforming solver returns up to `config.solution_limit` feasible
/// solutions, each with an objective no worse than the one before, and
/// returns the same sequence for the same model, limit and seed. Each
/// solution should carry one value per model variable.
pub trait CpSolver: Send + Sync {
    /// Solves the model and returns the improving solution sequence.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> SolveResult;
}
