//! Constraint Programming (CP) framework.
//!
//! Provides a domain-agnostic model for expressing constrained optimization
//! problems over integer and boolean variables, and an exact solver for it.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`BoolVar`], [`Literal`]: decision variables
//! - **Constraints**: [`Constraint`]: Linear, AndEquality, Spread
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait: interface for solver implementations
//! - **Search**: [`BranchAndBoundSolver`]: propagation plus depth-first search
//!
//! # Design
//!
//! Solvers report every improving solution they find, not only the best
//! one. Callers that need several good alternatives read
//! [`SolveResult::solutions`] in emission order.
//!
//! Domain-specific objectives (e.g., rating gaps) belong in consumer
//! layers. This module provides only generic `Minimize`/`Maximize` objectives.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, DecisionStrategy, Objective, ValueSelection};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SolveResult, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntVar, Literal, VarId, Variable};
