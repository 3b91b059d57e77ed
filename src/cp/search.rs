//! Depth-first branch and bound.
//!
//! # Algorithm
//!
//! 1. Propagate every constraint to a bounds fixpoint at the root
//! 2. Pick the first unfixed variable in decision order
//!    (declared strategies first, then the remaining variables by index)
//! 3. Branch on its preferred value, then on the rest of its domain
//! 4. At a leaf, record the solution and require the objective to
//!    improve strictly from then on
//! 5. Stop on exhaustion, the solution limit, the node limit, or the
//!    wall clock
//!
//! The incumbent objective bound takes part in propagation, so a better
//! solution prunes the remaining tree instead of only being compared at
//! the leaves.

use super::model::{Constraint, CpModel, ValueSelection};
use super::solver::{CpSolution, CpSolver, SolveResult, SolverConfig, SolverStatus};
use super::variables::{Literal, VarId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    lo: i64,
    hi: i64,
}

impl Bounds {
    fn is_fixed(self) -> bool {
        self.lo == self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    SolutionLimit,
    NodeLimit,
    TimeLimit,
}

#[derive(Debug, Clone, Copy)]
enum Choice {
    Min,
    Max,
    Random,
}

/// Exact branch-and-bound solver for [`CpModel`]s.
///
/// Handles every [`Constraint`] variant with bounds propagation. Variables
/// that no decision strategy covers take their first value from an RNG
/// seeded with [`SolverConfig::seed`], so runs are reproducible unless the
/// time limit interrupts them.
///
/// # Examples
///
/// ```
/// use u_lineup::cp::{BranchAndBoundSolver, CpModel, CpSolver, Objective, SolverConfig};
///
/// let mut model = CpModel::new("pick");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_at_most_one(&[a, b]);
/// model.set_objective(Objective::Maximize { terms: vec![(a, 2), (b, 3)] });
///
/// let result = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(result.best().unwrap().objective_value, 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> SolveResult {
        if let Err(e) = model.validate() {
            log::warn!("model '{}' rejected: {e}", model.name);
            return SolveResult::empty(SolverStatus::ModelInvalid);
        }
        if let Err(e) = config.validate() {
            log::warn!("model '{}': invalid solver config: {e}", model.name);
            return SolveResult::empty(SolverStatus::ModelInvalid);
        }

        let mut search = Search::new(model, config);
        let mut root: Vec<Bounds> = model
            .vars()
            .iter()
            .map(|v| {
                let (lo, hi) = v.bounds();
                Bounds { lo, hi }
            })
            .collect();

        let status = if search.propagate(&mut root, None) {
            search.dfs(root, 0);
            search.status()
        } else {
            log::debug!("model '{}' infeasible at the root", model.name);
            SolverStatus::Infeasible
        };

        log::debug!(
            "model '{}': {:?} with {} solutions after {} nodes",
            model.name,
            status,
            search.solutions.len(),
            search.nodes
        );

        SolveResult {
            status,
            nodes: search.nodes,
            solve_time_ms: search.started.elapsed().as_millis() as i64,
            solutions: search.solutions,
        }
    }
}

struct Search<'m> {
    model: &'m CpModel,
    config: &'m SolverConfig,
    /// Constraint indices per variable. Index `constraints.len()` is the objective.
    watchers: Vec<Vec<usize>>,
    objective: Vec<(VarId, i64)>,
    order: Vec<(usize, Choice)>,
    rng: StdRng,
    incumbent: Option<i64>,
    solutions: Vec<CpSolution>,
    nodes: u64,
    started: Instant,
    stop: Option<StopReason>,
}

impl<'m> Search<'m> {
    fn new(model: &'m CpModel, config: &'m SolverConfig) -> Self {
        let n = model.var_count();
        let objective_index = model.constraints.len();

        let mut watchers = vec![Vec::new(); n];
        for (c, constraint) in model.constraints.iter().enumerate() {
            for v in constraint.vars() {
                if watchers[v.index()].last() != Some(&c) {
                    watchers[v.index()].push(c);
                }
            }
        }

        let objective = model
            .objective
            .as_ref()
            .map(|o| o.minimization_terms())
            .unwrap_or_default();
        for &(v, _) in &objective {
            if watchers[v.index()].last() != Some(&objective_index) {
                watchers[v.index()].push(objective_index);
            }
        }

        let mut seen = vec![false; n];
        let mut order = Vec::with_capacity(n);
        for strategy in &model.strategies {
            let choice = match strategy.value {
                ValueSelection::MinValue => Choice::Min,
                ValueSelection::MaxValue => Choice::Max,
            };
            for v in &strategy.vars {
                if !seen[v.index()] {
                    seen[v.index()] = true;
                    order.push((v.index(), choice));
                }
            }
        }
        for (i, var) in model.vars().iter().enumerate() {
            if !seen[i] {
                let choice = if var.is_bool() {
                    Choice::Random
                } else {
                    Choice::Min
                };
                order.push((i, choice));
            }
        }

        Self {
            model,
            config,
            watchers,
            objective,
            order,
            rng: StdRng::seed_from_u64(config.seed),
            incumbent: None,
            solutions: Vec::new(),
            nodes: 0,
            started: Instant::now(),
            stop: None,
        }
    }

    fn status(&self) -> SolverStatus {
        let found = !self.solutions.is_empty();
        match self.stop {
            None if found => SolverStatus::Optimal,
            None => SolverStatus::Infeasible,
            Some(StopReason::SolutionLimit) => SolverStatus::Feasible,
            Some(_) if found => SolverStatus::Feasible,
            Some(StopReason::NodeLimit) => SolverStatus::Unknown,
            Some(StopReason::TimeLimit) => SolverStatus::Timeout,
        }
    }

    fn out_of_budget(&mut self) -> bool {
        if self.stop.is_some() {
            return true;
        }
        if let Some(limit) = self.config.node_limit {
            if self.nodes >= limit {
                self.stop = Some(StopReason::NodeLimit);
                return true;
            }
        }
        if let Some(ms) = self.config.time_limit_ms {
            if self.started.elapsed().as_millis() >= u128::from(ms) {
                self.stop = Some(StopReason::TimeLimit);
                return true;
            }
        }
        false
    }

    fn dfs(&mut self, domains: Vec<Bounds>, cursor: usize) {
        if self.out_of_budget() {
            return;
        }
        self.nodes += 1;

        let mut pos = cursor;
        while pos < self.order.len() && domains[self.order[pos].0].is_fixed() {
            pos += 1;
        }
        if pos == self.order.len() {
            self.record(&domains);
            return;
        }

        let (var, choice) = self.order[pos];
        let b = domains[var];
        let take_high = match choice {
            Choice::Max => true,
            Choice::Min => false,
            Choice::Random => self.rng.random_bool(0.5),
        };
        let branches = if take_high {
            [(b.hi, b.hi), (b.lo, b.hi - 1)]
        } else {
            [(b.lo, b.lo), (b.lo + 1, b.hi)]
        };

        for (lo, hi) in branches {
            if self.stop.is_some() {
                return;
            }
            let mut child = domains.clone();
            child[var] = Bounds { lo, hi };
            if self.propagate(&mut child, Some(var)) {
                self.dfs(child, pos);
            }
        }
    }

    fn record(&mut self, domains: &[Bounds]) {
        let values: Vec<i64> = domains.iter().map(|b| b.lo).collect();
        let minimized: i64 = self
            .objective
            .iter()
            .map(|&(v, c)| c * values[v.index()])
            .sum();
        let reported: i64 = match &self.model.objective {
            Some(o) => o.terms().iter().map(|&(v, c)| c * values[v.index()]).sum(),
            None => 0,
        };

        if self.model.objective.is_some() {
            self.incumbent = Some(minimized);
        }
        log::debug!(
            "model '{}': solution {} with objective {} after {} nodes",
            self.model.name,
            self.solutions.len() + 1,
            reported,
            self.nodes
        );
        self.solutions.push(CpSolution {
            objective_value: reported,
            values,
            nodes: self.nodes,
        });
        if self.solutions.len() >= self.config.solution_limit {
            self.stop = Some(StopReason::SolutionLimit);
        }
    }

    /// Runs propagators to a fixpoint. Returns `false` on a wipe-out.
    fn propagate(&self, domains: &mut [Bounds], changed: Option<usize>) -> bool {
        let constraint_count = self.model.constraints.len();
        let total = constraint_count + 1;
        let mut queued = vec![false; total];
        let mut queue = VecDeque::new();

        match changed {
            Some(v) => {
                for &c in &self.watchers[v] {
                    queued[c] = true;
                    queue.push_back(c);
                }
            }
            None => {
                for c in 0..constraint_count {
                    queued[c] = true;
                    queue.push_back(c);
                }
            }
        }
        if !queued[constraint_count] {
            queued[constraint_count] = true;
            queue.push_back(constraint_count);
        }

        let mut touched = Vec::new();
        while let Some(c) = queue.pop_front() {
            queued[c] = false;
            touched.clear();

            let ok = if c < constraint_count {
                filter(&self.model.constraints[c], domains, &mut touched)
            } else {
                match self.incumbent {
                    Some(best) => {
                        filter_linear(&self.objective, i64::MIN, best - 1, domains, &mut touched)
                    }
                    None => true,
                }
            };
            if !ok {
                return false;
            }

            for &v in &touched {
                for &w in &self.watchers[v] {
                    if !queued[w] {
                        queued[w] = true;
                        queue.push_back(w);
                    }
                }
            }
        }
        true
    }
}

fn filter(constraint: &Constraint, domains: &mut [Bounds], touched: &mut Vec<usize>) -> bool {
    match constraint {
        Constraint::Linear {
            terms,
            lower,
            upper,
        } => filter_linear(terms, *lower, *upper, domains, touched),
        Constraint::AndEquality { target, literals } => {
            filter_and(*target, literals, domains, touched)
        }
        Constraint::Spread { target, vars } => filter_spread(*target, vars, domains, touched),
    }
}

fn tighten(domains: &mut [Bounds], v: usize, lo: i64, hi: i64, touched: &mut Vec<usize>) -> bool {
    let b = &mut domains[v];
    let new_lo = b.lo.max(lo);
    let new_hi = b.hi.min(hi);
    if new_lo > new_hi {
        return false;
    }
    if new_lo != b.lo || new_hi != b.hi {
        b.lo = new_lo;
        b.hi = new_hi;
        touched.push(v);
    }
    true
}

fn term_range(coef: i64, b: Bounds) -> (i128, i128) {
    let (a, lo, hi) = (i128::from(coef), i128::from(b.lo), i128::from(b.hi));
    if a >= 0 {
        (a * lo, a * hi)
    } else {
        (a * hi, a * lo)
    }
}

fn div_floor(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n < 0) == (d < 0)) {
        q + 1
    } else {
        q
    }
}

fn clamp_i64(x: i128) -> i64 {
    x.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn filter_linear(
    terms: &[(VarId, i64)],
    lower: i64,
    upper: i64,
    domains: &mut [Bounds],
    touched: &mut Vec<usize>,
) -> bool {
    let (lower, upper) = (i128::from(lower), i128::from(upper));
    let (mut min_sum, mut max_sum) = (0i128, 0i128);
    for &(v, a) in terms {
        let (lo, hi) = term_range(a, domains[v.index()]);
        min_sum += lo;
        max_sum += hi;
    }
    if min_sum > upper || max_sum < lower {
        return false;
    }

    for &(v, a) in terms {
        if a == 0 {
            continue;
        }
        let (t_min, t_max) = term_range(a, domains[v.index()]);
        // a * x <= room_up and a * x >= room_down
        let room_up = upper - (min_sum - t_min);
        let room_down = lower - (max_sum - t_max);
        let a = i128::from(a);
        let (lo, hi) = if a > 0 {
            (div_ceil(room_down, a), div_floor(room_up, a))
        } else {
            (div_ceil(room_up, a), div_floor(room_down, a))
        };
        if !tighten(domains, v.index(), clamp_i64(lo), clamp_i64(hi), touched) {
            return false;
        }
    }
    true
}

fn filter_and(
    target: VarId,
    literals: &[Literal],
    domains: &mut [Bounds],
    touched: &mut Vec<usize>,
) -> bool {
    let mut open = None;
    let mut open_count = 0;
    for &lit in literals {
        let b = domains[lit.var.index()];
        if b.is_fixed() {
            if b.lo != lit.satisfying_value() {
                return tighten(domains, target.index(), 0, 0, touched);
            }
        } else {
            open = Some(lit);
            open_count += 1;
        }
    }

    if open_count == 0 {
        return tighten(domains, target.index(), 1, 1, touched);
    }

    let t = domains[target.index()];
    if t.is_fixed() && t.lo == 1 {
        for &lit in literals {
            let want = lit.satisfying_value();
            if !tighten(domains, lit.var.index(), want, want, touched) {
                return false;
            }
        }
    } else if t.is_fixed() && t.lo == 0 && open_count == 1 {
        if let Some(lit) = open {
            let want = lit.not().satisfying_value();
            return tighten(domains, lit.var.index(), want, want, touched);
        }
    }
    true
}

fn filter_spread(
    target: VarId,
    vars: &[VarId],
    domains: &mut [Bounds],
    touched: &mut Vec<usize>,
) -> bool {
    if vars.len() == 1 {
        return tighten(domains, target.index(), 0, 0, touched);
    }

    let bounds: Vec<Bounds> = vars.iter().map(|v| domains[v.index()]).collect();
    let max_lo = bounds.iter().map(|b| b.lo).max().unwrap_or(0);
    let min_lo = bounds.iter().map(|b| b.lo).min().unwrap_or(0);
    let max_hi = bounds.iter().map(|b| b.hi).max().unwrap_or(0);
    let min_hi = bounds.iter().map(|b| b.hi).min().unwrap_or(0);

    let spread_lo = max_lo.saturating_sub(min_hi).max(0);
    let spread_hi = max_hi.saturating_sub(min_lo);
    if !tighten(domains, target.index(), spread_lo, spread_hi, touched) {
        return false;
    }

    let gap = domains[target.index()].hi;
    for &v in vars {
        let lo = max_lo.saturating_sub(gap);
        let hi = min_hi.saturating_add(gap);
        if !tighten(domains, v.index(), lo, hi, touched) {
            return false;
        }
    }
    true
}
