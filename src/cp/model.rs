//! CP model definition.

use super::variables::{BoolVar, IntVar, Literal, VarId, Variable};
use std::collections::HashMap;

/// A constraint in the CP model.
///
/// All arithmetic is over integers. Boolean variables take the values 0 and 1
/// wherever they appear in a linear term.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `lower <= Σ coef * var <= upper`.
    Linear {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, i64)>,
        lower: i64,
        upper: i64,
    },

    /// `target <=> literals[0] AND literals[1] AND ...`.
    ///
    /// `target` and every literal must refer to boolean variables.
    AndEquality {
        target: VarId,
        literals: Vec<Literal>,
    },

    /// `target == max(vars) - min(vars)`.
    ///
    /// With two variables this is their absolute difference.
    Spread { target: VarId, vars: Vec<VarId> },
}

impl Constraint {
    /// Every variable the constraint mentions.
    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Constraint::Linear { terms, .. } => terms.iter().map(|&(v, _)| v).collect(),
            Constraint::AndEquality { target, literals } => std::iter::once(*target)
                .chain(literals.iter().map(|l| l.var))
                .collect(),
            Constraint::Spread { target, vars } => {
                std::iter::once(*target).chain(vars.iter().copied()).collect()
            }
        }
    }
}

/// Objective function for the CP model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Minimize a linear combination of variables.
    Minimize {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, i64)>,
    },

    /// Maximize a linear combination of variables.
    Maximize {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, i64)>,
    },
}

impl Objective {
    /// Terms of the equivalent minimization.
    pub fn minimization_terms(&self) -> Vec<(VarId, i64)> {
        match self {
            Objective::Minimize { terms } => terms.clone(),
            Objective::Maximize { terms } => terms.iter().map(|&(v, c)| (v, -c)).collect(),
        }
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        match self {
            Objective::Minimize { terms } | Objective::Maximize { terms } => terms,
        }
    }
}

/// Which value a decision tries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSelection {
    MinValue,
    MaxValue,
}

/// Ordered branching hint: decide `vars` in order, trying `value` first.
#[derive(Debug, Clone)]
pub struct DecisionStrategy {
    pub vars: Vec<VarId>,
    pub value: ValueSelection,
}

/// A constraint programming model.
///
/// Contains variables, constraints, an optional objective function and
/// optional decision strategies.
///
/// # Examples
///
/// ```
/// use u_lineup::cp::{CpModel, Objective};
///
/// let mut model = CpModel::new("example");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// let total = model.new_int_var("total", 0, 10);
/// model.add_at_most_one(&[a, b]);
/// model.add_linear_definition(total, vec![(a, 3), (b, 5)]);
/// model.set_objective(Objective::Maximize { terms: vec![(total, 1)] });
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    vars: Vec<Variable>,
    names: HashMap<String, VarId>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
    /// Branching hints, applied in order.
    pub strategies: Vec<DecisionStrategy>,
    duplicate_names: Vec<String>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            names: HashMap::new(),
            constraints: Vec::new(),
            objective: None,
            strategies: Vec::new(),
            duplicate_names: Vec::new(),
        }
    }

    fn push_var(&mut self, var: Variable) -> VarId {
        let id = VarId(self.vars.len());
        if self.names.insert(var.name().to_string(), id).is_some() {
            self.duplicate_names.push(var.name().to_string());
        }
        self.vars.push(var);
        id
    }

    /// Adds an integer variable.
    pub fn add_int_var(&mut self, var: IntVar) -> VarId {
        self.push_var(Variable::Int(var))
    }

    /// Adds a boolean variable.
    pub fn add_bool_var(&mut self, var: BoolVar) -> VarId {
        self.push_var(Variable::Bool(var))
    }

    /// Convenience: add an unfixed boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.add_bool_var(BoolVar::new(name))
    }

    /// Convenience: add an integer variable with bounds.
    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> VarId {
        self.add_int_var(IntVar::new(name, min, max))
    }

    /// Variable by handle.
    pub fn var(&self, id: VarId) -> Option<&Variable> {
        self.vars.get(id.0)
    }

    /// Variable handle by name.
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }

    /// All variables, indexed by [`VarId::index`].
    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: `lower <= Σ terms <= upper`.
    pub fn add_linear(&mut self, terms: Vec<(VarId, i64)>, lower: i64, upper: i64) {
        self.constraints.push(Constraint::Linear {
            terms,
            lower,
            upper,
        });
    }

    /// Convenience: `Σ terms == rhs`.
    pub fn add_equality(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.add_linear(terms, rhs, rhs);
    }

    /// Convenience: at most one of `vars` is true.
    pub fn add_at_most_one(&mut self, vars: &[VarId]) {
        self.add_linear(unit_terms(vars), 0, 1);
    }

    /// Convenience: exactly `count` of `vars` are true.
    pub fn add_exactly(&mut self, vars: &[VarId], count: i64) {
        self.add_equality(unit_terms(vars), count);
    }

    /// Convenience: `target == Σ terms`.
    pub fn add_linear_definition(&mut self, target: VarId, mut terms: Vec<(VarId, i64)>) {
        terms.push((target, -1));
        self.add_equality(terms, 0);
    }

    /// Convenience: `target <=> AND(literals)`.
    pub fn add_and_equality(&mut self, target: VarId, literals: Vec<Literal>) {
        self.constraints
            .push(Constraint::AndEquality { target, literals });
    }

    /// Convenience: `target == max(vars) - min(vars)`.
    pub fn add_spread(&mut self, target: VarId, vars: Vec<VarId>) {
        self.constraints.push(Constraint::Spread { target, vars });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Appends a decision strategy.
    pub fn add_decision_strategy(&mut self, vars: Vec<VarId>, value: ValueSelection) {
        self.strategies.push(DecisionStrategy { vars, value });
    }

    /// Validates the model for consistency.
    ///
    /// Checks variable references, domains, names, and that boolean-only
    /// constraints only mention boolean variables.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.duplicate_names.first() {
            return Err(format!("duplicate variable name: {name}"));
        }

        for var in &self.vars {
            let (lo, hi) = var.bounds();
            if lo > hi {
                return Err(format!("empty domain: {}", var.name()));
            }
        }

        let check = |id: VarId| -> Result<&Variable, String> {
            self.vars
                .get(id.0)
                .ok_or_else(|| format!("undefined variable: #{}", id.0))
        };

        for constraint in &self.constraints {
            match constraint {
                Constraint::Linear {
                    terms,
                    lower,
                    upper,
                } => {
                    if lower > upper {
                        return Err(format!("linear: lower {lower} exceeds upper {upper}"));
                    }
                    for &(v, _) in terms {
                        check(v)?;
                    }
                }
                Constraint::AndEquality { target, literals } => {
                    if !check(*target)?.is_bool() {
                        return Err(format!("and-equality target #{} is not boolean", target.0));
                    }
                    for lit in literals {
                        if !check(lit.var)?.is_bool() {
                            return Err(format!("literal #{} is not boolean", lit.var.0));
                        }
                    }
                }
                Constraint::Spread { target, vars } => {
                    if vars.is_empty() {
                        return Err("spread: no variables".into());
                    }
                    check(*target)?;
                    for &v in vars {
                        check(v)?;
                    }
                }
            }
        }

        if let Some(objective) = &self.objective {
            for &(v, _) in objective.terms() {
                check(v)?;
            }
        }

        for strategy in &self.strategies {
            for &v in &strategy.vars {
                check(v)?;
            }
        }

        Ok(())
    }

    /// Returns the number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of boolean variables.
    pub fn bool_var_count(&self) -> usize {
        self.vars.iter().filter(|v| v.is_bool()).count()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

fn unit_terms(vars: &[VarId]) -> Vec<(VarId, i64)> {
    vars.iter().map(|&v| (v, 1)).collect()
}
