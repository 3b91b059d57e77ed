//! CP variable types.

/// Handle to a variable inside a [`CpModel`](super::CpModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An integer variable with a domain [min, max].
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (unique identifier within a model).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

/// A boolean variable (true/false decision).
#[derive(Debug, Clone)]
pub struct BoolVar {
    /// Variable name.
    pub name: String,
}

impl BoolVar {
    /// Creates a new boolean variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A variable stored in a model.
#[derive(Debug, Clone)]
pub enum Variable {
    Bool(BoolVar),
    Int(IntVar),
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Bool(b) => &b.name,
            Variable::Int(i) => &i.name,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Variable::Bool(_))
    }

    /// Initial domain as an integer interval. Booleans are `[0, 1]`.
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Variable::Bool(_) => (0, 1),
            Variable::Int(i) => (i.min, i.max),
        }
    }
}

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    pub var: VarId,
    pub negated: bool,
}

impl Literal {
    /// The literal that is true when `var` is true.
    pub fn positive(var: VarId) -> Self {
        Self {
            var,
            negated: false,
        }
    }

    /// The literal that is true when `var` is false.
    pub fn negative(var: VarId) -> Self {
        Self { var, negated: true }
    }

    /// The opposite literal.
    pub fn not(self) -> Self {
        Self {
            var: self.var,
            negated: !self.negated,
        }
    }

    /// The 0/1 value `var` must take for this literal to hold.
    pub fn satisfying_value(self) -> i64 {
        if self.negated {
            0
        } else {
            1
        }
    }
}

impl From<VarId> for Literal {
    fn from(var: VarId) -> Self {
        Literal::positive(var)
    }
}
