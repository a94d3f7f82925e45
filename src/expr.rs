// SPDX: CC0-1.0

use crate::{
    eval::{self, EvalErr, Program},
    lex::{Lexer, SubStr},
    parse::{self, ParseErr},
    Number,
};
use core::fmt;
use std::sync::Arc;

/// A compiled expression in the single variable `x`.
#[derive(Debug)]
pub struct Expression {
    src: Arc<String>,
    prog: Program,
}

impl Expression {
    pub fn new(src: impl Into<String>) -> Result<Self, ParseErr> {
        let src = Arc::new(src.into());
        let prog = parse::parse(Lexer::new(&src), &SubStr::all(Arc::clone(&src)))?;
        Ok(Self { src, prog })
    }

    pub fn program(&self) -> &Program {
        &self.prog
    }

    pub fn eval(&self, x: Number) -> Result<Number, EvalErr> {
        self.eval_with(x, &mut Vec::new())
    }

    /// Like [`Expression::eval`], reusing `stack` between calls.
    pub fn eval_with(&self, x: Number, stack: &mut Vec<Number>) -> Result<Number, EvalErr> {
        eval::eval(&self.prog, x, stack)
    }

    /// Returns `f(x)` as a closure, `None` wherever the expression is undefined.
    pub fn sampler(&self) -> impl FnMut(Number) -> Option<Number> + '_ {
        let mut stack = Vec::new();
        move |x| self.eval_with(x, &mut stack).ok()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.src)
    }
}

/// What evaluating an expression at one point amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Value(Number),
    /// The expression could not be compiled or is malformed.
    Invalid,
    /// Division by zero, domain violation, or a non-finite result.
    Undefined,
    /// Finite, but larger in magnitude than the caller's bound.
    Overflow(Number),
}

impl Outcome {
    /// Compiles and evaluates `src` in one go.
    pub fn of(src: &str, x: Number, bound: Number) -> Self {
        match Expression::new(src) {
            Ok(expr) => Self::classify(expr.eval(x), bound),
            Err(_) => Self::Invalid,
        }
    }

    pub fn classify(result: Result<Number, EvalErr>, bound: Number) -> Self {
        match result {
            Ok(val) if val.abs() > bound => Self::Overflow(val),
            Ok(val) => Self::Value(val),
            Err(err) if err.is_malformed() => Self::Invalid,
            Err(_) => Self::Undefined,
        }
    }

    pub const fn value(&self) -> Option<Number> {
        match self {
            Self::Value(val) => Some(*val),
            Self::Invalid | Self::Undefined | Self::Overflow(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(val) => write!(f, "{val}"),
            Self::Invalid => write!(f, "invalid expression"),
            Self::Undefined => write!(f, "undefined"),
            Self::Overflow(val) => write!(f, "out of range ({val:e})"),
        }
    }
}
