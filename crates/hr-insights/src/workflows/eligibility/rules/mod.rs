//! Boolean rule expressions evaluated against an [`EvaluationContext`].
//!
//! Expressions are parsed once into an [`Expr`] tree and reused; evaluation
//! never coerces a missing variable to a default value.

mod ast;
mod lexer;
mod parser;

use std::collections::BTreeSet;
use std::fmt;

pub use ast::{CompareOp, Expr, Literal, Operand};

use super::context::EvaluationContext;

/// Malformed rule syntax, reported with the byte offset of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// A compiled rule expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    source: String,
    expr: Expr,
}

impl Rule {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, context: &EvaluationContext) -> Result<bool, RuleError> {
        self.expr.evaluate(context)
    }

    /// Names the rule reads from the context.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.expr.collect_variables(&mut names);
        names
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and evaluate `expression` in one step.
pub fn evaluate(expression: &str, context: &EvaluationContext) -> Result<bool, RuleError> {
    Rule::parse(expression)?.evaluate(context)
}
