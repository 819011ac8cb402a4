use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use super::RuleError;
use crate::workflows::eligibility::context::{ContextValue, EvaluationContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Literal {
    fn to_value(&self) -> ContextValue {
        match self {
            Literal::Number(value) => ContextValue::Number(*value),
            Literal::Text(value) => ContextValue::Text(value.clone()),
            Literal::Bool(value) => ContextValue::Bool(*value),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Either side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Variable(String),
}

impl Operand {
    fn resolve(&self, context: &EvaluationContext) -> Result<ContextValue, RuleError> {
        match self {
            Operand::Literal(literal) => Ok(literal.to_value()),
            Operand::Variable(name) => context
                .get(name)
                .cloned()
                .ok_or_else(|| RuleError::UnboundVariable(name.clone())),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(literal) => write!(f, "{literal}"),
            Operand::Variable(name) => f.write_str(name),
        }
    }
}

/// Parsed rule expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Comparison {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
    Literal(Literal),
    Variable(String),
}

impl Expr {
    pub fn evaluate(&self, context: &EvaluationContext) -> Result<bool, RuleError> {
        match self {
            Expr::Comparison { left, op, right } => {
                compare(&left.resolve(context)?, *op, &right.resolve(context)?)
            }
            Expr::LogicalAnd(left, right) => {
                Ok(left.evaluate(context)? && right.evaluate(context)?)
            }
            Expr::LogicalOr(left, right) => {
                Ok(left.evaluate(context)? || right.evaluate(context)?)
            }
            Expr::Literal(literal) => as_bool(&literal.to_value()),
            Expr::Variable(name) => {
                let value = context
                    .get(name)
                    .ok_or_else(|| RuleError::UnboundVariable(name.clone()))?;
                as_bool(value)
            }
        }
    }

    pub(crate) fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Comparison { left, right, .. } => {
                for operand in [left, right] {
                    if let Operand::Variable(name) = operand {
                        names.insert(name);
                    }
                }
            }
            Expr::LogicalAnd(left, right) | Expr::LogicalOr(left, right) => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Literal(_) => {}
            Expr::Variable(name) => {
                names.insert(name);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Comparison { left, op, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::LogicalAnd(left, right) => write!(f, "({left} && {right})"),
            Expr::LogicalOr(left, right) => write!(f, "({left} || {right})"),
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Variable(name) => f.write_str(name),
        }
    }
}

fn as_bool(value: &ContextValue) -> Result<bool, RuleError> {
    match value {
        ContextValue::Bool(flag) => Ok(*flag),
        other => Err(RuleError::TypeMismatch(format!(
            "expected a boolean, found {} {other}",
            other.type_name()
        ))),
    }
}

fn compare(left: &ContextValue, op: CompareOp, right: &ContextValue) -> Result<bool, RuleError> {
    let ordering = match (left, right) {
        (ContextValue::Number(a), ContextValue::Number(b)) => a.partial_cmp(b),
        (ContextValue::Text(a), ContextValue::Text(b)) => Some(a.cmp(b)),
        (ContextValue::Bool(a), ContextValue::Bool(b)) => match op {
            CompareOp::Eq | CompareOp::Ne => Some(a.cmp(b)),
            _ => {
                return Err(RuleError::TypeMismatch(format!(
                    "booleans only support == and !=, found '{}'",
                    op.symbol()
                )))
            }
        },
        (a, b) => {
            return Err(RuleError::TypeMismatch(format!(
                "cannot compare {} {a} with {} {b}",
                a.type_name(),
                b.type_name()
            )))
        }
    };

    // NaN never satisfies a comparison.
    Ok(ordering.map(|ordering| op.holds(ordering)).unwrap_or(false))
}
