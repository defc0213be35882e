//! Row filtering with an explicit, typed comparator
//!
//! A filter condition has the exact form `<column> <operator> <value>`. The
//! operator is parsed into [`CmpOp`] up front and the value is coerced to the
//! column's kind before any row is inspected, so filtering is a direct value
//! comparison and never evaluates a user-supplied expression.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Comparison operator allowed in a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `==`
    Eq,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl CmpOp {
    /// Whether `ordering` (cell compared to the condition value) satisfies
    /// this operator
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => ordering == Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
        }
    }
}

impl FromStr for CmpOp {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            "==" => Ok(Self::Eq),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            _ => Err(Error::InvalidOperator(token.to_string())),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "==",
            Self::Ge => ">=",
            Self::Le => "<=",
        };
        write!(f, "{}", token)
    }
}

/// A parsed filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Name of the column the condition applies to
    pub column: String,

    /// Comparison operator
    pub op: CmpOp,

    /// Raw value token, coerced against the column's kind at evaluation time
    pub value: String,
}

impl Condition {
    /// Build a condition from its three whitespace-separated words
    pub fn new(column: &str, op: &str, value: &str) -> Result<Self> {
        Ok(Self {
            column: column.to_string(),
            op: op.parse()?,
            value: value.to_string(),
        })
    }

    /// Coerce the value token for a numeric column
    pub fn numeric_value(&self) -> Result<f64> {
        self.value
            .parse::<f64>()
            .map_err(|_| Error::InvalidFilterValue {
                column: self.column.clone(),
                value: self.value.clone(),
            })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}
