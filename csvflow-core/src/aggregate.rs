//! Column aggregation statistics

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Aggregation statistic over a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Sum of present values
    Sum,
    /// Arithmetic mean of present values
    Mean,
    /// Minimum of present values
    Min,
    /// Maximum of present values
    Max,
    /// Count of present values
    Count,
    /// Product of present values
    Product,
    /// Sample standard deviation (ddof = 1) of present values
    Std,
    /// Sample variance (ddof = 1) of present values
    Var,
}

impl Stat {
    /// Apply this statistic to a column's present numeric values
    ///
    /// `min`, `max`, `mean` of no values and `std`/`var` of fewer than two
    /// values are NaN; the caller decides how to present that.
    pub fn apply(self, values: &[f64]) -> f64 {
        let n = values.len();
        match self {
            Self::Sum => values.iter().sum(),
            Self::Count => n as f64,
            Self::Product => values.iter().product(),
            Self::Mean => {
                if n == 0 {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / n as f64
                }
            }
            Self::Min => values.iter().copied().fold(f64::NAN, f64::min),
            Self::Max => values.iter().copied().fold(f64::NAN, f64::max),
            Self::Var => sample_variance(values),
            Self::Std => sample_variance(values).sqrt(),
        }
    }

    /// Whether this statistic is defined for text columns as well
    pub fn applies_to_text(self) -> bool {
        matches!(self, Self::Count)
    }
}

/// Sample variance with ddof = 1, NaN below two values
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let squared: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    squared / (n - 1) as f64
}

impl FromStr for Stat {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sum" => Ok(Self::Sum),
            "mean" => Ok(Self::Mean),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            "product" => Ok(Self::Product),
            "std" => Ok(Self::Std),
            "var" => Ok(Self::Var),
            _ => Err(Error::UnsupportedOperation(name.to_string())),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Product => "product",
            Self::Std => "std",
            Self::Var => "var",
        };
        write!(f, "{}", name)
    }
}
