//! Allow-listed functions and constants

use crate::error::{Error, Result};

/// Named constants
pub const CONSTANTS: &[(&str, f64)] = &[("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

/// Allow-listed functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Absolute value
    Abs,
    /// Round half-to-even, optional digit count
    Round,
    /// Smallest argument
    Min,
    /// Largest argument
    Max,
    /// Sum of arguments
    Sum,
    /// `pow(x, y)`
    Pow,
    /// Square root
    Sqrt,
    /// Sine
    Sin,
    /// Cosine
    Cos,
    /// Tangent
    Tan,
    /// Arc sine
    Asin,
    /// Arc cosine
    Acos,
    /// Arc tangent
    Atan,
    /// Natural log, optional base
    Log,
    /// Base-10 log
    Log10,
    /// Exponential
    Exp,
    /// Factorial of a non-negative integer
    Factorial,
    /// Ceiling
    Ceil,
    /// Floor
    Floor,
}

impl Function {
    /// Resolve a name against the allow-list
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "abs" => Self::Abs,
            "round" => Self::Round,
            "min" => Self::Min,
            "max" => Self::Max,
            "sum" => Self::Sum,
            "pow" => Self::Pow,
            "sqrt" => Self::Sqrt,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "exp" => Self::Exp,
            "factorial" => Self::Factorial,
            "ceil" => Self::Ceil,
            "floor" => Self::Floor,
            _ => return None,
        };
        Some(function)
    }

    /// Name as written in expressions
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Pow => "pow",
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Exp => "exp",
            Self::Factorial => "factorial",
            Self::Ceil => "ceil",
            Self::Floor => "floor",
        }
    }

    /// Accepted argument counts (inclusive)
    #[must_use]
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Self::Round | Self::Log => (1, 2),
            Self::Min | Self::Max => (1, usize::MAX),
            Self::Sum => (0, usize::MAX),
            Self::Pow => (2, 2),
            _ => (1, 1),
        }
    }

    /// Apply the function; argument count has already been checked
    pub fn apply(&self, args: &[f64]) -> Result<f64> {
        let x = args.first().copied().unwrap_or(0.0);
        let value = match self {
            Self::Abs => x.abs(),
            Self::Round => match args.get(1) {
                None => x.round_ties_even(),
                Some(digits) => round_to(x, integral(*digits, "round")?),
            },
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Sum => args.iter().sum(),
            Self::Pow => x.powf(args[1]),
            Self::Sqrt => domain(x >= 0.0, x.sqrt())?,
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => domain((-1.0..=1.0).contains(&x), x.asin())?,
            Self::Acos => domain((-1.0..=1.0).contains(&x), x.acos())?,
            Self::Atan => x.atan(),
            Self::Log => match args.get(1) {
                None => domain(x > 0.0, x.ln())?,
                Some(base) => domain(x > 0.0 && *base > 0.0 && *base != 1.0, x.log(*base))?,
            },
            Self::Log10 => domain(x > 0.0, x.log10())?,
            Self::Exp => x.exp(),
            Self::Factorial => factorial(x)?,
            Self::Ceil => x.ceil(),
            Self::Floor => x.floor(),
        };
        Ok(value)
    }
}

/// Look up a named constant
#[must_use]
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

fn domain(ok: bool, value: f64) -> Result<f64> {
    if ok {
        Ok(value)
    } else {
        Err(Error::Execution("math domain error".to_string()))
    }
}

fn integral(value: f64, function: &str) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(Error::Execution(format!(
            "{function}() requires an integer argument"
        )));
    }
    Ok(value as i64)
}

/// Half-to-even rounding at `digits` decimal places
///
/// Counts beyond what an f64 can resolve leave `x` as is (positive) or
/// round it to zero (negative).
fn round_to(x: f64, digits: i64) -> f64 {
    const MAX_DIGITS: i64 = 400;
    let digits = i32::try_from(digits.clamp(-MAX_DIGITS, MAX_DIGITS)).unwrap_or(0);
    let scale = 10f64.powi(digits);
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    if scale == 0.0 {
        return 0.0;
    }
    let rounded = scaled.round_ties_even() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}

fn factorial(x: f64) -> Result<f64> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(Error::Execution(
            "factorial() only accepts integral non-negative values".to_string(),
        ));
    }
    if x > 170.0 {
        return Err(Error::Execution("factorial() result too large".to_string()));
    }
    Ok((1..=x as u64).fold(1.0, |acc, n| acc * n as f64))
}
