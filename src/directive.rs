//! Assumption and assertion directives used inside a theory body.
//!
//! A body returns `CaseResult`. Directives return `Result<(), Signal>`, so a
//! body stops at the first unmet directive with `?` and the signal travels
//! back to the executor, never past it.
//!
//! ```rust
//! use theorem::directive::{assume, assert_close, CaseArgs, CaseResult};
//!
//! fn square_root(args: &CaseArgs) -> CaseResult {
//!     let d = args.float_at(0)?;
//!     assume(d > 0.0, "d must be positive")?;
//!     let root = d.sqrt();
//!     assert_close(root * root, d, 0.000001)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use crate::value::{Value, ValueTuple};

/// Why a case body stopped before running to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// An assumption did not hold; the input is outside the intended domain
    Inconclusive(String),
    /// An assertion did not hold
    Failure(String),
    /// Any other fault raised by the body
    Error(String),
    /// A fault fatal to the whole run; enumeration stops after this case
    Abort(String),
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Inconclusive(reason) => write!(f, "Assumption not met: {}", reason),
            Signal::Failure(detail) => write!(f, "Assertion failed: {}", detail),
            Signal::Error(fault) => write!(f, "Error: {}", fault),
            Signal::Abort(reason) => write!(f, "Run aborted: {}", reason),
        }
    }
}

/// Result of one invocation of a theory body
pub type CaseResult = Result<(), Signal>;

/// Stop the case as inconclusive unless `condition` holds
pub fn assume(condition: bool, reason: &str) -> CaseResult {
    if condition {
        Ok(())
    } else {
        Err(Signal::Inconclusive(reason.to_string()))
    }
}

/// Fail the case unless `condition` holds
pub fn assert_that(condition: bool, description: &str) -> CaseResult {
    if condition {
        Ok(())
    } else {
        Err(Signal::Failure(description.to_string()))
    }
}

/// Fail the case unless `actual == expected`
pub fn assert_equal<T>(actual: T, expected: T) -> CaseResult
where
    T: PartialEq + fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(Signal::Failure(format!(
            "Expected: {:?}\n  But was:  {:?}",
            expected, actual
        )))
    }
}

/// Fail the case unless `actual` is within `tolerance` of `expected`
///
/// Equal infinities compare equal; NaN never does.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) -> CaseResult {
    let close = actual == expected || (actual - expected).abs() <= tolerance;
    if close {
        Ok(())
    } else {
        Err(Signal::Failure(format!(
            "Expected: {:?} +/- {:?}\n  But was:  {:?}",
            expected, tolerance, actual
        )))
    }
}

/// Fail the case unconditionally
pub fn fail(description: &str) -> CaseResult {
    Err(Signal::Failure(description.to_string()))
}

/// Stop the whole run after this case
pub fn abort(reason: &str) -> CaseResult {
    Err(Signal::Abort(reason.to_string()))
}

/// The values of one case, bound positionally to the parameters
#[derive(Debug, Clone)]
pub struct CaseArgs<'a> {
    names: &'a [String],
    tuple: &'a ValueTuple,
}

impl<'a> CaseArgs<'a> {
    pub fn new(names: &'a [String], tuple: &'a ValueTuple) -> Self {
        Self { names, tuple }
    }

    pub fn len(&self) -> usize {
        self.tuple.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuple.is_empty()
    }

    pub fn tuple(&self) -> &ValueTuple {
        self.tuple
    }

    /// Parameter name at `index`, if the body was given names
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Raw value at `index`
    pub fn value_at(&self, index: usize) -> Result<&'a Value, Signal> {
        self.tuple.get(index).ok_or_else(|| {
            Signal::Error(format!(
                "Argument index {} out of range for {} arguments",
                index,
                self.tuple.len()
            ))
        })
    }

    fn mismatch(&self, index: usize, wanted: &str, found: &Value) -> Signal {
        let label = self
            .name(index)
            .map(|n| format!("`{}`", n))
            .unwrap_or_else(|| format!("#{}", index));
        Signal::Error(format!("Argument {} is {}, not {}", label, found.kind(), wanted))
    }

    pub fn bool_at(&self, index: usize) -> Result<bool, Signal> {
        match self.value_at(index)? {
            Value::Bool(b) => Ok(*b),
            other => Err(self.mismatch(index, "bool", other)),
        }
    }

    pub fn int_at(&self, index: usize) -> Result<i64, Signal> {
        match self.value_at(index)? {
            Value::Int(i) => Ok(*i),
            other => Err(self.mismatch(index, "int", other)),
        }
    }

    pub fn float_at(&self, index: usize) -> Result<f64, Signal> {
        match self.value_at(index)? {
            Value::Float(x) => Ok(*x),
            other => Err(self.mismatch(index, "float", other)),
        }
    }

    /// String argument; `None` for a null datapoint
    pub fn str_at(&self, index: usize) -> Result<Option<&'a str>, Signal> {
        match self.value_at(index)? {
            Value::Str(s) => Ok(Some(s.as_str())),
            Value::Null => Ok(None),
            other => Err(self.mismatch(index, "string", other)),
        }
    }

    /// Enum member name
    pub fn enum_at(&self, index: usize) -> Result<&'a str, Signal> {
        match self.value_at(index)? {
            Value::Enum { member, .. } => Ok(member.as_str()),
            other => Err(self.mismatch(index, "enum", other)),
        }
    }
}
