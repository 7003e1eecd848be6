//! Case execution and outcome classification.
//!
//! Invokes a theory body once for one tuple and turns whatever happens into
//! exactly one `CaseOutcome`. Directive signals and panics stop at this
//! boundary; nothing a body does can skip the next case except an explicit
//! abort.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::directive::{CaseArgs, CaseResult, Signal};
use crate::value::ValueTuple;

/// A callable theory body
pub type TestBody = Arc<dyn Fn(&CaseArgs<'_>) -> CaseResult + Send + Sync>;

/// Wrap a closure as a `TestBody`
pub fn body<F>(f: F) -> TestBody
where
    F: Fn(&CaseArgs<'_>) -> CaseResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Classification of a single executed case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseOutcome {
    /// Ran to completion with every directive satisfied
    Success,
    /// An assertion failed
    Failure(String),
    /// An assumption was not met
    Inconclusive(String),
    /// Any other fault
    Error(String),
}

impl CaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaseOutcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Failure(_))
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self, CaseOutcome::Inconclusive(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CaseOutcome::Error(_))
    }

    /// Failure detail, inconclusive reason or error fault
    pub fn message(&self) -> Option<&str> {
        match self {
            CaseOutcome::Success => None,
            CaseOutcome::Failure(m) | CaseOutcome::Inconclusive(m) | CaseOutcome::Error(m) => {
                Some(m)
            }
        }
    }
}

/// What one invocation produced
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub outcome: CaseOutcome,
    /// Set when the body asked for the whole run to stop
    pub abort: Option<String>,
    pub elapsed: Duration,
}

/// Invoke `body` once with `tuple` bound to `names`
///
/// With `catch_panics` a panicking body is classified as `Error`; without it
/// the panic propagates to the caller.
pub fn execute_case(body: &TestBody, names: &[String], tuple: &ValueTuple, catch_panics: bool) -> Execution {
    let args = CaseArgs::new(names, tuple);
    let start = Instant::now();

    let result = if catch_panics {
        catch_unwind(AssertUnwindSafe(|| body(&args))).unwrap_or_else(|payload| {
            Err(Signal::Error(format!("panicked: {}", panic_message(payload.as_ref()))))
        })
    } else {
        body(&args)
    };

    let elapsed = start.elapsed();
    let (outcome, abort) = classify(result);
    Execution { outcome, abort, elapsed }
}

/// Map a body's result onto the four case outcomes
pub fn classify(result: CaseResult) -> (CaseOutcome, Option<String>) {
    match result {
        Ok(()) => (CaseOutcome::Success, None),
        Err(Signal::Inconclusive(reason)) => (CaseOutcome::Inconclusive(reason), None),
        Err(Signal::Failure(detail)) => (CaseOutcome::Failure(detail), None),
        Err(Signal::Error(fault)) => (CaseOutcome::Error(fault), None),
        Err(Signal::Abort(reason)) => (
            CaseOutcome::Error(format!("aborted: {}", reason)),
            Some(reason),
        ),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
