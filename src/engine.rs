//! TheoryRunner - resolves, enumerates, executes and aggregates one theory
//!
//! Control flow for a theory is resolver, then enumerator and executor
//! interleaved one tuple at a time, then the aggregator. Nothing is shared
//! between runs beyond the read-only datapoint scope, so separate runners
//! may work on separate theories from separate threads.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::datapoint::DatapointScope;
use crate::enumerator::{product_size, Combinations};
use crate::error::{EngineError, EngineResult};
use crate::executor::{execute_case, CaseOutcome, TestBody};
use crate::resolver::{resolve_parameters, Parameter, ParameterDecl, Resolution};
use crate::result::{Aggregator, CaseRecord, Completion, Tally, TheoryResult};
use crate::value::{Value, ValueTuple};

/// Cooperative cancellation, checked between cases
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for the TheoryRunner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Classify a panicking body as an error instead of unwinding the runner
    pub catch_panics: bool,

    /// Refuse theories whose case count exceeds this
    pub case_limit: Option<u64>,

    /// Log every case at info level rather than debug
    pub verbose: bool,

    /// Stop enumeration when set
    pub cancel: Option<CancelToken>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            case_limit: None,
            verbose: false,
            cancel: None,
        }
    }
}

/// Cumulative statistics across every theory a runner has run
#[derive(Debug, Clone, Default)]
pub struct RunnerStats {
    /// Theories that reached enumeration
    pub theories_run: u32,

    /// Theories reported not runnable
    pub not_runnable: u32,

    /// Theories stopped by cancellation or abort
    pub interrupted: u32,

    /// Total cases executed
    pub cases_executed: u64,

    /// Outcome counts over all cases
    pub tally: Tally,

    /// Total time spent executing bodies
    pub total_runtime: Duration,
}

/// A test method as handed over by discovery
#[derive(Clone)]
pub enum TestMethod {
    /// Runs once per combination of its parameters' pools
    Theory {
        name: String,
        params: Vec<ParameterDecl>,
        body: TestBody,
    },
    /// Runs exactly its declared argument tuples and ignores datapoints
    Cases {
        name: String,
        params: Vec<ParameterDecl>,
        cases: Vec<ValueTuple>,
        body: TestBody,
    },
}

impl TestMethod {
    pub fn theory(name: &str, params: Vec<ParameterDecl>, body: TestBody) -> Self {
        TestMethod::Theory {
            name: name.to_string(),
            params,
            body,
        }
    }

    pub fn cases(name: &str, params: Vec<ParameterDecl>, cases: Vec<ValueTuple>, body: TestBody) -> Self {
        TestMethod::Cases {
            name: name.to_string(),
            params,
            cases,
            body,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestMethod::Theory { name, .. } | TestMethod::Cases { name, .. } => name,
        }
    }

    pub fn params(&self) -> &[ParameterDecl] {
        match self {
            TestMethod::Theory { params, .. } | TestMethod::Cases { params, .. } => params,
        }
    }
}

impl fmt::Debug for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMethod::Theory { name, params, .. } => f
                .debug_struct("Theory")
                .field("name", name)
                .field("params", params)
                .finish(),
            TestMethod::Cases { name, params, cases, .. } => f
                .debug_struct("Cases")
                .field("name", name)
                .field("params", params)
                .field("cases", &cases.len())
                .finish(),
        }
    }
}

/// Where a prepared test's tuples come from
#[derive(Debug, Clone, PartialEq)]
pub enum CasePlan {
    /// Cartesian product of resolved pools
    Product(Vec<Parameter>),
    /// A fixed list of declared tuples
    Fixed(Vec<ValueTuple>),
}

/// A theory ready to enumerate. Never mutated after preparation.
#[derive(Clone)]
pub struct TheorySpec {
    name: String,
    names: Vec<String>,
    plan: CasePlan,
    body: TestBody,
}

impl TheorySpec {
    pub fn new(name: &str, parameters: Vec<Parameter>, body: TestBody) -> Self {
        Self {
            name: name.to_string(),
            names: parameters.iter().map(|p| p.name().to_string()).collect(),
            plan: CasePlan::Product(parameters),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &CasePlan {
        &self.plan
    }

    /// Resolved parameters; empty for a fixed-case test
    pub fn parameters(&self) -> &[Parameter] {
        match &self.plan {
            CasePlan::Product(parameters) => parameters,
            CasePlan::Fixed(_) => &[],
        }
    }

    /// Number of cases a full run executes; `None` on overflow
    pub fn case_count(&self) -> Option<u64> {
        match &self.plan {
            CasePlan::Product(parameters) => product_size(parameters.iter().map(|p| p.values().len())),
            CasePlan::Fixed(cases) => Some(cases.len() as u64),
        }
    }

    /// Tuples in execution order, produced lazily for theories
    pub fn tuples(&self) -> Box<dyn Iterator<Item = ValueTuple> + '_> {
        match &self.plan {
            CasePlan::Product(parameters) => Box::new(Combinations::new(parameters)),
            CasePlan::Fixed(cases) => Box::new(cases.iter().cloned()),
        }
    }

    /// The tuple at `index` in execution order
    pub fn tuple_at(&self, index: u64) -> Option<ValueTuple> {
        match &self.plan {
            CasePlan::Product(parameters) => Combinations::new(parameters).tuple_at(index),
            CasePlan::Fixed(cases) => usize::try_from(index).ok().and_then(|i| cases.get(i).cloned()),
        }
    }
}

impl fmt::Debug for TheorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TheorySpec")
            .field("name", &self.name)
            .field("plan", &self.plan)
            .finish()
    }
}

/// Result of preparing a test method
#[derive(Debug, Clone)]
pub enum Preparation {
    Ready(TheorySpec),
    NotRunnable { name: String, reason: String },
}

/// Build a spec from a test method and the fixture's datapoints
pub fn prepare(method: &TestMethod, scope: &DatapointScope) -> EngineResult<Preparation> {
    match method {
        TestMethod::Theory { name, params, body } => {
            validate_inline_values(name, params)?;
            prepare_theory(name, params, body, scope)
        }
        TestMethod::Cases { name, params, cases, body } => {
            if cases.is_empty() && !params.is_empty() {
                return Ok(Preparation::NotRunnable {
                    name: name.clone(),
                    reason: "No arguments were provided".to_string(),
                });
            }
            validate_cases(name, params, cases)?;

            // A parameterless test is still one invocation
            let cases = if cases.is_empty() {
                vec![ValueTuple::empty()]
            } else {
                cases.clone()
            };

            Ok(Preparation::Ready(TheorySpec {
                name: name.clone(),
                names: params.iter().map(|p| p.name.clone()).collect(),
                plan: CasePlan::Fixed(cases),
                body: body.clone(),
            }))
        }
    }
}

fn prepare_theory(
    name: &str,
    params: &[ParameterDecl],
    body: &TestBody,
    scope: &DatapointScope,
) -> EngineResult<Preparation> {
    match resolve_parameters(params, scope) {
        Resolution::Ready(parameters) => {
            log::debug!("Theory {} resolved {} parameters", name, parameters.len());
            Ok(Preparation::Ready(TheorySpec::new(name, parameters, body.clone())))
        }
        Resolution::NotRunnable { parameter, ty } => Ok(Preparation::NotRunnable {
            name: name.to_string(),
            reason: format!("No datapoints of type {} for parameter `{}`", ty, parameter),
        }),
    }
}

/// Parameter-level values must fit the declared type like any datapoint
fn validate_inline_values(name: &str, params: &[ParameterDecl]) -> EngineResult<()> {
    for param in params {
        if let Some(values) = &param.inline {
            check_arguments(name, std::iter::repeat(param).zip(values))?;
        }
    }
    Ok(())
}

fn validate_cases(name: &str, params: &[ParameterDecl], cases: &[ValueTuple]) -> EngineResult<()> {
    for (index, case) in cases.iter().enumerate() {
        if case.len() != params.len() {
            return Err(EngineError::CaseArity {
                test: name.to_string(),
                index,
                expected: params.len(),
                found: case.len(),
            });
        }
        check_arguments(name, params.iter().zip(case.values()))?;
    }
    Ok(())
}

fn check_arguments<'a, I>(name: &str, pairs: I) -> EngineResult<()>
where
    I: IntoIterator<Item = (&'a ParameterDecl, &'a Value)>,
{
    for (param, value) in pairs {
        if !value.conforms_to(&param.ty) {
            return Err(EngineError::ArgumentType {
                test: name.to_string(),
                parameter: param.name.clone(),
                declared: param.ty.to_string(),
                found: value.kind(),
            });
        }
    }
    Ok(())
}

/// Main theory execution engine
#[derive(Debug, Default)]
pub struct TheoryRunner {
    /// Configuration for this runner
    pub config: RunnerConfig,

    /// Statistics about execution
    pub stats: RunnerStats,
}

impl TheoryRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            stats: RunnerStats::default(),
        }
    }

    /// Prepare and run `method` against `scope`
    pub fn run(&mut self, method: &TestMethod, scope: &DatapointScope) -> EngineResult<TheoryResult> {
        match prepare(method, scope)? {
            Preparation::Ready(spec) => self.run_spec(&spec),
            Preparation::NotRunnable { name, reason } => {
                log::warn!("{} is not runnable: {}", name, reason);
                self.stats.not_runnable += 1;
                Ok(TheoryResult::not_runnable(&name, reason))
            }
        }
    }

    /// Enumerate and execute a prepared spec
    pub fn run_spec(&mut self, spec: &TheorySpec) -> EngineResult<TheoryResult> {
        let count = spec.case_count().ok_or_else(|| EngineError::CaseCountOverflow {
            test: spec.name.clone(),
        })?;

        if let Some(limit) = self.config.case_limit {
            if count > limit {
                return Err(EngineError::CaseLimitExceeded {
                    test: spec.name.clone(),
                    count,
                    limit,
                });
            }
        }

        log::debug!("Running {} with {} cases", spec.name, count);
        self.stats.theories_run += 1;

        let mut aggregator = Aggregator::new(&spec.name);
        let mut completion = Completion::Exhausted;

        for tuple in spec.tuples() {
            if self.cancelled() {
                log::warn!("{} cancelled after {} of {} cases", spec.name, aggregator.len(), count);
                completion = Completion::Cancelled;
                break;
            }

            let execution = execute_case(&spec.body, &spec.names, &tuple, self.config.catch_panics);
            self.log_case(&spec.name, aggregator.len() as u64, &tuple, &execution.outcome);

            self.stats.cases_executed += 1;
            self.stats.tally.record(&execution.outcome);
            self.stats.total_runtime += execution.elapsed;

            let abort = execution.abort.clone();
            aggregator.push(tuple, execution);

            if let Some(reason) = abort {
                log::warn!("{} aborted at case {}: {}", spec.name, aggregator.len() - 1, reason);
                completion = Completion::Aborted(reason);
                break;
            }
        }

        if completion != Completion::Exhausted {
            self.stats.interrupted += 1;
        }

        let result = aggregator.finish(completion);
        log::info!(
            "{} {} ({} cases: {} passed, {} failed, {} inconclusive, {} errors)",
            result.name,
            result.status,
            result.case_count(),
            result.tally.success,
            result.tally.failure,
            result.tally.inconclusive,
            result.tally.error
        );
        Ok(result)
    }

    /// Re-execute the single case at `index`, e.g. to reproduce a failure
    pub fn run_case(&mut self, spec: &TheorySpec, index: u64) -> Option<CaseRecord> {
        let tuple = spec.tuple_at(index)?;
        let execution = execute_case(&spec.body, &spec.names, &tuple, self.config.catch_panics);
        self.log_case(&spec.name, index, &tuple, &execution.outcome);

        self.stats.cases_executed += 1;
        self.stats.tally.record(&execution.outcome);
        self.stats.total_runtime += execution.elapsed;

        Some(CaseRecord {
            index,
            tuple,
            outcome: execution.outcome,
            elapsed: execution.elapsed,
        })
    }

    fn cancelled(&self) -> bool {
        self.config.cancel.as_ref().map_or(false, CancelToken::is_cancelled)
    }

    fn log_case(&self, name: &str, index: u64, tuple: &ValueTuple, outcome: &CaseOutcome) {
        if self.config.verbose {
            log::info!("{} case {} {}: {:?}", name, index, tuple, outcome);
        } else {
            log::debug!("{} case {} {}: {:?}", name, index, tuple, outcome);
        }
    }
}
