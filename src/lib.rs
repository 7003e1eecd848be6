//! # Theorem
//!
//! A combinatorial engine for theory-style parameterized tests.
//!
//! A theory declares typed parameters. Each parameter draws candidates from
//! every datapoint of its type in the fixture's scope (or from a synthesis
//! rule for booleans and enums), the engine enumerates the cartesian product
//! of those pools in odometer order, runs the body once per tuple, and folds
//! the per-case outcomes into one verdict.
//!
//! Candidates are always explicit and finite. There is no random generation
//! and no shrinking here.

pub mod datapoint;
pub mod directive;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod resolver;
pub mod result;
pub mod value;

// Re-export core types for easy access
pub use datapoint::{Datapoint, DatapointKind, DatapointScope};
pub use directive::{abort, assert_close, assert_equal, assert_that, assume, fail, CaseArgs, CaseResult, Signal};
pub use engine::{prepare, CancelToken, CasePlan, Preparation, RunnerConfig, RunnerStats, TestMethod, TheoryRunner, TheorySpec};
pub use enumerator::{product_size, Combinations};
pub use error::{EngineError, EngineResult};
pub use executor::{body, execute_case, CaseOutcome, Execution, TestBody};
pub use resolver::{resolve_parameters, resolve_pool, Parameter, ParameterDecl, Resolution, SynthesisRule, ValueSource};
pub use result::{Aggregator, CaseRecord, CaseReport, Completion, Tally, TheoryReport, TheoryResult, TheoryStatus};
pub use value::{EnumType, Value, ValueTuple, ValueType};
