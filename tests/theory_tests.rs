//! # Theory Behaviour Test Suite
//!
//! End-to-end checks of resolution, enumeration, execution and aggregation
//! against a fixture shaped like a typical theory fixture: a few datapoint
//! fields, a datapoint array, a null object, and a mix of theories and plain
//! parameterized tests.

use std::sync::{Arc, Mutex};

use theorem::{
    assert_close, assert_that, assume, body, CaseArgs, CaseResult, Datapoint, DatapointScope,
    EnumType, ParameterDecl, TestMethod, TheoryResult, TheoryRunner, TheoryStatus, Value,
    ValueSource, ValueTuple, ValueType,
};

/// Test helper: the shared fixture scope
fn fixture() -> DatapointScope {
    DatapointScope::new("TheoryFixture")
        .with(Datapoint::single("i100", ValueType::Int, 100).unwrap())
        .with(Datapoint::single("i0", ValueType::Int, 0).unwrap())
        .with(Datapoint::single("neg", ValueType::Int, -1).unwrap())
        .with(Datapoint::single("nullObj", ValueType::Object, Value::Null).unwrap())
        .with(Datapoint::many("vals", ValueType::Str, ["xyz1", "xyz2", "xyz3"]).unwrap())
}

fn levels() -> ValueType {
    ValueType::Enum(EnumType::new("Level", ["Low", "Medium", "High"]).unwrap())
}

fn run(method: &TestMethod) -> TheoryResult {
    TheoryRunner::default().run(method, &fixture()).unwrap()
}

fn noop() -> theorem::TestBody {
    body(|_| Ok(()))
}

fn square_root_test(args: &CaseArgs) -> CaseResult {
    let d = args.float_at(0)?;
    assume(d > 0.0, "d > 0")?;
    let root = d.sqrt();
    assert_close(root * root, d, 0.000001)?;
    assert_that(root > 0.0, "root > 0")
}

fn square_root_theory(name: &str, values: [f64; 3]) -> TestMethod {
    TestMethod::theory(
        name,
        vec![ParameterDecl::new("d", ValueType::Float).with_values(values)],
        body(square_root_test),
    )
}

// === RUNNABILITY ===

#[test]
fn test_theory_with_no_arguments_is_treated_as_test() {
    let result = run(&TestMethod::theory("TheoryWithNoArguments", vec![], noop()));
    assert!(result.is_runnable());
    assert_eq!(result.case_count(), 1);
    assert_eq!(result.status, TheoryStatus::Succeeded);
}

#[test]
fn test_theory_with_no_datapoints_is_not_runnable() {
    let method = TestMethod::theory(
        "TheoryWithArgumentsButNoDatapoints",
        vec![ParameterDecl::new("d", ValueType::Float), ParameterDecl::new("x", ValueType::Int)],
        noop(),
    );
    let result = run(&method);

    assert_eq!(result.status, TheoryStatus::NotRunnable);
    assert_eq!(result.case_count(), 0);
    assert!(result.records.is_empty());
    assert!(result.not_runnable.as_deref().unwrap_or("").contains("`d`"));
}

#[test]
fn test_not_runnable_never_invokes_body() {
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let method = TestMethod::theory(
        "NeverRuns",
        vec![ParameterDecl::new("flag", ValueType::Bool), ParameterDecl::new("w", ValueType::Class("Widget".to_string()))],
        body(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        }),
    );
    let result = run(&method);

    assert_eq!(result.status, TheoryStatus::NotRunnable);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn test_theory_with_datapoints_is_runnable() {
    let method = TestMethod::theory(
        "TheoryWithArgumentsAndDatapoints",
        vec![ParameterDecl::new("x", ValueType::Int), ParameterDecl::new("y", ValueType::Int)],
        noop(),
    );
    let result = run(&method);

    assert!(result.is_runnable());
    assert_eq!(result.case_count(), 9);
}

// === SYNTHESIS ===

#[test]
fn test_boolean_arguments_are_supplied_automatically() {
    let method = TestMethod::theory(
        "TestWithBooleanArguments",
        vec![ParameterDecl::new("a", ValueType::Bool), ParameterDecl::new("b", ValueType::Bool)],
        noop(),
    );
    let result = run(&method);

    assert!(result.is_runnable());
    assert_eq!(result.case_count(), 4);
    let first: Vec<&ValueTuple> = result.tuples().collect();
    assert_eq!(*first[0], ValueTuple::new(vec![Value::Bool(false), Value::Bool(false)]));
    assert_eq!(*first[3], ValueTuple::new(vec![Value::Bool(true), Value::Bool(true)]));
}

#[test]
fn test_enum_arguments_are_supplied_automatically() {
    let method = TestMethod::theory(
        "TestWithEnumAsArgument",
        vec![ParameterDecl::new("level", levels())],
        body(|args| {
            let member = args.enum_at(0)?;
            assert_that(["Low", "Medium", "High"].contains(&member), "known member")
        }),
    );
    let result = run(&method);

    assert!(result.is_runnable());
    assert_eq!(result.case_count(), 3);
    let members: Vec<String> = result.tuples().map(|t| t.values()[0].to_string()).collect();
    assert_eq!(members, vec!["Level.Low", "Level.Medium", "Level.High"]);
}

// === DATAPOINT SOURCES ===

#[test]
fn test_null_datapoint_is_ok() {
    let method = TestMethod::theory(
        "NullDatapointIsOK",
        vec![ParameterDecl::new("o", ValueType::Object)],
        noop(),
    );
    let result = run(&method);

    assert_eq!(result.case_count(), 1);
    assert_eq!(result.status, TheoryStatus::Succeeded);
    assert_eq!(result.records[0].tuple, ValueTuple::new(vec![Value::Null]));
}

#[test]
fn test_array_with_datapoints_attribute_is_used() {
    let method = TestMethod::theory(
        "ArrayWithDatapointsAttributeIsUsed",
        vec![ParameterDecl::new("s", ValueType::Str)],
        body(|args| {
            let s = args.str_at(0)?.unwrap_or("");
            assert_that(s.starts_with("xyz"), "s starts with \"xyz\"")
        }),
    );
    let result = run(&method);

    assert_eq!(result.case_count(), 3);
    assert_eq!(result.tally.success, 3);
    assert_eq!(result.status, TheoryStatus::Succeeded);
}

#[test]
fn test_simple_test_ignores_datapoints() {
    let method = TestMethod::cases(
        "TestWithArguments",
        vec![ParameterDecl::new("x", ValueType::Int), ParameterDecl::new("y", ValueType::Int)],
        vec![
            ValueTuple::new(vec![Value::Int(2), Value::Int(3)]),
            ValueTuple::new(vec![Value::Int(4), Value::Int(5)]),
        ],
        noop(),
    );
    let result = run(&method);

    assert_eq!(result.case_count(), 2);
    assert_eq!(result.records[1].tuple, ValueTuple::new(vec![Value::Int(4), Value::Int(5)]));
}

// === CLASSIFICATION ===

#[test]
fn test_square_root_with_all_good_values() {
    let result = run(&square_root_theory("SquareRootWithAllGoodValues", [12.0, 4.0, 9.0]));
    assert_eq!(result.status, TheoryStatus::Succeeded);
    assert_eq!(result.tally.success, 3);
}

#[test]
fn test_square_root_with_one_bad_value() {
    let result = run(&square_root_theory("SquareRootWithOneBadValue", [12.0, -4.0, 9.0]));

    assert_eq!(result.status, TheoryStatus::Succeeded);
    assert_eq!(result.case_count(), 3);
    assert_eq!(result.tally.inconclusive, 1);
    assert_eq!(result.tally.failure, 0);
    assert!(result.records[1].outcome.is_inconclusive());
}

#[test]
fn test_square_root_with_all_bad_values() {
    let result = run(&square_root_theory("SquareRootWithAllBadValues", [-12.0, -4.0, -9.0]));

    assert_eq!(result.status, TheoryStatus::Inconclusive);
    assert_eq!(result.case_count(), 3);
    assert_eq!(result.problems().count(), 0);
}

#[test]
fn test_sqrt_times_itself_gives_original() {
    let scope = DatapointScope::new("SqrtTests")
        .with(Datapoint::single("zero", ValueType::Float, 0.0).unwrap())
        .with(Datapoint::single("positive", ValueType::Float, 1.0).unwrap())
        .with(Datapoint::single("negative", ValueType::Float, -1.0).unwrap())
        .with(Datapoint::single("max", ValueType::Float, f64::MAX).unwrap())
        .with(Datapoint::single("infinity", ValueType::Float, f64::INFINITY).unwrap());

    let method = TestMethod::theory(
        "SqrtTimesItselfGivesOriginal",
        vec![ParameterDecl::new("num", ValueType::Float)],
        body(|args| {
            let num = args.float_at(0)?;
            assume(num >= 0.0 && num < f64::MAX, "0 <= num < MAX")?;
            let sqrt = num.sqrt();
            assert_that(sqrt >= 0.0, "sqrt >= 0")?;
            assert_close(sqrt * sqrt, num, 0.000001)
        }),
    );
    let result = TheoryRunner::default().run(&method, &scope).unwrap();

    assert_eq!(result.case_count(), 5);
    assert_eq!(result.tally.success, 2);
    assert_eq!(result.tally.inconclusive, 3);
    assert_eq!(result.status, TheoryStatus::Succeeded);
}

#[test]
fn test_failing_case_is_reported_with_description() {
    let method = TestMethod::theory(
        "AllIntsPositive",
        vec![ParameterDecl::new("x", ValueType::Int)],
        body(|args| assert_that(args.int_at(0)? > 0, "x > 0")),
    );
    let result = run(&method);

    assert_eq!(result.status, TheoryStatus::Failed);
    assert_eq!(result.case_count(), 3);
    let failures: Vec<(String, Option<&str>)> = result
        .problems()
        .map(|r| (r.tuple.to_string(), r.outcome.message()))
        .collect();
    assert_eq!(
        failures,
        vec![("(0)".to_string(), Some("x > 0")), ("(-1)".to_string(), Some("x > 0"))]
    );
}

// === ENUMERATION ORDER ===

#[test]
fn test_enumeration_is_odometer_ordered_and_reproducible() {
    let method = TestMethod::theory(
        "Ordered",
        vec![
            ParameterDecl::new("x", ValueType::Int),
            ParameterDecl::new("flag", ValueType::Bool),
        ],
        noop(),
    );
    let first = run(&method);
    let second = run(&method);

    let expected: Vec<ValueTuple> = [100, 0, -1]
        .iter()
        .flat_map(|&x| {
            [false, true]
                .iter()
                .map(move |&b| ValueTuple::new(vec![Value::Int(x), Value::Bool(b)]))
        })
        .collect();
    let tuples: Vec<ValueTuple> = first.tuples().cloned().collect();
    assert_eq!(tuples, expected);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert!(first.tuples().eq(second.tuples()));
}

#[test]
fn test_inline_values_source_is_reported() {
    let method = square_root_theory("Inline", [1.0, 4.0, 9.0]);
    match theorem::prepare(&method, &fixture()).unwrap() {
        theorem::Preparation::Ready(spec) => {
            assert!(matches!(spec.parameters()[0].source(), ValueSource::Inline(_)));
            assert_eq!(spec.case_count(), Some(3));
        }
        other => panic!("Expected ready spec, got {:?}", other),
    }
}
