//! Datapoint sources visible in a fixture's scope.
//!
//! Discovering which members of a fixture are datapoints is someone else's
//! job. This module receives the already-identified sources, checks that each
//! value fits its declared type, and answers "which sources hold values of
//! exactly type T" in declaration order.

use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::value::{Value, ValueType};

/// Shape of a datapoint source
#[derive(Debug, Clone, PartialEq)]
pub enum DatapointKind {
    /// One candidate value
    Single(Value),
    /// A collection whose every element is a separate candidate
    Many(Vec<Value>),
}

/// A named, typed source of candidate values
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    name: String,
    ty: ValueType,
    kind: DatapointKind,
}

impl Datapoint {
    /// A single-valued source of type `ty`
    pub fn single(name: &str, ty: ValueType, value: impl Into<Value>) -> EngineResult<Self> {
        let value = value.into();
        check_conforms(name, &ty, &value)?;
        Ok(Self {
            name: name.to_string(),
            ty,
            kind: DatapointKind::Single(value),
        })
    }

    /// A multi-valued source whose elements are of type `ty`
    pub fn many<I, V>(name: &str, ty: ValueType, values: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        for value in &values {
            check_conforms(name, &ty, value)?;
        }
        Ok(Self {
            name: name.to_string(),
            ty,
            kind: DatapointKind::Many(values),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared element type
    pub fn value_type(&self) -> &ValueType {
        &self.ty
    }

    pub fn kind(&self) -> &DatapointKind {
        &self.kind
    }

    /// Candidate values contributed by this source, in order
    pub fn values(&self) -> &[Value] {
        match &self.kind {
            DatapointKind::Single(value) => std::slice::from_ref(value),
            DatapointKind::Many(values) => values,
        }
    }
}

fn check_conforms(name: &str, ty: &ValueType, value: &Value) -> EngineResult<()> {
    if value.conforms_to(ty) {
        Ok(())
    } else {
        Err(EngineError::DatapointType {
            source_name: name.to_string(),
            declared: ty.to_string(),
            found: value.kind(),
        })
    }
}

/// The datapoints a fixture can see: its own, then any inherited scope's
#[derive(Debug, Clone, Default)]
pub struct DatapointScope {
    name: String,
    sources: Vec<Datapoint>,
    inherited: Option<Arc<DatapointScope>>,
}

impl DatapointScope {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sources: Vec::new(),
            inherited: None,
        }
    }

    /// A scope with no datapoints at all
    pub fn empty() -> Self {
        Self::new("<empty>")
    }

    /// Add a source; declaration order is kept
    pub fn with(mut self, datapoint: Datapoint) -> Self {
        self.sources.push(datapoint);
        self
    }

    pub fn declare(&mut self, datapoint: Datapoint) {
        self.sources.push(datapoint);
    }

    /// Attach a base or static scope, searched after this one
    pub fn inheriting(mut self, parent: Arc<DatapointScope>) -> Self {
        self.inherited = Some(parent);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.sources.len() + self.inherited.as_ref().map_or(0, |p| p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every source whose element type is exactly `ty`, own sources first
    pub fn sources_for<'a>(&'a self, ty: &ValueType) -> Vec<&'a Datapoint> {
        let mut found: Vec<&Datapoint> = self.sources.iter().filter(|d| &d.ty == ty).collect();
        if let Some(parent) = &self.inherited {
            found.extend(parent.sources_for(ty));
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_many_values() {
        let one = Datapoint::single("zero", ValueType::Float, 0.0).unwrap();
        assert_eq!(one.values(), &[Value::Float(0.0)]);

        let many = Datapoint::many("vals", ValueType::Str, ["xyz1", "xyz2", "xyz3"]).unwrap();
        assert_eq!(many.values().len(), 3);
        assert_eq!(many.values()[2], Value::from("xyz3"));
    }

    #[test]
    fn test_rejects_mismatched_values() {
        let err = Datapoint::single("bad", ValueType::Int, "text").unwrap_err();
        assert_eq!(
            err,
            EngineError::DatapointType {
                source_name: "bad".to_string(),
                declared: "int".to_string(),
                found: "string".to_string(),
            }
        );

        assert!(Datapoint::many("mixed", ValueType::Int, vec![Value::Int(1), Value::Float(2.0)]).is_err());
        assert!(Datapoint::single("null_flag", ValueType::Bool, Value::Null).is_err());
    }

    #[test]
    fn test_null_datapoint_for_reference_type() {
        let null_obj = Datapoint::single("nullObj", ValueType::Object, Value::Null).unwrap();
        assert_eq!(null_obj.values(), &[Value::Null]);
    }

    #[test]
    fn test_lookup_is_by_exact_type_in_declaration_order() {
        let scope = DatapointScope::new("Fixture")
            .with(Datapoint::single("a", ValueType::Int, 1).unwrap())
            .with(Datapoint::single("s", ValueType::Str, "x").unwrap())
            .with(Datapoint::many("b", ValueType::Int, [2, 3]).unwrap());

        let ints: Vec<&str> = scope.sources_for(&ValueType::Int).iter().map(|d| d.name()).collect();
        assert_eq!(ints, vec!["a", "b"]);

        // Strings are objects, but lookup does not widen
        assert!(scope.sources_for(&ValueType::Object).is_empty());
    }

    #[test]
    fn test_inherited_scope_is_searched_after_own() {
        let base = Arc::new(
            DatapointScope::new("Base").with(Datapoint::single("base_one", ValueType::Int, 10).unwrap()),
        );
        let derived = DatapointScope::new("Derived")
            .with(Datapoint::single("own", ValueType::Int, 1).unwrap())
            .inheriting(base);

        let names: Vec<&str> = derived.sources_for(&ValueType::Int).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["own", "base_one"]);
        assert_eq!(derived.len(), 2);
    }
}
