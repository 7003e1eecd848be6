//! Value pool resolution.
//!
//! Resolves each declared parameter to an ordered sequence of candidate
//! values. Pools are unions by exact type, not by parameter name: every
//! parameter of type T draws from every T-typed datapoint in scope, which is
//! what makes two `int` parameters over a three-value pool produce nine cases.
//!
//! When a type has no explicit datapoints, a small closed set of synthesis
//! rules applies (booleans and enums). Anything else resolves to an empty
//! pool, and the theory is not runnable.

use serde::{Deserialize, Serialize};

use crate::datapoint::DatapointScope;
use crate::value::{Value, ValueType};

/// Where a parameter's candidates came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueSource {
    /// Values attached to the parameter itself
    Inline(Vec<Value>),
    /// Every datapoint of the parameter's type, concatenated in declaration order
    Explicit(Vec<Value>),
    /// Values produced by a synthesis rule
    Synthesized(Vec<Value>),
}

impl ValueSource {
    pub fn values(&self) -> &[Value] {
        match self {
            ValueSource::Inline(v) | ValueSource::Explicit(v) | ValueSource::Synthesized(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

/// A parameter as declared on the test body
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub name: String,
    pub ty: ValueType,
    /// Parameter-level values; when present they replace the type pool
    pub inline: Option<Vec<Value>>,
}

impl ParameterDecl {
    pub fn new(name: &str, ty: ValueType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            inline: None,
        }
    }

    /// Attach parameter-level values
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inline = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A resolved parameter. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    ty: ValueType,
    source: ValueSource,
}

impl Parameter {
    pub fn new(name: &str, ty: ValueType, source: ValueSource) -> Self {
        Self {
            name: name.to_string(),
            ty,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.ty
    }

    pub fn source(&self) -> &ValueSource {
        &self.source
    }

    pub fn values(&self) -> &[Value] {
        self.source.values()
    }
}

/// Closed set of rules for types that need no explicit datapoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisRule {
    /// `[false, true]`
    Boolean,
    /// Every declared member, in declaration order
    EnumMembers,
}

impl SynthesisRule {
    /// The rule covering `ty`, if any
    pub fn for_type(ty: &ValueType) -> Option<Self> {
        match ty {
            ValueType::Bool => Some(SynthesisRule::Boolean),
            ValueType::Enum(_) => Some(SynthesisRule::EnumMembers),
            _ => None,
        }
    }

    pub fn synthesize(self, ty: &ValueType) -> Vec<Value> {
        match (self, ty) {
            (SynthesisRule::Boolean, _) => vec![Value::Bool(false), Value::Bool(true)],
            (SynthesisRule::EnumMembers, ValueType::Enum(e)) => {
                (0..e.members().len()).filter_map(|i| e.value(i)).collect()
            }
            (SynthesisRule::EnumMembers, _) => Vec::new(),
        }
    }
}

/// Resolve the candidate pool for type `ty` in `scope`
///
/// An empty `Explicit` source means nothing matched and nothing could be
/// synthesized.
pub fn resolve_pool(ty: &ValueType, scope: &DatapointScope) -> ValueSource {
    let sources = scope.sources_for(ty);
    let explicit: Vec<Value> = sources
        .iter()
        .flat_map(|d| d.values().iter().cloned())
        .collect();

    if !sources.is_empty() {
        log::debug!(
            "Resolved {} explicit values for {} from {} sources",
            explicit.len(),
            ty,
            sources.len()
        );
        return ValueSource::Explicit(explicit);
    }

    match SynthesisRule::for_type(ty) {
        Some(rule) => {
            let values = rule.synthesize(ty);
            log::debug!("Synthesized {} values for {} via {:?}", values.len(), ty, rule);
            ValueSource::Synthesized(values)
        }
        None => {
            log::debug!("No datapoints for {} in scope {}", ty, scope.name());
            ValueSource::Explicit(Vec::new())
        }
    }
}

/// Outcome of resolving every parameter of a theory
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every parameter has at least one candidate
    Ready(Vec<Parameter>),
    /// The first parameter whose pool came up empty
    NotRunnable { parameter: String, ty: ValueType },
}

/// Resolve declared parameters in order against `scope`
pub fn resolve_parameters(decls: &[ParameterDecl], scope: &DatapointScope) -> Resolution {
    let mut parameters = Vec::with_capacity(decls.len());

    for decl in decls {
        let source = match &decl.inline {
            Some(values) => ValueSource::Inline(values.clone()),
            None => resolve_pool(&decl.ty, scope),
        };

        if source.is_empty() {
            return Resolution::NotRunnable {
                parameter: decl.name.clone(),
                ty: decl.ty.clone(),
            };
        }

        parameters.push(Parameter::new(&decl.name, decl.ty.clone(), source));
    }

    Resolution::Ready(parameters)
}
