//! Typed candidate values for theory parameters.
//!
//! Every candidate handed to a theory is a `Value`, and every declared
//! parameter has a `ValueType`. Pools are keyed by the exact `ValueType`, so
//! the type set is closed and hashable.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An enumerated type with its members in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    /// Create an enum type, rejecting empty or duplicate member lists
    pub fn new<I, S>(name: &str, members: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for member in members {
            let member = member.into();
            if collected.contains(&member) {
                return Err(EngineError::DuplicateEnumMember {
                    name: name.to_string(),
                    member,
                });
            }
            collected.push(member);
        }

        if collected.is_empty() {
            return Err(EngineError::EmptyEnum { name: name.to_string() });
        }

        Ok(Self {
            name: name.to_string(),
            members: collected,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Value for the member at `index` in declaration order
    pub fn value(&self, index: usize) -> Option<Value> {
        self.members.get(index).map(|member| Value::Enum {
            type_name: self.name.clone(),
            member: member.clone(),
        })
    }

    /// Value for the member named `member`, if declared
    pub fn member(&self, member: &str) -> Option<Value> {
        self.members
            .iter()
            .position(|m| m == member)
            .and_then(|index| self.value(index))
    }
}

/// Declared type of a parameter or datapoint source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    /// The catch-all reference type
    Object,
    Enum(EnumType),
    /// A named user reference type
    Class(String),
}

impl ValueType {
    /// Whether `Value::Null` is a legal value of this type
    pub fn is_reference(&self) -> bool {
        matches!(self, ValueType::Str | ValueType::Object | ValueType::Class(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Str => write!(f, "string"),
            ValueType::Object => write!(f, "object"),
            ValueType::Enum(e) => write!(f, "enum {}", e.name),
            ValueType::Class(name) => write!(f, "class {}", name),
        }
    }
}

/// A single candidate value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Enum { type_name: String, member: String },
    /// An opaque instance of a user reference type
    Instance { class: String, repr: String },
}

impl Value {
    /// Check whether this value may be bound to a parameter of type `ty`
    ///
    /// Every value conforms to `Object`. `Null` conforms to reference types only.
    pub fn conforms_to(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::Null, ty) => ty.is_reference(),
            (_, ValueType::Object) => true,
            (Value::Bool(_), ValueType::Bool) => true,
            (Value::Int(_), ValueType::Int) => true,
            (Value::Float(_), ValueType::Float) => true,
            (Value::Str(_), ValueType::Str) => true,
            (Value::Enum { type_name, member }, ValueType::Enum(e)) => {
                type_name == e.name() && e.members().contains(member)
            }
            (Value::Instance { class, .. }, ValueType::Class(name)) => class == name,
            _ => false,
        }
    }

    /// Short description of the value's own kind, for error messages
    pub fn kind(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Enum { type_name, .. } => format!("enum {}", type_name),
            Value::Instance { class, .. } => format!("class {}", class),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise, so NaN == NaN and -0.0 != 0.0
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Enum { type_name: ta, member: ma },
                Value::Enum { type_name: tb, member: mb },
            ) => ta == tb && ma == mb,
            (
                Value::Instance { class: ca, repr: ra },
                Value::Instance { class: cb, repr: rb },
            ) => ca == cb && ra == rb,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::Enum { type_name, member } => {
                5u8.hash(state);
                type_name.hash(state);
                member.hash(state);
            }
            Value::Instance { class, repr } => {
                6u8.hash(state);
                class.hash(state);
                repr.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Enum { type_name, member } => write!(f, "{}.{}", type_name, member),
            Value::Instance { class, repr } => write!(f, "{}({})", class, repr),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// One concrete assignment, positionally aligned with a theory's parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueTuple(Vec<Value>);

impl ValueTuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// The arity-zero tuple
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for ValueTuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl fmt::Display for ValueTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}
