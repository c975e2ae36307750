//! Runtime values.
//!
//! The object model proper lives outside this workspace. The dispatch layer
//! only needs to pass values around and ask a receiver for its shape, so
//! objects here carry nothing but a shape and a class name for diagnostics.

use crate::intern::{Symbol, intern};
use crate::shape::ShapeId;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Object
// =============================================================================

/// A heap object as seen by method dispatch.
#[derive(Debug)]
pub struct Object {
    shape: ShapeId,
    class_name: Symbol,
}

impl Object {
    pub fn new(shape: ShapeId, class_name: Symbol) -> Self {
        Self { shape, class_name }
    }

    #[inline]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    #[inline]
    pub fn class_name(&self) -> &Symbol {
        &self.class_name
    }
}

// =============================================================================
// Value
// =============================================================================

/// A runtime value.
///
/// Objects compare by identity; everything else compares structurally.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Symbol(Symbol),
    Str(Arc<str>),
    Array(Arc<[Value]>),
    Object(Arc<Object>),
}

impl Value {
    /// Create a symbol value, interning `name`.
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(intern(name))
    }

    pub fn str(text: &str) -> Self {
        Value::Str(Arc::from(text))
    }

    pub fn array(items: impl Into<Arc<[Value]>>) -> Self {
        Value::Array(items.into())
    }

    /// Allocate a fresh object of the given shape.
    pub fn object(shape: ShapeId, class_name: Symbol) -> Self {
        Value::Object(Arc::new(Object::new(shape, class_name)))
    }

    /// The receiver's effective-type identity.
    #[inline]
    pub fn shape(&self) -> ShapeId {
        match self {
            Value::Nil => ShapeId::NIL,
            Value::Bool(true) => ShapeId::TRUE,
            Value::Bool(false) => ShapeId::FALSE,
            Value::Int(_) => ShapeId::INTEGER,
            Value::Float(_) => ShapeId::FLOAT,
            Value::Symbol(_) => ShapeId::SYMBOL,
            Value::Str(_) => ShapeId::STRING,
            Value::Array(_) => ShapeId::ARRAY,
            Value::Object(obj) => obj.shape(),
        }
    }

    /// Name of the receiver's class, for error messages.
    pub fn class_name(&self) -> &str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(true) => "TrueClass",
            Value::Bool(false) => "FalseClass",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Symbol(_) => "Symbol",
            Value::Str(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(obj) => obj.class_name().as_str(),
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Symbol(sym) => write!(f, ":{}", sym),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "#<{}>", obj.class_name()),
        }
    }
}
