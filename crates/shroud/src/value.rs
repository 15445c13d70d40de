//! Value: the tagged union stored behind a key
//!
//! Every member of a store holds a [`Value`]. Plain data, nested records and
//! invocable operations share one type so that policies can branch on the
//! capability tag explicitly:
//!
//! ```text
//! Undefined | Null | Bool | Int | Float | Str | List   plain data
//! Object(StoreRef)                                     nested record (shared)
//! Operation(Operation)                                 invocable member
//! ```
//!
//! `Undefined` doubles as the absent marker: a native read of a missing key
//! yields it, and observers receive it as the `next` value of a delete.

use std::fmt;
use std::rc::Rc;

use crate::error::{HandleResult, ProxyError};
use crate::store::StoreRef;

/// A value held by a store member.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent marker
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// String
    Str(String),
    /// Ordered list
    List(Vec<Value>),
    /// Nested store, shared by reference
    Object(StoreRef),
    /// Invocable member
    Operation(Operation),
}

impl Value {
    /// Build a string value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Check for the absent marker
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check for the operation capability tag
    pub fn is_operation(&self) -> bool {
        matches!(self, Value::Operation(_))
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the nested store
    pub fn as_object(&self) -> Option<&StoreRef> {
        match self {
            Value::Object(store) => Some(store),
            _ => None,
        }
    }

    /// Get the operation
    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Value::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Operation(_) => "operation",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Identity, not structure
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Operation(a), Value::Operation(b)) => a.same_body(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(store) => write!(f, "Object({:p})", Rc::as_ptr(store) as *const ()),
            Value::Operation(op) => write!(f, "{:?}", op),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(_) => write!(f, "[object]"),
            Value::Operation(_) => write!(f, "[operation]"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Operation> for Value {
    fn from(op: Operation) -> Self {
        Value::Operation(op)
    }
}

impl From<StoreRef> for Value {
    fn from(store: StoreRef) -> Self {
        Value::Object(store)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Signature shared by every operation body: `(receiver, args) -> result`.
type OperationFn = dyn Fn(Option<&StoreRef>, &[Value]) -> HandleResult<Value>;

/// An invocable member.
///
/// An operation optionally carries a bound receiver. When called, a bound
/// receiver always wins over the one supplied by the caller, so an operation
/// pulled out of a wrapper keeps working on the store it was bound to.
#[derive(Clone)]
pub struct Operation {
    body: Rc<OperationFn>,
    receiver: Option<StoreRef>,
}

impl Operation {
    /// Operation that needs a receiver store (a method)
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&StoreRef, &[Value]) -> HandleResult<Value> + 'static,
    {
        Operation {
            body: Rc::new(move |receiver: Option<&StoreRef>, args: &[Value]| match receiver {
                Some(store) => f(store, args),
                None => Err(ProxyError::trap("method called without a receiver")),
            }),
            receiver: None,
        }
    }

    /// Operation that ignores its receiver (a free function)
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> HandleResult<Value> + 'static,
    {
        Operation {
            body: Rc::new(move |_: Option<&StoreRef>, args: &[Value]| f(args)),
            receiver: None,
        }
    }

    /// Copy of this operation with its receiver fixed to `receiver`
    pub fn bind(&self, receiver: StoreRef) -> Self {
        Operation {
            body: Rc::clone(&self.body),
            receiver: Some(receiver),
        }
    }

    /// Bound receiver, if any
    pub fn receiver(&self) -> Option<&StoreRef> {
        self.receiver.as_ref()
    }

    /// Whether a receiver is bound
    pub fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }

    /// Call with the bound receiver (or none)
    pub fn call(&self, args: &[Value]) -> HandleResult<Value> {
        (self.body)(self.receiver.as_ref(), args)
    }

    /// Call with `receiver` unless a receiver is already bound
    pub fn call_with(&self, receiver: &StoreRef, args: &[Value]) -> HandleResult<Value> {
        let this = self.receiver.as_ref().unwrap_or(receiver);
        (self.body)(Some(this), args)
    }

    /// Whether both operations run the same body, regardless of binding
    pub fn same_body(&self, other: &Operation) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            write!(f, "Operation(bound)")
        } else {
            write!(f, "Operation")
        }
    }
}
