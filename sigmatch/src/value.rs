//! Dynamic runtime values.
//!
//! Overload resolution happens entirely at runtime, so every argument is a
//! [`Value`]: a structurally typed datum in the style of a dynamic
//! language. Nominal identity only exists for [`Class`] (compared by
//! pointer) and for the [`Instance`]s a class constructs.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Fields of a plain object, in insertion order.
pub type Object = IndexMap<String, Value>;

/// Body of a native function value.
pub type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A dynamic value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value. Missing optional entries read as `Undefined`.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    /// All numbers are IEEE doubles.
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// A plain object.
    Object(Object),
    Function(Function),
    /// An object built by a [`Class`].
    Instance(Instance),
    /// A constructor reference.
    Class(Class),
}

impl Value {
    /// Build a plain object from key/value pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an array from anything convertible into values.
    pub fn array<T, I>(items: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// The runtime kind, as used in "received ..." messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_nan() => "NaN",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Instance(_) => "instance",
            Value::Class(_) => "class",
        }
    }

    /// Like [`Value::kind`], but names the class of instances and classes.
    pub fn describe(&self) -> String {
        match self {
            Value::Instance(instance) => instance.class().name().to_string(),
            Value::Class(class) => format!("class {}", class.name()),
            other => other.kind().to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to JSON with the rules of a dynamic runtime's serializer.
    ///
    /// Returns `None` only when the value itself has no JSON form
    /// (undefined, functions, classes). Nested inside an array those become
    /// `null`; as object properties they are omitted. Non-finite numbers
    /// become `null`, and instances serialize as their own fields.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Undefined | Value::Function(_) | Value::Class(_) => return None,
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => json_number(*n).map_or(serde_json::Value::Null, Into::into),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(serde_json::Value::Null))
                    .collect(),
            ),
            Value::Object(fields) => serde_json::Value::Object(object_to_json(fields)),
            Value::Instance(instance) => {
                serde_json::Value::Object(object_to_json(instance.fields()))
            }
        })
    }
}

/// Properties without a JSON form are skipped.
pub(crate) fn object_to_json(fields: &Object) -> serde_json::Map<String, serde_json::Value> {
    fields
        .iter()
        .filter_map(|(k, v)| Some((k.clone(), v.to_json()?)))
        .collect()
}

fn json_number(n: f64) -> Option<serde_json::Number> {
    if is_safe_integer(n) {
        Some(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
    }
}

fn is_safe_integer(n: f64) -> bool {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE
}

/// Render a number the way the host runtime prints it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if is_safe_integer(n) {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl PartialEq for Value {
    /// Primitives and plain data compare structurally; functions and
    /// classes compare by identity. `NaN` is never equal to itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(fields) => f.debug_map().entries(fields).finish(),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Instance(instance) => write!(f, "{instance:?}"),
            Value::Class(class) => write!(f, "{class:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(fields: Object) -> Self {
        Value::Object(fields)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<Class> for Value {
    fn from(class: Class) -> Self {
        Value::Class(class)
    }
}

/// A callable value with a declared parameter count.
#[derive(Clone)]
pub struct Function {
    name: Option<String>,
    arity: usize,
    body: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            arity,
            body: Arc::new(body),
        }
    }

    pub fn anonymous<F>(arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            arity,
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "[Function: {name}]"),
            None => write!(f, "[Function: anonymous]"),
        }
    }
}

/// A constructor reference.
///
/// Two `Class` handles are the same class only if they were cloned from
/// the same [`Class::new`] call; equal names are not enough.
#[derive(Clone)]
pub struct Class(Arc<ClassData>);

struct ClassData {
    name: String,
    parent: Option<Class>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassData {
            name: name.into(),
            parent: None,
        }))
    }

    /// A class whose instances are also instances of `parent`.
    pub fn extends(name: impl Into<String>, parent: &Class) -> Self {
        Self(Arc::new(ClassData {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// True if `self` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, ancestor: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Construct an instance carrying `fields`.
    pub fn instantiate(&self, fields: Object) -> Value {
        Value::Instance(Instance {
            class: self.clone(),
            fields,
        })
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[class {}]", self.name())
    }
}

/// An object constructed by a [`Class`].
#[derive(Clone, PartialEq)]
pub struct Instance {
    class: Class,
    fields: Object,
}

impl Instance {
    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn fields(&self) -> &Object {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.class.name())?;
        f.debug_map().entries(&self.fields).finish()
    }
}

/// A value an exact-match `literal` validator compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Literal {
    /// Strict equality against a runtime value.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Undefined, Value::Undefined) | (Literal::Null, Value::Null) => true,
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::Number(a), Value::Number(b)) => a == b,
            (Literal::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Undefined => write!(f, "undefined"),
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => write!(f, "{}", format_number(*n)),
            Literal::String(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(f64::from(n))
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}
