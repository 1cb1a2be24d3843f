//! Structural validators.
//!
//! A [`Validator`] is an immutable rule that checks a single [`Value`] and
//! reports structured [`Issue`]s when the value does not have the expected
//! shape. Validators are cheap to clone and safe to share between
//! signatures and threads.
//!
//! # Check contract
//!
//! Each rule's check receives the value and a [`CheckContext`]. It may
//! report issues through the context and returns a [`Check`]:
//!
//! - [`Check::Done`]: ok unless issues were reported
//! - [`Check::Bool`]: ok iff `true` and no issues were reported
//! - [`Check::Result`]: a full [`ValidationResult`], which may carry a
//!   transformed value
//!
//! A failure without any reported issue gets a synthetic
//! `"Value did not satisfy <summary>"` issue at the current path.
//!
//! # Specificity
//!
//! Every validator carries a specificity weight used to rank matching
//! overloads. See the constants below; composites derive theirs from
//! their children.

mod composite;
mod primitive;


use std::fmt;
use std::sync::Arc;

use crate::value::{Class, Literal, Value};

pub use composite::{
    array, array_of, instance_of, instance_of_with, intersection, shape, shape_with, tuple,
    tuple_with, union, ArrayOptions, ShapeOptions, TupleOptions,
};
pub use primitive::{
    boolean, custom, func, func_with, literal, literals, number, number_with, optional, string,
    string_with, type_of, unknown, FuncOptions, NumberOptions, NumberPredicate, StringOptions,
    StringPredicate,
};

use composite::{ArrayRule, InstanceOfRule, ShapeRule, TupleRule};
use primitive::{CustomRule, FuncRule, NumberRule, StringRule};

/// Specificity of `unknown()`: matches anything, ranks below everything.
pub const UNKNOWN_SPECIFICITY: u32 = 0;
/// Specificity of an unconstrained primitive check.
pub const PRIMITIVE_SPECIFICITY: u32 = 2;
/// Specificity of a primitive check with extra constraints.
pub const CONSTRAINED_SPECIFICITY: u32 = 3;
/// Specificity of an exact-value literal.
pub const LITERAL_SPECIFICITY: u32 = 5;
/// Base specificity of array, tuple and shape validators.
pub const COMPOSITE_BASE_SPECIFICITY: u32 = 3;
/// Minimum specificity of an instance-of check.
pub const INSTANCE_FLOOR_SPECIFICITY: u32 = 4;

/// One step into nested data: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Location of the failure within the validated value.
    pub path: Vec<PathSegment>,
    /// Human-readable description, rendered after the path.
    pub message: String,
    /// Summary of what was expected, when known.
    pub expected: Option<String>,
    /// What was received, when known.
    pub actual: Option<String>,
}

impl Issue {
    /// An issue with an empty path.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// The standard "Expected X, received Y" mismatch.
    pub fn mismatch(expected: impl Into<String>, value: &Value) -> Self {
        let expected = expected.into();
        let actual = value.describe();
        Self {
            path: Vec::new(),
            message: format!("Expected {expected}, received {actual}"),
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    /// Replace the path with an absolute one.
    pub fn at(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Attach the expected summary without changing the message.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the received description without changing the message.
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub ok: bool,
    pub issues: Vec<Issue>,
    /// Replacement value produced by a transforming validator.
    pub value: Option<Value>,
}

impl ValidationResult {
    /// Accepted, value unchanged.
    pub fn success() -> Self {
        Self {
            ok: true,
            issues: Vec::new(),
            value: None,
        }
    }

    /// Accepted, with `value` as the replacement.
    pub fn transformed(value: Value) -> Self {
        Self {
            ok: true,
            issues: Vec::new(),
            value: Some(value),
        }
    }

    pub fn failure(issues: Vec<Issue>) -> Self {
        Self {
            ok: false,
            issues,
            value: None,
        }
    }
}

/// What a check returns. See the module docs.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Done,
    Bool(bool),
    Result(ValidationResult),
}

impl From<bool> for Check {
    fn from(passed: bool) -> Self {
        Check::Bool(passed)
    }
}

impl From<ValidationResult> for Check {
    fn from(result: ValidationResult) -> Self {
        Check::Result(result)
    }
}

/// Per-call state handed to a check: the current path and the issue sink.
pub struct CheckContext<'a> {
    path: Vec<PathSegment>,
    issues: &'a mut Vec<Issue>,
}

impl<'a> CheckContext<'a> {
    fn new(path: Vec<PathSegment>, issues: &'a mut Vec<Issue>) -> Self {
        Self { path, issues }
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Report an issue. Its path is taken relative to the current path.
    pub fn report(&mut self, issue: Issue) {
        let mut path = self.path.clone();
        path.extend(issue.path.iter().cloned());
        self.issues.push(Issue { path, ..issue });
    }

    /// Report an issue at an absolute path.
    pub fn report_at(&mut self, path: Vec<PathSegment>, issue: Issue) {
        self.issues.push(issue.at(path));
    }

    /// Pass through issues that already carry absolute paths, such as those
    /// returned by a child validator.
    pub fn forward(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// A nested context one segment deeper, sharing the same issue sink.
    pub fn child(&mut self, segment: impl Into<PathSegment>) -> CheckContext<'_> {
        let mut path = self.path.clone();
        path.push(segment.into());
        CheckContext {
            path,
            issues: &mut *self.issues,
        }
    }

    /// Validate `value` with `validator` at the current path.
    pub fn run(&self, validator: &Validator, value: &Value) -> ValidationResult {
        validator.validate(value, &self.path)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// The rule behind a validator.
#[derive(Clone)]
pub(crate) enum Rule {
    String(StringRule),
    Number(NumberRule),
    Boolean,
    Literal(Vec<Literal>),
    Unknown,
    Func(FuncRule),
    TypeOf(Class),
    Array(ArrayRule),
    Tuple(TupleRule),
    Shape(ShapeRule),
    Union(Vec<Validator>),
    Intersection(Vec<Validator>),
    InstanceOf(InstanceOfRule),
    Custom(CustomRule),
}

impl Rule {
    fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        match self {
            Rule::String(rule) => rule.check(value, cx),
            Rule::Number(rule) => rule.check(value, cx),
            Rule::Boolean => primitive::check_boolean(value, cx),
            Rule::Literal(literals) => primitive::check_literal(literals, value, cx),
            Rule::Unknown => Check::Done,
            Rule::Func(rule) => rule.check(value, cx),
            Rule::TypeOf(class) => primitive::check_type_of(class, value, cx),
            Rule::Array(rule) => rule.check(value, cx),
            Rule::Tuple(rule) => rule.check(value, cx),
            Rule::Shape(rule) => rule.check(value, cx),
            Rule::Union(branches) => composite::check_union(branches, value, cx),
            Rule::Intersection(parts) => composite::check_intersection(parts, value, cx),
            Rule::InstanceOf(rule) => rule.check(value, cx),
            Rule::Custom(rule) => (rule.check)(value, cx),
        }
    }

    fn specificity(&self) -> u32 {
        match self {
            Rule::String(rule) => rule.specificity(),
            Rule::Number(rule) => rule.specificity(),
            Rule::Boolean => PRIMITIVE_SPECIFICITY,
            Rule::Literal(_) => LITERAL_SPECIFICITY,
            Rule::Unknown => UNKNOWN_SPECIFICITY,
            Rule::Func(rule) => rule.specificity(),
            Rule::TypeOf(_) => CONSTRAINED_SPECIFICITY,
            Rule::Array(rule) => rule.specificity(),
            Rule::Tuple(rule) => rule.specificity(),
            Rule::Shape(rule) => rule.specificity(),
            Rule::Union(branches) => branches
                .iter()
                .map(Validator::specificity)
                .max()
                .unwrap_or(UNKNOWN_SPECIFICITY),
            Rule::Intersection(parts) => parts.iter().map(Validator::specificity).sum(),
            Rule::InstanceOf(rule) => rule.specificity(),
            Rule::Custom(rule) => rule.specificity,
        }
    }

    fn summary(&self) -> String {
        match self {
            Rule::String(_) => "string".to_string(),
            Rule::Number(rule) => rule.summary(),
            Rule::Boolean => "boolean".to_string(),
            Rule::Literal(literals) => {
                join_summaries(literals.iter().map(ToString::to_string), " | ")
            }
            Rule::Unknown => "unknown".to_string(),
            Rule::Func(rule) => rule.summary(),
            Rule::TypeOf(class) => format!("typeof {}", class.name()),
            Rule::Array(rule) => rule.summary(),
            Rule::Tuple(rule) => rule.summary(),
            Rule::Shape(rule) => rule.summary(),
            Rule::Union(branches) => {
                join_summaries(branches.iter().map(|v| v.summary().to_string()), " | ")
            }
            Rule::Intersection(parts) => {
                join_summaries(parts.iter().map(|v| v.summary().to_string()), " & ")
            }
            Rule::InstanceOf(rule) => rule.summary(),
            Rule::Custom(rule) => rule.summary.clone(),
        }
    }
}

fn join_summaries(parts: impl Iterator<Item = String>, separator: &str) -> String {
    let parts: Vec<_> = parts.collect();
    if parts.is_empty() {
        "never".to_string()
    } else {
        parts.join(separator)
    }
}

struct ValidatorData {
    rule: Rule,
    optional: bool,
    specificity: u32,
    summary: String,
}

/// An immutable, shareable validation rule.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorData>);

impl Validator {
    pub(crate) fn new(rule: Rule, optional: bool) -> Self {
        let specificity = rule.specificity();
        let summary = rule.summary();
        Self(Arc::new(ValidatorData {
            rule,
            optional,
            specificity,
            summary,
        }))
    }

    /// Whether a missing or `undefined` value is accepted.
    pub fn is_optional(&self) -> bool {
        self.0.optional
    }

    pub fn specificity(&self) -> u32 {
        self.0.specificity
    }

    /// Human label of the expected shape.
    pub fn summary(&self) -> &str {
        &self.0.summary
    }

    /// The summary as shown in signature listings; optional validators get
    /// a trailing `?`.
    pub fn expected(&self) -> String {
        if self.0.optional {
            format!("{}?", self.0.summary)
        } else {
            self.0.summary.clone()
        }
    }

    /// The same rule, accepting missing and `undefined` values.
    pub fn as_optional(&self) -> Validator {
        if self.0.optional {
            return self.clone();
        }
        Validator::new(self.0.rule.clone(), true)
    }

    /// Validate `value`, reporting issues relative to `path`.
    pub fn validate(&self, value: &Value, path: &[PathSegment]) -> ValidationResult {
        if self.0.optional && value.is_undefined() {
            return ValidationResult::success();
        }

        let mut issues = Vec::new();
        let check = {
            let mut cx = CheckContext::new(path.to_vec(), &mut issues);
            self.0.rule.check(value, &mut cx)
        };

        let (ok, transformed) = match check {
            Check::Done => (issues.is_empty(), None),
            Check::Bool(passed) => (passed && issues.is_empty(), None),
            Check::Result(result) => {
                issues.extend(result.issues);
                (result.ok && issues.is_empty(), result.value)
            }
        };

        if ok {
            return ValidationResult {
                ok: true,
                issues: Vec::new(),
                value: transformed,
            };
        }

        if issues.is_empty() {
            issues.push(
                Issue::new(format!("Value did not satisfy {}", self.summary()))
                    .at(path.to_vec())
                    .with_expected(self.summary())
                    .with_actual(value.describe()),
            );
        }
        ValidationResult::failure(issues)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("summary", &self.0.summary)
            .field("specificity", &self.0.specificity)
            .field("optional", &self.0.optional)
            .finish()
    }
}
