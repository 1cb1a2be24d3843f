//! Primitive validators: strings, numbers, booleans, literals, functions,
//! constructor references, and caller-defined checks.

use std::sync::Arc;

use regex::Regex;

use super::{
    Check, CheckContext, Issue, Rule, Validator, CONSTRAINED_SPECIFICITY, PRIMITIVE_SPECIFICITY,
};
use crate::diagnostics::render_value;
use crate::value::{Class, Literal, Value};

/// Extra predicate run on a string after the built-in constraints.
pub type StringPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Extra predicate run on a number after the built-in constraints.
pub type NumberPredicate = Arc<dyn Fn(f64) -> bool + Send + Sync>;

type CustomCheck = dyn Fn(&Value, &mut CheckContext<'_>) -> Check + Send + Sync;

/// Options for [`string_with`].
#[derive(Clone, Default)]
pub struct StringOptions {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Must match somewhere in the string; anchor it for a full match.
    pub pattern: Option<Regex>,
    /// Extra caller check, run after the built-in constraints.
    pub predicate: Option<StringPredicate>,
    /// Also accept `undefined`, making the position optional.
    pub optional: bool,
}

/// Options for [`number_with`].
#[derive(Clone, Default)]
pub struct NumberOptions {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Reject values with a fractional part.
    pub integer: bool,
    /// Reject the infinities. `NaN` is always rejected.
    pub finite: bool,
    /// Extra caller check, run after the built-in constraints.
    pub predicate: Option<NumberPredicate>,
    /// Also accept `undefined`, making the position optional.
    pub optional: bool,
}

/// Options for [`func_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FuncOptions {
    /// Exact number of declared parameters.
    pub arity: Option<usize>,
    /// Also accept `undefined`, making the position optional.
    pub optional: bool,
}

#[derive(Clone)]
pub(crate) struct StringRule {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    predicate: Option<StringPredicate>,
}

impl StringRule {
    fn is_constrained(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
            || self.predicate.is_some()
    }

    pub(super) fn specificity(&self) -> u32 {
        if self.is_constrained() {
            CONSTRAINED_SPECIFICITY
        } else {
            PRIMITIVE_SPECIFICITY
        }
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        let Value::String(s) = value else {
            cx.report(Issue::mismatch("string", value));
            return Check::Bool(false);
        };

        let length = s.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                cx.report(Issue::new(format!(
                    "String must contain at least {}",
                    plural(min, "character")
                )));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                cx.report(Issue::new(format!(
                    "String must contain at most {}",
                    plural(max, "character")
                )));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                cx.report(Issue::new(format!("String must match pattern /{pattern}/")));
            }
        }
        if let Some(predicate) = &self.predicate {
            if !predicate(s) {
                cx.report(Issue::new("String failed predicate"));
            }
        }
        Check::Done
    }
}

#[derive(Clone)]
pub(crate) struct NumberRule {
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    finite: bool,
    predicate: Option<NumberPredicate>,
}

impl NumberRule {
    fn is_constrained(&self) -> bool {
        self.min.is_some()
            || self.max.is_some()
            || self.integer
            || self.finite
            || self.predicate.is_some()
    }

    pub(super) fn specificity(&self) -> u32 {
        if self.is_constrained() {
            CONSTRAINED_SPECIFICITY
        } else {
            PRIMITIVE_SPECIFICITY
        }
    }

    pub(super) fn summary(&self) -> String {
        let label = if self.integer { "integer" } else { "number" };
        label.to_string()
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        let n = match value {
            Value::Number(n) if !n.is_nan() => *n,
            _ => {
                cx.report(Issue::mismatch(self.summary(), value));
                return Check::Bool(false);
            }
        };

        if self.finite && !n.is_finite() {
            cx.report(Issue::new("Number must be finite"));
        }
        if self.integer && (!n.is_finite() || n.fract() != 0.0) {
            cx.report(Issue::new("Number must be an integer"));
        }
        if let Some(min) = self.min {
            if n < min {
                cx.report(Issue::new(format!(
                    "Number must be greater than or equal to {}",
                    crate::value::format_number(min)
                )));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                cx.report(Issue::new(format!(
                    "Number must be less than or equal to {}",
                    crate::value::format_number(max)
                )));
            }
        }
        if let Some(predicate) = &self.predicate {
            if !predicate(n) {
                cx.report(Issue::new("Number failed predicate"));
            }
        }
        Check::Done
    }
}

#[derive(Clone)]
pub(crate) struct FuncRule {
    arity: Option<usize>,
}

impl FuncRule {
    pub(super) fn specificity(&self) -> u32 {
        if self.arity.is_some() {
            CONSTRAINED_SPECIFICITY
        } else {
            PRIMITIVE_SPECIFICITY
        }
    }

    pub(super) fn summary(&self) -> String {
        match self.arity {
            Some(arity) => format!("function({arity})"),
            None => "function".to_string(),
        }
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        let Value::Function(func) = value else {
            cx.report(Issue::mismatch("function", value));
            return Check::Bool(false);
        };
        match self.arity {
            Some(arity) if func.arity() != arity => {
                cx.report(
                    Issue::new(format!(
                        "Function must accept exactly {}, accepts {}",
                        plural(arity, "argument"),
                        func.arity()
                    ))
                    .with_expected(self.summary())
                    .with_actual(format!("function({})", func.arity())),
                );
                Check::Bool(false)
            }
            _ => Check::Bool(true),
        }
    }
}

/// A caller-defined check.
#[derive(Clone)]
pub(crate) struct CustomRule {
    pub(crate) summary: String,
    pub(crate) specificity: u32,
    pub(crate) check: Arc<CustomCheck>,
}

pub(super) fn check_boolean(value: &Value, cx: &mut CheckContext<'_>) -> Check {
    if matches!(value, Value::Bool(_)) {
        return Check::Bool(true);
    }
    cx.report(Issue::mismatch("boolean", value));
    Check::Bool(false)
}

pub(super) fn check_literal(
    literals: &[Literal],
    value: &Value,
    cx: &mut CheckContext<'_>,
) -> Check {
    if literals.iter().any(|literal| literal.matches(value)) {
        return Check::Bool(true);
    }
    let expected = literals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ");
    // Scalars are shown by value, everything else by kind as in other mismatches.
    let actual = match value {
        Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            render_value(value)
        }
        _ => value.describe(),
    };
    cx.report(
        Issue::new(format!("Expected {expected}, received {actual}"))
            .with_expected(expected)
            .with_actual(actual),
    );
    Check::Bool(false)
}

pub(super) fn check_type_of(class: &Class, value: &Value, cx: &mut CheckContext<'_>) -> Check {
    match value {
        Value::Class(candidate) if candidate.is_subclass_of(class) => Check::Bool(true),
        _ => {
            cx.report(Issue::mismatch(format!("typeof {}", class.name()), value));
            Check::Bool(false)
        }
    }
}

pub(super) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Any string.
pub fn string() -> Validator {
    string_with(StringOptions::default())
}

/// A string with length, pattern or predicate constraints.
pub fn string_with(options: StringOptions) -> Validator {
    let StringOptions {
        min_length,
        max_length,
        pattern,
        predicate,
        optional,
    } = options;
    Validator::new(
        Rule::String(StringRule {
            min_length,
            max_length,
            pattern,
            predicate,
        }),
        optional,
    )
}

/// Any number except `NaN`.
pub fn number() -> Validator {
    number_with(NumberOptions::default())
}

/// A number with range, integrality, finiteness or predicate constraints.
///
/// Every violated constraint is reported, not just the first.
pub fn number_with(options: NumberOptions) -> Validator {
    let NumberOptions {
        min,
        max,
        integer,
        finite,
        predicate,
        optional,
    } = options;
    Validator::new(
        Rule::Number(NumberRule {
            min,
            max,
            integer,
            finite,
            predicate,
        }),
        optional,
    )
}

/// `true` or `false`.
pub fn boolean() -> Validator {
    Validator::new(Rule::Boolean, false)
}

/// Exactly `value`.
pub fn literal(value: impl Into<Literal>) -> Validator {
    Validator::new(Rule::Literal(vec![value.into()]), false)
}

/// Exactly one of `values`.
pub fn literals<L, I>(values: I) -> Validator
where
    L: Into<Literal>,
    I: IntoIterator<Item = L>,
{
    Validator::new(
        Rule::Literal(values.into_iter().map(Into::into).collect()),
        false,
    )
}

/// Accepts every value, with zero specificity.
pub fn unknown() -> Validator {
    Validator::new(Rule::Unknown, false)
}

/// Any function value.
pub fn func() -> Validator {
    func_with(FuncOptions::default())
}

/// A function value, optionally with an exact declared arity.
pub fn func_with(options: FuncOptions) -> Validator {
    Validator::new(
        Rule::Func(FuncRule {
            arity: options.arity,
        }),
        options.optional,
    )
}

/// The constructor `class` itself, or any class extending it.
pub fn type_of(class: &Class) -> Validator {
    Validator::new(Rule::TypeOf(class.clone()), false)
}

/// Shorthand for [`Validator::as_optional`].
pub fn optional(validator: Validator) -> Validator {
    validator.as_optional()
}

/// A validator running `check` under the standard check contract.
///
/// This is the only way to build a validator that produces a transformed
/// value: return `Check::Result(ValidationResult::transformed(..))`.
pub fn custom<F>(summary: impl Into<String>, specificity: u32, check: F) -> Validator
where
    F: Fn(&Value, &mut CheckContext<'_>) -> Check + Send + Sync + 'static,
{
    Validator::new(
        Rule::Custom(CustomRule {
            summary: summary.into(),
            specificity,
            check: Arc::new(check),
        }),
        false,
    )
}
