//! Composite validators that delegate to child validators.

use indexmap::IndexMap;

use super::primitive::plural;
use super::{
    Check, CheckContext, Issue, Rule, ValidationResult, Validator, COMPOSITE_BASE_SPECIFICITY,
    INSTANCE_FLOOR_SPECIFICITY,
};
use crate::value::{Class, Value};

/// Options for [`array_of`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayOptions {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Exact length; checked before the bounds.
    pub length: Option<usize>,
    /// Report every invalid element instead of stopping at the first one.
    pub collect_all: bool,
    pub optional: bool,
}

/// Options for [`tuple_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleOptions {
    /// Accept elements beyond the declared positions.
    pub allow_extra: bool,
    pub optional: bool,
}

/// Options for [`shape_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeOptions {
    /// Accept properties that are not in the schema.
    pub allow_unknown_properties: bool,
    pub optional: bool,
}

#[derive(Clone)]
pub(crate) struct ArrayRule {
    elements: Vec<Validator>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    length: Option<usize>,
    collect_all: bool,
}

impl ArrayRule {
    fn has_length_constraint(&self) -> bool {
        self.length.is_some() || self.min_length.is_some() || self.max_length.is_some()
    }

    pub(super) fn specificity(&self) -> u32 {
        COMPOSITE_BASE_SPECIFICITY + u32::from(self.has_length_constraint())
    }

    pub(super) fn summary(&self) -> String {
        let elements: Vec<_> = self.elements.iter().map(Validator::summary).collect();
        if elements.is_empty() {
            "Array<never>".to_string()
        } else {
            format!("Array<{}>", elements.join(" | "))
        }
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        let Value::Array(items) = value else {
            cx.report(Issue::mismatch(self.summary(), value));
            return Check::Bool(false);
        };

        if !self.check_length(items.len(), cx) {
            return Check::Bool(false);
        }

        let mut ok = true;
        for (index, item) in items.iter().enumerate() {
            let mut element = cx.child(index);
            if let Err(issues) = self.match_element(item, &element) {
                element.forward(issues);
                if !self.collect_all {
                    return Check::Bool(false);
                }
                ok = false;
            }
        }
        Check::Bool(ok)
    }

    fn check_length(&self, len: usize, cx: &mut CheckContext<'_>) -> bool {
        if let Some(length) = self.length {
            if len != length {
                cx.report(
                    Issue::new(format!("Array must contain exactly {}", plural(length, "element")))
                        .with_actual(len.to_string()),
                );
                return false;
            }
        }
        if let Some(min) = self.min_length {
            if len < min {
                cx.report(
                    Issue::new(format!("Array must contain at least {}", plural(min, "element")))
                        .with_actual(len.to_string()),
                );
                return false;
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                cx.report(
                    Issue::new(format!("Array must contain at most {}", plural(max, "element")))
                        .with_actual(len.to_string()),
                );
                return false;
            }
        }
        true
    }

    /// First element validator that accepts `item` wins; otherwise the
    /// issues of every element validator are returned together.
    fn match_element(&self, item: &Value, cx: &CheckContext<'_>) -> Result<(), Vec<Issue>> {
        let mut issues = Vec::new();
        for validator in &self.elements {
            let result = cx.run(validator, item);
            if result.ok {
                return Ok(());
            }
            issues.extend(result.issues);
        }
        if issues.is_empty() {
            issues.push(Issue::new("Unexpected element").at(cx.path().to_vec()));
        }
        Err(issues)
    }
}

#[derive(Clone)]
pub(crate) struct TupleRule {
    elements: Vec<Validator>,
    allow_extra: bool,
}

impl TupleRule {
    fn required_count(&self) -> usize {
        self.elements.iter().filter(|v| !v.is_optional()).count()
    }

    pub(super) fn specificity(&self) -> u32 {
        let positions = u32::try_from(self.elements.len()).unwrap_or(u32::MAX);
        COMPOSITE_BASE_SPECIFICITY.saturating_add(positions)
    }

    pub(super) fn summary(&self) -> String {
        let mut parts: Vec<_> = self.elements.iter().map(Validator::expected).collect();
        if self.allow_extra {
            parts.push("...".to_string());
        }
        format!("[{}]", parts.join(", "))
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        let Value::Array(items) = value else {
            cx.report(Issue::mismatch(self.summary(), value));
            return Check::Bool(false);
        };

        let required = self.required_count();
        if items.len() < required {
            cx.report(
                Issue::new(format!(
                    "Tuple must contain at least {}, received {}",
                    plural(required, "element"),
                    items.len()
                ))
                .with_expected(self.summary()),
            );
            return Check::Bool(false);
        }

        if !self.allow_extra && items.len() > self.elements.len() {
            for index in self.elements.len()..items.len() {
                cx.child(index).report(Issue::new("Unexpected element"));
            }
            return Check::Bool(false);
        }

        for (index, validator) in self.elements.iter().enumerate() {
            let mut element = cx.child(index);
            let Some(item) = items.get(index) else {
                if validator.is_optional() {
                    continue;
                }
                element.report(
                    Issue::new("Element is required but missing")
                        .with_expected(validator.expected()),
                );
                return Check::Bool(false);
            };
            let result = element.run(validator, item);
            if !result.ok {
                element.forward(result.issues);
                return Check::Bool(false);
            }
        }
        Check::Bool(true)
    }
}

#[derive(Clone)]
pub(crate) struct ShapeRule {
    schema: IndexMap<String, Validator>,
    allow_unknown_properties: bool,
}

impl ShapeRule {
    pub(super) fn specificity(&self) -> u32 {
        let properties = u32::try_from(self.schema.len()).unwrap_or(u32::MAX);
        COMPOSITE_BASE_SPECIFICITY
            .saturating_add(properties)
            .saturating_add(u32::from(!self.allow_unknown_properties))
    }

    pub(super) fn summary(&self) -> String {
        let mut parts: Vec<_> = self
            .schema
            .iter()
            .map(|(key, validator)| {
                if validator.is_optional() {
                    format!("{key}?: {}", validator.summary())
                } else {
                    format!("{key}: {}", validator.summary())
                }
            })
            .collect();
        if self.allow_unknown_properties {
            parts.push("...".to_string());
        }
        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join(", "))
        }
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        // Instances are objects too; their own fields face the schema.
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Instance(instance) => instance.fields(),
            _ => {
                cx.report(Issue::mismatch(self.summary(), value));
                return Check::Bool(false);
            }
        };

        let mut ok = true;
        for (key, validator) in &self.schema {
            let mut property = cx.child(key.as_str());
            match fields.get(key) {
                None if validator.is_optional() => {}
                None => {
                    property.report(
                        Issue::new("Property is required but missing")
                            .with_expected(validator.expected()),
                    );
                    ok = false;
                }
                Some(field) => {
                    let result = property.run(validator, field);
                    if !result.ok {
                        property.forward(result.issues);
                        ok = false;
                    }
                }
            }
        }

        if !self.allow_unknown_properties {
            for key in fields.keys().filter(|key| !self.schema.contains_key(*key)) {
                cx.child(key.as_str()).report(Issue::new("Unknown property"));
                ok = false;
            }
        }
        Check::Bool(ok)
    }
}

#[derive(Clone)]
pub(crate) struct InstanceOfRule {
    class: Class,
    inner: Option<Validator>,
}

impl InstanceOfRule {
    pub(super) fn specificity(&self) -> u32 {
        match &self.inner {
            Some(inner) => INSTANCE_FLOOR_SPECIFICITY.max(inner.specificity().saturating_add(1)),
            None => INSTANCE_FLOOR_SPECIFICITY,
        }
    }

    pub(super) fn summary(&self) -> String {
        format!("instanceof {}", self.class.name())
    }

    pub(super) fn check(&self, value: &Value, cx: &mut CheckContext<'_>) -> Check {
        match value {
            Value::Instance(instance) if instance.class().is_subclass_of(&self.class) => {}
            _ => {
                cx.report(Issue::mismatch(self.summary(), value));
                return Check::Bool(false);
            }
        }

        let Some(inner) = &self.inner else {
            return Check::Bool(true);
        };
        let result = cx.run(inner, value);
        if !result.ok {
            cx.forward(result.issues);
            return Check::Bool(false);
        }
        Check::Result(result)
    }
}

pub(super) fn check_union(
    branches: &[Validator],
    value: &Value,
    cx: &mut CheckContext<'_>,
) -> Check {
    let mut issues = Vec::new();
    for branch in branches {
        let result = cx.run(branch, value);
        if result.ok {
            return Check::Result(result);
        }
        issues.extend(result.issues);
    }
    cx.forward(issues);
    Check::Bool(false)
}

pub(super) fn check_intersection(
    parts: &[Validator],
    value: &Value,
    cx: &mut CheckContext<'_>,
) -> Check {
    for part in parts {
        let result = cx.run(part, value);
        if !result.ok {
            cx.forward(result.issues);
            return Check::Bool(false);
        }
    }
    Check::Result(ValidationResult::success())
}

/// An array whose every element satisfies `element`.
pub fn array(element: Validator) -> Validator {
    array_of([element], ArrayOptions::default())
}

/// An array whose every element satisfies at least one of `elements`.
pub fn array_of(elements: impl IntoIterator<Item = Validator>, options: ArrayOptions) -> Validator {
    Validator::new(
        Rule::Array(ArrayRule {
            elements: elements.into_iter().collect(),
            min_length: options.min_length,
            max_length: options.max_length,
            length: options.length,
            collect_all: options.collect_all,
        }),
        options.optional,
    )
}

/// A fixed-position array.
pub fn tuple(elements: impl IntoIterator<Item = Validator>) -> Validator {
    tuple_with(elements, TupleOptions::default())
}

/// A fixed-position array. Optional trailing positions may be absent;
/// extra elements are rejected unless `allow_extra` is set.
pub fn tuple_with(
    elements: impl IntoIterator<Item = Validator>,
    options: TupleOptions,
) -> Validator {
    Validator::new(
        Rule::Tuple(TupleRule {
            elements: elements.into_iter().collect(),
            allow_extra: options.allow_extra,
        }),
        options.optional,
    )
}

/// An object (plain or class instance) with exactly the properties in
/// `schema`. Arrays, primitives, functions and classes are rejected.
pub fn shape<K, I>(schema: I) -> Validator
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Validator)>,
{
    shape_with(schema, ShapeOptions::default())
}

/// Like [`shape`]. With `allow_unknown_properties`, properties outside
/// the schema are ignored instead of reported.
pub fn shape_with<K, I>(schema: I, options: ShapeOptions) -> Validator
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Validator)>,
{
    Validator::new(
        Rule::Shape(ShapeRule {
            schema: schema.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            allow_unknown_properties: options.allow_unknown_properties,
        }),
        options.optional,
    )
}

/// The first of `branches` that accepts the value wins.
pub fn union(branches: impl IntoIterator<Item = Validator>) -> Validator {
    Validator::new(Rule::Union(branches.into_iter().collect()), false)
}

/// Every one of `parts` must accept the value.
pub fn intersection(parts: impl IntoIterator<Item = Validator>) -> Validator {
    Validator::new(Rule::Intersection(parts.into_iter().collect()), false)
}

/// An instance of `class` or one of its subclasses.
pub fn instance_of(class: &Class) -> Validator {
    Validator::new(
        Rule::InstanceOf(InstanceOfRule {
            class: class.clone(),
            inner: None,
        }),
        false,
    )
}

/// An instance of `class` that also satisfies `inner`.
pub fn instance_of_with(class: &Class, inner: Validator) -> Validator {
    Validator::new(
        Rule::InstanceOf(InstanceOfRule {
            class: class.clone(),
            inner: Some(inner),
        }),
        false,
    )
}
