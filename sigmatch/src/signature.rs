//! Signature authoring and normalization.
//!
//! A [`Definition`] is built with [`def`] followed by exactly one
//! finalizer ([`PendingDefinition::handle`] or
//! [`PendingDefinition::throws`]), or with [`fallback`]. When a
//! [`Matcher`](crate::Matcher) is assembled every definition is normalized
//! into a [`NormalizedSignature`] with its arity bounds and total
//! specificity computed once.

use std::fmt;
use std::sync::Arc;

use crate::error::AuthoringError;
use crate::validate::Validator;
use crate::value::Value;

/// A signature's handler. Its return value is passed back to the caller
/// untouched.
pub type Handler<R> = Arc<dyn Fn(&[Value]) -> R + Send + Sync>;

/// Optional metadata for [`def`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefOptions {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl DefOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn described(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: Some(description.into()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }
}

/// The error a signature always raises instead of running a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredThrow {
    /// Error kind, e.g. `"TypeError"`.
    pub kind: String,
    pub message: Option<String>,
}

/// What a signature does once selected.
pub(crate) enum Action<R> {
    Handle(Handler<R>),
    Throw(DeclaredThrow),
}

impl<R> Clone for Action<R> {
    fn clone(&self) -> Self {
        match self {
            Action::Handle(handler) => Action::Handle(Arc::clone(handler)),
            Action::Throw(throw) => Action::Throw(throw.clone()),
        }
    }
}

/// A definition that still needs its finalizer.
#[derive(Debug, Clone)]
#[must_use = "a definition needs `.handle(..)` or `.throws(..)`"]
pub struct PendingDefinition {
    options: DefOptions,
    validators: Vec<Validator>,
}

/// Start a signature definition.
pub fn def(
    options: DefOptions,
    validators: impl IntoIterator<Item = Validator>,
) -> PendingDefinition {
    PendingDefinition {
        options,
        validators: validators.into_iter().collect(),
    }
}

impl PendingDefinition {
    /// Finalize with a handler.
    pub fn handle<R, F>(self, handler: F) -> Result<Definition<R>, AuthoringError>
    where
        F: Fn(&[Value]) -> R + Send + Sync + 'static,
    {
        self.finish(Action::Handle(Arc::new(handler)))
    }

    /// Finalize with an error the signature always raises.
    pub fn throws<R>(
        self,
        kind: impl Into<String>,
        message: Option<&str>,
    ) -> Result<Definition<R>, AuthoringError> {
        self.finish(Action::Throw(DeclaredThrow {
            kind: kind.into(),
            message: message.map(str::to_string),
        }))
    }

    fn finish<R>(self, action: Action<R>) -> Result<Definition<R>, AuthoringError> {
        if self.validators.is_empty() {
            return Err(AuthoringError::NoValidators {
                name: self.options.label(),
            });
        }
        Ok(Definition {
            options: self.options,
            validators: self.validators,
            action,
            fallback: false,
        })
    }
}

/// A finalized signature definition.
pub struct Definition<R> {
    options: DefOptions,
    validators: Vec<Validator>,
    action: Action<R>,
    fallback: bool,
}

impl<R> Definition<R> {
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn options(&self) -> &DefOptions {
        &self.options
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

impl<R> Clone for Definition<R> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            validators: self.validators.clone(),
            action: self.action.clone(),
            fallback: self.fallback,
        }
    }
}

impl<R> fmt::Debug for Definition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("options", &self.options)
            .field("validators", &self.validators)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// A signature run when nothing else matches. It takes no validators and
/// receives the raw arguments.
pub fn fallback<R, F>(handler: F) -> Definition<R>
where
    F: Fn(&[Value]) -> R + Send + Sync + 'static,
{
    Definition {
        options: DefOptions::default(),
        validators: Vec::new(),
        action: Action::Handle(Arc::new(handler)),
        fallback: true,
    }
}

/// A definition after normalization: scored, with arity bounds.
pub struct NormalizedSignature<R> {
    /// Declaration position; the final tie-break.
    pub id: usize,
    pub name: Option<String>,
    pub description: Option<String>,
    pub validators: Vec<Validator>,
    pub min_arity: usize,
    pub required_arity: usize,
    pub max_arity: usize,
    /// Sum of the validators' specificities.
    pub specificity: u32,
    pub fallback: bool,
    action: Action<R>,
}

impl<R> NormalizedSignature<R> {
    pub fn normalize(definition: Definition<R>, id: usize) -> Self {
        let Definition {
            options,
            validators,
            action,
            fallback,
        } = definition;

        let required_arity = validators.iter().filter(|v| !v.is_optional()).count();
        let min_arity = if fallback { 0 } else { required_arity };
        let max_arity = validators.len();
        let specificity = validators.iter().map(Validator::specificity).sum();

        Self {
            id,
            name: options.name,
            description: options.description,
            validators,
            min_arity,
            required_arity,
            max_arity,
            specificity,
            fallback,
            action,
        }
    }

    /// Name, description, or `overload#<id>`.
    pub fn label(&self) -> String {
        signature_label(self.id, self.name.as_deref(), self.description.as_deref())
    }

    /// Expected summary of each position.
    pub fn expected(&self) -> Vec<String> {
        self.validators.iter().map(Validator::expected).collect()
    }

    pub fn handler(&self) -> Option<&Handler<R>> {
        match &self.action {
            Action::Handle(handler) => Some(handler),
            Action::Throw(_) => None,
        }
    }

    pub fn throws(&self) -> Option<&DeclaredThrow> {
        match &self.action {
            Action::Throw(throw) => Some(throw),
            Action::Handle(_) => None,
        }
    }

    pub(crate) fn action(&self) -> &Action<R> {
        &self.action
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        (self.min_arity..=self.max_arity).contains(&count)
    }

    /// A handler-free snapshot for diagnostics.
    pub fn info(&self) -> SignatureInfo {
        SignatureInfo {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            expected: self.expected(),
            specificity: self.specificity,
            min_arity: self.min_arity,
            required_arity: self.required_arity,
            max_arity: self.max_arity,
            fallback: self.fallback,
        }
    }
}

impl<R> fmt::Debug for NormalizedSignature<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedSignature")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("expected", &self.expected())
            .field("arity", &(self.min_arity, self.required_arity, self.max_arity))
            .field("specificity", &self.specificity)
            .field("fallback", &self.fallback)
            .field("throws", &self.throws())
            .finish()
    }
}

/// Description of a signature carried by errors, independent of the
/// handler's return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub id: usize,
    pub name: Option<String>,
    pub description: Option<String>,
    pub expected: Vec<String>,
    pub specificity: u32,
    pub min_arity: usize,
    pub required_arity: usize,
    pub max_arity: usize,
    pub fallback: bool,
}

impl SignatureInfo {
    pub fn label(&self) -> String {
        signature_label(self.id, self.name.as_deref(), self.description.as_deref())
    }
}

fn signature_label(id: usize, name: Option<&str>, description: Option<&str>) -> String {
    name.or(description)
        .map(str::to_string)
        .unwrap_or_else(|| format!("overload#{id}"))
}
