//! Dispatch result types and errors.

use std::fmt;

use thiserror::Error;

use crate::diagnostics;
use crate::signature::{NormalizedSignature, SignatureInfo};
use crate::validate::Issue;
use crate::value::Value;

/// Outcome of resolving an argument list, before anything is invoked.
#[derive(Debug)]
pub enum Resolution<'a, R> {
    /// A single best ordinary signature matched.
    Resolved(&'a NormalizedSignature<R>),
    /// Nothing matched and the fallback takes over.
    Fallback(&'a NormalizedSignature<R>),
    /// Nothing matched and there is no fallback.
    NoMatch(NoMatchError),
    /// Several signatures share the top score.
    Ambiguous(AmbiguityError),
}

/// Why one signature rejected the arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureFailure {
    pub signature: SignatureInfo,
    pub issues: Vec<Issue>,
    /// Expected summary of each position.
    pub expected: Vec<String>,
}

/// Error when no signature accepts the arguments and there is no fallback.
#[derive(Debug, Clone)]
pub struct NoMatchError {
    /// The arguments as supplied.
    pub args: Vec<Value>,
    /// One report per rejected signature, in declaration order.
    pub failures: Vec<SignatureFailure>,
    pub(crate) issue_limit: usize,
}

impl NoMatchError {
    /// Every issue of every rejected signature.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.failures.iter().flat_map(|failure| failure.issues.iter())
    }
}

impl fmt::Display for NoMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        diagnostics::write_no_match(f, &self.args, &self.failures, self.issue_limit)
    }
}

impl std::error::Error for NoMatchError {}

/// Error when multiple signatures match equally well.
#[derive(Debug, Clone)]
pub struct AmbiguityError {
    pub args: Vec<Value>,
    /// The tied signatures, in declaration order.
    pub candidates: Vec<SignatureInfo>,
}

impl fmt::Display for AmbiguityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        diagnostics::write_ambiguity(f, &self.args, &self.candidates)
    }
}

impl std::error::Error for AmbiguityError {}

/// The error a `throws` signature raises when selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("declared by signature"))]
pub struct DeclaredError {
    /// The signature that declared the error.
    pub signature: SignatureInfo,
    pub kind: String,
    pub message: Option<String>,
}

/// Errors raised by [`Matcher::dispatch`](crate::Matcher::dispatch).
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error(transparent)]
    NoMatch(NoMatchError),

    #[error(transparent)]
    Ambiguous(AmbiguityError),

    #[error(transparent)]
    Declared(DeclaredError),
}

impl From<NoMatchError> for DispatchError {
    fn from(err: NoMatchError) -> Self {
        DispatchError::NoMatch(err)
    }
}

impl From<AmbiguityError> for DispatchError {
    fn from(err: AmbiguityError) -> Self {
        DispatchError::Ambiguous(err)
    }
}

impl From<DeclaredError> for DispatchError {
    fn from(err: DeclaredError) -> Self {
        DispatchError::Declared(err)
    }
}
