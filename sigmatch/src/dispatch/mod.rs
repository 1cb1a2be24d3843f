//! Overload resolution.
//!
//! A [`Matcher`] holds an ordered set of normalized signatures and selects
//! the best one for each argument list it is given.
//!
//! # Algorithm Overview
//!
//! 1. **Arity gate**: skip signatures whose arity bounds exclude the call
//! 2. **Positional validation**: validate each argument at `arg.[i]`,
//!    stopping at the first failing position
//! 3. **Extra arguments**: reject arguments beyond the declared positions
//! 4. **Score**: rank every accepted signature by [`MatchScore`]
//! 5. **Select**: run the best signature, the fallback when nothing
//!    matched, or report why every signature was rejected

mod result;
mod score;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::{MatcherConfig, TieBreak};
use crate::diagnostics::render_issue;
use crate::error::AuthoringError;
use crate::signature::{Action, Definition, NormalizedSignature};
use crate::validate::{Issue, PathSegment};
use crate::value::Value;

pub use result::{
    AmbiguityError, DeclaredError, DispatchError, NoMatchError, Resolution, SignatureFailure,
};
pub use score::MatchScore;

/// Assemble a matcher with the default configuration.
pub fn overload<R>(definitions: impl IntoIterator<Item = Definition<R>>) -> Matcher<R> {
    let (signatures, fallback) = partition(definitions);
    Matcher {
        signatures,
        fallback,
        config: MatcherConfig::default(),
    }
}

/// An immutable set of signatures for one logical operation.
pub struct Matcher<R = Value> {
    signatures: Vec<NormalizedSignature<R>>,
    fallback: Option<NormalizedSignature<R>>,
    config: MatcherConfig,
}

impl<R> Matcher<R> {
    /// Same as [`overload`].
    pub fn new(definitions: impl IntoIterator<Item = Definition<R>>) -> Self {
        overload(definitions)
    }

    /// Assemble a matcher with an explicit configuration.
    ///
    /// Fails with [`AuthoringError::Collision`] when `reject_collisions` is
    /// set and two ordinary signatures share specificity and arity bounds.
    pub fn with_config(
        definitions: impl IntoIterator<Item = Definition<R>>,
        config: MatcherConfig,
    ) -> Result<Self, AuthoringError> {
        let (signatures, fallback) = partition(definitions);
        if config.reject_collisions {
            check_collisions(&signatures)?;
        }
        Ok(Self {
            signatures,
            fallback,
            config,
        })
    }

    /// Ordinary signatures in declaration order.
    pub fn signatures(&self) -> &[NormalizedSignature<R>] {
        &self.signatures
    }

    pub fn fallback(&self) -> Option<&NormalizedSignature<R>> {
        self.fallback.as_ref()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Select the signature for `args` without invoking it.
    pub fn resolve(&self, args: &[Value]) -> Resolution<'_, R> {
        let mut top: Vec<(MatchScore, &NormalizedSignature<R>)> = Vec::new();
        let mut failures = Vec::new();

        for signature in &self.signatures {
            let score = match evaluate(signature, args) {
                Ok(score) => score,
                Err(issues) => {
                    trace!(
                        "{} rejected: {}",
                        signature.label(),
                        issues.first().map(render_issue).unwrap_or_default()
                    );
                    failures.push(SignatureFailure {
                        signature: signature.info(),
                        expected: signature.expected(),
                        issues,
                    });
                    continue;
                }
            };

            let ordering = top
                .first()
                .map(|(best, _)| self.compare(&score, best))
                .unwrap_or(Ordering::Greater);
            match ordering {
                Ordering::Greater => {
                    top.clear();
                    top.push((score, signature));
                }
                Ordering::Equal => top.push((score, signature)),
                Ordering::Less => {}
            }
        }

        match top.as_slice() {
            [] => match &self.fallback {
                Some(fallback) => {
                    debug!("no signature matched {} argument(s), using fallback", args.len());
                    Resolution::Fallback(fallback)
                }
                None => Resolution::NoMatch(NoMatchError {
                    args: args.to_vec(),
                    failures,
                    issue_limit: self.config.diagnostics.max_issues_per_signature,
                }),
            },
            [(score, signature)] => {
                debug!("selected {} with {:?}", signature.label(), score);
                Resolution::Resolved(*signature)
            }
            tied => {
                debug!("{} signatures tied for {} argument(s)", tied.len(), args.len());
                Resolution::Ambiguous(AmbiguityError {
                    args: args.to_vec(),
                    candidates: tied.iter().map(|(_, signature)| signature.info()).collect(),
                })
            }
        }
    }

    /// Resolve `args` and run the selected signature.
    ///
    /// The handler's return value is passed back unchanged. A signature
    /// declared with `throws` returns [`DispatchError::Declared`] without
    /// running anything.
    pub fn dispatch(&self, args: &[Value]) -> Result<R, DispatchError> {
        let signature = match self.resolve(args) {
            Resolution::Resolved(signature) | Resolution::Fallback(signature) => signature,
            Resolution::NoMatch(err) => return Err(err.into()),
            Resolution::Ambiguous(err) => return Err(err.into()),
        };

        match signature.action() {
            Action::Handle(handler) => Ok(handler(args)),
            Action::Throw(throw) => Err(DeclaredError {
                signature: signature.info(),
                kind: throw.kind.clone(),
                message: throw.message.clone(),
            }
            .into()),
        }
    }

    fn compare(&self, a: &MatchScore, b: &MatchScore) -> Ordering {
        match self.config.tie_break {
            TieBreak::DeclarationOrder => a.cmp(b),
            TieBreak::Ambiguous => a.cmp_rank(b),
        }
    }
}

impl<R> fmt::Debug for Matcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("signatures", &self.signatures)
            .field("fallback", &self.fallback)
            .field("config", &self.config)
            .finish()
    }
}

/// Normalize definitions, splitting off the first fallback.
fn partition<R>(
    definitions: impl IntoIterator<Item = Definition<R>>,
) -> (Vec<NormalizedSignature<R>>, Option<NormalizedSignature<R>>) {
    let mut signatures = Vec::new();
    let mut fallback = None;

    for (id, definition) in definitions.into_iter().enumerate() {
        let signature = NormalizedSignature::normalize(definition, id);
        if !signature.fallback {
            signatures.push(signature);
        } else if fallback.is_none() {
            fallback = Some(signature);
        } else {
            warn!("ignoring extra fallback declared at position {id}");
        }
    }
    (signatures, fallback)
}

fn check_collisions<R>(signatures: &[NormalizedSignature<R>]) -> Result<(), AuthoringError> {
    let mut seen: FxHashMap<(u32, usize, usize), &NormalizedSignature<R>> = FxHashMap::default();
    for signature in signatures {
        let key = (signature.specificity, signature.required_arity, signature.max_arity);
        if let Some(first) = seen.insert(key, signature) {
            return Err(AuthoringError::Collision {
                first: first.label(),
                second: signature.label(),
                specificity: signature.specificity,
                required_arity: signature.required_arity,
                max_arity: signature.max_arity,
            });
        }
    }
    Ok(())
}

/// Check one signature against `args`.
fn evaluate<R>(
    signature: &NormalizedSignature<R>,
    args: &[Value],
) -> Result<MatchScore, Vec<Issue>> {
    if !signature.accepts_arity(args.len()) {
        return Err(vec![Issue::new(format!(
            "Received {} arguments, expected between {} and {}",
            args.len(),
            signature.min_arity,
            signature.max_arity
        ))
        .with_expected(format!("{}..={}", signature.min_arity, signature.max_arity))
        .with_actual(args.len().to_string())]);
    }

    for (index, validator) in signature.validators.iter().enumerate() {
        let path = vec![PathSegment::from("arg"), PathSegment::from(index)];
        let Some(arg) = args.get(index) else {
            if validator.is_optional() {
                continue;
            }
            return Err(vec![Issue::new("Argument is required but missing")
                .at(path)
                .with_expected(validator.expected())]);
        };

        let result = validator.validate(arg, &path);
        if !result.ok {
            return Err(result.issues);
        }
    }

    if args.len() > signature.validators.len() {
        return Err((signature.validators.len()..args.len())
            .map(|index| {
                Issue::new("Unexpected argument")
                    .at(vec![PathSegment::from("arg"), PathSegment::from(index)])
            })
            .collect());
    }

    Ok(MatchScore {
        specificity: signature.specificity,
        required_arity: signature.required_arity,
        exact_arity: args.len() == signature.validators.len(),
        id: signature.id,
    })
}
