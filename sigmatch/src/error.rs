//! Authoring and configuration errors.
//!
//! Dispatch-time errors live in [`crate::dispatch`]; validation issues are
//! plain data ([`crate::Issue`]) and never errors on their own.

use std::path::PathBuf;

use thiserror::Error;

/// Raised while building definitions or assembling a matcher.
#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("signature `{name}` declares no validators")]
    NoValidators { name: String },

    #[error(
        "signatures `{first}` and `{second}` collide: both have specificity {specificity} \
         and accept {required_arity}..={max_arity} arguments"
    )]
    Collision {
        first: String,
        second: String,
        specificity: u32,
        required_arity: usize,
        max_arity: usize,
    },
}

/// Raised while loading a [`MatcherConfig`](crate::MatcherConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid matcher config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize matcher config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
