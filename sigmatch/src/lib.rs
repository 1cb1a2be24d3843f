//! Runtime overload resolution over structurally validated arguments.
//!
//! A logical operation is declared as an ordered set of signatures. Each
//! signature is a list of [`Validator`]s plus a handler; calling
//! [`Matcher::dispatch`] picks the single best-matching signature for a
//! concrete argument list and runs its handler, or explains precisely why
//! nothing matched.
//!
//! # Features
//!
//! - Primitive and composite validators with structured, path-aware issues
//! - Specificity scoring: literals beat primitives, primitives beat `unknown()`
//! - Arity bounds derived from optional validators
//! - Fallback signatures and signatures that always raise a declared error
//! - Configurable handling of equally ranked matches
//!
//! # Example
//!
//! ```
//! use sigmatch::{def, number, overload, string, DefOptions, Value};
//!
//! let describe = overload([
//!     def(DefOptions::named("label"), [string(), number()])
//!         .handle(|args: &[Value]| {
//!             let text = args[0].as_str().unwrap_or_default();
//!             Value::from(format!("{text}:{}", args[1].as_f64().unwrap_or_default()))
//!         })
//!         .unwrap(),
//!     def(DefOptions::named("sum"), [number(), number()])
//!         .handle(|args: &[Value]| {
//!             Value::from(args.iter().filter_map(Value::as_f64).sum::<f64>())
//!         })
//!         .unwrap(),
//! ]);
//!
//! let args = [Value::from("x"), Value::from(1)];
//! assert_eq!(describe.dispatch(&args).unwrap(), Value::from("x:1"));
//! assert_eq!(describe.dispatch(&[Value::from(2), Value::from(3)]).unwrap(), Value::from(5));
//!
//! let err = describe.dispatch(&[Value::Bool(true)]).unwrap_err();
//! assert!(err.to_string().starts_with("No overload matched for (true)"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod signature;
pub mod validate;
pub mod value;

pub use config::{DiagnosticsConfig, MatcherConfig, TieBreak};
pub use dispatch::{
    overload, AmbiguityError, DeclaredError, DispatchError, MatchScore, Matcher, NoMatchError,
    Resolution, SignatureFailure,
};
pub use error::{AuthoringError, ConfigError};
pub use signature::{
    def, fallback, DeclaredThrow, DefOptions, Definition, Handler, NormalizedSignature,
    PendingDefinition, SignatureInfo,
};
pub use validate::{
    array, array_of, boolean, custom, func, func_with, instance_of, instance_of_with,
    intersection, literal, literals, number, number_with, optional, shape, shape_with, string,
    string_with, tuple, tuple_with, type_of, union, unknown, ArrayOptions, Check, CheckContext,
    FuncOptions, Issue, NumberOptions, PathSegment, ShapeOptions, StringOptions, TupleOptions,
    ValidationResult, Validator,
};
pub use value::{Class, Function, Instance, Literal, Object, Value};
