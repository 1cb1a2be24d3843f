//! Rendering of arguments, issue paths and failure reports.
//!
//! A no-match report looks like:
//!
//! ```text
//! No overload matched for ("x", true)
//!   concat expects (string, string)
//!     arg.[1] Expected string, received boolean
//!   overload#1 expects (number, number)
//!     arg.[0] Expected number, received string
//! ```

use std::fmt::{self, Write};

use crate::dispatch::SignatureFailure;
use crate::signature::SignatureInfo;
use crate::validate::{Issue, PathSegment};
use crate::value::{format_number, object_to_json, Value};

const UNSERIALIZABLE: &str = "[unserializable]";

/// Render one argument the way it appears in error headers.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| UNSERIALIZABLE.to_string()),
        Value::Function(func) => match func.name() {
            Some(name) => format!("[Function: {name}]"),
            None => "[Function: anonymous]".to_string(),
        },
        Value::Class(class) => format!("[class {}]", class.name()),
        Value::Instance(instance) => {
            let fields = serde_json::to_string(&object_to_json(instance.fields()))
                .unwrap_or_else(|_| UNSERIALIZABLE.to_string());
            format!("{} {fields}", instance.class().name())
        }
        Value::Array(_) | Value::Object(_) => value
            .to_json()
            .and_then(|json| serde_json::to_string(&json).ok())
            .unwrap_or_else(|| UNSERIALIZABLE.to_string()),
    }
}

/// Render an argument list, comma separated.
pub fn render_args(args: &[Value]) -> String {
    args.iter().map(render_value).collect::<Vec<_>>().join(", ")
}

/// `["arg", 0, "tags", 2]` renders as `arg.[0].tags.[2]`.
pub fn render_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// `<path> <message>`, or just the message for an empty path.
pub fn render_issue(issue: &Issue) -> String {
    if issue.path.is_empty() {
        issue.message.clone()
    } else {
        format!("{} {}", render_path(&issue.path), issue.message)
    }
}

fn write_signature_line(f: &mut impl Write, label: &str, expected: &[String]) -> fmt::Result {
    write!(f, "\n  {label} expects ({})", expected.join(", "))
}

/// Write the full no-match report. `issue_limit == 0` lists every issue.
pub(crate) fn write_no_match(
    f: &mut impl Write,
    args: &[Value],
    failures: &[SignatureFailure],
    issue_limit: usize,
) -> fmt::Result {
    write!(f, "No overload matched for ({})", render_args(args))?;
    for failure in failures {
        write_signature_line(f, &failure.signature.label(), &failure.expected)?;

        let shown = if issue_limit == 0 {
            failure.issues.len()
        } else {
            issue_limit.min(failure.issues.len())
        };
        for issue in &failure.issues[..shown] {
            write!(f, "\n    {}", render_issue(issue))?;
        }
        let hidden = failure.issues.len() - shown;
        if hidden > 0 {
            write!(f, "\n    ... and {hidden} more")?;
        }
    }
    Ok(())
}

pub(crate) fn write_ambiguity(
    f: &mut impl Write,
    args: &[Value],
    candidates: &[SignatureInfo],
) -> fmt::Result {
    write!(
        f,
        "Ambiguous overload for ({}): {} signatures match equally well",
        render_args(args),
        candidates.len()
    )?;
    for candidate in candidates {
        write_signature_line(f, &candidate.label(), &candidate.expected)?;
    }
    Ok(())
}
