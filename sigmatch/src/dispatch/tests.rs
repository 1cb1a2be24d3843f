use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::config::DiagnosticsConfig;
use crate::signature::{def, fallback, DefOptions, SignatureInfo};
use crate::validate::{
    array, boolean, custom, instance_of_with, literal, number, number_with, optional, shape,
    string, string_with, unknown, Check, NumberOptions, StringOptions,
};
use crate::value::{Class, Object};

fn tag(name: &'static str) -> impl Fn(&[Value]) -> Value + Send + Sync + 'static {
    move |_| Value::from(name)
}

fn named(name: &str) -> DefOptions {
    DefOptions::named(name)
}

#[test]
fn test_literal_beats_string() {
    let matcher = overload([
        def(named("any"), [string()]).handle(tag("string")).unwrap(),
        def(named("ok"), [literal("ok")]).handle(tag("literal")).unwrap(),
    ]);

    assert_eq!(matcher.dispatch(&[Value::from("ok")]).unwrap(), Value::from("literal"));
    assert_eq!(matcher.dispatch(&[Value::from("nope")]).unwrap(), Value::from("string"));
}

#[test]
fn test_literal_beats_string_regardless_of_order() {
    let matcher = overload([
        def(named("ok"), [literal("ok")]).handle(tag("literal")).unwrap(),
        def(named("any"), [string()]).handle(tag("string")).unwrap(),
    ]);

    assert_eq!(matcher.dispatch(&[Value::from("ok")]).unwrap(), Value::from("literal"));
}

#[test]
fn test_exact_arity_wins() {
    let matcher = overload([
        def(
            named("optional"),
            [
                number(),
                string_with(StringOptions {
                    optional: true,
                    ..Default::default()
                }),
            ],
        )
        .handle(tag("optional"))
        .unwrap(),
        def(named("exact"), [number(), string()])
            .handle(tag("exact"))
            .unwrap(),
    ]);

    let args = [Value::from(1), Value::from("x")];
    assert_eq!(matcher.dispatch(&args).unwrap(), Value::from("exact"));
    assert_eq!(matcher.dispatch(&[Value::from(1)]).unwrap(), Value::from("optional"));
}

#[test]
fn test_last_declaration_wins() {
    let matcher = overload([
        def(named("first"), [boolean()]).handle(tag("first")).unwrap(),
        def(named("second"), [boolean()]).handle(tag("second")).unwrap(),
    ]);

    assert_eq!(matcher.dispatch(&[Value::Bool(true)]).unwrap(), Value::from("second"));
}

#[test]
fn test_end_to_end_concat_and_add() {
    let matcher = overload([
        def(DefOptions::default(), [string(), number()])
            .handle(|args: &[Value]| {
                let a = args[0].as_str().unwrap_or_default();
                let b = args[1].as_f64().unwrap_or_default();
                Value::from(format!("{a}:{}", crate::value::format_number(b)))
            })
            .unwrap(),
        def(DefOptions::default(), [number(), number()])
            .handle(|args: &[Value]| {
                let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
                Value::from(sum)
            })
            .unwrap(),
    ]);

    assert_eq!(
        matcher.dispatch(&[Value::from("x"), Value::from(1)]).unwrap(),
        Value::from("x:1")
    );
    assert_eq!(
        matcher.dispatch(&[Value::from(2), Value::from(3)]).unwrap(),
        Value::from(5)
    );

    let err = matcher.dispatch(&[Value::Bool(true)]).unwrap_err();
    assert!(matches!(err, DispatchError::NoMatch(_)));
    assert!(err.to_string().contains("No overload matched for (true)"));
}

#[test]
fn test_no_match_reports_every_signature() {
    let matcher = overload([
        def(named("concat"), [string(), string()])
            .handle(tag("concat"))
            .unwrap(),
        def(DefOptions::default(), [number(), number()])
            .handle(tag("add"))
            .unwrap(),
    ]);

    let err = match matcher.resolve(&[Value::from("x"), Value::Bool(true)]) {
        Resolution::NoMatch(err) => err,
        other => panic!("expected no match, got {other:?}"),
    };

    assert_eq!(err.failures.len(), 2);
    assert_eq!(err.failures[0].signature.label(), "concat");
    assert_eq!(err.failures[0].expected, vec!["string", "string"]);
    assert_eq!(err.failures[1].signature.label(), "overload#1");
    assert_eq!(
        err.to_string(),
        "No overload matched for (\"x\", true)\n  \
         concat expects (string, string)\n    \
         arg.[1] Expected string, received boolean\n  \
         overload#1 expects (number, number)\n    \
         arg.[0] Expected number, received string"
    );
}

#[test]
fn test_arity_gate_skips_positional_checks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counting = custom("counted", 2, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Check::Bool(true)
    });
    let matcher = overload([def(DefOptions::default(), [counting.clone(), counting])
        .handle(tag("pair"))
        .unwrap()]);

    let err = match matcher.resolve(&[Value::from(1)]) {
        Resolution::NoMatch(err) => err,
        other => panic!("expected no match, got {other:?}"),
    };
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(err.failures[0].issues.len(), 1);
    assert_eq!(
        err.failures[0].issues[0].message,
        "Received 1 arguments, expected between 2 and 2"
    );
    assert!(err.failures[0].issues[0].path.is_empty());
}

#[test]
fn test_positional_validation_stops_at_first_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let counting = custom("counted", 2, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Check::Bool(true)
    });
    let matcher = overload([def(DefOptions::default(), [number(), counting])
        .handle(tag("pair"))
        .unwrap()]);

    let err = matcher
        .dispatch(&[Value::from("not a number"), Value::from(1)])
        .unwrap_err();
    let DispatchError::NoMatch(err) = err else {
        panic!("expected no match");
    };
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(err.failures[0].issues.len(), 1);
    assert_eq!(
        err.failures[0].issues[0].path,
        vec![PathSegment::from("arg"), PathSegment::from(0)]
    );
}

#[test]
fn test_optional_trailing_argument_may_be_undefined() {
    let matcher = overload([def(
        DefOptions::default(),
        [string(), optional(number())],
    )
    .handle(|args: &[Value]| Value::from(args.len() as u32))
    .unwrap()]);

    assert_eq!(matcher.dispatch(&[Value::from("a")]).unwrap(), Value::from(1));
    assert_eq!(
        matcher
            .dispatch(&[Value::from("a"), Value::Undefined])
            .unwrap(),
        Value::from(2)
    );
}

#[test]
fn test_fallback_receives_raw_arguments() {
    let matcher = overload([
        def(DefOptions::default(), [number()]).handle(tag("number")).unwrap(),
        fallback(|args: &[Value]| Value::Array(args.to_vec())),
    ]);

    let args = [Value::from("a"), Value::Null, Value::Bool(false)];
    assert_eq!(matcher.dispatch(&args).unwrap(), Value::Array(args.to_vec()));
    assert_eq!(matcher.dispatch(&[]).unwrap(), Value::Array(Vec::new()));
    assert_eq!(matcher.dispatch(&[Value::from(1)]).unwrap(), Value::from("number"));
}

#[test]
fn test_first_fallback_is_effective() {
    let matcher = overload([
        fallback(tag("first")),
        def(DefOptions::default(), [number()]).handle(tag("number")).unwrap(),
        fallback(tag("second")),
    ]);

    assert_eq!(matcher.signatures().len(), 1);
    assert_eq!(matcher.signatures()[0].id, 1);
    assert_eq!(matcher.fallback().map(|f| f.id), Some(0));
    assert_eq!(matcher.dispatch(&[Value::Null]).unwrap(), Value::from("first"));
}

#[test]
fn test_declared_throw_never_runs_a_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let matcher = overload([
        def(DefOptions::default(), [unknown()])
            .handle(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Value::Null
            })
            .unwrap(),
        def(named("reject-booleans"), [boolean()])
            .throws("TypeError", Some("booleans are not accepted"))
            .unwrap(),
    ]);

    let err = matcher.dispatch(&[Value::Bool(true)]).unwrap_err();
    let DispatchError::Declared(declared) = &err else {
        panic!("expected declared error, got {err:?}");
    };
    assert_eq!(declared.kind, "TypeError");
    assert_eq!(declared.signature.label(), "reject-booleans");
    assert_eq!(err.to_string(), "TypeError: booleans are not accepted");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    matcher.dispatch(&[Value::Null]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handler_result_is_returned_verbatim() {
    type Pending = Box<dyn FnOnce() -> Result<String, String> + Send>;

    let matcher: Matcher<Pending> = overload([
        def(DefOptions::default(), [string()])
            .handle(|args: &[Value]| {
                let text = args[0].as_str().unwrap_or_default().to_string();
                Box::new(move || Ok::<_, String>(text)) as Pending
            })
            .unwrap(),
        def(DefOptions::default(), [number()])
            .handle(|_: &[Value]| {
                Box::new(|| Err::<String, _>("numbers fail later".to_string())) as Pending
            })
            .unwrap(),
    ]);

    let pending = matcher.dispatch(&[Value::from("later")]).unwrap();
    assert_eq!(pending(), Ok("later".to_string()));
    let pending = matcher.dispatch(&[Value::from(1)]).unwrap();
    assert_eq!(pending(), Err("numbers fail later".to_string()));
}

#[test]
fn test_unknown_ranks_below_everything() {
    let matcher = overload([
        def(named("number"), [number()]).handle(tag("number")).unwrap(),
        def(named("anything"), [unknown()]).handle(tag("anything")).unwrap(),
    ]);

    assert_eq!(matcher.dispatch(&[Value::from(1)]).unwrap(), Value::from("number"));
    assert_eq!(matcher.dispatch(&[Value::Null]).unwrap(), Value::from("anything"));
}

#[test]
fn test_required_arity_beats_exact_arity() {
    // Same specificity; the signature requiring more arguments wins even
    // though the other one matches the exact count.
    let matcher = overload([
        def(named("one-required"), [number(), optional(number())])
            .handle(tag("one-required"))
            .unwrap(),
        def(named("two-required"), [number(), number(), optional(unknown())])
            .handle(tag("two-required"))
            .unwrap(),
    ]);

    let args = [Value::from(1), Value::from(2)];
    assert_eq!(matcher.dispatch(&args).unwrap(), Value::from("two-required"));
}

#[test]
fn test_ambiguous_tie_break_reports_every_tied_signature() {
    let config = MatcherConfig::new().with_tie_break(TieBreak::Ambiguous);
    let matcher = Matcher::with_config(
        [
            def(named("a"), [boolean()]).handle(tag("a")).unwrap(),
            def(named("b"), [boolean()]).handle(tag("b")).unwrap(),
            def(named("num"), [number()]).handle(tag("num")).unwrap(),
        ],
        config,
    )
    .unwrap();

    let err = matcher.dispatch(&[Value::Bool(false)]).unwrap_err();
    let DispatchError::Ambiguous(ambiguity) = &err else {
        panic!("expected ambiguity, got {err:?}");
    };
    let labels: Vec<_> = ambiguity.candidates.iter().map(SignatureInfo::label).collect();
    assert_eq!(labels, vec!["a", "b"]);
    assert_eq!(
        err.to_string(),
        "Ambiguous overload for (false): 2 signatures match equally well\n  \
         a expects (boolean)\n  \
         b expects (boolean)"
    );

    assert_eq!(matcher.dispatch(&[Value::from(1)]).unwrap(), Value::from("num"));
}

#[test]
fn test_ambiguous_tie_break_still_ranks_by_specificity() {
    let config = MatcherConfig::new().with_tie_break(TieBreak::Ambiguous);
    let matcher = Matcher::with_config(
        [
            def(named("literal"), [literal(true)]).handle(tag("literal")).unwrap(),
            def(named("boolean"), [boolean()]).handle(tag("boolean")).unwrap(),
        ],
        config,
    )
    .unwrap();

    assert_eq!(matcher.dispatch(&[Value::Bool(true)]).unwrap(), Value::from("literal"));
}

#[test]
fn test_reject_collisions_at_construction() {
    let config = MatcherConfig::new().rejecting_collisions();
    let err = Matcher::with_config(
        [
            def(named("first"), [string()]).handle(tag("first")).unwrap(),
            def(named("other"), [number(), number()]).handle(tag("other")).unwrap(),
            def(named("second"), [number()]).handle(tag("second")).unwrap(),
        ],
        config,
    )
    .unwrap_err();

    match err {
        AuthoringError::Collision {
            first,
            second,
            specificity,
            required_arity,
            max_arity,
        } => {
            assert_eq!((first.as_str(), second.as_str()), ("first", "second"));
            assert_eq!((specificity, required_arity, max_arity), (2, 1, 1));
        }
        other => panic!("expected collision, got {other:?}"),
    }
}

#[test]
fn test_reject_collisions_ignores_fallbacks_and_distinct_scores() {
    let config = MatcherConfig::new().rejecting_collisions();
    let matcher = Matcher::with_config(
        [
            def(DefOptions::default(), [string()]).handle(tag("string")).unwrap(),
            def(DefOptions::default(), [literal("x")]).handle(tag("x")).unwrap(),
            fallback(tag("fallback")),
            fallback(tag("ignored")),
        ],
        config,
    );
    assert!(matcher.is_ok());
}

#[test]
fn test_issue_limit_truncates_rendered_report() {
    let config = MatcherConfig {
        diagnostics: DiagnosticsConfig {
            max_issues_per_signature: 1,
        },
        ..MatcherConfig::default()
    };
    let matcher = Matcher::with_config(
        [def(named("user"), [shape([("id", number()), ("name", string())])])
            .handle(tag("user"))
            .unwrap()],
        config,
    )
    .unwrap();

    let err = matcher
        .dispatch(&[Value::object([("id", Value::from("1"))])])
        .unwrap_err();
    let DispatchError::NoMatch(no_match) = &err else {
        panic!("expected no match");
    };
    assert_eq!(no_match.issues().count(), 2);
    assert_eq!(
        err.to_string(),
        "No overload matched for ({\"id\":\"1\"})\n  \
         user expects ({ id: number, name: string })\n    \
         arg.[0].id Expected number, received string\n    \
         ... and 1 more"
    );
}

#[test]
fn test_nested_issue_paths() {
    let matcher = overload([def(
        named("tagged"),
        [shape([("tags", array(string()))])],
    )
    .handle(tag("tagged"))
    .unwrap()]);

    let err = matcher
        .dispatch(&[Value::object([(
            "tags",
            Value::array([Value::from("a"), Value::from("b"), Value::from(3)]),
        )])])
        .unwrap_err();
    assert!(err
        .to_string()
        .ends_with("arg.[0].tags.[2] Expected string, received number"));
}

#[test]
fn test_instance_of_shape_beats_plain_shape() {
    let point = Class::new("Point");
    let matcher = overload([
        def(named("plain"), [shape([("x", number())])])
            .handle(tag("plain"))
            .unwrap(),
        def(named("point"), [instance_of_with(&point, shape([("x", number())]))])
            .handle(tag("point"))
            .unwrap(),
    ]);
    let x = |value: Value| -> Object { [("x".to_string(), value)].into_iter().collect() };

    assert_eq!(
        matcher.dispatch(&[point.instantiate(x(Value::from(1)))]).unwrap(),
        Value::from("point")
    );
    assert_eq!(
        matcher.dispatch(&[Value::Object(x(Value::from(1)))]).unwrap(),
        Value::from("plain")
    );

    let err = matcher
        .dispatch(&[point.instantiate(x(Value::from("a")))])
        .unwrap_err();
    assert!(err
        .to_string()
        .ends_with("arg.[0].x Expected number, received string"));
}

#[test]
fn test_dispatch_is_deterministic() {
    let matcher = overload([
        def(DefOptions::default(), [number_with(NumberOptions {
            integer: true,
            ..Default::default()
        })])
        .handle(tag("integer"))
        .unwrap(),
        def(DefOptions::default(), [number()]).handle(tag("number")).unwrap(),
        def(DefOptions::default(), [unknown()]).handle(tag("unknown")).unwrap(),
    ]);

    for _ in 0..10 {
        assert_eq!(matcher.dispatch(&[Value::from(4)]).unwrap(), Value::from("integer"));
        assert_eq!(matcher.dispatch(&[Value::from(4.5)]).unwrap(), Value::from("number"));
    }
}

#[test]
fn test_matcher_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Matcher>();

    let matcher = Arc::new(overload([
        def(DefOptions::default(), [number()]).handle(tag("number")).unwrap(),
    ]));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let matcher = Arc::clone(&matcher);
            std::thread::spawn(move || matcher.dispatch(&[Value::from(i)]).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::from("number"));
    }
}
