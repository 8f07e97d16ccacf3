// tests/integration_tests.rs
// End-to-end tests: query text and logfmt line in, evaluation result out

use std::thread;

use lrep::evaluator::Side;
use lrep::{EvalError, Evaluator, Record, Value, eval, parse, to_literal};

/// Evaluate `query` against the record `line` and return the literal text
/// of the result.
fn run(line: &str, query: &str) -> String {
    let record = Record::parse(line).unwrap_or_else(|e| panic!("bad record {line:?}: {e}"));
    let expr = parse(query).unwrap_or_else(|e| panic!("bad query {query:?}: {e}"));
    to_literal(&eval(&expr, &record))
}

fn eval_line(line: &str, query: &str) -> Result<Value, EvalError> {
    let record = Record::parse(line).unwrap();
    eval(&parse(query).unwrap(), &record)
}

#[test]
fn test_readme_cases() {
    let test_cases = vec![
        ("user=johndoe", ".user", r#""johndoe""#),
        ("user=John mail=john@doe.com", ".user", r#""John""#),
        ("in=120 out=125", ".in < .out", "true"),
        ("in=125 out=120", ".in < .out", "false"),
        ("user=johndoe@mail.com", ".user ~ /john.*/", "true"),
        ("user=johndoe@mail.com", ".user ~ /jane.*/", "false"),
        ("user=johndoe@mail.com age=20", ".user ~ /john.*/ and .age < 40", "true"),
        ("a=true b=false c=false", ".a OR .b AND .c", "true"),
        ("a=true b=false c=false", ".a OR ( .b AND .c )", "true"),
        ("a=true b=false c=false", "(.a OR  .b ) AND .c ", "false"),
        (r#"a="path/subpath""#, r".a ~ /path\/sub.*/", "true"),
    ];

    for (line, query, expected) in test_cases {
        assert_eq!(run(line, query), expected, "Failed for {query:?} on {line:?}");
    }
}

// ============================================================================
// Literals and lookups
// ============================================================================

#[test]
fn test_literal_values() {
    assert_eq!(run("", "12"), "12");
    assert_eq!(run("", "52.5"), "52.5");
    assert_eq!(run("", "90s"), "1m30s");
    assert_eq!(run("", "/a.*/"), "/a.*/");
    assert_eq!(run("", ".missing"), "<nil>");
    assert_eq!(run("debug", ".debug"), "<nil>");
    assert_eq!(run(r#"msg="hello world""#, ".msg"), r#""hello world""#);
}

#[test]
fn test_key_without_value_is_present_but_empty() {
    let value = eval_line("debug", ".debug").unwrap();
    assert_eq!(value, Value::Attr(None));
    assert_eq!(eval_line("debug", ".other").unwrap(), Value::Nil);
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_numeric_comparisons() {
    let test_cases = vec![
        ("x=12", ".x = 12", "true"),
        ("x=12.0", ".x = 12", "true"),
        ("x=-3", ".x < 0", "true"),
        ("load=250ms", ".load > 0.2", "true"),
        ("load=250ms", ".load < 35ms", "false"),
        ("a=100\u{00B5}s", ".a < 100s", "true"),
        ("a=1h", ".a = 3600", "true"),
        ("", "1.5s < 2s", "true"),
        ("", "3 > 2.5", "true"),
    ];

    for (line, query, expected) in test_cases {
        assert_eq!(run(line, query), expected, "Failed for {query:?} on {line:?}");
    }
}

#[test]
fn test_missing_values_never_compare() {
    // NaN on either side makes every comparison false
    for query in [".x < 1", ".x > 1", ".x = 1", "1 < .x"] {
        assert_eq!(run("y=1", query), "false", "Failed for {query:?}");
        assert_eq!(run("x", query), "false", "Failed for {query:?} on a bare key");
    }
}

#[test]
fn test_comparison_errors() {
    let err = eval_line("x=abc", ".x < 1").unwrap_err();
    assert!(matches!(err, EvalError::RecordValue { ref value, .. } if value == "abc"));

    let err = eval_line("", "/a/ < 1").unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { found: "'regexp'", expected: "'decimal'" }));
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_match_left_side_conversions() {
    assert_eq!(run("n=5", ".n ~ /5/"), "true");
    assert_eq!(run("", "12 ~ /^1/"), "true");
    assert_eq!(run("", "90s ~ /1m30s/"), "true");
    // an absent value matches as the empty string
    assert_eq!(run("", ".missing ~ /^$/"), "true");
    assert_eq!(run("debug", ".debug ~ /./"), "false");
}

#[test]
fn test_match_right_side_must_be_regexp() {
    let err = eval_line("a=x", ".a ~ 12").unwrap_err();
    match err {
        EvalError::MatchOperand { side, source } => {
            assert_eq!(side, Side::Right);
            assert!(matches!(*source, EvalError::TypeMismatch { found: "'number'", .. }));
        }
        other => panic!("expected a match operand error, got {:?}", other),
    }
    assert!(run("a=x", ".a ~ 12").starts_with("<err:invalid right hand side of '~' comparison"));
}

#[test]
fn test_match_left_side_errors() {
    let err = eval_line("a=1", "since( .a ) ~ /x/").unwrap_err();
    assert!(matches!(err, EvalError::MatchOperand { side: Side::Left, .. }));
}

#[test]
fn test_invalid_regexp() {
    let err = eval_line("a=x", ".a ~ /a(/").unwrap_err();
    match err {
        EvalError::MatchOperand { side: Side::Right, source } => {
            assert!(matches!(*source, EvalError::InvalidRegexp { .. }));
        }
        other => panic!("expected a regexp error, got {:?}", other),
    }
}

// ============================================================================
// Boolean logic
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let bools = ["false", "true"];
    for a in bools {
        for b in bools {
            for c in bools {
                let line = format!("a={a} b={b} c={c}");
                assert_eq!(
                    run(&line, ".a OR .b AND .c"),
                    run(&line, ".a OR ( .b AND .c )"),
                    "Failed on {line:?}"
                );
            }
        }
    }
}

#[test]
fn test_every_and_operand_counts() {
    assert_eq!(run("a=true b=true c=false", ".a AND .b AND .c"), "false");
    assert_eq!(run("a=true b=true c=true", ".a AND .b AND .c"), "true");
}

#[test]
fn test_short_circuit() {
    // the right side would fail if it were evaluated
    assert_eq!(run("a=false", ".a AND since( .b )"), "false");
    assert_eq!(run("a=true", ".a OR since( .b )"), "true");
    assert_eq!(
        run("a=true", ".a AND since( .b )"),
        r#"<err:unsupported function "since">"#
    );
}

#[test]
fn test_left_error_stops_evaluation() {
    let err = eval_line("a=yes", ".a OR .b ?").unwrap_err();
    assert!(matches!(err, EvalError::InvalidBool(ref s) if s == "yes"));
    assert_eq!(run("a=yes", ".a AND .b"), r#"<err:cannot parse "yes" as a boolean>"#);
}

#[test]
fn test_not() {
    assert_eq!(run("a=false", "not .a"), "true");
    assert_eq!(run("a=x", "not .a ?"), "false");
    assert_eq!(run("a=x", "not not .a ?"), "true");
    assert_eq!(run("", "not .missing"), "true");
    assert_eq!(run("", "not 0"), "true");
}

#[test]
fn test_bool_of_values() {
    assert_eq!(run("a=T b=1", ".a AND .b"), "true");
    assert_eq!(run("a=True b=0", ".a AND .b"), "false");
    let err = eval_line("", "35ms AND .a").unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { found: "'duration'", expected: "'bool'" }));
}

// ============================================================================
// Existence
// ============================================================================

#[test]
fn test_existence() {
    let line = r#"user=john debug msg="""#;
    for key in ["user", "debug", "msg"] {
        assert_eq!(run(line, &format!(".{key} ?")), "true", "Failed for {key}");
    }
    assert_eq!(run(line, ".nope ?"), "false");
}

#[test]
fn test_existence_on_non_identifier() {
    let err = eval_line("", "/x/ ?").unwrap_err();
    assert_eq!(err.to_string(), "cannot test existence on <REGEXP>, only <IDENT> is supported");
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_functions_are_not_evaluated() {
    assert_eq!(
        run("a=1", "since( .a ) > 1s"),
        r#"<err:unsupported function "since">"#
    );
}

// ============================================================================
// Reuse
// ============================================================================

#[test]
fn test_query_reused_across_records() {
    let expr = parse(".user ~ /^jo/ AND .age < 40").unwrap();
    let evaluator = Evaluator::new();
    let lines = ["user=john age=20", "user=jane age=20", "user=joe age=60", "user=jo"];
    let results: Vec<_> = lines
        .iter()
        .map(|line| evaluator.eval(&expr, &Record::parse(line).unwrap()).unwrap())
        .collect();
    assert_eq!(
        results,
        vec![
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Boolean(false),
            Value::Boolean(false),
        ]
    );
}

#[test]
fn test_concurrent_evaluation() {
    let expr = parse(".n > 50 OR .force ?").unwrap();
    let records: Vec<Record> = (0..100)
        .map(|n| Record::new().with("n", n.to_string()))
        .collect();

    let matched: usize = thread::scope(|s| {
        let handles: Vec<_> = records
            .chunks(25)
            .map(|chunk| {
                let expr = &expr;
                s.spawn(move || {
                    chunk
                        .iter()
                        .filter(|rec| eval(expr, rec).unwrap() == Value::Boolean(true))
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(matched, 49);
}
