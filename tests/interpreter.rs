use tox::error::LoxError;
use tox::interpreter::Interpreter;
use tox::repl;
use tox::runner::{evaluate_source, run_line, run_source, LineOutcome};
use tox::value::Value;

/// Run `source` as a program and return everything it printed.
fn run(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new());
    run_source(source, &mut interpreter).expect("program should run");
    String::from_utf8(interpreter.into_output()).expect("output is UTF-8")
}

fn evaluate(source: &str) -> Value {
    let mut interpreter = Interpreter::with_output(Vec::new());
    evaluate_source(source, &mut interpreter).expect("expression should evaluate")
}

#[test]
fn evaluation_table() {
    let table = [
        ("true", Value::Bool(true)),
        ("false", Value::Bool(false)),
        ("1", Value::Number(1.0)),
        ("nil", Value::Nil),
        ("\"hello world\"", Value::String("hello world".into())),
        ("2 + 2 * 5", Value::Number(12.0)),
        ("2 * 5 - 2", Value::Number(8.0)),
        ("1 + 2 * 3 - 2", Value::Number(5.0)),
        ("1 + 2 + 3", Value::Number(6.0)),
        ("5 > 4 == 3 < 4", Value::Bool(true)),
        ("3 < 5 == true", Value::Bool(true)),
        ("3 > 5 == false", Value::Bool(true)),
        ("5 < 4 != 3 > 4", Value::Bool(false)),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", Value::Bool(true)),
        ("1 + (2 + 3) + 4", Value::Number(10.0)),
        ("(5 + 5) * 2", Value::Number(20.0)),
        ("2 / (5 + 5)", Value::Number(0.2)),
        ("(5 + 5) * 2 * (5 + 5)", Value::Number(200.0)),
        ("-32 * 2", Value::Number(-64.0)),
        ("1 - - - - - 1", Value::Number(0.0)),
        ("1 - - - - - 1 * 3", Value::Number(-2.0)),
        ("!-32", Value::Bool(false)),
        ("-(5 + 5)", Value::Number(-10.0)),
        ("!true == true", Value::Bool(false)),
        ("!(true == true)", Value::Bool(false)),
        ("!(1 * 0)", Value::Bool(false)),
        ("\"foo\" + \"bar\"", Value::String("foobar".into())),
        ("10 - 2 - 3", Value::Number(5.0)),
        ("12 / 2 / 3", Value::Number(2.0)),
    ];

    for (source, expected) in table {
        assert_eq!(evaluate(source), expected, "{:?}", source);
    }
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(evaluate("1 / 0"), Value::Number(f64::INFINITY));
    assert_eq!(evaluate("-1 / 0"), Value::Number(f64::NEG_INFINITY));

    match evaluate("0 / 0") {
        Value::Number(n) => assert!(n.is_nan()),
        other => panic!("expected a number, got {:?}", other),
    }
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(evaluate("nil or \"fallback\""), Value::String("fallback".into()));
    assert_eq!(evaluate("1 or 2"), Value::Number(1.0));
    assert_eq!(evaluate("false and 2"), Value::Bool(false));
    assert_eq!(evaluate("1 and 2"), Value::Number(2.0));
}

#[test]
fn logical_operators_evaluate_both_sides() {
    let output = run("var hits = 0;\ntrue or (hits = hits + 1);\nfalse and (hits = hits + 1);\nprint hits;");

    assert_eq!(output, "2\n");
}

#[test]
fn truthiness_of_zero_and_empty_string() {
    let output = run("if (0) print \"zero\"; else print \"no\";\nif (\"\") print \"empty\";\nif (nil) print \"nil\"; else print \"falsy\";");

    assert_eq!(output, "zero\nempty\nfalsy\n");
}

#[test]
fn while_loop_counts() {
    let output = run("var i = 0;\nwhile (i < 3) {\n  print i;\n  i = i + 1;\n}");

    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn block_locals_do_not_escape() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    run_source("{ var inner = 1; print inner; }", &mut interpreter).unwrap();
    let err = run_source("print inner;", &mut interpreter).unwrap_err();

    assert!(matches!(err, LoxError::Runtime { .. }));
    assert!(err.to_string().contains("inner"));
}

#[test]
fn shadowing_and_outer_assignment() {
    let output = run(
        "var a = \"outer\";\nvar b = \"outer\";\n{\n  var a = \"shadow\";\n  b = \"assigned\";\n  print a;\n}\nprint a;\nprint b;",
    );

    assert_eq!(output, "shadow\nouter\nassigned\n");
}

#[test]
fn nested_scopes_resolve_outward() {
    let output = run("var a = 1;\n{ var b = 2; { var c = 3; print a + b + c; a = 10; } }\nprint a;");

    assert_eq!(output, "6\n10\n");
}

#[test]
fn undefined_variables_are_runtime_errors() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    let read = run_source("print missing;", &mut interpreter).unwrap_err();
    let write = run_source("\nmissing = 1;", &mut interpreter).unwrap_err();

    for (err, line) in [(read, 1), (write, 2)] {
        match err {
            LoxError::Runtime { message, line: l } => {
                assert!(message.contains("'missing'"), "{}", message);
                assert_eq!(l, line);
            }
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }
}

#[test]
fn failed_block_restores_environment() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    run_source("var x = \"before\";", &mut interpreter).unwrap();
    assert_eq!(interpreter.scope_depth(), 1);

    let err = run_source("{ var x = \"inside\"; { print nope; } }", &mut interpreter);
    assert!(err.is_err());
    assert_eq!(interpreter.scope_depth(), 1);

    run_source("print x;", &mut interpreter).unwrap();
    let output = String::from_utf8(interpreter.into_output()).unwrap();

    assert_eq!(output, "before\n");
}

#[test]
fn nothing_runs_when_parsing_fails() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    let err = run_source("print 1;\nprint 2", &mut interpreter).unwrap_err();

    assert!(err.is_static());
    assert!(interpreter.output().is_empty());
}

#[test]
fn assignment_expression_yields_value() {
    let output = run("var a;\nvar b;\nprint a;\nb = (a = 3) + 1;\nprint a;\nprint b;");

    assert_eq!(output, "nil\n3\n4\n");
}

#[test]
fn repl_lines_share_one_session() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    assert_eq!(
        run_line("var x = 2;", &mut interpreter).unwrap(),
        LineOutcome::Executed
    );
    assert_eq!(
        run_line("x * 21", &mut interpreter).unwrap(),
        LineOutcome::Value(Value::Number(42.0))
    );
}

#[test]
fn repl_reports_errors_and_continues() {
    let input = "var a = 1;\nprint b;\n{ var a = 5; print c; }\na + 1\n";
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();

    repl::run(input.as_bytes(), &mut out, &mut err).unwrap();

    let out = String::from_utf8(out).unwrap();
    let err = String::from_utf8(err).unwrap();

    assert!(out.contains("2\n"), "{}", out);
    assert_eq!(err.lines().count(), 2, "{}", err);
    assert!(err.contains("'b'"));
    assert!(err.contains("'c'"));
}
