// Parser robustness tables for XBasic.
//
// Every case runs through the lexer and parser together. A suite reports
// all of its cases before deciding pass or fail, so one run shows every
// regression at once. A panic inside the front end counts as a crash.

use std::panic;
use xbasic::ast::Node;
use xbasic::error::XbError;
use xbasic::lexer::Lexer;
use xbasic::parser::Parser;

#[derive(Debug, Clone, Copy)]
enum Expect {
    Parses,
    Fails,
    /// Fails, and the error details contain this text.
    FailsWith(&'static str),
}

struct Case {
    name: &'static str,
    input: String,
    expect: Expect,
}

fn ok(name: &'static str, input: &str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::Parses,
    }
}

fn bad(name: &'static str, input: &str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::Fails,
    }
}

fn bad_with(name: &'static str, input: &str, message: &'static str) -> Case {
    Case {
        name,
        input: input.to_string(),
        expect: Expect::FailsWith(message),
    }
}

fn parse_input(input: &str) -> Result<Node, XbError> {
    let tokens = Lexer::new("<test>", input).make_tokens()?;
    Parser::new(tokens).parse()
}

/// Why a case did not behave, or `None` when it did.
fn judge(case: &Case) -> Option<String> {
    let outcome = match panic::catch_unwind(|| parse_input(&case.input)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "unknown panic".to_string());
            return Some(format!("crashed: {}", message));
        }
    };

    match (outcome, case.expect) {
        (Ok(_), Expect::Parses) | (Err(_), Expect::Fails) => None,
        (Ok(_), _) => Some("parsed, but should have failed".to_string()),
        (Err(error), Expect::Parses) => Some(format!("should parse, got {}", error)),
        (Err(error), Expect::FailsWith(expected)) if error.details.contains(expected) => None,
        (Err(error), Expect::FailsWith(expected)) => Some(format!(
            "error '{}' does not mention '{}'",
            error.details, expected
        )),
    }
}

fn check_suite(suite: &str, cases: Vec<Case>) {
    println!("{} ({} cases)", suite, cases.len());

    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| match judge(case) {
            None => {
                println!("  ok   {}", case.name);
                None
            }
            Some(reason) => {
                println!("  FAIL {}: {}", case.name, reason);
                Some(format!("{}: {}", case.name, reason))
            }
        })
        .collect();

    assert!(
        failures.is_empty(),
        "{}: {} of {} cases failed:\n{}",
        suite,
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}

#[test]
fn unbalanced_delimiters() {
    check_suite(
        "delimiters",
        vec![
            bad_with("open_paren", "(1 + 2", "Expected ')'"),
            bad_with("open_paren_nested", "((1 + 2)", "Expected ')'"),
            bad_with("open_paren_inner", "(1 + (2 * 3)", "Expected ')'"),
            bad_with("stray_close_paren", "1 + 2)", "Token cannot appear after previous tokens"),
            bad_with("two_stray_close_parens", "1 + 2))", "Token cannot appear after previous tokens"),
            bad_with("empty_parens", "()", "Expected int, float"),
            bad_with("empty_parens_operand", "1 + ()", "Expected int, float"),
            bad_with("open_bracket", "[1, 2", "Expected ',' or ']'"),
            bad_with("list_missing_comma", "[1 2]", "Expected ',' or ']'"),
            bad_with("stray_close_bracket", "num x = 1]", "Token cannot appear after previous tokens"),
            bad("paren_closed_by_bracket", "num x = [1 + (2 * 3]"),
        ],
    );
}

#[test]
fn edge_cases() {
    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    let very_deep_parens = "(".repeat(5000) + "1" + &")".repeat(5000);
    let unclosed_parens = "(".repeat(5000) + "1";
    let minus_chain = "-".repeat(2000) + "1";
    let not_chain = "not ".repeat(2000) + "1";
    let power_chain = vec!["2"; 2000].join(" ^ ");
    check_suite(
        "edge cases",
        vec![
            ok("empty_input", ""),
            ok("only_whitespace", "   \n\t  "),
            ok("only_comment", "# nothing to see"),
            ok("empty_statements", "1 ; ; 2\n\n;"),
            ok("trailing_comment", "num x = 1 # set x"),
            ok("crlf_line_endings", "num x = 1\r\nx\r\n"),
            ok("deeply_nested_parens", &deep_parens),
            ok("very_deeply_nested_parens", &very_deep_parens),
            bad_with("deep_unclosed_parens", &unclosed_parens, "Expected ')'"),
            ok("long_unary_minus_chain", &minus_chain),
            ok("long_not_chain", &not_chain),
            ok("long_power_chain", &power_chain),
            bad("eof_after_operator", "1 +"),
            bad("eof_after_open_paren", "1 + ("),
        ],
    );
}

#[test]
fn operators() {
    check_suite(
        "operators",
        vec![
            bad("missing_left_operand", "+ 1"),
            bad("missing_right_operand", "1 +"),
            bad("lone_operator", "+"),
            bad("double_plus", "1 ++ 2"),
            bad("dangling_logic", "1 and or 2"),
            // Unary minus makes these valid
            ok("double_minus", "1 -- 2"),
            ok("plus_minus", "1 +- 2"),
            ok("equal", "1 == 2"),
            ok("not_equal", "1 != 2"),
            ok("less", "1 < 2"),
            ok("greater_equal", "1 >= 2"),
            bad_with("bare_bang", "1 ! 2", "'=' (after '!')"),
            ok("chained_power", "2 ^ 3 ^ 2"),
            ok("double_not", "not not 1"),
        ],
    );
}

#[test]
fn control_flow() {
    check_suite(
        "control flow",
        vec![
            ok("if_line", "IF x THEN 1"),
            ok("if_elif_else_line", "IF x THEN 1 ELIF y THEN 2 ELSE 3"),
            ok(
                "if_block",
                "IF x THEN\n  num y = 1\nELIF z THEN\n  num y = 2\nELSE\n  num y = 3\nEND",
            ),
            bad_with("if_missing_then", "IF x 1", "Expected 'THEN'"),
            bad("if_missing_body", "IF x THEN"),
            bad_with("if_missing_end", "IF x THEN\n1", "Expected 'END'"),
            ok("while_line", "WHILE x < 10 THEN num x = x + 1"),
            bad("while_missing_condition", "WHILE THEN x"),
            bad_with("while_missing_end", "WHILE x THEN\n1\n", "Expected 'END'"),
            ok("for_line", "FOR i = 0 TO 10 THEN i"),
            ok("for_block_with_step", "FOR i = 10 TO 0 STEP -2 THEN\n  print(i)\nEND"),
            bad_with("for_missing_equals", "FOR i 0 TO 10 THEN i", "Expected '='"),
            bad_with("for_missing_to", "FOR i = 0 10 THEN i", "Expected 'TO'"),
            bad_with("for_number_as_variable", "FOR 1 = 0 TO 1 THEN 1", "Expected identifier"),
            ok("bare_signals", "RETURN\nCONTINUE\nBREAK"),
            ok("return_value", "RETURN [1, 2]"),
            bad("return_two_values", "RETURN 1 2"),
        ],
    );
}

#[test]
fn literals() {
    check_suite(
        "literals",
        vec![
            ok("integer", "42"),
            ok("float", "3.14"),
            ok("trailing_dot_is_float", "42."),
            ok("string", "\"hello\""),
            ok("string_escapes", "\"tab\\there \\\"quoted\\\"\\n\""),
            ok("upper_true", "TRUE"),
            ok("lower_false", "false"),
            bad_with("two_dots", "3.14.159", "'.'"),
            bad("leading_dot", ".42"),
            bad_with("unterminated_string", "\"hello", "to close string"),
            bad("unterminated_string_across_lines", "\"hello\nworld"),
            bad_with("illegal_character", "num x = @", "'@'"),
        ],
    );
}

#[test]
fn functions() {
    check_suite(
        "functions",
        vec![
            ok("call_no_args", "foo()"),
            ok("call_with_args", "foo(1, 2, 3)"),
            ok("chained_calls", "make_adder(1)(2)"),
            bad_with("call_unclosed", "foo(1, 2", "Expected ',' or ')'"),
            bad("call_without_paren", "foo 1, 2)"),
            bad("call_trailing_comma", "foo(1, 2,)"),
            ok("arrow_definition", "FN add(a, b) -> a + b"),
            ok("anonymous_definition", "FN (x) -> x * 2"),
            ok(
                "block_definition",
                "FN greet(name)\n  print(\"hi \" + name)\n  RETURN name\nEND",
            ),
            bad_with("params_missing_comma", "FN f(a b) -> a", "Expected ',' or ')'"),
            bad_with("number_as_param", "FN f(a, 1) -> a", "Expected identifier"),
            bad_with("missing_body", "FN f() 1", "Expected '->' or NEWLINE"),
            bad_with("block_missing_end", "FN f()\n1", "Expected 'END'"),
            bad("unclosed_params", "FN f("),
        ],
    );
}

#[test]
fn declarations() {
    check_suite(
        "declarations",
        vec![
            ok("num", "num x = 1"),
            ok("num_expression", "num x = 1 + 2"),
            ok("text", "text s = \"a\""),
            ok("list", "list l = [1, 2]"),
            ok("annotated", "x : num = 1"),
            bad("missing_value", "num x ="),
            bad_with("number_as_name", "num 1 = x", "Expected identifier"),
            bad_with("untyped", "x = 1", "Token cannot appear after previous tokens"),
            bad_with("missing_equals", "num x 1", "Expected '='"),
            bad_with("unknown_type", "x : int = 1", "Expected 'num', 'text' or 'list'"),
        ],
    );
}

#[test]
fn well_formed_programs() {
    check_suite(
        "well-formed programs",
        vec![
            ok("precedence", "1 + 2 * 3"),
            ok("grouping", "(1 + 2) * 3"),
            ok("string_concatenation", "\"hello\" + \" world\""),
            ok("logic", "TRUE and FALSE"),
            ok("comparison_with_not", "1 < 2 or not 0"),
            ok("nested_list_index", "[1, [2, 3], \"x\"] / 1"),
            ok("mixed_expression", "num x = (1 + 2) * 3 + foo(4, 5)"),
            ok(
                "loop_in_function",
                "FN sum(l)\n  num total = 0\n  FOR i = 0 TO len(l) THEN num total = total + l / i\n  RETURN total\nEND",
            ),
        ],
    );
}
