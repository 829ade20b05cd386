use cmm::ast::{Expression, Identifier, InfixOperator, Node, PrefixOperator, Program, Statement};
use cmm::parser::parse;
use cmm::token::Span;
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse(source);
    assert!(
        errors.is_empty(),
        "unexpected parse errors for {:?}: {:?}",
        source,
        errors
    );
    program
}

fn error_messages(source: &str) -> Vec<String> {
    let (_, errors) = parse(source);
    errors.into_iter().map(|error| error.message).collect()
}

fn single_expression(source: &str) -> Expression {
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "source: {:?}", source);
    match program.statements.into_iter().next() {
        Some(Statement::Expression { expr }) => expr,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn ident(name: &str) -> Expression {
    Expression::Identifier(Identifier::new(name))
}

#[test]
fn test_let_statements() {
    let program = parse_ok("let x = 5; let y = true; let foobar = y;");

    assert_eq!(
        program.statements,
        vec![
            Statement::Let {
                name: Identifier::new("x"),
                value: Expression::IntegerLiteral(5),
            },
            Statement::Let {
                name: Identifier::new("y"),
                value: Expression::BooleanLiteral(true),
            },
            Statement::Let {
                name: Identifier::new("foobar"),
                value: ident("y"),
            },
        ]
    );
    assert_eq!(program.token_literal(), "let");
}

#[test]
fn test_return_statements() {
    let program = parse_ok("return 5; return x + y;");

    assert_eq!(program.statements.len(), 2);
    for statement in &program.statements {
        assert_eq!(statement.token_literal(), "return");
    }
    assert_eq!(program.to_string(), "return 5; return (x + y);");
}

#[test]
fn test_prefix_expressions() {
    assert_eq!(
        single_expression("!5;"),
        Expression::Prefix {
            operator: PrefixOperator::Not,
            operand: Box::new(Expression::IntegerLiteral(5)),
        }
    );
    assert_eq!(
        single_expression("-foo"),
        Expression::Prefix {
            operator: PrefixOperator::Negate,
            operand: Box::new(ident("foo")),
        }
    );
}

#[test]
fn test_infix_expressions() {
    let cases = [
        ("5 + 6", InfixOperator::Add),
        ("5 - 6", InfixOperator::Subtract),
        ("5 * 6", InfixOperator::Multiply),
        ("5 / 6", InfixOperator::Divide),
        ("5 < 6", InfixOperator::Less),
        ("5 > 6", InfixOperator::Greater),
        ("5 == 6", InfixOperator::Equal),
        ("5 != 6", InfixOperator::NotEqual),
    ];

    for (source, operator) in cases {
        assert_eq!(
            single_expression(source),
            Expression::Infix {
                operator,
                left: Box::new(Expression::IntegerLiteral(5)),
                right: Box::new(Expression::IntegerLiteral(6)),
            },
            "source: {}",
            source
        );
    }
}

#[test]
fn test_operator_precedence_rendering() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("true", "true"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
    ];

    for (source, expected) in cases {
        assert_eq!(parse_ok(source).to_string(), expected, "source: {}", source);
    }
}

#[test]
fn test_if_expression() {
    let expr = single_expression("if (x < y) { x }");

    assert_eq!(expr.to_string(), "if ((x < y)) { x }");
    match expr {
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            assert_eq!(condition.to_string(), "(x < y)");
            assert_eq!(consequence.statements.len(), 1);
            assert_eq!(alternative, None);
        }
        other => panic!("expected if expression, got {:?}", other),
    }
}

#[test]
fn test_if_else_expression() {
    let expr = single_expression("if (x < y) { x } else { y }");

    match &expr {
        Expression::If { alternative, .. } => {
            let alternative = alternative.as_ref().map(|block| block.to_string());
            assert_eq!(alternative.as_deref(), Some("{ y }"));
        }
        other => panic!("expected if expression, got {:?}", other),
    }
    assert_eq!(expr.token_literal(), "if");
}

#[test]
fn test_function_literal() {
    let expr = single_expression("fn(x, y) { x + y; }");

    match &expr {
        Expression::FunctionLiteral { parameters, body } => {
            assert_eq!(parameters, &vec![Identifier::new("x"), Identifier::new("y")]);
            assert_eq!(body.to_string(), "{ (x + y) }");
        }
        other => panic!("expected function literal, got {:?}", other),
    }
    assert_eq!(expr.token_literal(), "fn");
}

#[test]
fn test_function_parameters() {
    let cases: [(&str, &[&str]); 3] = [
        ("fn() {};", &[]),
        ("fn(x) {};", &["x"]),
        ("fn(x, y, z) {};", &["x", "y", "z"]),
    ];

    for (source, expected) in cases {
        match single_expression(source) {
            Expression::FunctionLiteral { parameters, .. } => {
                let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, expected.to_vec(), "source: {}", source);
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }
}

#[test]
fn test_call_expression() {
    let expr = single_expression("add(1, 2 * 3, 4 + 5);");

    match &expr {
        Expression::Call { callee, arguments } => {
            assert_eq!(**callee, ident("add"));
            let rendered: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
            assert_eq!(rendered, vec!["1", "(2 * 3)", "(4 + 5)"]);
        }
        other => panic!("expected call expression, got {:?}", other),
    }
    assert_eq!(expr.token_literal(), "(");
}

#[test]
fn test_rendering_round_trips() {
    let sources = [
        "let add = fn(a, b) { return a + b; }; add(1, 2)",
        "if (a > b) { a; b } else { }",
        "let f = fn(x) { fn(y) { x * y } }; f(2)(3)",
        "a; (b)",
        "!-(1 + 2) == false",
    ];

    for source in sources {
        let first = parse_ok(source);
        let rendered = first.to_string();
        let second = parse_ok(&rendered);
        assert_eq!(second, first, "rendered: {}", rendered);
        assert_eq!(second.to_string(), rendered);
    }
}

#[test]
fn test_empty_program() {
    let program = parse_ok("");
    assert!(program.statements.is_empty());
    assert_eq!(program.token_literal(), "");
    assert_eq!(program.to_string(), "");
}

#[test]
fn test_let_diagnostics() {
    assert_eq!(
        error_messages("let = 5;"),
        vec!["expected next token to be IDENT, got = instead"]
    );
    assert_eq!(
        error_messages("let 838383;"),
        vec!["expected next token to be IDENT, got INT instead"]
    );
}

#[test]
fn test_one_diagnostic_per_malformed_statement() {
    let (program, errors) = parse("let x 5; let y 10; let z 15; let ok = 1;");

    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "expected next token to be =, got INT instead",
            "expected next token to be =, got INT instead",
            "expected next token to be =, got INT instead",
        ]
    );
    assert_eq!(program.to_string(), "let ok = 1;");
}

#[test]
fn test_diagnostic_points_at_offending_token() {
    let (_, errors) = parse("let x 5;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span, Span::new(6, 7));
    assert_eq!(errors[0].to_string(), errors[0].message);
}

#[test]
fn test_no_prefix_parse_function_diagnostic() {
    assert_eq!(
        error_messages("+5;"),
        vec!["no prefix parse function for + found"]
    );
    assert_eq!(
        error_messages("let x = );"),
        vec!["no prefix parse function for ) found"]
    );
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(
        error_messages("99999999999999999999"),
        vec!["could not parse \"99999999999999999999\" as integer"]
    );
    assert_eq!(
        single_expression("9223372036854775807"),
        Expression::IntegerLiteral(i64::MAX)
    );
}

#[test]
fn test_else_requires_block() {
    assert_eq!(
        error_messages("if (x) { 1 } else 2"),
        vec!["expected next token to be {, got INT instead"]
    );
}

#[test]
fn test_recovery_inside_block() {
    let (_, errors) = parse("fn() { let = 1; x }; let y = 2; let z 3;");

    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "expected next token to be IDENT, got = instead",
            "expected next token to be =, got INT instead",
        ]
    );
}

#[test]
fn test_unterminated_block() {
    assert_eq!(
        error_messages("fn(x) { x"),
        vec!["expected next token to be }, got EOF instead"]
    );
}
