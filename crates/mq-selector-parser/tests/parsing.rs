//! Integration tests for the public parse() API.

mod common;

use mq_selector_parser::{BinaryOp, Expr, SpannedExpr, UnaryOp};

fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

fn unbox(expr: &SpannedExpr) -> &Expr {
    &expr.node
}

// ============================================================================
// Literal parsing tests
// ============================================================================

#[test]
fn parse_integer_literals() {
    assert_eq!(common::assert_parses("0").node, Expr::Int(0));
    assert_eq!(common::assert_parses("123").node, Expr::Int(123));
    assert_eq!(common::assert_parses("0x1F").node, Expr::Int(31));
    assert_eq!(common::assert_parses("010").node, Expr::Int(8));
}

#[test]
fn parse_long_literals() {
    assert_eq!(common::assert_parses("123L").node, Expr::Long(123));
    assert_eq!(
        common::assert_parses("9223372036854775807").node,
        Expr::Long(i64::MAX)
    );
    assert_eq!(
        common::assert_parses("0x7FFFFFFFFFFFFFFF").node,
        Expr::Long(i64::MAX)
    );
}

#[test]
fn parse_float_literals() {
    assert_eq!(common::assert_parses("1.5").node, Expr::Double(1.5));
    assert_eq!(common::assert_parses(".25").node, Expr::Double(0.25));
    assert_eq!(common::assert_parses("2E3").node, Expr::Double(2000.0));
}

#[test]
fn parse_string_literals() {
    assert_eq!(
        common::assert_parses("'hello'").node,
        Expr::String("hello".to_string())
    );
    assert_eq!(
        common::assert_parses("'O''Brien'").node,
        Expr::String("O'Brien".to_string())
    );
}

#[test]
fn parse_boolean_and_null_literals() {
    assert_eq!(common::assert_parses("TRUE").node, Expr::Bool(true));
    assert_eq!(common::assert_parses("false").node, Expr::Bool(false));
    assert_eq!(common::assert_parses("Null").node, Expr::Null);
}

#[test]
fn parse_identifiers() {
    assert_eq!(common::assert_parses("JMSType").node, ident("JMSType"));
    assert_eq!(common::assert_parses("$count").node, ident("$count"));
}

// ============================================================================
// Operator tests
// ============================================================================

#[test]
fn parse_multiplication_binds_tighter_than_addition() {
    let ast = common::assert_parses("a + b * c");
    match ast.node {
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => {
            assert_eq!(unbox(&left), &ident("a"));
            assert!(matches!(
                right.node,
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected addition, got {:?}", other),
    }
}

#[test]
fn parse_arithmetic_is_left_associative() {
    let ast = common::assert_parses("a - b - c");
    match ast.node {
        Expr::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } => {
            assert!(matches!(
                left.node,
                Expr::Binary {
                    op: BinaryOp::Sub,
                    ..
                }
            ));
            assert_eq!(unbox(&right), &ident("c"));
        }
        other => panic!("expected subtraction, got {:?}", other),
    }
}

#[test]
fn parse_and_binds_tighter_than_or() {
    let ast = common::assert_parses("a = 1 OR b = 2 AND c = 3");
    match ast.node {
        Expr::Binary {
            op: BinaryOp::Or,
            right,
            ..
        } => assert!(matches!(
            right.node,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        )),
        other => panic!("expected OR, got {:?}", other),
    }
}

#[test]
fn parse_comparison_operators() {
    for (src, expected) in [
        ("a = 1", BinaryOp::Eq),
        ("a <> 1", BinaryOp::Ne),
        ("a < 1", BinaryOp::Lt),
        ("a <= 1", BinaryOp::Le),
        ("a > 1", BinaryOp::Gt),
        ("a >= 1", BinaryOp::Ge),
    ] {
        match common::assert_parses(src).node {
            Expr::Binary { op, .. } => assert_eq!(op, expected, "{}", src),
            other => panic!("expected binary for '{}', got {:?}", src, other),
        }
    }
}

#[test]
fn parse_unary_minus_and_plus() {
    let ast = common::assert_parses("-a");
    assert!(matches!(
        ast.node,
        Expr::Unary {
            op: UnaryOp::Neg,
            ..
        }
    ));
    assert_eq!(common::assert_parses("+a").node, ident("a"));
}

#[test]
fn parse_parenthesized_grouping() {
    let ast = common::assert_parses("(a + b) * c");
    match ast.node {
        Expr::Binary {
            op: BinaryOp::Mul,
            left,
            ..
        } => assert!(matches!(
            left.node,
            Expr::Binary {
                op: BinaryOp::Add,
                ..
            }
        )),
        other => panic!("expected multiplication, got {:?}", other),
    }
}

// ============================================================================
// Predicate tests
// ============================================================================

#[test]
fn parse_like_with_escape() {
    let ast = common::assert_parses("name LIKE 'a\\_%' ESCAPE '\\'");
    match ast.node {
        Expr::Like {
            expr,
            pattern,
            escape,
            negated,
        } => {
            assert_eq!(unbox(&expr), &ident("name"));
            assert_eq!(pattern, "a\\_%");
            assert_eq!(escape, Some('\\'));
            assert!(!negated);
        }
        other => panic!("expected LIKE, got {:?}", other),
    }
}

#[test]
fn parse_not_like() {
    let ast = common::assert_parses("JMSType NOT LIKE '%IGNORE'");
    match ast.node {
        Expr::Like {
            pattern,
            escape,
            negated,
            ..
        } => {
            assert_eq!(pattern, "%IGNORE");
            assert_eq!(escape, None);
            assert!(negated);
        }
        other => panic!("expected LIKE, got {:?}", other),
    }
}

#[test]
fn parse_in_list() {
    let ast = common::assert_parses("country NOT IN ('UK', 'US', 'France')");
    match ast.node {
        Expr::In { values, negated, .. } => {
            assert_eq!(values, vec!["UK", "US", "France"]);
            assert!(negated);
        }
        other => panic!("expected IN, got {:?}", other),
    }
}

#[test]
fn parse_between() {
    let ast = common::assert_parses("age BETWEEN 15 AND 19 AND ok = TRUE");
    match ast.node {
        Expr::Binary {
            op: BinaryOp::And,
            left,
            ..
        } => match left.node {
            Expr::Between { low, high, negated, .. } => {
                assert_eq!(unbox(&low), &Expr::Int(15));
                assert_eq!(unbox(&high), &Expr::Int(19));
                assert!(!negated);
            }
            other => panic!("expected BETWEEN, got {:?}", other),
        },
        other => panic!("expected AND, got {:?}", other),
    }
}

#[test]
fn parse_is_null_and_is_not_null() {
    assert!(matches!(
        common::assert_parses("prop IS NULL").node,
        Expr::IsNull { negated: false, .. }
    ));
    assert!(matches!(
        common::assert_parses("prop is not null").node,
        Expr::IsNull { negated: true, .. }
    ));
}

#[test]
fn parse_keywords_are_case_insensitive() {
    let upper = common::assert_parses("a LIKE 'x' AND b IN ('y')");
    let lower = common::assert_parses("a like 'x' and b in ('y')");
    assert_eq!(format!("{:?}", upper.node), format!("{:?}", lower.node));
}
