use super::*;

fn ident(s: &str) -> Box<Expr> {
    Box::new(Expr::Ident(s.to_owned()))
}

#[test]
fn parses_arithmetic_precedence() {
    let e = parse_expr("1+2*3").unwrap();
    match e {
        Expr::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        )),
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn logical_operators_bind_loosest() {
    let e = parse_expr("a>1 && b<2 || c").unwrap();
    match e {
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            assert_eq!(right, ident("c"));
            assert!(matches!(
                *left,
                Expr::Binary {
                    op: BinaryOp::And,
                    ..
                }
            ));
        }
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn subtraction_is_left_associative() {
    let e = parse_expr("a-b-c").unwrap();
    assert_eq!(
        e,
        Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Sub,
                left: ident("a"),
                right: ident("b"),
            }),
            right: ident("c"),
        }
    );
}

#[test]
fn parses_prefix_and_postfix() {
    let e = parse_expr("-!v[i+1]").unwrap();
    assert_eq!(
        e,
        Expr::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(Expr::Index {
                    base: ident("v"),
                    index: Box::new(Expr::Binary {
                        op: BinaryOp::Add,
                        left: ident("i"),
                        right: Box::new(Expr::Number(1.0)),
                    }),
                }),
            }),
        }
    );
    assert!(matches!(
        parse_expr("+x").unwrap(),
        Expr::Unary {
            op: UnaryOp::Plus,
            ..
        }
    ));
}

#[test]
fn reports_offsets_for_malformed_text() {
    assert!(matches!(
        parse_expr("(a+b"),
        Err(ExprError::Parse { offset: 4, .. })
    ));
    assert!(matches!(
        parse_expr("a+"),
        Err(ExprError::Parse { offset: 2, .. })
    ));
    assert!(matches!(
        parse_expr("a b"),
        Err(ExprError::Parse { offset: 2, .. })
    ));
    assert!(matches!(parse_expr("   "), Err(ExprError::Parse { .. })));
}
