// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Recognition of `for i := 0; i < n; i++` loops.

use rangefix_ast::expr::{BinOp, Expr, ExprKind, LitKind};
use rangefix_ast::stmt::{ForLoop, IncDecOp, Stmt, StmtKind};
use rangefix_ast::Span;

/// A loop that counts a fresh variable from zero up to a bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountingLoop<'a> {
    /// The counter declared by the init statement.
    pub var: &'a str,
    /// Where the counter is declared.
    pub var_span: Span,
    /// Right-hand side of the `<` comparison, taken as-is.
    pub bound: &'a Expr,
}

/// Match `for VAR := 0; VAR < BOUND; VAR++`.
///
/// The checks run in a fixed order and stop at the first failure. The bound
/// is not inspected: the source is assumed to type-check, so comparing an
/// integer counter against it makes it an integer.
pub fn match_counting_loop(for_loop: &ForLoop) -> Option<CountingLoop<'_>> {
    let (lhs, declares, rhs) = match for_loop.init.as_deref() {
        Some(Stmt { kind: StmtKind::Assign { lhs, op, rhs }, .. }) => (lhs, op.declares(), rhs),
        _ => return None,
    };

    let (var, var_span) = match lhs.as_slice() {
        [target] => (target.as_ident()?, target.span),
        _ => return None,
    };

    if !declares {
        return None;
    }
    match rhs.as_slice() {
        [value] if is_int_zero(value) => {}
        _ => return None,
    }

    let (left, bound) = match for_loop.cond.as_ref().map(|cond| &cond.kind) {
        Some(ExprKind::Binary { op: BinOp::Lt, left, right }) => (left, right.as_ref()),
        _ => return None,
    };
    if left.as_ident() != Some(var) {
        return None;
    }

    let target = match for_loop.post.as_deref() {
        Some(Stmt { kind: StmtKind::IncDec { target, op: IncDecOp::Inc }, .. }) => target,
        _ => return None,
    };
    if target.as_ident() != Some(var) {
        return None;
    }

    Some(CountingLoop { var, var_span, bound })
}

/// The literal `0`, exactly as written.
fn is_int_zero(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::BasicLit { kind: LitKind::Int, value } if value == "0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangefix_ast::expr::UnaryOp;
    use rangefix_ast::stmt::{AssignOp, Block};

    fn ident(name: &str) -> Expr {
        Expr::ident(name, Span::default())
    }

    fn lit(kind: LitKind, value: &str) -> Expr {
        Expr::new(ExprKind::BasicLit { kind, value: value.to_string() }, Span::default())
    }

    fn int(value: &str) -> Expr {
        lit(LitKind::Int, value)
    }

    fn paren(inner: Expr) -> Expr {
        Expr::new(ExprKind::Paren(Box::new(inner)), Span::default())
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::new(
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            Span::default(),
        )
    }

    fn stmt(kind: StmtKind) -> Option<Box<Stmt>> {
        Some(Box::new(Stmt::new(kind, Span::default())))
    }

    fn assign(lhs: Vec<Expr>, op: AssignOp, rhs: Vec<Expr>) -> Option<Box<Stmt>> {
        stmt(StmtKind::Assign { lhs, op, rhs })
    }

    fn incdec(target: Expr, op: IncDecOp) -> Option<Box<Stmt>> {
        stmt(StmtKind::IncDec { target, op })
    }

    fn correct_init() -> Option<Box<Stmt>> {
        assign(vec![ident("i")], AssignOp::Define, vec![int("0")])
    }

    fn correct_cond() -> Option<Expr> {
        Some(binary(BinOp::Lt, ident("i"), int("5")))
    }

    fn correct_post() -> Option<Box<Stmt>> {
        incdec(ident("i"), IncDecOp::Inc)
    }

    fn for_loop(
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    ) -> ForLoop {
        ForLoop { init, cond, post, body: Block::default() }
    }

    #[test]
    fn counting_loop_matches() {
        let l = for_loop(correct_init(), correct_cond(), correct_post());
        let m = match_counting_loop(&l).expect("should match");
        assert_eq!(m.var, "i");
        assert_eq!(m.bound, &int("5"));
    }

    #[test]
    fn rejected_shapes() {
        let cases: Vec<(&str, ForLoop)> = vec![
            ("infinite loop", for_loop(None, None, None)),
            ("condition only", for_loop(None, correct_cond(), None)),
            (
                "init is not an assignment",
                for_loop(incdec(ident("i"), IncDecOp::Inc), correct_cond(), correct_post()),
            ),
            (
                "two targets",
                for_loop(
                    assign(vec![ident("i"), ident("j")], AssignOp::Define, vec![int("0")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "parenthesized target",
                for_loop(
                    assign(vec![paren(ident("i"))], AssignOp::Define, vec![int("0")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "plain assignment",
                for_loop(
                    assign(vec![ident("i")], AssignOp::Assign, vec![int("0")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "two values",
                for_loop(
                    assign(vec![ident("i")], AssignOp::Define, vec![int("0"), int("0")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "identifier value",
                for_loop(
                    assign(vec![ident("i")], AssignOp::Define, vec![ident("j")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "string value",
                for_loop(
                    assign(vec![ident("i")], AssignOp::Define, vec![lit(LitKind::String, "\"0\"")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "starts at one",
                for_loop(
                    assign(vec![ident("i")], AssignOp::Define, vec![int("1")]),
                    correct_cond(),
                    correct_post(),
                ),
            ),
            (
                "parenthesized condition",
                for_loop(correct_init(), correct_cond().map(paren), correct_post()),
            ),
            (
                "less or equal",
                for_loop(
                    correct_init(),
                    Some(binary(BinOp::Le, ident("i"), int("5"))),
                    correct_post(),
                ),
            ),
            (
                "literal on the left",
                for_loop(
                    correct_init(),
                    Some(binary(BinOp::Lt, int("5"), ident("i"))),
                    correct_post(),
                ),
            ),
            (
                "other variable compared",
                for_loop(
                    correct_init(),
                    Some(binary(BinOp::Lt, ident("j"), int("5"))),
                    correct_post(),
                ),
            ),
            (
                "post is an assignment",
                for_loop(
                    correct_init(),
                    correct_cond(),
                    assign(
                        vec![ident("i")],
                        AssignOp::Assign,
                        vec![binary(BinOp::Add, ident("i"), int("1"))],
                    ),
                ),
            ),
            (
                "decrement",
                for_loop(correct_init(), correct_cond(), incdec(ident("i"), IncDecOp::Dec)),
            ),
            (
                "literal incremented",
                for_loop(correct_init(), correct_cond(), incdec(int("5"), IncDecOp::Inc)),
            ),
            (
                "other variable incremented",
                for_loop(correct_init(), correct_cond(), incdec(ident("j"), IncDecOp::Inc)),
            ),
        ];

        for (description, l) in &cases {
            assert_eq!(match_counting_loop(l), None, "{description}");
        }
    }

    #[test]
    fn zero_is_compared_textually() {
        for zero in ["00", "0x0", "0_0"] {
            let l = for_loop(
                assign(vec![ident("i")], AssignOp::Define, vec![int(zero)]),
                correct_cond(),
                correct_post(),
            );
            assert_eq!(match_counting_loop(&l), None, "{zero}");
        }
        let float = for_loop(
            assign(vec![ident("i")], AssignOp::Define, vec![lit(LitKind::Float, "0.0")]),
            correct_cond(),
            correct_post(),
        );
        assert_eq!(match_counting_loop(&float), None);
    }

    #[test]
    fn any_bound_is_accepted() {
        let call = Expr::new(
            ExprKind::Call { func: Box::new(ident("len")), args: vec![ident("xs")], ellipsis: false },
            Span::default(),
        );
        let neg = Expr::new(
            ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(ident("n")) },
            Span::default(),
        );
        for bound in [call, neg, ident("i"), lit(LitKind::String, "\"x\"")] {
            let l = for_loop(
                correct_init(),
                Some(binary(BinOp::Lt, ident("i"), bound.clone())),
                correct_post(),
            );
            assert_eq!(match_counting_loop(&l).map(|m| m.bound), Some(&bound));
        }
    }
}
