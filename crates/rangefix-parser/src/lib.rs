// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for Go source.
//!
//! Transforms a token stream into a [`File`](rangefix_ast::decl::File).

mod hints;
mod parser;

pub use parser::{ParseError, ParseResult, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use rangefix_ast::decl::{DeclKind, FuncDecl, GenKeyword, SpecKind};
    use rangefix_ast::expr::{BinOp, ChanDir, ExprKind, InterfaceElemKind, LitKind, UnaryOp};
    use rangefix_ast::stmt::{AssignOp, BranchKind, IncDecOp, Stmt, StmtKind};

    fn parse(src: &str) -> ParseResult {
        let lex_result = rangefix_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok(), "Lex errors: {:?}", lex_result.errors);
        Parser::new(lex_result.tokens).parse()
    }

    fn parse_ok(src: &str) -> ParseResult {
        let result = parse(src);
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        result
    }

    /// Parse `body` as the statements of a function and return them.
    fn body_stmts(body: &str) -> Vec<Stmt> {
        let src = format!("package p\n\nfunc f() {{\n{}\n}}\n", body);
        let result = parse_ok(&src);
        match result.file.decls.into_iter().next().map(|d| d.kind) {
            Some(DeclKind::Func(FuncDecl { body: Some(block), .. })) => block.stmts,
            other => panic!("Expected function with body, got {:?}", other),
        }
    }

    fn single_stmt(body: &str) -> StmtKind {
        let mut stmts = body_stmts(body);
        assert_eq!(stmts.len(), 1, "Expected one statement, got {:?}", stmts);
        stmts.remove(0).kind
    }

    #[test]
    fn parse_package_and_imports() {
        let result = parse_ok("package main\n\nimport \"fmt\"\n\nimport (\n\tio \"io\"\n\t_ \"embed\"\n)\n");
        assert_eq!(result.file.package, "main");
        assert_eq!(result.file.decls.len(), 2);

        let DeclKind::Gen(ref group) = result.file.decls[1].kind else {
            panic!("Expected import group");
        };
        assert_eq!(group.keyword, GenKeyword::Import);
        assert!(group.grouped);
        assert_eq!(group.specs.len(), 2);
        match &group.specs[0].kind {
            SpecKind::Import { name, path } => {
                assert_eq!(name.as_deref(), Some("io"));
                assert_eq!(path, "\"io\"");
            }
            other => panic!("Expected import spec, got {:?}", other),
        }
    }

    #[test]
    fn parse_three_clause_loop() {
        let StmtKind::For(f) = single_stmt("for i := 0; i < n; i++ {\n\tuse(i)\n}") else {
            panic!("Expected for loop");
        };

        let init = f.init.expect("init");
        match init.kind {
            StmtKind::Assign { lhs, op, rhs } => {
                assert_eq!(op, AssignOp::Define);
                assert_eq!(lhs[0].as_ident(), Some("i"));
                assert!(matches!(&rhs[0].kind, ExprKind::BasicLit { kind: LitKind::Int, value } if value == "0"));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }

        match f.cond.expect("cond").kind {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(op, BinOp::Lt);
                assert_eq!(left.as_ident(), Some("i"));
                assert_eq!(right.as_ident(), Some("n"));
            }
            other => panic!("Expected comparison, got {:?}", other),
        }

        assert!(matches!(
            f.post.expect("post").kind,
            StmtKind::IncDec { op: IncDecOp::Inc, .. }
        ));
        assert_eq!(f.body.stmts.len(), 1);
    }

    #[test]
    fn parse_loop_forms() {
        assert!(matches!(
            single_stmt("for {\n}"),
            StmtKind::For(ref f) if f.init.is_none() && f.cond.is_none() && f.post.is_none()
        ));
        assert!(matches!(
            single_stmt("for x < 10 {\n}"),
            StmtKind::For(ref f) if f.init.is_none() && f.cond.is_some()
        ));
        assert!(matches!(
            single_stmt("for ; ; {\n}"),
            StmtKind::For(ref f) if f.init.is_none() && f.cond.is_none()
        ));
        assert!(matches!(
            single_stmt("for i := 0; i < 5; {\n}"),
            StmtKind::For(ref f) if f.post.is_none()
        ));
    }

    #[test]
    fn parse_range_forms() {
        match single_stmt("for i := range 10 {\n}") {
            StmtKind::Range(r) => {
                assert_eq!(r.key.as_ref().and_then(|k| k.as_ident()), Some("i"));
                assert!(r.value.is_none());
                assert_eq!(r.tok, Some(AssignOp::Define));
            }
            other => panic!("Expected range loop, got {:?}", other),
        }
        match single_stmt("for k, v := range m {\n}") {
            StmtKind::Range(r) => assert_eq!(r.value.as_ref().and_then(|v| v.as_ident()), Some("v")),
            other => panic!("Expected range loop, got {:?}", other),
        }
        match single_stmt("for range ch {\n}") {
            StmtKind::Range(r) => {
                assert!(r.key.is_none());
                assert!(r.tok.is_none());
            }
            other => panic!("Expected range loop, got {:?}", other),
        }
        assert!(matches!(
            single_stmt("for x = range xs {\n}"),
            StmtKind::Range(ref r) if r.tok == Some(AssignOp::Assign)
        ));
    }

    #[test]
    fn header_braces_are_blocks_not_literals() {
        // `n {` opens the body; `[]int{...}` is always a literal.
        match single_stmt("for _, x := range []int{1, 2} {\n\t_ = x\n}") {
            StmtKind::Range(r) => {
                assert!(matches!(r.iter.kind, ExprKind::CompositeLit { .. }));
                assert_eq!(r.body.stmts.len(), 1);
            }
            other => panic!("Expected range loop, got {:?}", other),
        }
        assert!(matches!(single_stmt("if p == (Point{}) {\n}"), StmtKind::If { .. }));
        assert!(matches!(single_stmt("switch s {\n}"), StmtKind::Switch { .. }));
    }

    #[test]
    fn parse_if_else_chain() {
        match single_stmt("if v, ok := m[k]; ok {\n} else if v > 1 {\n} else {\n}") {
            StmtKind::If { init, els, .. } => {
                assert!(init.is_some());
                let els = els.expect("else branch");
                match els.kind {
                    StmtKind::If { els: Some(last), .. } => assert!(matches!(last.kind, StmtKind::Block(_))),
                    other => panic!("Expected else-if, got {:?}", other),
                }
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn parse_switches_and_select() {
        match single_stmt("switch x := f(); x {\ncase 1, 2:\n\tg()\n\tfallthrough\ndefault:\n}") {
            StmtKind::Switch { init, tag, clauses, .. } => {
                assert!(init.is_some());
                assert!(tag.is_some());
                assert_eq!(clauses.len(), 2);
                assert_eq!(clauses[0].list.len(), 2);
                assert!(matches!(
                    clauses[0].body[1].kind,
                    StmtKind::Branch { kind: BranchKind::Fallthrough, .. }
                ));
                assert!(clauses[1].is_default());
            }
            other => panic!("Expected switch, got {:?}", other),
        }

        match single_stmt("switch v := x.(type) {\ncase int, []string:\ncase nil:\n}") {
            StmtKind::TypeSwitch { guard, clauses, .. } => {
                assert!(matches!(guard.kind, StmtKind::Assign { op: AssignOp::Define, .. }));
                assert_eq!(clauses.len(), 2);
            }
            other => panic!("Expected type switch, got {:?}", other),
        }

        match single_stmt("select {\ncase v := <-in:\n\tout <- v\ncase <-done:\n\treturn\ndefault:\n}") {
            StmtKind::Select { clauses, .. } => {
                assert_eq!(clauses.len(), 3);
                assert!(matches!(clauses[0].body[0].kind, StmtKind::Send { .. }));
                assert!(clauses[2].comm.is_none());
            }
            other => panic!("Expected select, got {:?}", other),
        }
    }

    #[test]
    fn parse_simple_statements() {
        let stmts = body_stmts("x, y = y, x\ns += 2\nch <- 1\ni--\ngo run()\ndefer close(ch)\nvar z int = 3\nreturn");
        let kinds: Vec<_> = stmts.iter().map(|s| &s.kind).collect();
        assert!(matches!(kinds[0], StmtKind::Assign { op: AssignOp::Assign, lhs, .. } if lhs.len() == 2));
        assert!(matches!(kinds[1], StmtKind::Assign { op: AssignOp::AddAssign, .. }));
        assert!(matches!(kinds[2], StmtKind::Send { .. }));
        assert!(matches!(kinds[3], StmtKind::IncDec { op: IncDecOp::Dec, .. }));
        assert!(matches!(kinds[4], StmtKind::Go(_)));
        assert!(matches!(kinds[5], StmtKind::Defer(_)));
        assert!(matches!(kinds[6], StmtKind::Decl(_)));
        assert!(matches!(kinds[7], StmtKind::Return(r) if r.is_empty()));
    }

    #[test]
    fn parse_labeled_loop() {
        match single_stmt("outer:\n\tfor {\n\t\tbreak outer\n\t}") {
            StmtKind::Labeled { label, stmt } => {
                assert_eq!(label, "outer");
                let StmtKind::For(f) = stmt.kind else { panic!("Expected for loop") };
                assert!(matches!(
                    &f.body.stmts[0].kind,
                    StmtKind::Branch { kind: BranchKind::Break, label: Some(l) } if l == "outer"
                ));
            }
            other => panic!("Expected labeled statement, got {:?}", other),
        }
    }

    #[test]
    fn binary_precedence() {
        let StmtKind::Expr(e) = single_stmt("f(a + b*c < d && e)") else { panic!("Expected expression") };
        let ExprKind::Call { args, .. } = e.kind else { panic!("Expected call") };
        let ExprKind::Binary { op: BinOp::LAnd, left, .. } = &args[0].kind else { panic!("Expected &&") };
        let ExprKind::Binary { op: BinOp::Lt, left, .. } = &left.kind else { panic!("Expected <") };
        let ExprKind::Binary { op: BinOp::Add, right, .. } = &left.kind else { panic!("Expected +") };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn parse_primary_expressions() {
        let stmts = body_stmts(
            "_ = s[1:]\n_ = s[i:j:k]\n_ = x.(fmt.Stringer)\n_ = Map[int, string](xs)\n_ = []byte(str)\n_ = f(xs...)\n_ = &T{A: 1, B: []int{2}}\n_ = <-ch",
        );
        let rhs: Vec<_> = stmts
            .into_iter()
            .map(|s| match s.kind {
                StmtKind::Assign { mut rhs, .. } => rhs.remove(0).kind,
                other => panic!("Expected assignment, got {:?}", other),
            })
            .collect();

        assert!(matches!(&rhs[0], ExprKind::Slice { low: Some(_), high: None, full: false, .. }));
        assert!(matches!(&rhs[1], ExprKind::Slice { full: true, max: Some(_), .. }));
        assert!(matches!(&rhs[2], ExprKind::TypeAssert { ty: Some(_), .. }));
        match &rhs[3] {
            ExprKind::Call { func, .. } => {
                assert!(matches!(&func.kind, ExprKind::Index { indices, .. } if indices.len() == 2))
            }
            other => panic!("Expected generic call, got {:?}", other),
        }
        assert!(matches!(&rhs[4], ExprKind::Call { func, .. } if matches!(func.kind, ExprKind::ArrayType { len: None, .. })));
        assert!(matches!(&rhs[5], ExprKind::Call { ellipsis: true, .. }));
        match &rhs[6] {
            ExprKind::Unary { op: UnaryOp::Addr, operand } => match &operand.kind {
                ExprKind::CompositeLit { elts, .. } => {
                    assert_eq!(elts.len(), 2);
                    assert!(matches!(elts[0].kind, ExprKind::KeyValue { .. }));
                }
                other => panic!("Expected composite literal, got {:?}", other),
            },
            other => panic!("Expected address-of, got {:?}", other),
        }
        assert!(matches!(&rhs[7], ExprKind::Unary { op: UnaryOp::Recv, .. }));
    }

    #[test]
    fn parse_func_literal_and_closure_call() {
        let StmtKind::Go(e) = single_stmt("go func(x int) {\n\tprint(x)\n}(1)") else {
            panic!("Expected go statement");
        };
        let ExprKind::Call { func, args, .. } = e.kind else { panic!("Expected call") };
        assert!(matches!(func.kind, ExprKind::FuncLit { .. }));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn parse_grouped_params_and_results() {
        let result = parse_ok("package p\nfunc f(a, b int, c ...string) (n int, err error) {\n\treturn\n}\n");
        let DeclKind::Func(ref f) = result.file.decls[0].kind else { panic!("Expected func") };
        assert_eq!(f.sig.params.len(), 2);
        assert_eq!(f.sig.params[0].names, vec!["a", "b"]);
        assert!(matches!(f.sig.params[1].ty.kind, ExprKind::Ellipsis(Some(_))));
        assert_eq!(f.sig.results.len(), 2);

        let result = parse_ok("package p\nfunc g(int, string) error\n");
        let DeclKind::Func(ref g) = result.file.decls[0].kind else { panic!("Expected func") };
        assert!(g.sig.params.iter().all(|p| p.names.is_empty()));
        assert_eq!(g.sig.results.len(), 1);
        assert!(g.body.is_none());
    }

    #[test]
    fn parse_methods_and_generics() {
        let src = "package p\n\ntype Stack[T any] struct {\n\titems []T\n}\n\nfunc (s *Stack[T]) Push(v T) {\n}\n\nfunc Map[T, U any](xs []T, f func(T) U) []U {\n\treturn nil\n}\n\ntype Number interface {\n\t~int | ~float64\n}\n\ntype Buf [4]byte\n";
        let result = parse_ok(src);
        assert_eq!(result.file.decls.len(), 5);

        match &result.file.decls[0].kind {
            DeclKind::Gen(g) => match &g.specs[0].kind {
                SpecKind::Type { name, type_params, .. } => {
                    assert_eq!(name, "Stack");
                    assert_eq!(type_params.len(), 1);
                }
                other => panic!("Expected type spec, got {:?}", other),
            },
            other => panic!("Expected type decl, got {:?}", other),
        }

        let DeclKind::Func(ref push) = result.file.decls[1].kind else { panic!("Expected method") };
        let recv = push.recv.as_ref().expect("receiver");
        assert_eq!(recv.names, vec!["s"]);
        assert!(matches!(recv.ty.kind, ExprKind::Star(_)));

        let DeclKind::Func(ref map) = result.file.decls[2].kind else { panic!("Expected func") };
        assert_eq!(map.sig.type_params[0].names, vec!["T", "U"]);

        match &result.file.decls[3].kind {
            DeclKind::Gen(g) => match &g.specs[0].kind {
                SpecKind::Type { ty, .. } => match &ty.kind {
                    ExprKind::InterfaceType(elems) => {
                        assert!(matches!(
                            &elems[0].kind,
                            InterfaceElemKind::Embed(e) if matches!(e.kind, ExprKind::Binary { op: BinOp::Or, .. })
                        ));
                    }
                    other => panic!("Expected interface, got {:?}", other),
                },
                other => panic!("Expected type spec, got {:?}", other),
            },
            other => panic!("Expected type decl, got {:?}", other),
        }

        match &result.file.decls[4].kind {
            DeclKind::Gen(g) => assert!(matches!(
                &g.specs[0].kind,
                SpecKind::Type { type_params, ty, .. }
                    if type_params.is_empty() && matches!(ty.kind, ExprKind::ArrayType { len: Some(_), .. })
            )),
            other => panic!("Expected type decl, got {:?}", other),
        }
    }

    #[test]
    fn parse_struct_and_interface_members() {
        let src = "package p\n\ntype T struct {\n\tio.Reader\n\t*Base\n\tA, B int `json:\"a\"`\n\tch <-chan string\n}\n\ntype S interface {\n\tfmt.Stringer\n\tRead(p []byte) (n int, err error)\n}\n";
        let result = parse_ok(src);
        let DeclKind::Gen(ref g) = result.file.decls[0].kind else { panic!("Expected type decl") };
        let SpecKind::Type { ref ty, .. } = g.specs[0].kind else { panic!("Expected type spec") };
        let ExprKind::StructType(ref fields) = ty.kind else { panic!("Expected struct") };
        assert_eq!(fields.len(), 4);
        assert!(fields[0].names.is_empty());
        assert!(fields[1].names.is_empty());
        assert_eq!(fields[2].names, vec!["A", "B"]);
        assert_eq!(fields[2].tag.as_deref(), Some("`json:\"a\"`"));
        assert!(matches!(fields[3].ty.kind, ExprKind::ChanType { dir: ChanDir::Recv, .. }));

        let DeclKind::Gen(ref g) = result.file.decls[1].kind else { panic!("Expected type decl") };
        let SpecKind::Type { ref ty, .. } = g.specs[0].kind else { panic!("Expected type spec") };
        let ExprKind::InterfaceType(ref elems) = ty.kind else { panic!("Expected interface") };
        assert!(matches!(elems[1].kind, InterfaceElemKind::Method { ref name, .. } if name == "Read"));
    }

    #[test]
    fn parse_grouped_value_specs() {
        let result = parse_ok("package p\n\nconst (\n\tA = iota\n\tB\n)\n\nvar x, y = 1, 2\n");
        let DeclKind::Gen(ref g) = result.file.decls[0].kind else { panic!("Expected const decl") };
        assert_eq!(g.specs.len(), 2);
        assert!(matches!(&g.specs[1].kind, SpecKind::Value { values, .. } if values.is_empty()));
    }

    #[test]
    fn statement_spans_exclude_terminator() {
        let stmts = body_stmts("x := 1");
        assert_eq!(stmts[0].span.len(), "x := 1".len());
    }

    #[test]
    fn missing_package_is_an_error() {
        let result = parse("func main() {}\n");
        assert!(!result.is_ok());
        assert!(result.errors[0].message.contains("'package'"));
    }

    #[test]
    fn recovers_after_bad_statement() {
        let result = parse("package p\n\nfunc f() {\n\tx := \n\ty := 2\n}\n\nfunc g() {}\n");
        assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
        assert_eq!(result.file.decls.len(), 2);
        assert!(result.errors[0].hint.is_some());
    }

    #[test]
    fn brace_on_next_line_is_rejected() {
        let result = parse("package p\n\nfunc f() {\n\tif x\n\t{\n\t}\n}\n");
        assert!(!result.is_ok());
    }

    #[test]
    fn error_count_is_capped() {
        let mut src = String::from("package p\n");
        for _ in 0..40 {
            src.push_str("+\n");
        }
        let result = parse(&src);
        assert!(result.errors.len() <= 20);
        assert!(!result.is_ok());
    }

    #[test]
    fn deep_parens_are_rejected() {
        let depth = 10_000;
        let src = format!("package p\n\nvar x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let parsed = parse(&src);
        assert!(!parsed.is_ok());
        assert!(parsed.errors.iter().any(|e| e.message == "nesting too deep"), "errors: {:?}", parsed.errors);
    }

    #[test]
    fn deep_blocks_and_types_are_rejected() {
        let depth = 10_000;
        let blocks = format!("package p\n\nfunc f() {{\n{}{}\n}}\n", "{".repeat(depth), "}".repeat(depth));
        let parsed = parse(&blocks);
        assert!(!parsed.is_ok());
        assert_eq!(parsed.errors[0].message, "nesting too deep");

        let types = format!("package p\n\nvar x {}int\n", "*".repeat(depth));
        assert!(!parse(&types).is_ok());
    }

    #[test]
    fn ordinary_nesting_parses() {
        let depth = 40;
        parse_ok(&format!("package p\n\nvar x = {}1{}\n", "(".repeat(depth), ")".repeat(depth)));
        parse_ok(&format!("package p\n\nfunc f() {{\n{}{}\n}}\n", "{".repeat(depth), "}".repeat(depth)));
    }
}
