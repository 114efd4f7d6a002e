use super::*;
use crate::ast::{BinaryOp, ExprKind, Item, Literal, StmtKind};
use pretty_assertions::assert_eq;

fn call_parts(expr: &Expr) -> (&str, &[Expr]) {
    expr.as_implicit_call().unwrap()
}

#[test]
fn test_command_call_with_arguments() {
    let block = parse_block("select all, limit(10)").unwrap();
    assert_eq!(block.statements.len(), 1);
    let (method, args) = call_parts(block.statements[0].as_expr().unwrap());
    assert_eq!(method, "select");
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].as_variable(), Some("all"));
    let (inner, inner_args) = call_parts(&args[1]);
    assert_eq!(inner, "limit");
    assert_eq!(inner_args[0].kind, ExprKind::Constant(Literal::Int(10)));
}

#[test]
fn test_paren_call_matches_command_call() {
    let paren = parse_block("where(age > 5, age < 10)").unwrap();
    let command = parse_block("where age > 5,\n      age < 10").unwrap();
    assert_eq!(paren, command);
}

#[test]
fn test_cast_argument() {
    let block = parse_block("from entity as Person").unwrap();
    let (_, args) = call_parts(block.statements[0].as_expr().unwrap());
    match &args[0].kind {
        ExprKind::Cast { expr, ty } => {
            assert_eq!(expr.as_variable(), Some("entity"));
            assert_eq!(ty, "Person");
        }
        other => panic!("expected cast, got {:?}", other),
    }
}

#[test]
fn test_assignment_argument() {
    let block = parse_block("from childOf = parentKey").unwrap();
    let (_, args) = call_parts(block.statements[0].as_expr().unwrap());
    match &args[0].kind {
        ExprKind::Binary { left, op, right } => {
            assert_eq!(left.as_variable(), Some("childOf"));
            assert_eq!(*op, BinaryOp::Assign);
            assert_eq!(right.as_variable(), Some("parentKey"));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_capitalized_keyword_is_not_a_declaration() {
    let block = parse_block("From childOf = key").unwrap();
    let (method, _) = call_parts(block.statements[0].as_expr().unwrap());
    assert_eq!(method, "From");
}

#[test]
fn test_precedence() {
    let expr = parse_expr("a + b * c == d && !e").unwrap();
    let ExprKind::Binary { op, left, .. } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::And);
    let ExprKind::Binary { op, left, .. } = &left.kind else {
        panic!("expected equality");
    };
    assert_eq!(*op, BinaryOp::Eq);
    let ExprKind::Binary { op, right, .. } = &left.kind else {
        panic!("expected addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_in_and_left_shift() {
    let expr = parse_expr("age in [1, 2]").unwrap();
    assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::In, .. }));
    let expr = parse_expr("age << [1, 2]").unwrap();
    assert!(matches!(
        expr.kind,
        ExprKind::Binary {
            op: BinaryOp::LeftShift,
            ..
        }
    ));
}

#[test]
fn test_negative_literal_folds() {
    let expr = parse_expr("-5").unwrap();
    assert_eq!(expr.kind, ExprKind::Constant(Literal::Int(-5)));
    let expr = parse_expr("-x").unwrap();
    assert!(matches!(expr.kind, ExprKind::Negate(_)));
}

#[test]
fn test_index_constructor_and_spread() {
    let expr = parse_expr("keys[0]").unwrap();
    assert!(matches!(
        expr.kind,
        ExprKind::Binary {
            op: BinaryOp::Index,
            ..
        }
    ));

    let expr = parse_expr("new com.acme.Key('Person', 12)").unwrap();
    match &expr.kind {
        ExprKind::Constructor { ty, args } => {
            assert_eq!(ty, "com.acme.Key");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected constructor, got {:?}", other),
    }

    let expr = parse_expr("[*ids, 4]").unwrap();
    let ExprKind::List(items) = &expr.kind else {
        panic!("expected list");
    };
    assert!(matches!(items[0].kind, ExprKind::Spread(_)));
}

#[test]
fn test_trailing_closure_call() {
    let block = parse_block(
        "def people = datastore.executeQuery {\n    from Person\n    where age > 5\n}",
    )
    .unwrap();
    let StmtKind::Declare { name, init, .. } = &block.statements[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(name, "people");
    let init = init.as_ref().unwrap();
    let ExprKind::Call {
        object,
        method,
        args,
    } = &init.kind
    else {
        panic!("expected call");
    };
    assert_eq!(object.as_ref().unwrap().as_variable(), Some("datastore"));
    assert_eq!(method, "executeQuery");
    let ExprKind::Closure(closure) = &args[0].kind else {
        panic!("expected closure argument");
    };
    assert_eq!(closure.body.statements.len(), 2);
}

#[test]
fn test_closure_parameters() {
    let expr = parse_expr("{ a, b -> a + b }").unwrap();
    let ExprKind::Closure(closure) = &expr.kind else {
        panic!("expected closure");
    };
    assert_eq!(closure.params, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(closure.body.statements.len(), 1);
}

#[test]
fn test_if_else_chain() {
    let block = parse_block(
        "if (kind__kql) {\n  x = 1\n} else if (y) {\n  x = 2\n} else {\n  x = 3\n}",
    )
    .unwrap();
    let StmtKind::If { otherwise, .. } = &block.statements[0].kind else {
        panic!("expected if");
    };
    let nested = &otherwise.as_ref().unwrap().statements[0];
    assert!(matches!(
        nested.kind,
        StmtKind::If {
            otherwise: Some(_),
            ..
        }
    ));
}

#[test]
fn test_module_items() {
    let source = r#"
class Person {
    String name
    int age = 0

    def load(key) {
        return datastore.get(key)
    }
}

static main(String[] args) {
    println "hi"
}

def total = 1; total += 2
"#;
    let module = parse_module(source).unwrap();
    assert_eq!(module.items.len(), 4);
    let person = module.classes().next().unwrap();
    assert_eq!(person.name, "Person");
    assert_eq!(person.fields.len(), 2);
    assert_eq!(person.fields[0].ty.as_deref(), Some("String"));
    assert_eq!(person.methods[0].name, "load");
    assert!(matches!(&module.items[1], Item::Method(m) if m.name == "main"));
}

#[test]
fn test_spans_are_one_based() {
    let block = parse_block("a = 1\n  b = 2").unwrap();
    assert_eq!(block.statements[1].span.line, 2);
    assert_eq!(block.statements[1].span.column, 3);
}

#[test]
fn test_error_position() {
    let err = parse_block("from Person\nwhere age > > 5").unwrap_err();
    match err {
        KindqlError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_statements_need_separators() {
    assert!(parse_block("a = 1 b = 2").is_err());
    assert!(parse_block("a = 1; b = 2").is_ok());
}

#[test]
fn test_comments_ignored() {
    let block = parse_block("// leading\nfrom Person /* kind */\n// done").unwrap();
    assert_eq!(block.statements.len(), 1);
}
