use super::*;
use crate::parser::{parse_block, parse_expr, parse_module};
use pretty_assertions::assert_eq;

fn roundtrip_expr(source: &str) -> String {
    let expr = parse_expr(source).unwrap();
    let rendered = render_expr(&expr);
    assert_eq!(parse_expr(&rendered).unwrap(), expr, "rendered: {}", rendered);
    rendered
}

#[test]
fn test_render_value_expressions() {
    assert_eq!(roundtrip_expr("'x'"), "\"x\"");
    assert_eq!(roundtrip_expr("42"), "42");
    assert_eq!(roundtrip_expr("-1.5"), "-1.5");
    assert_eq!(roundtrip_expr("userName"), "userName");
    assert_eq!(roundtrip_expr("keys[i + 1]"), "keys[i + 1]");
    assert_eq!(roundtrip_expr("new Key( 'Person' ,5)"), "new Key(\"Person\", 5)");
}

#[test]
fn test_render_calls_and_properties() {
    assert_eq!(roundtrip_expr("params.id"), "params.id");
    assert_eq!(
        roundtrip_expr("KeyFactory.createKey('Person', id)"),
        "KeyFactory.createKey(\"Person\", id)"
    );
    assert_eq!(roundtrip_expr("[1, *more, 'z']"), "[1, *more, \"z\"]");
}

#[test]
fn test_render_minimal_parentheses() {
    assert_eq!(roundtrip_expr("(a + b) * c"), "(a + b) * c");
    assert_eq!(roundtrip_expr("a + (b * c)"), "a + b * c");
    assert_eq!(roundtrip_expr("a - (b - c)"), "a - (b - c)");
    assert_eq!(roundtrip_expr("(a || b).size()"), "(a || b).size()");
    assert_eq!(roundtrip_expr("x = y = 3"), "x = y = 3");
    assert_eq!(roundtrip_expr("!(a && b)"), "!(a && b)");
}

#[test]
fn test_render_cast_receivers() {
    assert_eq!(roundtrip_expr("(p as Person).name"), "(p as Person).name");
    assert_eq!(roundtrip_expr("(p as Person).size()"), "(p as Person).size()");
    assert_eq!(roundtrip_expr("(p as Person)[0]"), "(p as Person)[0]");
    assert_eq!(roundtrip_expr("p.owner as Person"), "p.owner as Person");
    assert_eq!(roundtrip_expr("(-1) as Long"), "(-1) as Long");
    assert_eq!(roundtrip_expr("-x as Long"), "-x as Long");
}

#[test]
fn test_render_string_escapes() {
    let rendered = roundtrip_expr(r#"'say "hi"\n'"#);
    assert_eq!(rendered, r#""say \"hi\"\n""#);
}

#[test]
fn test_render_trailing_closure() {
    let rendered = roundtrip_expr("datastore.executeQuery({ from Person })");
    assert_eq!(rendered, "datastore.executeQuery {\n  from(Person)\n}");
}

#[test]
fn test_print_block() {
    let block = parse_block("if (x) { y = 1 } else if (z) { y = 2 } else { return }").unwrap();
    let printed = print_block(&block).unwrap();
    assert_eq!(
        printed,
        "if (x) {\n  y = 1\n} else if (z) {\n  y = 2\n} else {\n  return\n}\n"
    );
    assert_eq!(parse_block(&printed).unwrap(), block);
}

#[test]
fn test_print_module_roundtrip() {
    let source = r#"
class Person extends Base {
    static String name
    int age = 3
    def load(key) { return datastore.get(key) }
}
def people = datastore.executeQuery {
    select all, limit(10)
    from entity as Person
    where age > 5, name in ['a', 'b']
    orderBy age as DESC
}
"#;
    let module = parse_module(source).unwrap();
    let printed = print_module(&module).unwrap();
    assert_eq!(parse_module(&printed).unwrap(), module);
    assert!(printed.contains("class Person extends Base {\n  static String name\n"));
    assert!(printed.contains("  where(age > 5, name in [\"a\", \"b\"])\n"));
}
