//! SQL dialect rendering, end to end through the parser

use std::sync::Arc;

use parlance::{DialectKind, DialectOpts, Field, FieldType, ParserConfig, QueryParser};

fn sql_parser(fields: Vec<Field>, opts: DialectOpts) -> QueryParser {
    QueryParser::new(
        ParserConfig::new()
            .with_fields(fields)
            .with_dialect(DialectKind::Sql)
            .with_dialect_opts(opts),
    )
    .unwrap()
}

fn text_fields(names: &[&str]) -> Vec<Field> {
    names.iter().map(|n| Field::new(*n)).collect()
}

#[test]
fn fuzzify_scenario() {
    let parser = sql_parser(
        text_fields(&["foo"]),
        DialectOpts::default().with_fuzzify(true),
    );
    let query = parser.parse("foo:bar").unwrap();
    assert_eq!(query.render().unwrap(), "foo ILIKE 'bar%'");
}

#[test]
fn plain_and_negated_clauses() {
    let parser = sql_parser(text_fields(&["foo", "bar"]), DialectOpts::default());
    let query = parser.parse("foo:this -bar:that").unwrap();
    assert_eq!(
        query.render().unwrap(),
        "foo = 'this' AND bar != 'that'"
    );
}

#[test]
fn or_bucket_renders_with_or() {
    let parser = sql_parser(text_fields(&["t"]), DialectOpts::default());
    let query = parser.parse("t:a or t:b").unwrap();
    assert_eq!(query.render().unwrap(), "t = 'a' OR t = 'b'");
}

#[test]
fn grouped_or_inside_and() {
    let parser = sql_parser(text_fields(&["t", "u"]), DialectOpts::default());
    let query = parser.parse("u:x (t:a or t:b)").unwrap();
    assert_eq!(
        query.render().unwrap(),
        "u = 'x' AND (t = 'a' OR t = 'b')"
    );
}

#[test]
fn wildcard_value_switches_to_like() {
    let parser = sql_parser(text_fields(&["name"]), DialectOpts::default());
    let query = parser.parse("name:jo*").unwrap();
    assert_eq!(query.render().unwrap(), "name ILIKE 'jo%'");
}

#[test]
fn negated_wildcard_uses_not_like() {
    let parser = sql_parser(text_fields(&["name", "x"]), DialectOpts::default());
    let query = parser.parse("x:keep -name:jo*").unwrap();
    assert_eq!(
        query.render().unwrap(),
        "x = 'keep' AND name NOT ILIKE 'jo%'"
    );
}

#[test]
fn numeric_field_is_unquoted() {
    let parser = sql_parser(
        vec![Field::new("year").with_type(FieldType::Int)],
        DialectOpts::default(),
    );
    let query = parser.parse("year>=2020").unwrap();
    assert_eq!(query.render().unwrap(), "year >= 2020");
}

#[test]
fn range_renders_between() {
    let parser = sql_parser(
        vec![Field::new("year").with_type(FieldType::Int)],
        DialectOpts::default(),
    );
    let query = parser.parse("year=(2020..2024)").unwrap();
    assert_eq!(query.render().unwrap(), "year BETWEEN 2020 AND 2024");
}

#[test]
fn fieldless_clause_expands_over_default_field() {
    let parser = QueryParser::new(
        ParserConfig::new()
            .with_fields(text_fields(&["body", "title"]))
            .with_default_field("body")
            .with_dialect(DialectKind::Sql),
    )
    .unwrap();
    let query = parser.parse("rust").unwrap();
    assert_eq!(query.render().unwrap(), "body = 'rust'");
}

#[test]
fn callback_output_is_verbatim() {
    let special = Field::new("geo").with_callback(Arc::new(
        |name: &str, _op: &str, value: &str| format!("ST_Contains({name}, '{value}')"),
    ));
    let parser = sql_parser(vec![special], DialectOpts::default());
    let query = parser.parse("geo:somewhere").unwrap();
    assert_eq!(query.render().unwrap(), "ST_Contains(geo, 'somewhere')");
}

#[test]
fn quote_fields_option() {
    let parser = sql_parser(
        text_fields(&["from"]),
        DialectOpts::default().with_quote_fields("\""),
    );
    let query = parser.parse("from:me").unwrap();
    assert_eq!(query.render().unwrap(), "\"from\" = 'me'");
}

#[test]
fn custom_like_keyword() {
    let parser = sql_parser(
        text_fields(&["foo"]),
        DialectOpts::default().with_like("LIKE").with_fuzzify2(true),
    );
    let query = parser.parse("foo:bar").unwrap();
    assert_eq!(query.render().unwrap(), "foo LIKE '%bar%'");
}

#[test]
fn translated_from_native_renders_sql() {
    let parser = QueryParser::new(
        ParserConfig::new().with_fields(text_fields(&["foo", "color"])),
    )
    .unwrap();
    let query = parser.parse("foo:bar and -color:red").unwrap();
    let sql = query.translate_to(DialectKind::Sql);
    assert_eq!(
        sql.render().unwrap(),
        "foo = 'bar' AND color != 'red'"
    );
}
