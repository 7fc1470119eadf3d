//! End-to-end scenarios for the parser and the native dialect
//!
//! Exercises the whole pipeline - parse, expand, render, re-parse - and the
//! structural invariants: bucket order preservation, idempotent expansion,
//! translation stability.

use std::sync::Arc;

use parlance::{
    BoolOp, Clause, DialectKind, Field, ParserConfig, QueryParser, TermExpander,
};

fn default_parser() -> QueryParser {
    QueryParser::new(ParserConfig::default()).unwrap()
}

fn native(input: &str) -> String {
    default_parser().parse(input).unwrap().render().unwrap()
}

#[test]
fn scenario_signs_and_default_and() {
    assert_eq!(native("+hello -world now"), "+hello +now -world");
}

#[test]
fn scenario_field_distribution_over_group() {
    assert_eq!(
        native("foo=bar and color=(red or green)"),
        "+foo=bar +(color=red color=green)"
    );
}

#[test]
fn scenario_group_only() {
    assert_eq!(native("foo=(this or that)"), "+(foo=this foo=that)");
}

#[test]
fn scenario_phrase_proximity() {
    assert_eq!(
        native("\"foo bar\"~5 and foo=bar"),
        "+\"foo bar\"~5 +foo=bar"
    );
}

#[test]
fn scenario_near_keyword() {
    assert_eq!(
        native("foo NEAR5 bar and foo=bar"),
        "+\"foo bar\"~5 +foo=bar"
    );
}

#[test]
fn scenario_range_enumeration() {
    let parser = QueryParser::new(
        ParserConfig::new().with_fields([Field::new("date").with_type(parlance::FieldType::Int)]),
    )
    .unwrap();
    let query = parser.parse("date=(1..10)").unwrap();
    assert_eq!(query.render().unwrap(), "+date=(1 2 3 4 5 6 7 8 9 10)");
}

#[test]
fn scenario_unclosed_paren_is_error() {
    let err = default_parser()
        .parse("this is a=bad (query")
        .unwrap_err()
        .to_string();
    assert!(err.contains("no matching )"), "got: {err}");
    assert!(err.starts_with("[this is a=bad (query] :"), "got: {err}");
}

#[test]
fn scenario_term_expander() {
    let expander: TermExpander = Arc::new(|term: &str| {
        vec![
            "one".to_string(),
            "two".to_string(),
            "three".to_string(),
            term.to_string(),
        ]
    });
    let parser = QueryParser::new(ParserConfig::new().with_term_expander(expander)).unwrap();
    let query = parser.parse("foo=bar").unwrap();
    assert_eq!(
        query.render().unwrap(),
        "+(foo=one foo=two foo=three foo=bar)"
    );
}

#[test]
fn scenario_multi_alias_fan_out() {
    let parser = QueryParser::new(ParserConfig::new().with_fields([
        Field::new("field2"),
        Field::new("mydefault"),
        Field::new("field1").with_alias_targets(["field2", "mydefault"]),
    ]))
    .unwrap();
    let query = parser.parse("field1=(green or blue)").unwrap();

    // each leaf fans out into its own OR group over the alias targets
    let tree = query.tree();
    let outer = tree.must[0].value.as_tree().unwrap();
    assert_eq!(outer.should.len(), 2);
    for (fanned, value) in outer.should.iter().zip(["green", "blue"]) {
        let inner = fanned.value.as_tree().unwrap();
        let fields: Vec<&str> = inner
            .should
            .iter()
            .filter_map(|c| c.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["field2", "mydefault"]);
        for alias_leaf in &inner.should {
            assert_eq!(alias_leaf.value.as_term(), Some(value));
            assert_eq!(alias_leaf.op, "=");
        }
    }
}

#[test]
fn sloppy_scenarios() {
    let parser = QueryParser::new(ParserConfig::new().with_sloppy(true)).unwrap();
    let garbage = parser
        .parse("and one:two foo and -- (not OR AND near5 bar or")
        .unwrap();
    assert_eq!(garbage.render().unwrap(), "one two foo bar");

    let nonsense = parser.parse("~~~~~~~").unwrap();
    assert_eq!(nonsense.render().unwrap(), "~~~~~~~");
}

#[test]
fn sloppy_unknown_field() {
    let parser = QueryParser::new(
        ParserConfig::new()
            .with_sloppy(true)
            .with_field_names(["color"]),
    )
    .unwrap();
    let query = parser.parse("foo:bar").unwrap();
    assert_eq!(query.render().unwrap(), "foo bar");
}

#[test]
fn invariant_bucket_order_is_stable() {
    let query = default_parser().parse("+z +a -m +q -b").unwrap();
    let tree = query.tree();
    let must: Vec<&str> = tree.must.iter().filter_map(|c| c.value.as_term()).collect();
    let must_not: Vec<&str> = tree
        .must_not
        .iter()
        .filter_map(|c| c.value.as_term())
        .collect();
    assert_eq!(must, vec!["z", "a", "q"]);
    assert_eq!(must_not, vec!["m", "b"]);
}

#[test]
fn invariant_native_output_reparses_to_same_tree() {
    // prefix-faithful inputs: every clause carries its sign in the output
    let parser = default_parser();
    for input in [
        "+hello -world now",
        "\"foo bar\"~5 and foo=bar",
        "+a +b -c",
    ] {
        let first = parser.parse(input).unwrap();
        let rendered = first.render().unwrap();
        let second = parser.parse(&rendered).unwrap();
        assert_eq!(first.tree(), second.tree(), "input: {input}");
        assert_eq!(second.render().unwrap(), rendered, "input: {input}");
    }

    // OR-joined clauses render bare, so they round-trip under an OR default
    let or_parser =
        QueryParser::new(ParserConfig::new().with_default_boolop(BoolOp::Or)).unwrap();
    for input in ["a or b or c", "+req opt -no"] {
        let first = or_parser.parse(input).unwrap();
        let rendered = first.render().unwrap();
        let second = or_parser.parse(&rendered).unwrap();
        assert_eq!(first.tree(), second.tree(), "input: {input}");
    }
}

#[test]
fn invariant_translation_preserves_structure() {
    let parser = QueryParser::new(
        ParserConfig::new().with_field_names(["foo", "color", "name"]),
    )
    .unwrap();
    let query = parser.parse("foo:bar and -color:red").unwrap();
    let sql = query.translate_to(DialectKind::Sql);
    let swish = sql.translate_to(DialectKind::Swish);
    assert_eq!(query.tree(), sql.tree());
    assert_eq!(query.tree(), swish.tree());
    // only the rendered form differs
    assert_ne!(query.render().unwrap(), sql.render().unwrap());
}

#[test]
fn invariant_or_only_tree_is_accepted() {
    let query = default_parser().parse("a or b").unwrap();
    let tree = query.tree();
    assert!(tree.must.is_empty());
    assert_eq!(tree.should.len(), 2);
}

#[test]
fn invariant_all_negative_is_rejected() {
    let err = default_parser().parse("-a -b").unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn default_boolop_or_keeps_terms_in_should() {
    let parser =
        QueryParser::new(ParserConfig::new().with_default_boolop(BoolOp::Or)).unwrap();
    let query = parser.parse("one two three").unwrap();
    assert_eq!(query.render().unwrap(), "one two three");
}

#[test]
fn builder_api_round_trip() {
    let mut query = default_parser().parse("base").unwrap();
    query.add_and_clause(Clause::term(Some("tag".to_string()), ":", "extra"));
    query.add_not_clause(Clause::term(None, ":", "spam"));
    assert_eq!(query.render().unwrap(), "+base +tag:extra -spam");
}

#[test]
fn tree_snapshot_serializes_bucket_keys() {
    let parser =
        QueryParser::new(ParserConfig::new().with_default_boolop(BoolOp::Or)).unwrap();
    let query = parser.parse("+a b -c").unwrap();
    let json = serde_json::to_value(query.as_tree()).unwrap();
    assert_eq!(json["+"][0]["value"], "a");
    assert_eq!(json[""][0]["value"], "b");
    assert_eq!(json["-"][0]["value"], "c");
}
