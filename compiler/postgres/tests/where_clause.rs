mod common;

use std::collections::BTreeSet;

use anyhow::Result;
use nestql::{parse_predicate, FieldPath, Predicate};
use nestql_postgres::{resolve_denormalized, CompileError, CompileRequest, CompilerConfig, DistanceMethod, QueryCompiler};
use serde_json::json;

fn compile_filter(filter: serde_json::Value) -> Result<String, CompileError> {
    let predicate = parse_predicate(&filter)?;
    QueryCompiler::default().compile_where(&predicate, &BTreeSet::new(), &common::user_types())
}

#[test]
fn test_resolve_denormalized() {
    let columns: BTreeSet<String> = ["location__ltree_path".to_string()].into_iter().collect();
    assert_eq!(resolve_denormalized(&["location", "ltreePath"], &columns), Some("location__ltree_path"));
    assert_eq!(resolve_denormalized(&["location", "ltreePath"], &BTreeSet::new()), None);
}

#[test]
fn test_filter_document_to_sql() -> Result<()> {
    let sql = compile_filter(json!({
        "AND": [
            {"path": ["profile", "age"], "operator": "gte", "value": 18},
            {"path": ["profile", "username"], "operator": "icontains", "value": "ann"},
            {"OR": [
                {"path": ["server", "port"], "operator": "in", "value": [80, 443]},
                {"path": ["createdAt"], "operator": "gt", "value": "2024-01-01T00:00:00Z"}
            ]}
        ]
    }))?;
    assert_eq!(
        sql,
        "((data->'profile'->>'age')::numeric >= 18 AND data->'profile'->>'username' ILIKE '%ann%' AND \
         ((data->'server'->>'port')::integer IN (80, 443) OR (data->>'createdAt')::timestamptz > '2024-01-01T00:00:00Z'::timestamptz))"
    );
    Ok(())
}

#[test]
fn test_empty_membership_is_valid_sql() -> Result<()> {
    assert_eq!(compile_filter(json!({"path": ["profile", "age"], "operator": "in", "value": []}))?, "FALSE");
    assert_eq!(compile_filter(json!({"path": ["profile", "username"], "operator": "notin", "value": []}))?, "TRUE");
    assert_eq!(compile_filter(json!({"path": ["location", "coordinates"], "operator": "in", "value": []}))?, "FALSE");
    Ok(())
}

#[test]
fn test_literals_are_escaped() -> Result<()> {
    let sql = compile_filter(json!({"path": ["profile", "username"], "operator": "eq", "value": "x' OR '1'='1"}))?;
    assert_eq!(sql, "data->'profile'->>'username' = 'x'' OR ''1''=''1'");

    let sql = compile_filter(json!({"path": ["profile", "username"], "operator": "eq", "value": r"a\' OR true --"}))?;
    assert_eq!(sql, r"data->'profile'->>'username' = E'a\\'' OR true --'");

    let sql = compile_filter(json!({"path": ["server", "port"], "operator": "in", "value": [r"80\", 443]}))?;
    assert_eq!(sql, r"(data->'server'->>'port')::integer IN (E'80\\'::integer, 443)");
    Ok(())
}

#[test]
fn test_denormalized_column_in_full_query() -> Result<()> {
    let request = CompileRequest::new("tv_location")
        .with_fields(vec![FieldPath::new("name", ["name"])])
        .columns(["location__ltree_path", "id"])
        .field_types(common::user_types())
        .filter(parse_predicate(&json!({"path": ["location", "ltreePath"], "operator": "descendant_of", "value": "europe.france"}))?);
    assert_eq!(
        QueryCompiler::default().compile(&request)?,
        "SELECT data->>'name' AS \"name\" FROM tv_location WHERE location__ltree_path <@ 'europe.france'::ltree"
    );
    Ok(())
}

#[test]
fn test_distance_method_from_config() -> Result<()> {
    let compiler = QueryCompiler::new(CompilerConfig::default().with_distance_method(DistanceMethod::PostGis));
    let predicate = parse_predicate(&json!({"path": ["location", "coordinates"], "operator": "distance_within", "value": [48.5, 2.25, 5000]}))?;
    let sql = compiler.compile_where(&predicate, &BTreeSet::new(), &common::user_types())?;
    assert!(sql.starts_with("ST_DWithin(ST_SetSRID((data->'location'->>'coordinates')::point::geometry, 4326)::geography"), "{}", sql);
    assert!(sql.ends_with("ST_SetSRID(ST_MakePoint(2.25, 48.5), 4326)::geography, 5000)"), "{}", sql);
    Ok(())
}

#[test]
fn test_errors_abort_compilation() -> Result<()> {
    let compiler = QueryCompiler::default();

    let unsupported = CompileRequest::new("t").filter(parse_predicate(&json!({"path": ["profile", "age"], "operator": "lca", "value": ["a"]}))?);
    let unsupported = unsupported.field_types(common::user_types());
    assert!(matches!(compiler.compile(&unsupported), Err(CompileError::UnsupportedOperator { .. })));

    let malformed = CompileRequest::new("t")
        .field_types(common::user_types())
        .filter(parse_predicate(&json!({"path": ["location", "coordinates"], "operator": "distance_within", "value": [1.5, 2.5]}))?);
    assert!(matches!(compiler.compile(&malformed), Err(CompileError::MalformedValue { .. })));

    assert!(matches!(compile_filter(json!({"path": [], "operator": "eq", "value": 1})), Err(CompileError::InvalidPath(_))));
    assert!(matches!(compile_filter(json!({"path": "profile..age", "operator": "eq", "value": 1})), Err(CompileError::InvalidPath(_))));
    assert!(matches!(compile_filter(json!({"operator": "eq", "value": 1})), Err(CompileError::Parse(_))));
    assert!(matches!(compiler.compile_where(&Predicate::Condition(nestql::Condition::new(["a", ""], "eq", json!(1))), &BTreeSet::new(), &Default::default()), Err(CompileError::InvalidPath(_))));
    Ok(())
}
