use serde::de::{self, Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::ast::{split_dot_path, Condition, DeclaredType, Predicate};
use crate::error::ParseError;

/// Decode a predicate tree from its JSON shape:
///
/// ```text
/// {"AND": [..]} | {"OR": [..]} | {"NOT": {..}}
/// {"path": ["a", "b"] | "a.b", "operator": "eq", "value": .., "declared_type": "Int"}
/// ```
pub fn parse_predicate(value: &Value) -> Result<Predicate, ParseError> {
    let object = value.as_object().ok_or_else(|| unexpected("predicate object", value))?;

    if let Some(children) = object.get("AND") {
        return Ok(Predicate::And(parse_children("AND", children)?));
    }
    if let Some(children) = object.get("OR") {
        return Ok(Predicate::Or(parse_children("OR", children)?));
    }
    if let Some(inner) = object.get("NOT") {
        return Ok(Predicate::Not(Box::new(parse_predicate(inner)?)));
    }

    parse_condition(object).map(Predicate::Condition)
}

fn parse_children(keyword: &str, children: &Value) -> Result<Vec<Predicate>, ParseError> {
    let items = children.as_array().ok_or_else(|| ParseError::MalformedPredicate(format!("{keyword} expects a list of predicates")))?;
    items.iter().map(parse_predicate).collect()
}

fn parse_condition(object: &Map<String, Value>) -> Result<Condition, ParseError> {
    let path = match object.get("path") {
        Some(path) => parse_path(path)?,
        None => return Err(ParseError::MalformedPredicate("condition is missing `path`".into())),
    };

    let operator = match object.get("operator") {
        Some(Value::String(op)) if !op.is_empty() => op.clone(),
        Some(other) => return Err(unexpected("operator string", other)),
        None => return Err(ParseError::MalformedPredicate("condition is missing `operator`".into())),
    };

    let declared_type = match object.get("declared_type") {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(DeclaredType::from(tag.as_str())),
        Some(other) => return Err(unexpected("type tag string", other)),
    };

    Ok(Condition { path, operator, value: object.get("value").cloned().unwrap_or(Value::Null), declared_type })
}

/// A path is either a list of segments or a dot-joined string. Either way it must
/// have at least one segment and no segment may be empty.
pub fn parse_path(value: &Value) -> Result<Vec<String>, ParseError> {
    let segments = match value {
        Value::String(dotted) => split_dot_path(dotted),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(segment) => Ok(segment.clone()),
                other => Err(unexpected("path segment string", other)),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(unexpected("path", other)),
    };

    if segments.is_empty() {
        return Err(ParseError::InvalidPath("path has no segments".into()));
    }
    if segments.iter().any(String::is_empty) {
        return Err(ParseError::InvalidPath(format!("empty segment in {:?}", segments)));
    }
    Ok(segments)
}

fn unexpected(expected: &'static str, got: &Value) -> ParseError { ParseError::UnexpectedValue { expected, got: got.to_string() } }

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        parse_predicate(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition() -> anyhow::Result<()> {
        let predicate = parse_predicate(&json!({"path": ["profile", "age"], "operator": "gt", "value": 21, "declared_type": "Int"}))?;
        assert_eq!(predicate, Predicate::Condition(Condition::new(["profile", "age"], "gt", json!(21)).typed(DeclaredType::Int)));
        Ok(())
    }

    #[test]
    fn test_dotted_path_and_missing_value() -> anyhow::Result<()> {
        let predicate = parse_predicate(&json!({"path": "profile.nickname", "operator": "isnull"}))?;
        assert_eq!(predicate, Predicate::Condition(Condition::new(["profile", "nickname"], "isnull", Value::Null)));
        Ok(())
    }

    #[test]
    fn test_nested_groups() -> anyhow::Result<()> {
        let predicate = parse_predicate(&json!({
            "AND": [
                {"path": ["status"], "operator": "eq", "value": "active"},
                {"OR": [
                    {"path": ["age"], "operator": "lt", "value": 18},
                    {"NOT": {"path": ["age"], "operator": "isnull", "value": true}}
                ]}
            ]
        }))?;

        match predicate {
            Predicate::And(children) => {
                assert_eq!(children.len(), 2);
                match &children[1] {
                    Predicate::Or(inner) => assert!(matches!(inner[1], Predicate::Not(_))),
                    other => panic!("expected OR, got {:?}", other),
                }
            }
            other => panic!("expected AND, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_invalid_paths() {
        assert!(matches!(parse_predicate(&json!({"path": [], "operator": "eq", "value": 1})), Err(ParseError::InvalidPath(_))));
        assert!(matches!(parse_predicate(&json!({"path": "a..b", "operator": "eq", "value": 1})), Err(ParseError::InvalidPath(_))));
        assert!(matches!(parse_predicate(&json!({"path": [1], "operator": "eq"})), Err(ParseError::UnexpectedValue { .. })));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse_predicate(&json!({"operator": "eq"})), Err(ParseError::MalformedPredicate(_))));
        assert!(matches!(parse_predicate(&json!({"AND": {"path": ["a"]}})), Err(ParseError::MalformedPredicate(_))));
        assert!(matches!(parse_predicate(&json!("eq")), Err(ParseError::UnexpectedValue { .. })));
    }

    #[test]
    fn test_deserialize() -> anyhow::Result<()> {
        let predicate: Predicate = serde_json::from_str(r#"{"OR": []}"#)?;
        assert_eq!(predicate, Predicate::Or(vec![]));
        Ok(())
    }
}
