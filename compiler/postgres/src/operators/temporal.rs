use nestql::DeclaredType;

use super::helpers::CastStrategy;

/// Literals are handed to the cast verbatim; the database owns date parsing.
pub fn date() -> CastStrategy { CastStrategy::new("date", DeclaredType::Date, "date") }

pub fn datetime() -> CastStrategy { CastStrategy::new("datetime", DeclaredType::DateTime, "timestamptz") }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{FieldExpr, OperatorStrategy};
    use serde_json::json;

    #[test]
    fn test_date() -> anyhow::Result<()> {
        let field = FieldExpr::Json("data->>'birthday'".into());
        assert_eq!(date().build("gte", &json!("2024-01-01"), &field, None)?, "(data->>'birthday')::date >= '2024-01-01'::date");
        assert_eq!(date().build("eq", &json!("not-a-date"), &field, None)?, "(data->>'birthday')::date = 'not-a-date'::date");
        Ok(())
    }

    #[test]
    fn test_datetime() -> anyhow::Result<()> {
        let field = FieldExpr::Json("data->>'createdAt'".into());
        assert_eq!(
            datetime().build("lt", &json!("2024-01-01T12:00:00Z"), &field, None)?,
            "(data->>'createdAt')::timestamptz < '2024-01-01T12:00:00Z'::timestamptz"
        );
        assert_eq!(
            datetime().build("notin", &json!(["2024-01-01T00:00:00Z"]), &field, None)?,
            "(data->>'createdAt')::timestamptz NOT IN ('2024-01-01T00:00:00Z'::timestamptz)"
        );
        Ok(())
    }
}
