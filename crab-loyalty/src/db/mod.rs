//! Database access layer (PostgreSQL)
//!
//! Free async functions over `&PgPool`. Enum columns are TEXT; row structs
//! convert into the shared models.

pub mod connections;
pub mod contact_lists;
pub mod credits;
pub mod customers;
pub mod discount_codes;
pub mod discount_rules;
pub mod orders;
pub mod points;
pub mod settings;
pub mod sync_logs;

pub(crate) use crate::BoxError;

use shared::models::CustomerType;

pub(crate) fn snowflake_id() -> i64 {
    shared::util::snowflake_id()
}

/// Parse a TEXT enum column
pub(crate) fn parse_enum<T>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    column: &str,
) -> Result<T, BoxError> {
    parse(value).ok_or_else(|| format!("invalid {column} value in database: {value}").into())
}

/// Parse a TEXT[] of customer types
pub(crate) fn parse_customer_types(values: &[String]) -> Result<Vec<CustomerType>, BoxError> {
    values
        .iter()
        .map(|v| parse_enum(v, CustomerType::parse, "customer_type"))
        .collect()
}

pub(crate) fn customer_types_to_db(types: &[CustomerType]) -> Vec<String> {
    types.iter().map(|t| t.as_str().to_string()).collect()
}

/// `LIKE` pattern matching values that start with `prefix` literally
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Name of the violated unique constraint, if this error is one
pub fn unique_violation(err: &BoxError) -> Option<String> {
    let db_err = err.downcast_ref::<sqlx::Error>()?.as_database_error()?;
    if db_err.is_unique_violation() {
        Some(db_err.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_types_round_trip_through_text() {
        let types = vec![CustomerType::Gc, CustomerType::Wholesale];
        let text = customer_types_to_db(&types);
        assert_eq!(text, vec!["GC", "WHOLESALE"]);
        assert_eq!(parse_customer_types(&text).unwrap(), types);
    }

    #[test]
    fn unknown_enum_text_is_an_error() {
        let err = parse_customer_types(&["PLATINUM".to_string()]).unwrap_err();
        assert!(err.to_string().contains("PLATINUM"));
    }

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("Jan"), "Jan%");
        assert_eq!(like_prefix("%%"), "\\%\\%%");
        assert_eq!(like_prefix("a_b\\c"), "a\\_b\\\\c%");
    }

    #[test]
    fn non_sqlx_errors_are_not_unique_violations() {
        let err: BoxError = "boom".into();
        assert!(unique_violation(&err).is_none());
    }
}
