//! Read-only guard for the query console.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::BLOCKED_SQL_KEYWORDS;
use crate::errors::{AppError, AppResult};

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid word pattern"));

/// Refuse anything but a single statement free of blocklisted keywords.
///
/// Runs before the statement reaches the database; the rejection names the
/// offending keyword.
pub fn check_read_only(sql: &str) -> AppResult<()> {
    let statement = sql.trim().trim_end_matches(';').trim_end();
    if statement.contains(';') {
        return Err(AppError::not_permitted(
            "Multiple statements are not allowed in read-only mode",
        ));
    }

    let blocked = WORD.find_iter(statement).find_map(|word| {
        BLOCKED_SQL_KEYWORDS
            .iter()
            .find(|keyword| word.as_str().eq_ignore_ascii_case(keyword))
    });
    match blocked {
        Some(keyword) => Err(AppError::not_permitted(format!(
            "{} statements are not allowed in read-only mode",
            keyword
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(sql: &str) -> String {
        match check_read_only(sql) {
            Err(AppError::NotPermitted(message)) => message,
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_select_passes() {
        assert!(check_read_only("SELECT id, created_at FROM users;").is_ok());
        assert!(check_read_only("select count(*) from records where deleted_at is null").is_ok());
    }

    #[test]
    fn test_blocked_keyword_is_named() {
        assert!(rejection("DROP TABLE users").starts_with("DROP"));
        assert!(rejection("with x as (delete from users returning *) select * from x")
            .starts_with("DELETE"));
    }

    #[test]
    fn test_identifiers_containing_keywords_pass() {
        assert!(check_read_only("SELECT updated_at, created_by FROM records").is_ok());
    }

    #[test]
    fn test_multiple_statements_rejected() {
        assert!(rejection("SELECT 1; SELECT 2").contains("Multiple statements"));
    }
}
