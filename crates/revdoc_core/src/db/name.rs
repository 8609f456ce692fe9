//! Database naming rules.
//!
//! # Invariants
//! - A name starts with a lowercase ASCII letter.
//! - Remaining characters are limited to `a-z 0-9 _ $ ( ) + - /`.
//! - `/` nests the database file under sub-directories.

use super::{DbError, DbResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// File extension of on-disk databases.
pub const DATABASE_FILE_EXTENSION: &str = "revdoc";

static DATABASE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_$()+\-/]*$").expect("database name pattern is valid")
});

/// Returns whether `name` is a legal database name.
pub fn is_valid_database_name(name: &str) -> bool {
    DATABASE_NAME_PATTERN.is_match(name) && !name.split('/').any(str::is_empty)
}

/// Resolves the database file for `name` under `directory`.
///
/// # Errors
/// - `InvalidDatabaseName` when `name` breaks the naming rules.
pub fn database_path(directory: impl AsRef<Path>, name: &str) -> DbResult<PathBuf> {
    if !is_valid_database_name(name) {
        return Err(DbError::InvalidDatabaseName(name.to_string()));
    }
    let mut path = directory.as_ref().to_path_buf();
    for segment in name.split('/') {
        path.push(segment);
    }
    path.set_extension(DATABASE_FILE_EXTENSION);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{database_path, is_valid_database_name};
    use crate::db::DbError;
    use std::path::Path;

    #[test]
    fn accepts_names_following_the_rules() {
        for name in ["hello", "a", "db_1", "cash$(x)+y-z", "team/notes"] {
            assert!(is_valid_database_name(name), "`{name}` should be valid");
        }
    }

    #[test]
    fn rejects_names_breaking_the_rules() {
        for name in ["", "Hello", "1db", "_db", "has space", "dots.db", "a//b", "trail/"] {
            assert!(!is_valid_database_name(name), "`{name}` should be invalid");
        }
    }

    #[test]
    fn database_path_appends_extension_and_nests_segments() {
        let path = database_path("/data", "team/notes").unwrap();
        assert_eq!(path, Path::new("/data/team/notes.revdoc"));
    }

    #[test]
    fn database_path_rejects_invalid_names() {
        let err = database_path("/data", "Bad").unwrap_err();
        assert!(matches!(err, DbError::InvalidDatabaseName(name) if name == "Bad"));
    }
}
