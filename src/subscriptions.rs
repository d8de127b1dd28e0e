use std::io::Read;
use std::path::Path;

use crate::app::{Result, TikfeedError};

/// Read usernames from a headerless CSV, first field of each row.
///
/// Blank rows are skipped; order and duplicates are preserved.
pub fn read_subscriptions(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| {
        TikfeedError::Config(format!(
            "Cannot open subscription list {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_subscriptions(file)
}

pub fn parse_subscriptions<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut users = Vec::new();
    for record in csv.records() {
        let record = record?;
        if let Some(user) = record.get(0).filter(|u| !u.is_empty()) {
            users.push(user.to_string());
        }
    }
    Ok(users)
}

/// Reject usernames that would escape `rss/` or `thumbnails/`
pub fn validate_username(username: &str) -> Result<()> {
    let bad = username.is_empty()
        || username == "."
        || username == ".."
        || username.contains(['/', '\\']);
    if bad {
        Err(TikfeedError::InvalidUsername(username.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_per_line() {
        let users = parse_subscriptions("alice\nbob\ncarol\n".as_bytes()).unwrap();
        assert_eq!(users, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_parse_first_field_only_and_trim() {
        let users = parse_subscriptions(" alice ,extra\n\nbob\n".as_bytes()).unwrap();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let users = parse_subscriptions("alice\nalice\n".as_bytes()).unwrap();
        assert_eq!(users, vec!["alice", "alice"]);
    }

    #[test]
    fn test_parse_no_header_assumed() {
        let users = parse_subscriptions("username\nalice\n".as_bytes()).unwrap();
        assert_eq!(users, vec!["username", "alice"]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_subscriptions(&dir.path().join("subscriptions.csv")).unwrap_err();
        assert!(matches!(err, TikfeedError::Config(_)));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("some.user_1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("..").is_err());
        assert!(validate_username("a/b").is_err());
        assert!(validate_username("a\\b").is_err());
    }
}
