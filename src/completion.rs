//! Keyword completion over Cypher's reserved words

use serde::Serialize;
use serde_json::{Map, Value};

/// Cypher reserved words, including the literals `false`, `null` and `true`.
pub const KEYWORDS: &[&str] = &[
    "CALL", "CREATE", "DELETE", "DETACH", "EXISTS", "FOREACH", "LOAD", "MATCH", "MERGE",
    "OPTIONAL", "REMOVE", "RETURN", "SET", "START", "UNION", "UNWIND", "WITH", "LIMIT", "ORDER",
    "SKIP", "WHERE", "YIELD", "ASC", "ASCENDING", "ASSERT", "BY", "CSV", "DESC", "DESCENDING",
    "ON", "ALL", "CASE", "ELSE", "END", "THEN", "WHEN", "AND", "AS", "CONTAINS", "DISTINCT",
    "ENDS", "IN", "IS", "NOT", "OR", "STARTS", "XOR", "CONSTRAINT", "DROP", "INDEX", "NODE",
    "KEY", "UNIQUE", "JOIN", "PERIODIC", "COMMIT", "SCAN", "USING", "false", "null", "true",
    "ADD", "DO", "FOR", "MANDATORY", "OF", "REQUIRE", "SCALAR",
];

/// `complete_reply` content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReply {
    pub matches: Vec<String>,
    pub cursor_start: usize,
    pub cursor_end: usize,
    pub metadata: Map<String, Value>,
    pub status: &'static str,
}

/// Complete the token ending at `cursor` (a character offset, clamped to
/// the code length). The token starts after the last space before the cursor.
pub fn complete(code: &str, cursor: usize) -> CompletionReply {
    let chars: Vec<char> = code.chars().collect();
    let cursor = cursor.min(chars.len());

    let start = chars[..cursor]
        .iter()
        .rposition(|c| *c == ' ')
        .map(|i| i + 1)
        .unwrap_or(0);
    let token: String = chars[start..cursor].iter().collect::<String>().to_lowercase();

    let matches = KEYWORDS
        .iter()
        .filter(|kw| kw.to_lowercase().starts_with(&token))
        .map(|kw| kw.to_string())
        .collect();

    CompletionReply {
        matches,
        cursor_start: start,
        cursor_end: cursor,
        metadata: Map::new(),
        status: "ok",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keywords_are_unique() {
        let unique: HashSet<_> = KEYWORDS.iter().collect();
        assert_eq!(unique.len(), KEYWORDS.len());
    }

    #[test]
    fn test_complete_prefix_after_space() {
        let reply = complete("MATCH (n) RET", 13);
        assert_eq!(reply.matches, vec!["RETURN"]);
        assert_eq!(reply.cursor_start, 10);
        assert_eq!(reply.cursor_end, 13);
        assert_eq!(reply.status, "ok");
    }

    #[test]
    fn test_complete_is_case_insensitive() {
        let reply = complete("ma", 2);
        assert_eq!(reply.matches, vec!["MATCH", "MANDATORY"]);
        assert_eq!(reply.cursor_start, 0);

        let reply = complete("RETURN NU", 9);
        assert_eq!(reply.matches, vec!["null"]);
    }

    #[test]
    fn test_complete_uses_cursor_not_end() {
        let reply = complete("CRE (n)", 3);
        assert_eq!(reply.matches, vec!["CREATE"]);
        assert_eq!(reply.cursor_end, 3);
    }

    #[test]
    fn test_complete_counts_characters() {
        // 'é' is two bytes but one character
        let reply = complete("é WH", 4);
        assert_eq!(reply.cursor_start, 2);
        assert_eq!(reply.matches, vec!["WHERE", "WHEN"]);
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let reply = complete("LIM", 99);
        assert_eq!(reply.cursor_end, 3);
        assert_eq!(reply.matches, vec!["LIMIT"]);
    }

    #[test]
    fn test_empty_token_matches_everything() {
        let reply = complete("MATCH ", 6);
        assert_eq!(reply.matches.len(), KEYWORDS.len());
    }

    #[test]
    fn test_no_match() {
        assert!(complete("zzz", 3).matches.is_empty());
    }
}
