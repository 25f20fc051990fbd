//! Separator-aware splitting of table cells, lists and paths.
//!
//! Property values may contain `-`, `,`, `|` or brackets inside string
//! literals, so none of the splits here cut on raw characters. The scanner
//! finds the true boundaries (outside strings, at bracket depth 0), a marker
//! that does not occur anywhere in the input is injected at those
//! boundaries, and only then is the text split on the marker.

/// A character outside any string literal, with the bracket depth *before* it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub offset: usize,
    pub ch: char,
    pub depth: usize,
}

/// Walk `s` once, yielding every character that is not inside a `"…"`,
/// `'…'` or `` `…` `` literal. Unbalanced closers never drive the depth
/// below zero.
pub(crate) fn scan(s: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(s.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q != '`' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' => {
                tokens.push(Token { offset, ch, depth });
                depth += 1;
            }
            ')' | ']' | '}' => {
                tokens.push(Token { offset, ch, depth });
                depth = depth.saturating_sub(1);
            }
            _ => tokens.push(Token { offset, ch, depth }),
        }
    }
    tokens
}

/// True when every bracket opened outside strings is closed, in order.
pub(crate) fn is_balanced(s: &str) -> bool {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in s.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q != '`' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty() && quote.is_none()
}

/// A random marker guaranteed not to occur in `s`.
pub(crate) fn unique_marker(s: &str) -> String {
    loop {
        let marker = format!("\u{1f}{:016x}\u{1f}", rand::random::<u64>());
        if !s.contains(&marker) {
            return marker;
        }
    }
}

/// Replace each `(start, end)` byte span of `s` with `marker` and split on it.
///
/// Spans must be sorted and non-overlapping. A zero-width span injects the
/// marker without removing text.
pub(crate) fn split_at_spans(s: &str, spans: &[(usize, usize)]) -> Vec<String> {
    if spans.is_empty() {
        return vec![s.to_string()];
    }
    let marker = unique_marker(s);
    let mut injected = String::with_capacity(s.len() + spans.len() * marker.len());
    let mut last = 0;
    for &(start, end) in spans {
        injected.push_str(&s[last..start]);
        injected.push_str(&marker);
        last = end;
    }
    injected.push_str(&s[last..]);
    injected.split(marker.as_str()).map(str::to_string).collect()
}

/// Split a table row (outer `|` delimiters already removed) into trimmed cells.
pub(crate) fn split_row(row: &str) -> Vec<String> {
    let spans: Vec<(usize, usize)> = scan(row)
        .into_iter()
        .filter(|t| t.ch == '|' && t.depth == 0)
        .map(|t| (t.offset, t.offset + 1))
        .collect();
    split_at_spans(row, &spans)
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// How the elements of a bracketed list are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    /// `), (` boundaries
    Nodes,
    /// `], [` boundaries
    Relations,
    /// No boundary at all: empty or single element
    Single,
}

/// Split the inside of a list literal (without its outer `[` `]`) into
/// element literals.
///
/// Boundaries are depth-0 commas sitting between a closing `)`/`]` and an
/// opening `(`/`[`.
pub(crate) fn split_list(inner: &str) -> (ListKind, Vec<String>) {
    let tokens = scan(inner);
    let mut spans = Vec::new();
    let mut kind = ListKind::Single;

    for (i, token) in tokens.iter().enumerate() {
        if token.ch != ',' || token.depth != 0 {
            continue;
        }
        let before = tokens[..i].iter().rev().find(|t| !t.ch.is_whitespace());
        let after = tokens[i + 1..].iter().find(|t| !t.ch.is_whitespace());
        match (before.map(|t| t.ch), after.map(|t| t.ch)) {
            (Some(')'), Some('(')) => {
                if kind == ListKind::Single {
                    kind = ListKind::Nodes;
                }
                spans.push((token.offset, token.offset + 1));
            }
            (Some(']'), Some('[')) => {
                kind = ListKind::Relations;
                spans.push((token.offset, token.offset + 1));
            }
            _ => {}
        }
    }

    let elements = split_at_spans(inner, &spans)
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    (kind, elements)
}

/// True when `s` contains a top-level `)-[`, `)->[` or `)<-[` connector.
pub(crate) fn has_path_connector(s: &str) -> bool {
    let tokens = scan(s);
    tokens.iter().enumerate().any(|(i, t)| {
        if t.ch != ')' || t.depth != 1 {
            return false;
        }
        let rest: String = tokens[i + 1..]
            .iter()
            .take_while(|n| n.offset - t.offset <= 4)
            .map(|n| n.ch)
            .collect();
        rest.starts_with("-[") || rest.starts_with("->[") || rest.starts_with("<-[")
    })
}

/// Split a path literal into its alternating node and relation literals.
///
/// Returns `None` when anything other than `-`, `<`, `>` sits between two
/// top-level entities.
pub(crate) fn split_path(s: &str) -> Option<Vec<String>> {
    let tokens = scan(s);
    let mut spans = Vec::new();
    let mut connector_start: Option<usize> = None;

    for token in &tokens {
        match (token.ch, token.depth) {
            (')' | ']', 1) => {
                connector_start = Some(token.offset + 1);
            }
            ('(' | '[', 0) => {
                if let Some(start) = connector_start.take() {
                    let connector = s[start..token.offset].trim();
                    if connector.is_empty() || !connector.chars().all(|c| matches!(c, '-' | '<' | '>')) {
                        return None;
                    }
                    spans.push((start, token.offset));
                }
            }
            (_, 0) if connector_start.is_none() && !token.ch.is_whitespace() => return None,
            _ => {}
        }
    }

    if let Some(start) = connector_start {
        if !s[start..].trim().is_empty() {
            return None;
        }
    }

    let parts: Vec<String> = split_at_spans(s, &spans)
        .into_iter()
        .map(|p| p.trim().to_string())
        .collect();
    if parts.iter().any(String::is_empty) {
        return None;
    }
    Some(parts)
}
