//! Query template expansion.
//!
//! # Responsibilities
//! - Parse `index.php?var=$matches[1]&other=literal` templates once
//! - Expand `$matches[N]` references from regex captures per request
//!
//! # Design Decisions
//! - Parsing happens when the rewrite table is built, never per request
//! - A reference to a group that did not match expands to an empty string
//! - Pairs without a key are dropped

/// Piece of a query value: literal text or a capture group reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(usize),
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    raw: String,
    pairs: Vec<(String, Vec<Segment>)>,
}

impl QueryTemplate {
    pub fn parse(raw: &str) -> Self {
        let query = match raw.split_once('?') {
            Some((_, query)) => query,
            None if raw.starts_with("index.php") => "",
            None => raw,
        };

        let pairs = query
            .split('&')
            .filter(|p| !p.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), parse_segments(value)))
            })
            .collect();

        Self {
            raw: raw.to_string(),
            pairs,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Expand the template against regex captures (index 0 = whole match).
    pub fn expand(&self, captures: &[Option<String>]) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|(key, segments)| {
                let mut value = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => value.push_str(text),
                        Segment::Group(n) => {
                            if let Some(Some(capture)) = captures.get(*n) {
                                value.push_str(capture);
                            }
                        }
                    }
                }
                (key.clone(), value)
            })
            .collect()
    }
}

const GROUP_OPEN: &str = "$matches[";

fn parse_segments(value: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find(GROUP_OPEN) {
        let after = &rest[start + GROUP_OPEN.len()..];
        let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
        let closed = digits > 0 && after[digits..].starts_with(']');

        if !closed {
            // Not a group reference; keep the text and move past the marker.
            push_literal(&mut segments, &rest[..start + GROUP_OPEN.len()]);
            rest = after;
            continue;
        }

        push_literal(&mut segments, &rest[..start]);
        if let Ok(n) = after[..digits].parse() {
            segments.push(Segment::Group(n));
        }
        rest = &after[digits + 1..];
    }

    push_literal(&mut segments, rest);
    segments
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(Segment::Literal(prev)) => prev.push_str(text),
        _ => segments.push(Segment::Literal(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_bare_index_has_no_vars() {
        let t = QueryTemplate::parse("index.php");
        assert!(t.expand(&[]).is_empty());
    }

    #[test]
    fn test_expand_groups_and_literals() {
        let t = QueryTemplate::parse("index.php?product=$matches[1]&view=full&page=p$matches[2]");
        let out = t.expand(&caps(&[Some("shop/shoe/3"), Some("shoe"), Some("3")]));
        assert_eq!(
            out,
            vec![
                ("product".to_string(), "shoe".to_string()),
                ("view".to_string(), "full".to_string()),
                ("page".to_string(), "p3".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_group_expands_empty() {
        let t = QueryTemplate::parse("index.php?a=$matches[4]");
        assert_eq!(t.expand(&caps(&[Some("x")])), vec![("a".to_string(), String::new())]);
    }

    #[test]
    fn test_template_without_index_prefix() {
        let t = QueryTemplate::parse("pagename=about");
        assert_eq!(
            t.expand(&[]),
            vec![("pagename".to_string(), "about".to_string())]
        );
    }

    #[test]
    fn test_malformed_marker_kept_literal() {
        let t = QueryTemplate::parse("index.php?a=$matches[x]&=skip&b");
        let out = t.expand(&[]);
        assert_eq!(
            out,
            vec![
                ("a".to_string(), "$matches[x]".to_string()),
                ("b".to_string(), String::new()),
            ]
        );
    }
}
