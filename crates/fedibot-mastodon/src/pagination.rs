// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RFC 5988 `Link` header parsing for Mastodon's cursor pagination.
//!
//! Mastodon returns `Link: <url>; rel="next", <url>; rel="prev"` on list
//! endpoints. Only those two relations are emitted; anything else in the
//! header is ignored.

/// Next/prev page URLs extracted from a `Link` response header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl PageLinks {
    /// Parse a raw `Link` header value. Malformed segments are skipped
    /// rather than failing the whole response.
    pub fn parse(header: &str) -> Self {
        let mut links = PageLinks::default();
        for segment in header.split(',') {
            let mut parts = segment.splitn(2, ';');
            let url_part = parts.next().unwrap_or("").trim();
            let rel_part = parts.next().unwrap_or("").trim();

            let Some(url) = url_part.strip_prefix('<').and_then(|u| u.strip_suffix('>')) else {
                continue;
            };
            let Some(rel) = rel_part
                .strip_prefix("rel=\"")
                .and_then(|r| r.strip_suffix('"'))
            else {
                continue;
            };

            match rel {
                "next" => links.next = Some(url.to_string()),
                "prev" => links.prev = Some(url.to_string()),
                _ => {}
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_relations() {
        let header = r#"<https://m.example/api/v1/notifications?max_id=100>; rel="next", <https://m.example/api/v1/notifications?min_id=200>; rel="prev""#;
        let links = PageLinks::parse(header);
        assert_eq!(
            links.next.as_deref(),
            Some("https://m.example/api/v1/notifications?max_id=100")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("https://m.example/api/v1/notifications?min_id=200")
        );
    }

    #[test]
    fn single_relation_leaves_other_empty() {
        let links = PageLinks::parse(r#"<https://m.example/x?max_id=5>; rel="next""#);
        assert!(links.next.is_some());
        assert!(links.prev.is_none());
    }

    #[test]
    fn malformed_segments_are_skipped() {
        let links = PageLinks::parse(r#"garbage, <https://m.example/x>; rel="prev""#);
        assert!(links.next.is_none());
        assert_eq!(links.prev.as_deref(), Some("https://m.example/x"));
    }

    #[test]
    fn empty_header_parses_to_default() {
        assert_eq!(PageLinks::parse(""), PageLinks::default());
    }
}
