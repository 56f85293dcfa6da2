//! Post summaries and date ordering for index pages.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use mdpost_core::PostMetadata;
use serde::Serialize;

/// A post as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// Directory name of the post, used in its URL.
    pub slug: String,
    /// Front matter, or the placeholder record.
    pub metadata: PostMetadata,
}

/// Parses a front matter date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS`, and plain
/// `YYYY-MM-DD` dates (midnight). Anything else is `None`.
pub fn parse_post_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(date) {
        return Some(timestamp.naive_utc());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return Some(timestamp);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
}

/// Sorts newest first. Unparseable dates sort as the oldest; ties keep their
/// existing order.
pub fn sort_newest_first(posts: &mut [PostSummary]) {
    posts.sort_by_cached_key(|post| std::cmp::Reverse(parse_post_date(&post.metadata.date)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(slug: &str, date: &str) -> PostSummary {
        PostSummary {
            slug: slug.to_string(),
            metadata: PostMetadata {
                icon: None,
                title: slug.to_string(),
                date: date.to_string(),
                excerpt: String::new(),
            },
        }
    }

    #[test]
    fn parses_supported_formats() {
        assert!(parse_post_date("2021-05-01").is_some());
        assert!(parse_post_date(" 2021-05-01 ").is_some());
        assert!(parse_post_date("2021-05-01T10:30:00").is_some());
        assert!(parse_post_date("2021-05-01T10:30:00+02:00").is_some());
        assert!(parse_post_date("yesterday").is_none());
        assert!(parse_post_date("2021-13-40").is_none());
    }

    #[test]
    fn rfc3339_offsets_normalize_to_utc() {
        let a = parse_post_date("2021-05-01T10:00:00+02:00").expect("parses");
        let b = parse_post_date("2021-05-01T08:00:00").expect("parses");
        assert_eq!(a, b);
    }

    #[test]
    fn sorts_descending_with_invalid_last() {
        let mut posts = vec![
            summary("old", "2019-01-01"),
            summary("broken", "not a date"),
            summary("new", "2023-06-30"),
            summary("mid", "2021-05-01T12:00:00Z"),
            summary("sentinel", "2000-01-01"),
        ];
        sort_newest_first(&mut posts);
        let order: Vec<&str> = posts.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "sentinel", "broken"]);
    }

    #[test]
    fn ties_keep_order() {
        let mut posts = vec![summary("a", "2020-01-01"), summary("b", "2020-01-01")];
        sort_newest_first(&mut posts);
        assert_eq!(posts[0].slug, "a");
        assert_eq!(posts[1].slug, "b");
    }
}
