//! Related-post summaries for prompt context.

use super::ManifestPost;
use crate::types::ParentSummary;
use regex::Regex;
use std::sync::LazyLock;

/// Word budget of a generated excerpt.
pub const EXCERPT_WORDS: usize = 30;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Remove HTML tags and collapse whitespace.
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `limit` words, appending `more` when anything was cut.
pub fn trim_words(text: &str, limit: usize, more: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    format!("{}{more}", words[..limit].join(" "))
}

/// Summarize a post: its excerpt, or the first words of its stripped content.
pub fn summarize_post(post: &ManifestPost) -> ParentSummary {
    let excerpt = if post.excerpt.trim().is_empty() {
        trim_words(&strip_tags(&post.content), EXCERPT_WORDS, "…")
    } else {
        post.excerpt.trim().to_string()
    };

    ParentSummary {
        id: post.id,
        post_type: post.post_type.clone(),
        title: post.title.trim().to_string(),
        excerpt,
        permalink: post.permalink.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Hello <strong>bay</strong></p>\n<p>area</p>"),
            "Hello bay area"
        );
    }

    #[test]
    fn test_trim_words() {
        assert_eq!(trim_words("one two three", 5, "…"), "one two three");
        assert_eq!(trim_words("one two three", 2, "…"), "one two…");
    }

    #[test]
    fn test_summary_prefers_excerpt() {
        let post = ManifestPost {
            id: 4,
            post_type: "page".into(),
            title: "About".into(),
            content: "<p>Long body</p>".into(),
            excerpt: "Who we are".into(),
            ..Default::default()
        };
        let summary = summarize_post(&post);
        assert_eq!(summary.excerpt, "Who we are");
        assert_eq!(summary.post_type, "page");
    }

    #[test]
    fn test_summary_trims_content() {
        let body = (1..=40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let post = ManifestPost {
            id: 4,
            post_type: "post".into(),
            content: format!("<div>{body}</div>"),
            ..Default::default()
        };
        let summary = summarize_post(&post);
        assert!(summary.excerpt.starts_with("w1 w2"));
        assert!(summary.excerpt.ends_with("w30…"));
    }
}
