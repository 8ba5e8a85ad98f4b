//! Normalization of raw provider output into a usable alt text.

use regex::Regex;
use std::sync::LazyLock;

static PREAMBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(image|photo|picture)\s+of\b\s*").expect("preamble pattern is valid")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?:/+\S*").expect("url pattern is valid"));

const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’', '`'];

/// Clean up a raw suggestion.
///
/// Strips a leading "image of" style preamble, keeps at most `max_words`
/// words (no limit when zero), removes URLs, collapses whitespace and
/// trims surrounding quotes. Preamble and quote stripping repeat until the
/// text stops changing, so `"Image of a dog"` ends up as `a dog`.
pub fn sanitize_suggestion(raw: &str, max_words: u32) -> String {
    let text = strip_preamble(raw.trim());
    let text = truncate_words(text, max_words as usize);
    let text = URL_RE.replace_all(&text, " ");
    let mut text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    loop {
        let trimmed = text.trim_matches(|c: char| c.is_whitespace() || QUOTES.contains(&c));
        let next = strip_preamble(trimmed);
        if next == text {
            return text;
        }
        text = next.to_string();
    }
}

fn strip_preamble(text: &str) -> &str {
    match PREAMBLE_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

fn truncate_words(text: &str, max_words: usize) -> String {
    if max_words == 0 {
        return text.to_string();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        words[..max_words].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts_with_preamble(text: &str) -> bool {
        let lower = text.to_lowercase();
        ["image of", "photo of", "picture of"]
            .iter()
            .any(|p| lower.starts_with(p))
    }

    #[test]
    fn test_strips_preamble_and_quotes() {
        assert_eq!(
            sanitize_suggestion("  \"Image of a red bicycle\"  ", 20),
            "a red bicycle"
        );
        assert_eq!(sanitize_suggestion("PHOTO OF two cats", 20), "two cats");
        assert_eq!(sanitize_suggestion("'picture of' 'image of' dog", 20), "dog");
        assert_eq!(sanitize_suggestion("Image  of a kite", 20), "a kite");
    }

    #[test]
    fn test_keeps_words_starting_with_of() {
        assert_eq!(
            sanitize_suggestion("Photo officially unveiled at the museum", 20),
            "Photo officially unveiled at the museum"
        );
        assert_eq!(
            sanitize_suggestion("Picture offsets on a printing press", 20),
            "Picture offsets on a printing press"
        );
    }

    #[test]
    fn test_truncates_words() {
        let raw = "one two three four five six seven eight";
        assert_eq!(sanitize_suggestion(raw, 5), "one two three four five");
        assert_eq!(sanitize_suggestion(raw, 0), raw);
    }

    #[test]
    fn test_removes_urls() {
        assert_eq!(
            sanitize_suggestion("A chart https://example.com/chart.png of sales", 20),
            "A chart of sales"
        );
        assert_eq!(
            sanitize_suggestion("Logo (see HTTP://example.com)", 20),
            "Logo (see"
        );
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(sanitize_suggestion("", 20), "");
        assert_eq!(sanitize_suggestion("  \"\"  ", 20), "");
        assert_eq!(sanitize_suggestion("Image of", 20), "");
    }

    #[test]
    fn test_properties_over_samples() {
        let samples = [
            "Image of image of a boat",
            "\"Photo of\" https://x.y/z a harbor at dawn with many small fishing boats moored",
            "picture of: a map",
            "   ‘Image of a quoted thing’ ",
            "A long caption with a link http://a.b/c and then many many more words following it here",
            "https://only.example/url",
        ];
        for max_words in [5u32, 12, 60] {
            for raw in samples {
                let out = sanitize_suggestion(raw, max_words);
                assert!(!starts_with_preamble(&out), "{raw:?} -> {out:?}");
                assert!(!out.to_lowercase().contains("http://"), "{out:?}");
                assert!(!out.to_lowercase().contains("https://"), "{out:?}");
                assert!(out.split_whitespace().count() <= max_words as usize);
                assert_eq!(out, sanitize_suggestion(&out, max_words));
            }
        }
    }
}
