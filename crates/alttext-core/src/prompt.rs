//! Prompt rendering.
//!
//! The prompt shape is stable: preview tooling and audit logs compare prompts
//! line by line, so the order below must not change.

use crate::config::PromptConfig;
use crate::types::SubjectContext;

const PLACEHOLDER: &str = "N/A";

const VERBATIM_TEXT_RULE: &str = "If on-image text is visible, copy the exact words verbatim into the alt text \
(including headings, labels, CTAs, and prominent body copy). If multiple fragments are visible, \
include them all; if none, state that no on-image text was detected.";

const CONCISE_TEXT_RULE: &str =
    "If on-image text is visible and relevant, include the key wording concisely in the alt text.";

/// Renders a [`SubjectContext`] into an instruction-following prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// The instruction block: decision tree, decorative rule, length rule,
    /// on-image text rule, anti-repetition rule, tone, and custom instructions
    /// when there are any.
    pub fn instructions(&self, config: &PromptConfig) -> Vec<String> {
        let mut lines = vec![
            "You are an assistant that writes concise, accessible alt text that follows the W3C alt decision tree."
                .to_string(),
            "If the image appears purely decorative or conveys no meaningful info, return an empty string."
                .to_string(),
            format!(
                "Otherwise, describe the image’s purpose in page context in one sentence, no more than {} words.",
                config.max_words
            ),
            if config.force_verbatim_text {
                VERBATIM_TEXT_RULE.to_string()
            } else {
                CONCISE_TEXT_RULE.to_string()
            },
            "Do not start with \"Image of\" or similar, and do not repeat file names, URLs, or camera metadata."
                .to_string(),
            format!("Use a {} tone.", config.tone.trim()),
        ];

        let custom = config.custom_instructions.trim();
        if !custom.is_empty() {
            lines.push(format!("Custom instructions: {custom}"));
        }

        lines
    }

    /// Render the full prompt for one subject.
    pub fn build(&self, context: &SubjectContext, config: &PromptConfig) -> String {
        let mut lines = self.instructions(config);

        let parent_line = match &context.parent {
            Some(parent) => format!(
                "Related content ({}): {}. Summary: {}.",
                parent.post_type, parent.title, parent.excerpt
            ),
            None => "No related post context was provided.".to_string(),
        };

        lines.push(String::new());
        lines.push("Attachment data:".to_string());
        lines.push(format!("Title: {}", or_placeholder(&context.title)));
        lines.push(format!("Caption: {}", or_placeholder(&context.caption)));
        lines.push(format!(
            "Description: {}",
            or_placeholder(&context.description)
        ));
        lines.push(format!(
            "Existing alt (if any): {}",
            or_placeholder(&context.existing_alt)
        ));
        lines.push(format!("File name: {}", or_placeholder(&context.file_name)));
        lines.push(format!("Mime type: {}", or_placeholder(&context.mime_type)));
        lines.push(parent_line);
        lines.push("If an image is provided, use it to improve accuracy.".to_string());

        lines.join("\n")
    }
}

fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        PLACEHOLDER
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParentSummary;

    fn sunset() -> SubjectContext {
        SubjectContext {
            attachment_id: 7,
            title: "Sunset over bay".into(),
            file_name: "sunset.jpg".into(),
            short_file_name: "sunset".into(),
            mime_type: "image/jpeg".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sunset_prompt_shape() {
        let prompt = PromptBuilder::new().build(&sunset(), &PromptConfig::default());
        let lines: Vec<&str> = prompt.lines().collect();

        // Six instruction lines, blank separator, then the data block
        assert!(lines[0].contains("W3C alt decision tree"));
        assert!(lines[1].contains("purely decorative"));
        assert!(lines[2].ends_with("no more than 20 words."));
        assert_eq!(lines[3], CONCISE_TEXT_RULE);
        assert!(lines[4].starts_with("Do not start with \"Image of\""));
        assert_eq!(lines[5], "Use a neutral and descriptive tone.");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Attachment data:");
        assert_eq!(lines[8], "Title: Sunset over bay");
        assert_eq!(lines[9], "Caption: N/A");
        assert_eq!(lines[10], "Description: N/A");
        assert_eq!(lines[11], "Existing alt (if any): N/A");
        assert_eq!(lines[12], "File name: sunset.jpg");
        assert_eq!(lines[13], "Mime type: image/jpeg");
        assert_eq!(lines[14], "No related post context was provided.");
        assert_eq!(
            lines[15],
            "If an image is provided, use it to improve accuracy."
        );
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        let config = PromptConfig {
            custom_instructions: "Mention the product name.".into(),
            ..Default::default()
        };
        assert_eq!(
            builder.build(&sunset(), &config),
            builder.build(&sunset(), &config)
        );
    }

    #[test]
    fn test_verbatim_and_custom_lines() {
        let config = PromptConfig {
            max_words: 12,
            tone: "playful".into(),
            custom_instructions: "  Avoid brand names. ".into(),
            force_verbatim_text: true,
        };
        let lines = PromptBuilder::new().instructions(&config);
        assert_eq!(lines.len(), 7);
        assert!(lines[2].contains("no more than 12 words"));
        assert_eq!(lines[3], VERBATIM_TEXT_RULE);
        assert_eq!(lines[5], "Use a playful tone.");
        assert_eq!(lines[6], "Custom instructions: Avoid brand names.");
    }

    #[test]
    fn test_parent_summary_line() {
        let mut context = sunset();
        context.parent = Some(ParentSummary {
            id: 3,
            post_type: "post".into(),
            title: "Summer recap".into(),
            excerpt: "Highlights from the season".into(),
            permalink: "https://example.com/summer".into(),
        });
        let prompt = PromptBuilder::new().build(&context, &PromptConfig::default());
        assert!(prompt.contains(
            "Related content (post): Summer recap. Summary: Highlights from the season."
        ));
        assert!(!prompt.contains("No related post context"));
    }
}
