//! Subject context assembly.

use crate::library::Attachment;
use crate::types::{ParentSummary, SubjectContext};
use std::path::Path;

/// Build the context of one suggestion request.
pub fn build_context(attachment: &Attachment, parent: Option<ParentSummary>) -> SubjectContext {
    let file_name = file_name(attachment);
    let short_file_name = Path::new(&file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    SubjectContext {
        attachment_id: attachment.id,
        title: attachment.title.trim().to_string(),
        caption: attachment.caption.trim().to_string(),
        description: attachment.description.trim().to_string(),
        existing_alt: attachment.alt_text.trim().to_string(),
        file_name,
        short_file_name,
        mime_type: attachment.mime_type.clone(),
        public_url: attachment
            .url
            .as_ref()
            .filter(|u| !u.trim().is_empty())
            .cloned(),
        local_file_path: attachment.file_path.clone(),
        parent,
    }
}

/// Base name of the stored file, falling back to the last URL path segment.
fn file_name(attachment: &Attachment) -> String {
    if let Some(name) = attachment.file_path.as_deref().and_then(Path::file_name) {
        return name.to_string_lossy().into_owned();
    }

    let Some(raw) = attachment.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return String::new();
    };
    match url::Url::parse(raw) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => raw.rsplit('/').next().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn attachment() -> Attachment {
        Attachment {
            id: 7,
            post_type: "attachment".into(),
            title: " Sunset over bay ".into(),
            mime_type: "image/jpeg".into(),
            url: Some("https://example.com/uploads/2024/sunset-bay.jpg?ver=2".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_name_from_path() {
        let mut a = attachment();
        a.file_path = Some(PathBuf::from("/srv/media/harbor.final.png"));
        let ctx = build_context(&a, None);
        assert_eq!(ctx.file_name, "harbor.final.png");
        assert_eq!(ctx.short_file_name, "harbor.final");
        assert_eq!(ctx.title, "Sunset over bay");
    }

    #[test]
    fn test_file_name_from_url() {
        let ctx = build_context(&attachment(), None);
        assert_eq!(ctx.file_name, "sunset-bay.jpg");
        assert_eq!(ctx.short_file_name, "sunset-bay");
        assert_eq!(
            ctx.public_url.as_deref(),
            Some("https://example.com/uploads/2024/sunset-bay.jpg?ver=2")
        );
    }

    #[test]
    fn test_missing_sources() {
        let mut a = attachment();
        a.url = Some("   ".into());
        let ctx = build_context(&a, None);
        assert!(ctx.public_url.is_none());
        assert_eq!(ctx.file_name, "");
        assert_eq!(ctx.short_file_name, "");
    }
}
