//! Message sanitization

/// Where a value is going to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityContext {
    None,
    Html,
    Style,
    Script,
    Url,
    ResourceUrl,
}

/// Neutralizes untrusted text for a rendering context.
///
/// `None` means the value cannot be made safe for that context.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, context: SecurityContext, value: &str) -> Option<String>;
}

/// URL schemes that are passed through unchanged
const SAFE_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "ftp", "tel", "file", "sms", "data"];

/// Default sanitizer: whitelist HTML cleaning and URL scheme checks
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self
    }

    fn sanitize_url(value: &str) -> String {
        let value = value.trim();
        // A scheme is whatever precedes the first ':' when no '/', '?' or '#' comes before it
        let scheme = value
            .find(|c: char| matches!(c, ':' | '/' | '?' | '#'))
            .filter(|&idx| value[idx..].starts_with(':'))
            .map(|idx| value[..idx].to_ascii_lowercase());

        match scheme {
            Some(scheme) if !SAFE_URL_SCHEMES.contains(&scheme.as_str()) => {
                tracing::warn!("Unsafe URL value sanitized: {}", value);
                format!("unsafe:{}", value)
            }
            _ => value.to_string(),
        }
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, context: SecurityContext, value: &str) -> Option<String> {
        match context {
            SecurityContext::None | SecurityContext::Style => Some(value.to_string()),
            SecurityContext::Html => Some(ammonia::clean(value)),
            SecurityContext::Url => Some(Self::sanitize_url(value)),
            SecurityContext::Script | SecurityContext::ResourceUrl => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        let sanitizer = HtmlSanitizer::new();
        assert_eq!(sanitizer.sanitize(SecurityContext::Html, "Hello").as_deref(), Some("Hello"));
        assert_eq!(sanitizer.sanitize(SecurityContext::Html, "").as_deref(), Some(""));
    }

    #[test]
    fn test_script_removed() {
        let sanitizer = HtmlSanitizer::new();
        let clean = sanitizer
            .sanitize(SecurityContext::Html, "<script>alert('x')</script>Saved")
            .unwrap();
        assert_eq!(clean, "Saved");
    }

    #[test]
    fn test_safe_markup_kept() {
        let sanitizer = HtmlSanitizer::new();
        let clean = sanitizer
            .sanitize(SecurityContext::Html, "<strong>Dealer</strong> saved")
            .unwrap();
        assert_eq!(clean, "<strong>Dealer</strong> saved");
    }

    #[test]
    fn test_event_handler_attributes_stripped() {
        let sanitizer = HtmlSanitizer::new();
        let clean = sanitizer
            .sanitize(SecurityContext::Html, "<b onclick=\"steal()\">hi</b>")
            .unwrap();
        assert!(!clean.contains("onclick"));
        assert!(clean.contains("hi"));
    }

    #[test]
    fn test_urls() {
        let sanitizer = HtmlSanitizer::new();
        assert_eq!(
            sanitizer.sanitize(SecurityContext::Url, "https://example.com/a?b").as_deref(),
            Some("https://example.com/a?b")
        );
        assert_eq!(
            sanitizer.sanitize(SecurityContext::Url, "/dealers/1:edit").as_deref(),
            Some("/dealers/1:edit")
        );
        assert_eq!(
            sanitizer.sanitize(SecurityContext::Url, "javascript:alert(1)").as_deref(),
            Some("unsafe:javascript:alert(1)")
        );
    }

    #[test]
    fn test_unsanitizable_contexts() {
        let sanitizer = HtmlSanitizer::new();
        assert!(sanitizer.sanitize(SecurityContext::Script, "1 + 1").is_none());
        assert!(sanitizer.sanitize(SecurityContext::ResourceUrl, "https://cdn").is_none());
        assert_eq!(sanitizer.sanitize(SecurityContext::None, "<b>").as_deref(), Some("<b>"));
    }
}
