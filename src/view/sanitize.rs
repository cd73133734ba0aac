//! HTML sanitization for API-provided descriptions and stories.
//!
//! Fragments are parsed as HTML and rebuilt from an allow-list of tags,
//! attributes and URL schemes, so obfuscated markup cannot slip through.

use ammonia::Builder;

/// Elements dropped together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style", "iframe", "object", "embed"];

fn cleaner() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .link_rel(None)
        .clean_content_tags(DROPPED_WITH_CONTENT.iter().copied().collect());
    builder
}

/// Strip executable content from an HTML fragment, keeping its formatting.
pub fn sanitize_html(html: &str) -> String {
    cleaner().clean(html).to_string()
}

/// Sanitize an optional fragment in place.
pub fn sanitize_opt(html: &mut Option<String>) {
    if let Some(value) = html.as_mut() {
        *value = sanitize_html(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_formatting() {
        let html = r#"<p>Shot from <a href="https://example.com/site">the dark site</a> at <em>3am</em>.</p>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_removes_scripts_and_styles() {
        let html = "<p>Hi</p><script>alert('x')</script><STYLE>p{}</STYLE><p>there</p>";
        assert_eq!(sanitize_html(html), "<p>Hi</p><p>there</p>");
    }

    #[test]
    fn test_removes_embedded_frames() {
        let html = r#"<p>Map</p><iframe src="https://x.example">fallback</iframe>"#;
        assert_eq!(sanitize_html(html), "<p>Map</p>");
    }

    #[test]
    fn test_removes_event_handlers() {
        let html = r#"<img src="a.jpg" onerror="alert(1)" alt="M31">"#;
        assert_eq!(sanitize_html(html), r#"<img src="a.jpg" alt="M31">"#);
    }

    #[test]
    fn test_split_tags_do_not_reassemble() {
        let out = sanitize_html("<scr<script>ipt>alert(1)</scr<script>ipt>");
        assert!(!out.to_ascii_lowercase().contains("<script"), "got {:?}", out);
    }

    #[test]
    fn test_slash_separated_handler_removed() {
        let out = sanitize_html("<svg/onload=alert(1)>");
        assert!(!out.contains("onload"), "got {:?}", out);
        assert!(!out.contains("<svg"), "got {:?}", out);
    }

    #[test]
    fn test_script_urls_removed() {
        for html in [
            r#"<a href="javascript:alert(1)">x</a>"#,
            r#"<a href='JavaScript:void(0)'>x</a>"#,
            r#"<a href="jav&#x61;script:alert(1)">x</a>"#,
            r#"<a href="&#106;avascript:alert(1)">x</a>"#,
        ] {
            assert_eq!(sanitize_html(html), "<a>x</a>", "input {:?}", html);
        }
    }

    #[test]
    fn test_sanitize_opt() {
        let mut story = Some("<p onclick=\"x()\">Vik</p>".to_string());
        sanitize_opt(&mut story);
        assert_eq!(story.as_deref(), Some("<p>Vik</p>"));

        let mut none: Option<String> = None;
        sanitize_opt(&mut none);
        assert!(none.is_none());
    }
}
