use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&]+)")
            .expect("watch URL pattern is valid"),
        Regex::new(r"(?:https?://)?(?:www\.)?youtu\.be/([^?]+)")
            .expect("short URL pattern is valid"),
    ]
});

/// Pulls the video ID out of a `youtube.com/watch?v=` or `youtu.be/` URL.
///
/// Patterns are tried in order and the first match wins.
pub fn extract_video_id(url: &str) -> Option<String> {
    URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn short_url_stops_at_query() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=30"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn watch_url_stops_at_next_param() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn scheme_and_www_are_optional() {
        assert_eq!(
            extract_video_id("youtube.com/watch?v=xyz"),
            Some("xyz".to_string())
        );
        assert_eq!(extract_video_id("youtu.be/xyz"), Some("xyz".to_string()));
    }

    #[test]
    fn non_matching_input() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(
            extract_video_id("https://www.youtube.com/playlist?list=PLrAXtmRdnEQy"),
            None
        );
        assert_eq!(extract_video_id("https://youtu.be/"), None);
    }
}
