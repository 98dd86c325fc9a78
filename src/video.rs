//! Helpers for externally hosted video links.

use url::Url;

/// Extract the YouTube video id from a watch URL or a youtu.be short link.
///
/// Returns `None` for anything else, including YouTube URLs without an id.
pub fn youtube_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let id = match host {
        "youtube.com" | "m.youtube.com" if url.path() == "/watch" => url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())?,
        "youtu.be" => url.path_segments()?.next()?.to_string(),
        _ => return None,
    };

    (!id.is_empty()).then_some(id)
}

/// High-quality thumbnail for a YouTube link, if the URL is one.
pub fn youtube_thumbnail(raw: &str) -> Option<String> {
    youtube_video_id(raw).map(|id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_urls() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("https://m.youtube.com/watch?feature=share&v=abc123&t=10").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_short_links() {
        assert_eq!(
            youtube_video_id("https://youtu.be/xyz789?si=tracking").as_deref(),
            Some("xyz789")
        );
        assert_eq!(youtube_video_id("https://youtu.be/"), None);
    }

    #[test]
    fn test_other_urls_have_no_id() {
        assert_eq!(youtube_video_id("https://vimeo.com/12345"), None);
        assert_eq!(youtube_video_id("https://www.youtube.com/@SomeChannel"), None);
        assert_eq!(youtube_video_id("not a url"), None);
    }

    #[test]
    fn test_thumbnail() {
        assert_eq!(
            youtube_thumbnail("https://youtu.be/xyz789").as_deref(),
            Some("https://img.youtube.com/vi/xyz789/hqdefault.jpg")
        );
        assert_eq!(youtube_thumbnail("https://example.com/video.mp4"), None);
    }
}
