use url::Url;

use crate::errors::UnfurlError;

/// Query marker that opts a shared link out of previews.
pub const NO_UNFURL_MARKER: &str = "no_unfurl";

/// Parse a URL as delivered in a `link_shared` event.
///
/// Slack sometimes escapes characters with backslashes; those are dropped
/// before parsing.
///
/// # Errors
///
/// Returns `UnfurlError::ParseError` if the cleaned string is not a URL.
pub fn parse_shared_url(raw: &str) -> Result<Url, UnfurlError> {
    let cleaned = raw.trim().replace('\\', "");
    Ok(Url::parse(&cleaned)?)
}

/// Whether the sender asked for no preview, e.g. `…/issues/6?no_unfurl`.
#[must_use]
pub fn is_unfurl_suppressed(url: &Url) -> bool {
    url.query()
        .is_some_and(|query| query.contains(NO_UNFURL_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_backslash_escapes() {
        let url = parse_shared_url(r"https://gitlab.example.com/kiwi/com/issues/37\#note_1").unwrap();
        assert_eq!(url.path(), "/kiwi/com/issues/37");
        assert_eq!(url.fragment(), Some("note_1"));
    }

    #[test]
    fn detects_no_unfurl_marker() {
        let suppressed = [
            "https://gitlab.example.com/a/b/issues/1?no_unfurl",
            "https://gitlab.example.com/a/b/issues/1?no_unfurl=1",
            "https://gitlab.example.com/a/b/issues/1?tab=x&no_unfurl",
        ];
        for raw in suppressed {
            assert!(is_unfurl_suppressed(&parse_shared_url(raw).unwrap()), "{raw}");
        }

        let kept = [
            "https://gitlab.example.com/a/b/issues/1",
            "https://gitlab.example.com/a/b/issues/1?tab=notes",
            "https://gitlab.example.com/a/b/issues/1#no_unfurl",
        ];
        for raw in kept {
            assert!(!is_unfurl_suppressed(&parse_shared_url(raw).unwrap()), "{raw}");
        }
    }

    #[test]
    fn rejects_non_urls() {
        assert!(parse_shared_url("not a url").is_err());
    }
}
