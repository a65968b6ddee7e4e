//! Joining the configured API root with Gemini method paths.

/// Strips trailing slashes so a configured base URL joins cleanly.
///
/// ```
/// use genui_chat::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Appends `endpoint` to `base_url` with exactly one slash between them.
///
/// ```
/// use genui_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://proxy.test/v1beta/", "/models/gemini-2.5-flash:generateContent"),
///     "https://proxy.test/v1beta/models/gemini-2.5-flash:generateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_removed() {
        assert_eq!(normalize_base_url("https://a.test/v1beta///"), "https://a.test/v1beta");
        assert_eq!(normalize_base_url("https://a.test"), "https://a.test");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn method_paths_join_with_one_slash() {
        let expected = "https://a.test/v1beta/models/m:streamGenerateContent?alt=sse";
        for (base, endpoint) in [
            ("https://a.test/v1beta", "models/m:streamGenerateContent?alt=sse"),
            ("https://a.test/v1beta/", "models/m:streamGenerateContent?alt=sse"),
            ("https://a.test/v1beta//", "//models/m:streamGenerateContent?alt=sse"),
        ] {
            assert_eq!(construct_api_url(base, endpoint), expected);
        }
    }
}
