use url::Url;

/// Returns `url` with a trailing slash on its path, so relative joins append
/// instead of replacing the last path segment.
pub fn ensure_trailing_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        return url.clone();
    }
    let mut slashed = url.clone();
    slashed.set_path(&format!("{}/", url.path()));
    slashed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ensure_trailing_slash() {
        let base = Url::parse("https://connect.example.com/content/abc123").unwrap();
        assert_eq!(ensure_trailing_slash(&base).as_str(), "https://connect.example.com/content/abc123/");

        let slashed = Url::parse("https://connect.example.com/content/abc123/").unwrap();
        assert_eq!(ensure_trailing_slash(&slashed), slashed);
    }
}
