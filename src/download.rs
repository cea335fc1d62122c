//! # Download Filenames
//!
//! Exports are named `{base}-{style}-{date}`:
//!
//! | Text | Base |
//! |------|------|
//! | blank or the placeholder | `qr-code` |
//! | anything that parses as a URL | host, non-alphanumerics as `-` (empty for `mailto:` and other hostless URLs) |
//! | anything else | first 20 characters, non-alphanumerics as `-` |
//!
//! The date is the UTC calendar date, `YYYY-MM-DD`.

use chrono::NaiveDate;
use url::Url;

/// Replace every character outside `[A-Za-z0-9]` with `-`.
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Base name for `text`, before style and date are appended.
///
/// `placeholder` is the data rendered for blank input and `default_base`
/// the name used for it.
pub fn base_name(text: &str, placeholder: &str, default_base: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text == placeholder {
        return default_base.to_string();
    }

    match Url::parse(text) {
        Ok(url) => sanitize(url.host_str().unwrap_or_default()),
        Err(_) => {
            let prefix: String = text.chars().take(20).collect();
            sanitize(&prefix)
        }
    }
}

/// Full download name without extension.
pub fn file_name(
    text: &str,
    style: &str,
    date: NaiveDate,
    placeholder: &str,
    default_base: &str,
) -> String {
    format!(
        "{}-{}-{}",
        base_name(text, placeholder, default_base),
        style,
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_DATA;

    fn base(text: &str) -> String {
        base_name(text, PLACEHOLDER_DATA, "qr-code")
    }

    #[test]
    fn test_url_host() {
        assert_eq!(base("https://openai.com"), "openai-com");
        assert_eq!(base("http://sub.example.co.uk/path?q=1"), "sub-example-co-uk");
        assert_eq!(base("  https://openai.com/  "), "openai-com");
    }

    #[test]
    fn test_plain_text_prefix() {
        assert_eq!(base("hello world"), "hello-world");
        assert_eq!(base("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst");
        assert_eq!(base("café au lait!"), "caf--au-lait-");
    }

    #[test]
    fn test_hostless_url_has_empty_base() {
        assert_eq!(base("mailto:me@example.com"), "");
        assert_eq!(base("tel:+15551234"), "");

        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            file_name("mailto:me@example.com", "dots", date, PLACEHOLDER_DATA, "qr-code"),
            "-dots-2024-03-07"
        );
    }

    #[test]
    fn test_placeholder_and_blank() {
        assert_eq!(base(""), "qr-code");
        assert_eq!(base("   "), "qr-code");
        assert_eq!(base(PLACEHOLDER_DATA), "qr-code");
    }

    #[test]
    fn test_full_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            file_name("https://openai.com", "dots", date, PLACEHOLDER_DATA, "qr-code"),
            "openai-com-dots-2024-03-07"
        );
        assert_eq!(
            file_name("", "square", date, PLACEHOLDER_DATA, "qr-code"),
            "qr-code-square-2024-03-07"
        );
    }
}
