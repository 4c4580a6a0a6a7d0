// URL normalization

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Whitespace plus the zero-width characters scraped titles and links tend to carry.
static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s\u{200B}-\u{200D}\u{FEFF}]+").expect("invisible-character pattern compiles")
});

/// The pieces of a URL this crate cares about. Query and fragment are dropped
/// during splitting.
#[derive(Debug, PartialEq, Eq)]
struct UrlParts<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
}

/// Canonicalizes a scraped URL.
///
/// Returns an empty string when the value is absent, is not an `http`/`https`
/// URL, or has no host. Otherwise the result is lowercase, percent-decoded,
/// free of whitespace and zero-width characters, has no leading `www.`, no
/// trailing `/`, and no query or fragment.
///
/// Normalizing an already-normalized URL returns it unchanged.
pub fn normalize_url(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if has_broken_scheme(raw) {
        return String::new();
    }

    let cleaned = decode_and_strip(raw).to_lowercase();
    let Some(parts) = split_url(&cleaned) else {
        return String::new();
    };
    if parts.scheme != "http" && parts.scheme != "https" {
        return String::new();
    }

    let mut host = parts.authority;
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    if host.is_empty() {
        return String::new();
    }

    let path = parts.path.trim_end_matches('/');
    format!("{}://{}{}", parts.scheme, host, path)
}

/// True when the scheme, before any cleanup, has whitespace or a zero-width
/// character inside it (`ht tp://`, `https ://`). Surrounding padding is fine.
fn has_broken_scheme(raw: &str) -> bool {
    let trimmed = raw.trim_matches(is_invisible);
    trimmed
        .find(':')
        .is_some_and(|colon| trimmed[..colon].chars().any(is_invisible))
}

// Same character class as `INVISIBLE`.
fn is_invisible(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Percent-decodes and removes invisible characters until neither changes the
/// string. Doing both to a fixed point keeps escapes such as `%2520` or a
/// `%2` split by a zero-width space from surviving into the output.
fn decode_and_strip(raw: &str) -> String {
    let mut current = INVISIBLE.replace_all(raw, "").into_owned();
    loop {
        let decoded = percent_decode_str(&current).decode_utf8_lossy();
        let next = INVISIBLE.replace_all(&decoded, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Splits `scheme://authority/path?query#fragment`. Returns `None` when there
/// is no scheme or no `//` authority marker.
fn split_url(url: &str) -> Option<UrlParts<'_>> {
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }

    let rest = url[colon + 1..].strip_prefix("//")?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    let tail = &rest[authority_end..];
    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());

    Some(UrlParts {
        scheme,
        authority,
        path: &tail[..path_end],
    })
}
