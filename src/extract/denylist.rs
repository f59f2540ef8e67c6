//! Hosts that never serve a candidate mirror.

/// Matched as the exact host or any subdomain of it.
const DENIED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "facebook.com",
    "fb.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "reddit.com",
    "wikipedia.org",
    "tiktok.com",
    "pinterest.com",
    "linkedin.com",
    "vimeo.com",
    "dailymotion.com",
    "telegram.org",
    "t.me",
    "quora.com",
];

/// Search engine brands, denied on every TLD (`google.co.in`, `bing.com`, ...).
const DENIED_BRANDS: &[&str] = &["google", "bing", "yahoo", "duckduckgo"];

/// True when `host` (already lowercase) belongs to a non-candidate domain.
pub fn is_denied_host(host: &str) -> bool {
    let host = host.trim_end_matches('.');

    if DENIED_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    {
        return true;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let Some((_tld, rest)) = labels.split_last() else {
        return false;
    };
    rest.iter().any(|label| DENIED_BRANDS.contains(label))
}
