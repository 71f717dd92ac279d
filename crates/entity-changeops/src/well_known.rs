//! Well-known language codes and site ids.
//!
//! Used as defaults when no explicit registry is configured.

use std::collections::BTreeSet;

lazy_static::lazy_static! {
    /// Language codes accepted for terms when none are configured.
    pub static ref DEFAULT_LANGUAGE_CODES: BTreeSet<&'static str> = [
        "ar", "de", "de-ch", "en", "en-gb", "es", "fa", "fr", "he", "hi", "it", "ja",
        "ko", "nl", "pl", "pt", "pt-br", "ru", "sv", "tr", "uk", "zh", "zh-hans",
        "zh-hant",
    ]
    .into_iter()
    .collect();

    /// Site ids accepted for site links when none are configured.
    pub static ref DEFAULT_SITE_IDS: BTreeSet<&'static str> = [
        "arwiki", "dewiki", "enwiki", "eswiki", "frwiki", "itwiki", "jawiki", "nlwiki",
        "plwiki", "ptwiki", "ruwiki", "svwiki", "zhwiki", "enwikivoyage", "commonswiki",
    ]
    .into_iter()
    .collect();
}

/// Returns true if `code` is one of the default language codes.
pub fn is_default_language(code: &str) -> bool {
    DEFAULT_LANGUAGE_CODES.contains(code)
}

/// Returns true if `site_id` is one of the default site ids.
pub fn is_default_site(site_id: &str) -> bool {
    DEFAULT_SITE_IDS.contains(site_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_languages() {
        assert!(is_default_language("en"));
        assert!(is_default_language("de"));
        assert!(!is_default_language("xx-invalid"));
    }

    #[test]
    fn test_default_sites() {
        assert!(is_default_site("enwiki"));
        assert!(is_default_site("plwiki"));
        assert!(!is_default_site("nosuchwiki"));
    }
}
