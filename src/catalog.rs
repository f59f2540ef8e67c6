//! Built-in site profiles.
//!
//! A profile is static metadata for one logical site: the search queries used
//! to discover it and the pattern its hostnames follow. Names missing from the
//! catalog get a synthesized profile derived from the name itself.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Static metadata for a logical site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Stable lowercase identifier, e.g. `movierulz`
    pub name: String,
    pub display_name: String,
    /// Search queries, in the order they are tried
    pub query_aliases: Vec<String>,
    /// Matched against the host component of candidate URLs
    pub domain_pattern: Regex,
}

/// Serializable summary of a profile for the supported-sites listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub display_name: String,
    pub query_aliases: Vec<String>,
    pub domain_pattern: String,
}

impl SiteProfile {
    fn builtin(name: &str, display_name: &str, aliases: &[&str], pattern: &str) -> Self {
        SiteProfile {
            name: name.to_string(),
            display_name: display_name.to_string(),
            query_aliases: aliases.iter().map(|a| a.to_string()).collect(),
            domain_pattern: Regex::new(pattern).expect("built-in domain pattern is valid"),
        }
    }

    /// Profile for a name with no catalog entry.
    ///
    /// Aliases are `[name, name.com, name latest]`; the pattern matches
    /// `<name>.<2-6 letter tld>` on a word boundary.
    pub fn synthesized(name: &str) -> Result<Self, regex::Error> {
        let name = name.trim().to_lowercase();
        let domain_pattern = Regex::new(&format!(
            r"(?i)\b{}\.[a-z]{{2,6}}\b",
            regex::escape(&name)
        ))?;
        Ok(SiteProfile {
            display_name: name.clone(),
            query_aliases: vec![
                name.clone(),
                format!("{name}.com"),
                format!("{name} latest"),
            ],
            domain_pattern,
            name,
        })
    }

    /// True when `host` belongs to this site.
    pub fn matches_host(&self, host: &str) -> bool {
        self.domain_pattern.is_match(host)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            query_aliases: self.query_aliases.clone(),
            domain_pattern: self.domain_pattern.as_str().to_string(),
        }
    }
}

/// The set of known site profiles, keyed by lowercase name.
#[derive(Debug, Clone)]
pub struct SiteCatalog {
    profiles: Vec<SiteProfile>,
}

static BUILTIN_CATALOG: LazyLock<SiteCatalog> = LazyLock::new(|| SiteCatalog {
    profiles: vec![
        SiteProfile::builtin(
            "movierulz",
            "Movierulz",
            &[
                "movierulz",
                "movie rulz",
                "movierulz.com",
                "movierulz.in",
                "movierulz.tv",
                "movierulz.ms",
                "movierulz.pl",
                "movierulz latest",
                "movierulz new domain",
                "movierulz working link",
            ],
            r"(?i)(?:^|\.)\d*movierulz\d*\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "moviezap",
            "Moviezap",
            &[
                "moviezap",
                "movie zap",
                "moviezap.com",
                "moviezap.in",
                "moviezap.org",
                "moviezap.net",
                "moviezap.co",
                "moviezap latest",
                "moviezap new domain",
                "moviezap working link",
            ],
            r"(?i)(?:^|\.)moviezap\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "tamilrockers",
            "TamilRockers",
            &["tamilrockers", "tamilrockers latest", "tamilrockers new domain"],
            r"(?i)(?:^|\.)tamilrockers\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "filmywap",
            "Filmywap",
            &["filmywap", "filmywap latest", "filmywap new domain"],
            r"(?i)(?:^|\.)filmywap\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "worldfree4u",
            "Worldfree4u",
            &["worldfree4u", "worldfree4u latest", "worldfree4u new domain"],
            r"(?i)(?:^|\.)worldfree4u\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "9xmovies",
            "9xMovies",
            &["9xmovies", "9xmovies latest", "9xmovies new domain"],
            r"(?i)(?:^|\.)9xmovies\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "khatrimaza",
            "Khatrimaza",
            &["khatrimaza", "khatrimaza latest", "khatrimaza new domain"],
            r"(?i)(?:^|\.)\d*khatrimaza\.[a-z]{2,6}$",
        ),
        SiteProfile::builtin(
            "bolly4u",
            "Bolly4u",
            &["bolly4u", "bolly4u latest", "bolly4u new domain"],
            r"(?i)(?:^|\.)bolly4u\.[a-z]{2,6}$",
        ),
    ],
});

impl SiteCatalog {
    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    /// A catalog with exactly the given profiles.
    pub fn from_profiles(profiles: Vec<SiteProfile>) -> Self {
        SiteCatalog { profiles }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&SiteProfile> {
        let name = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The catalog profile for `name`, or a synthesized one.
    pub fn profile_for(&self, name: &str) -> Result<SiteProfile, regex::Error> {
        match self.get(name) {
            Some(profile) => Ok(profile.clone()),
            None => SiteProfile::synthesized(name),
        }
    }

    pub fn profiles(&self) -> &[SiteProfile] {
        &self.profiles
    }
}

impl Default for SiteCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
