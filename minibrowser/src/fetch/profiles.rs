//! Browser identities applied to each fetch.

use rand::seq::SliceRandom;
use serde::Serialize;

/// A user agent together with its matching `Accept-Language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrowserProfile {
    /// Short profile name for logging.
    pub name: &'static str,
    /// `User-Agent` string.
    pub user_agent: &'static str,
    /// `Accept-Language` value.
    pub accept_language: &'static str,
}

/// The fixed profile table.
pub const BROWSER_PROFILES: &[BrowserProfile] = &[
    BrowserProfile {
        name: "chrome-windows",
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.9",
    },
    BrowserProfile {
        name: "chrome-macos",
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        accept_language: "en-GB,en;q=0.9",
    },
    BrowserProfile {
        name: "firefox-linux",
        user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
        accept_language: "en-US,en;q=0.5",
    },
    BrowserProfile {
        name: "safari-macos",
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
        accept_language: "en-US,en;q=0.9",
    },
    BrowserProfile {
        name: "safari-ios",
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
        accept_language: "en-US,en;q=0.9",
    },
    BrowserProfile {
        name: "chrome-android",
        user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
        accept_language: "de-DE,de;q=0.9,en;q=0.8",
    },
];

/// Picks a profile at random.
#[must_use]
pub fn random_profile() -> &'static BrowserProfile {
    BROWSER_PROFILES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&BROWSER_PROFILES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_profile_from_table() {
        for _ in 0..20 {
            let profile = random_profile();
            assert!(BROWSER_PROFILES.contains(profile));
        }
    }

    #[test]
    fn test_profiles_well_formed() {
        assert_eq!(BROWSER_PROFILES.len(), 6);
        for profile in BROWSER_PROFILES {
            assert!(profile.user_agent.starts_with("Mozilla/5.0"));
            assert!(!profile.accept_language.is_empty());
        }
    }
}
