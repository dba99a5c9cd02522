use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for deciding which image references get downloaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFilterConfig {
    /// Regex patterns for absolute URLs to include (if empty, everything not excluded is included)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for absolute URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Reference filter that uses regex patterns to determine which images to download
#[derive(Debug, Default)]
pub struct ReferenceFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl ReferenceFilter {
    /// Create a new reference filter from configuration
    pub fn new(config: &ReferenceFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Trims a raw reference taken from markup, dropping it if nothing is left
    pub fn normalize_reference<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ::log::debug!("Skipping empty image reference");
            None
        } else {
            Some(trimmed)
        }
    }

    /// Determine if a resolved absolute URL should be downloaded
    pub fn should_download(&self, url: &str) -> bool {
        // Exclusions take precedence
        if self.exclude_regexes.iter().any(|r| r.is_match(url)) {
            ::log::debug!("Reference filter excluded: {}", url);
            return false;
        }

        // If include patterns are specified, at least one must match
        if !self.include_regexes.is_empty() && !self.include_regexes.iter().any(|r| r.is_match(url))
        {
            ::log::debug!("Reference filter found no include match for: {}", url);
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_accepts_everything() {
        let filter = ReferenceFilter::default();
        assert!(filter.should_download("https://example.com/image.jpg"));
        assert!(filter.should_download("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_normalize_reference() {
        let filter = ReferenceFilter::default();
        assert_eq!(filter.normalize_reference("  /a.png \n"), Some("/a.png"));
        assert_eq!(filter.normalize_reference("b.png"), Some("b.png"));
        assert_eq!(filter.normalize_reference(""), None);
        assert_eq!(filter.normalize_reference(" \t\n"), None);
    }

    #[test]
    fn test_regex_patterns() {
        let config = ReferenceFilterConfig {
            include_patterns: vec![r"\.(png|jpe?g)$".to_string()],
            exclude_patterns: vec![r"/tracking/".to_string()],
        };
        let filter = ReferenceFilter::new(&config).unwrap();

        // Matching include pattern should be allowed
        assert!(filter.should_download("https://example.com/photos/cat.jpg"));

        // Non-matching include pattern should be excluded
        assert!(!filter.should_download("https://example.com/anim.gif"));

        // Matching exclude pattern should be excluded even if it matches include
        assert!(!filter.should_download("https://example.com/tracking/pixel.png"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let config = ReferenceFilterConfig {
            include_patterns: vec![],
            exclude_patterns: vec!["(unclosed".to_string()],
        };
        assert!(ReferenceFilter::new(&config).is_err());
    }
}
