//! Locale identifier grammar

use std::fmt;
use std::str::FromStr;

use crate::error::IdentError;

/// Validated locale identifier of the form `ll[_RR][@variant]`.
///
/// The language subtag is two lowercase letters, the optional region subtag
/// two uppercase letters, the optional variant tag 4-8 lowercase letters or
/// digits. Anything else is rejected at parse time, so a constructed value
/// is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId {
    language: String,
    region: Option<String>,
    variant: Option<String>,
}

impl LocaleId {
    /// Parses and validates an identifier.
    pub fn new(raw: &str) -> Result<Self, IdentError> {
        raw.parse()
    }

    /// Checks a raw string against the identifier grammar.
    pub fn is_valid(raw: &str) -> bool {
        raw.parse::<LocaleId>().is_ok()
    }

    /// Primary language subtag, e.g. `en`.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Region subtag, e.g. `US` in `en_US`.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Variant tag, e.g. `deva` in `sd@deva`.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl Default for LocaleId {
    /// The hard-coded `en` fallback locale.
    fn default() -> Self {
        LocaleId {
            language: "en".to_string(),
            region: None,
            variant: None,
        }
    }
}

impl FromStr for LocaleId {
    type Err = IdentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let reject = || IdentError::Invalid(raw.to_string());

        let (head, variant) = match raw.split_once('@') {
            Some((head, variant)) => (head, Some(variant)),
            None => (raw, None),
        };
        let (language, region) = match head.split_once('_') {
            Some((language, region)) => (language, Some(region)),
            None => (head, None),
        };

        if language.len() != 2 || !language.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(reject());
        }
        if let Some(region) = region {
            if region.len() != 2 || !region.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(reject());
            }
        }
        if let Some(variant) = variant {
            let tag_char = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
            if variant.len() < 4 || variant.len() > 8 || !variant.bytes().all(tag_char) {
                return Err(reject());
            }
        }

        Ok(LocaleId {
            language: language.to_string(),
            region: region.map(str::to_string),
            variant: variant.map(str::to_string),
        })
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.language)?;
        if let Some(region) = &self.region {
            write!(f, "_{}", region)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "@{}", variant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_identifiers() {
        for raw in ["en", "en_US", "en_US@variant1", "sd@deva", "zh_TW@hant2024"] {
            assert!(LocaleId::is_valid(raw), "{raw} should be valid");
        }
    }

    #[test]
    fn test_rejects_invalid_identifiers() {
        for raw in [
            "", "EN", "eng", "e", "en-US", "en_us", "en_USA", "en_US@abc", "en_US@toolongtag1",
            "en_US@UPPER", "en@", "_US", "en_US@var iant",
        ] {
            assert!(!LocaleId::is_valid(raw), "{raw} should be invalid");
        }
    }

    #[test]
    fn test_components() {
        let id = LocaleId::new("pt_BR@variant1").unwrap();
        assert_eq!(id.language(), "pt");
        assert_eq!(id.region(), Some("BR"));
        assert_eq!(id.variant(), Some("variant1"));
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["en", "en_US", "en_US@variant1"] {
            assert_eq!(LocaleId::new(raw).unwrap().to_string(), raw);
        }
    }
}
