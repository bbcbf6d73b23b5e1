//! ISO-639 code conversion table
//!
//! The reference dataset is bundled into the binary and parsed exactly once.
//! Lookups that have no mapping return `None` rather than an error, since
//! callers routinely probe for optional identity data.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

static ISO639_DATA: &str = include_str!("../data/iso639.ron");
static REGION_DATA: &str = include_str!("../data/regions.ron");

#[derive(Debug, Deserialize)]
struct IsoRecord {
    alpha2: String,
    alpha3: String,
    name: String,
    native: String,
}

struct Table {
    by_alpha2: HashMap<String, IsoRecord>,
    alpha2_by_alpha3: HashMap<String, String>,
    regions: HashMap<String, String>,
}

static TABLE: Lazy<Table> = Lazy::new(|| {
    let records: Vec<IsoRecord> =
        ron::from_str(ISO639_DATA).expect("bundled ISO-639 dataset must parse");
    let regions: Vec<(String, String)> =
        ron::from_str(REGION_DATA).expect("bundled region dataset must parse");

    let mut by_alpha2 = HashMap::new();
    let mut alpha2_by_alpha3 = HashMap::new();
    for record in records {
        alpha2_by_alpha3.insert(record.alpha3.clone(), record.alpha2.clone());
        by_alpha2.insert(record.alpha2.clone(), record);
    }

    Table {
        by_alpha2,
        alpha2_by_alpha3,
        regions: regions.into_iter().collect(),
    }
});

/// 3-letter code for a 2-letter language code.
pub fn alpha3_for(alpha2: &str) -> Option<&'static str> {
    TABLE.by_alpha2.get(alpha2).map(|r| r.alpha3.as_str())
}

/// 2-letter code for a 3-letter language code.
pub fn alpha2_for(alpha3: &str) -> Option<&'static str> {
    TABLE.alpha2_by_alpha3.get(alpha3).map(|s| s.as_str())
}

/// English name of a language, by 2-letter code.
pub fn english_name(alpha2: &str) -> Option<&'static str> {
    TABLE.by_alpha2.get(alpha2).map(|r| r.name.as_str())
}

/// Name of a language in the language itself, by 2-letter code.
pub fn native_name(alpha2: &str) -> Option<&'static str> {
    TABLE.by_alpha2.get(alpha2).map(|r| r.native.as_str())
}

/// English short name of a region, by ISO-3166 alpha-2 code.
pub fn region_name(code: &str) -> Option<&'static str> {
    TABLE.regions.get(code).map(|s| s.as_str())
}

/// Whether the 2-letter code is in the reference dataset.
pub fn is_known_language(alpha2: &str) -> bool {
    TABLE.by_alpha2.contains_key(alpha2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_lookups_are_bidirectional() {
        assert_eq!(alpha3_for("en"), Some("eng"));
        assert_eq!(alpha2_for("eng"), Some("en"));
        assert_eq!(alpha3_for("de"), Some("deu"));
        assert_eq!(alpha2_for("deu"), Some("de"));
    }

    #[test]
    fn test_unknown_codes_are_not_found() {
        assert_eq!(alpha3_for("xx"), None);
        assert_eq!(alpha2_for("xxx"), None);
        assert_eq!(region_name("XX"), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(english_name("de"), Some("German"));
        assert_eq!(native_name("de"), Some("Deutsch"));
        assert_eq!(region_name("US"), Some("United States"));
    }
}
