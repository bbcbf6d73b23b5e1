//! Language-identity services for one locale
//!
//! Display names prefer the engine's own translations (`language.<ll>` and
//! `country.<RR>` keys), then the bundled ISO dataset, then the raw code.

use crate::bundle::Entry;
use crate::error::BundleError;
use crate::ident::LocaleId;
use crate::iso;
use crate::registry::Localizer;

/// How `display_name` renders the language name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    /// Only in the requested rendering locale.
    Without,
    /// In the requested rendering locale, then in the locale's own language.
    With,
    /// Only in the locale's own language.
    Only,
}

/// Separator between the two renderings in `NameMode::With`.
const NAME_SEPARATOR: &str = " / ";

/// Default coverage threshold for `is_complete`.
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 0.9;

/// Base set of right-to-left languages.
static RTL_LANGUAGES: &[&str] = &[
    "ar", "dv", "fa", "he", "ks", "ku", "ps", "sd", "ug", "ur", "yi",
];

/// Script and region combinations that override the base set. A `None`
/// component matches any value; the first matching row wins.
static DIRECTION_EXCEPTIONS: &[(&str, Option<&str>, Option<&str>, bool)] = &[
    // Sindhi in Devanagari script reads left to right
    ("sd", None, Some("deva"), false),
    ("az", None, Some("arab"), true),
    ("uz", None, Some("arab"), true),
    ("pa", Some("PK"), None, true),
    ("ku", Some("IQ"), None, true),
];

/// Identity view of one locale, backed by the engine for name lookups and
/// completeness scoring.
#[derive(Clone)]
pub struct LocaleMetadata {
    engine: Localizer,
    id: LocaleId,
}

impl LocaleMetadata {
    pub(crate) fn new(engine: Localizer, id: LocaleId) -> Self {
        LocaleMetadata { engine, id }
    }

    pub fn id(&self) -> &LocaleId {
        &self.id
    }

    /// 2-letter language code, `None` when the language subtag is not in
    /// the reference dataset.
    pub fn iso_alpha2(&self) -> Option<&str> {
        iso::is_known_language(self.id.language()).then(|| self.id.language())
    }

    /// 3-letter language code, `None` when unmapped.
    pub fn iso_alpha3(&self) -> Option<&'static str> {
        iso::alpha3_for(self.id.language())
    }

    /// Human-readable name of the locale. `in_locale` defaults to the
    /// hard-coded fallback locale. With `with_country` set and a region
    /// subtag present, the region name is appended in parentheses; in
    /// `NameMode::With` an identical pair of country renderings collapses
    /// to one.
    pub fn display_name(
        &self,
        in_locale: Option<&LocaleId>,
        with_country: bool,
        mode: NameMode,
    ) -> Result<String, BundleError> {
        let fallback_in = LocaleId::default();
        let in_locale = in_locale.unwrap_or(&fallback_in);

        let mut name = match mode {
            NameMode::Without => self.foreign_language_name(in_locale)?,
            NameMode::With => format!(
                "{}{}{}",
                self.foreign_language_name(in_locale)?,
                NAME_SEPARATOR,
                self.own_language_name()?
            ),
            NameMode::Only => self.own_language_name()?,
        };

        if with_country {
            if let Some(region) = self.id.region() {
                let country = match mode {
                    NameMode::Without => self.country_name(in_locale, region)?,
                    NameMode::With => {
                        let foreign = self.country_name(in_locale, region)?;
                        let own = self.country_name(&self.id, region)?;
                        if foreign == own {
                            foreign
                        } else {
                            format!("{foreign}{NAME_SEPARATOR}{own}")
                        }
                    }
                    NameMode::Only => self.country_name(&self.id, region)?,
                };
                name.push_str(" (");
                name.push_str(&country);
                name.push(')');
            }
        }
        Ok(name)
    }

    /// Whether the locale reads right to left. The exception table wins
    /// over the base language set.
    pub fn is_rtl(&self) -> bool {
        for (language, region, variant, rtl) in DIRECTION_EXCEPTIONS {
            if *language != self.id.language() {
                continue;
            }
            if region.is_some() && *region != self.id.region() {
                continue;
            }
            if variant.is_some() && *variant != self.id.variant() {
                continue;
            }
            return *rtl;
        }
        RTL_LANGUAGES.contains(&self.id.language())
    }

    /// Share of the reference locale's keys this locale covers. The own
    /// bundle is fetched uncached so scoring a foreign locale does not
    /// displace the serving cache. `reference` defaults to the hard-coded
    /// fallback locale.
    pub fn completeness_ratio(&self, reference: Option<&LocaleId>) -> Result<f64, BundleError> {
        let fallback_ref = LocaleId::default();
        let reference = reference.unwrap_or(&fallback_ref);

        let reference_bundle = self.engine.bundle(reference, true)?;
        let own = self.engine.bundle(&self.id, false)?;
        let hits = reference_bundle
            .keys()
            .filter(|key| own.get(key).is_some())
            .count();
        Ok((hits as f64 / reference_bundle.len().max(1) as f64).min(1.0))
    }

    /// Whether the coverage ratio meets `threshold` (default 0.9).
    pub fn is_complete(
        &self,
        threshold: Option<f64>,
        reference: Option<&LocaleId>,
    ) -> Result<bool, BundleError> {
        let threshold = threshold.unwrap_or(DEFAULT_COMPLETENESS_THRESHOLD);
        Ok(self.completeness_ratio(reference)? >= threshold)
    }

    fn own_language_name(&self) -> Result<String, BundleError> {
        let key = format!("language.{}", self.id.language());
        if let Some(name) = self.bundle_text(&self.id, &key)? {
            return Ok(name);
        }
        Ok(iso::native_name(self.id.language())
            .unwrap_or(self.id.language())
            .to_string())
    }

    fn foreign_language_name(&self, in_locale: &LocaleId) -> Result<String, BundleError> {
        let key = format!("language.{}", self.id.language());
        if let Some(name) = self.bundle_text(in_locale, &key)? {
            return Ok(name);
        }
        Ok(iso::english_name(self.id.language())
            .unwrap_or(self.id.language())
            .to_string())
    }

    fn country_name(&self, in_locale: &LocaleId, region: &str) -> Result<String, BundleError> {
        let key = format!("country.{}", region);
        if let Some(name) = self.bundle_text(in_locale, &key)? {
            return Ok(name);
        }
        Ok(iso::region_name(region).unwrap_or(region).to_string())
    }

    fn bundle_text(&self, locale: &LocaleId, key: &str) -> Result<Option<String>, BundleError> {
        let bundle = self.engine.bundle(locale, true)?;
        Ok(match bundle.get(key) {
            Some(Entry::Text(text)) => Some(text.clone()),
            _ => None,
        })
    }
}
