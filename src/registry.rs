//! Engine handle and per-execution locale resolution
//!
//! `Localizer` owns the process-wide state: sources, loaders, caches and
//! handler registrations. `Session` scopes the resolved current locale to
//! one execution (one request, one CLI invocation) so concurrent operations
//! never observe each other's locale.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::bundle::{Assembler, Bundle, Loader};
use crate::context::{EnvironmentAdapter, NullEnvironment, RequestContext};
use crate::error::BundleError;
use crate::ident::LocaleId;
use crate::iso;
use crate::metadata::LocaleMetadata;
use crate::translator::{MissHook, MissingKeyHandler, Translator};

/// Hard-coded last-resort locale, used when the context supplies no usable
/// primary locale.
pub const DEFAULT_LOCALE: &str = "en";

struct Shared {
    translator: Translator,
    env: Arc<dyn EnvironmentAdapter>,
}

/// Shared engine handle. Cheap to clone; all clones see the same sources,
/// loaders and caches.
#[derive(Clone)]
pub struct Localizer {
    shared: Arc<Shared>,
}

impl Localizer {
    pub fn new() -> Self {
        Self::with_environment(Arc::new(NullEnvironment))
    }

    /// Engine whose sessions apply `env` on every locale change.
    pub fn with_environment(env: Arc<dyn EnvironmentAdapter>) -> Self {
        Localizer {
            shared: Arc::new(Shared {
                translator: Translator::new(Assembler::new()),
                env,
            }),
        }
    }

    pub fn register_source(&self, dir: &Path, priority: i32) {
        self.shared.translator.assembler().register_source(dir, priority);
    }

    pub fn register_loader(&self, loader: Loader, priority: i32) {
        self.shared.translator.assembler().register_loader(loader, priority);
    }

    pub fn set_missing_key_handler(&self, handler: Option<MissingKeyHandler>) {
        self.shared.translator.set_missing_key_handler(handler);
    }

    pub fn add_miss_hook(&self, hook: MissHook) {
        self.shared.translator.add_miss_hook(hook);
    }

    /// Drops every cached bundle and directory scan.
    pub fn invalidate_all(&self) {
        self.shared.translator.assembler().invalidate();
    }

    /// Locales discovered across all registered sources, ordered by source
    /// priority and deduplicated.
    pub fn available_locales(&self) -> Vec<LocaleId> {
        self.shared.translator.assembler().available_locales()
    }

    pub fn bundle(&self, locale: &LocaleId, use_cache: bool) -> Result<Arc<Bundle>, BundleError> {
        self.shared.translator.assembler().bundle(locale, use_cache)
    }

    /// Metadata for a raw identifier, `None` when it fails the grammar.
    pub fn metadata(&self, raw: &str) -> Option<LocaleMetadata> {
        let id: LocaleId = raw.parse().ok()?;
        Some(LocaleMetadata::new(self.clone(), id))
    }

    pub fn translate_in(
        &self,
        locale: &LocaleId,
        key: &str,
        count: Option<i64>,
        params: &[(&str, String)],
    ) -> Result<String, BundleError> {
        self.shared.translator.translate(locale, key, count, params)
    }

    /// Opens an execution scope bound to `ctx`.
    pub fn session(&self, ctx: Arc<dyn RequestContext>) -> Session {
        Session {
            engine: self.clone(),
            ctx,
            current: RwLock::new(None),
        }
    }

    /// Coverage of every available locale against the reference vocabulary.
    /// Foreign bundles are fetched uncached so the report does not displace
    /// the serving cache.
    pub fn completeness_report(
        &self,
        reference: &LocaleId,
    ) -> Result<Vec<CompletenessEntry>, BundleError> {
        let reference_bundle = self.bundle(reference, true)?;
        let mut report = Vec::new();
        for locale in self.available_locales() {
            let bundle = if locale == *reference {
                Arc::clone(&reference_bundle)
            } else {
                self.bundle(&locale, false)?
            };
            let hits = reference_bundle
                .keys()
                .filter(|key| bundle.get(key).is_some())
                .count();
            let ratio = (hits as f64 / reference_bundle.len().max(1) as f64).min(1.0);
            report.push(CompletenessEntry {
                locale,
                ratio,
                missing: reference_bundle.len() - hits,
            });
        }
        Ok(report)
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One locale's coverage against the reference locale.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletenessEntry {
    pub locale: LocaleId,
    pub ratio: f64,
    pub missing: usize,
}

/// Per-execution scope: resolves and holds the current locale.
pub struct Session {
    engine: Localizer,
    ctx: Arc<dyn RequestContext>,
    current: RwLock<Option<LocaleId>>,
}

impl Session {
    pub fn engine(&self) -> &Localizer {
        &self.engine
    }

    /// The active locale for this scope, resolved once and then cached.
    pub fn locale(&self) -> LocaleId {
        {
            let current = self.current.read().unwrap_or_else(|e| e.into_inner());
            if let Some(locale) = current.as_ref() {
                return locale.clone();
            }
        }
        let resolved = self.resolve();
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        current.get_or_insert(resolved).clone()
    }

    /// Switches the scope to `candidate`. A candidate that fails the grammar
    /// or is not supported is never an error: it logs a warning and the
    /// primary locale is applied instead, since locale selection must not
    /// block the operation. Returns the locale actually applied.
    pub fn set_locale(&self, candidate: &str) -> LocaleId {
        let locale = match candidate.parse::<LocaleId>() {
            Ok(locale) if self.is_supported(&locale) => locale,
            Ok(locale) => {
                warn!(candidate = %locale, "unsupported locale requested, substituting primary");
                self.primary_locale()
            }
            Err(_) => {
                warn!(candidate, "invalid locale requested, substituting primary");
                self.primary_locale()
            }
        };

        self.engine.shared.env.apply(&locale);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(locale.clone());
        locale
    }

    /// The configured primary locale, or the hard-coded default when the
    /// context supplies none or an invalid one.
    pub fn primary_locale(&self) -> LocaleId {
        match self.ctx.primary_locale() {
            Some(raw) => match raw.parse() {
                Ok(locale) => locale,
                Err(_) => {
                    warn!(raw = %raw, "invalid primary locale configured, using default");
                    LocaleId::default()
                }
            },
            None => LocaleId::default(),
        }
    }

    /// Supported locales from the context, invalid entries dropped, order
    /// preserved.
    pub fn supported_locales(&self) -> Vec<LocaleId> {
        self.ctx
            .supported_locales()
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect()
    }

    pub fn is_supported(&self, locale: &LocaleId) -> bool {
        self.supported_locales().contains(locale)
    }

    pub fn translate(&self, key: &str, params: &[(&str, String)]) -> Result<String, BundleError> {
        self.engine.translate_in(&self.locale(), key, None, params)
    }

    pub fn translate_in(
        &self,
        locale: &LocaleId,
        key: &str,
        params: &[(&str, String)],
    ) -> Result<String, BundleError> {
        self.engine.translate_in(locale, key, None, params)
    }

    pub fn translate_plural(
        &self,
        key: &str,
        count: i64,
        params: &[(&str, String)],
    ) -> Result<String, BundleError> {
        self.engine.translate_in(&self.locale(), key, Some(count), params)
    }

    pub fn translate_plural_in(
        &self,
        locale: &LocaleId,
        key: &str,
        count: i64,
        params: &[(&str, String)],
    ) -> Result<String, BundleError> {
        self.engine.translate_in(locale, key, Some(count), params)
    }

    /// Resolves a 3-letter code to a concrete locale. With several
    /// candidate locales for one code the primary locale wins outright,
    /// then the first match in supported-set order, then the first
    /// candidate in enumeration order.
    pub fn locale_from_alpha3(&self, alpha3: &str) -> Option<LocaleId> {
        let candidates: Vec<LocaleId> = self
            .engine
            .available_locales()
            .into_iter()
            .filter(|locale| iso::alpha3_for(locale.language()) == Some(alpha3))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let primary = self.primary_locale();
        if candidates.contains(&primary) {
            return Some(primary);
        }
        for supported in self.supported_locales() {
            if candidates.contains(&supported) {
                return Some(supported);
            }
        }
        candidates.into_iter().next()
    }

    fn resolve(&self) -> LocaleId {
        let supported = self.supported_locales();
        let preferences = [
            ("override", self.ctx.override_locale()),
            ("session", self.ctx.session_locale()),
            ("client", self.ctx.client_locale()),
        ];

        for (origin, preference) in preferences {
            let Some(raw) = preference else { continue };
            if raw.is_empty() {
                continue;
            }
            match raw.parse::<LocaleId>() {
                Ok(locale) if supported.contains(&locale) => {
                    debug!(origin, locale = %locale, "resolved current locale");
                    return locale;
                }
                Ok(locale) => {
                    debug!(origin, locale = %locale, "skipping unsupported locale preference");
                }
                Err(_) => {
                    debug!(origin, raw = %raw, "skipping invalid locale preference");
                }
            }
        }
        self.primary_locale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticContext;

    fn session_with(ctx: StaticContext) -> Session {
        Localizer::new().session(Arc::new(ctx))
    }

    fn supported(raws: &[&str]) -> Vec<String> {
        raws.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_override_takes_priority() {
        let session = session_with(StaticContext {
            override_locale: Some("de".into()),
            session_locale: Some("fr".into()),
            client_locale: Some("es".into()),
            primary_locale: Some("en".into()),
            supported_locales: supported(&["en", "de", "fr", "es"]),
        });
        assert_eq!(session.locale().to_string(), "de");
    }

    #[test]
    fn test_session_preference_beats_client() {
        let session = session_with(StaticContext {
            session_locale: Some("fr".into()),
            client_locale: Some("es".into()),
            primary_locale: Some("en".into()),
            supported_locales: supported(&["en", "fr", "es"]),
            ..Default::default()
        });
        assert_eq!(session.locale().to_string(), "fr");
    }

    #[test]
    fn test_invalid_and_unsupported_preferences_are_skipped() {
        let session = session_with(StaticContext {
            override_locale: Some("not a locale".into()),
            session_locale: Some("ru".into()),
            client_locale: Some("es".into()),
            primary_locale: Some("en".into()),
            supported_locales: supported(&["en", "es"]),
            ..Default::default()
        });
        assert_eq!(session.locale().to_string(), "es");
    }

    #[test]
    fn test_empty_preferences_fall_back_to_primary() {
        let session = session_with(StaticContext {
            override_locale: Some(String::new()),
            primary_locale: Some("de_DE".into()),
            supported_locales: supported(&["de_DE"]),
            ..Default::default()
        });
        assert_eq!(session.locale().to_string(), "de_DE");
    }

    #[test]
    fn test_resolution_is_cached_per_session() {
        let session = session_with(StaticContext {
            client_locale: Some("es".into()),
            primary_locale: Some("en".into()),
            supported_locales: supported(&["en", "es"]),
            ..Default::default()
        });
        assert_eq!(session.locale(), session.locale());
    }

    #[test]
    fn test_set_locale_never_fails() {
        let session = session_with(StaticContext {
            primary_locale: Some("en".into()),
            supported_locales: supported(&["en", "de"]),
            ..Default::default()
        });

        assert_eq!(session.set_locale("de").to_string(), "de");
        assert_eq!(session.locale().to_string(), "de");

        // unsupported and ungrammatical candidates substitute the primary
        assert_eq!(session.set_locale("fr").to_string(), "en");
        assert_eq!(session.set_locale("NOPE").to_string(), "en");
    }

    #[test]
    fn test_invalid_primary_falls_back_to_default() {
        let session = session_with(StaticContext {
            primary_locale: Some("INVALID".into()),
            ..Default::default()
        });
        assert_eq!(session.primary_locale().to_string(), DEFAULT_LOCALE);

        let session = session_with(StaticContext::default());
        assert_eq!(session.primary_locale().to_string(), DEFAULT_LOCALE);
    }

    #[test]
    fn test_metadata_requires_valid_identifier() {
        let engine = Localizer::new();
        assert!(engine.metadata("de_AT").is_some());
        assert!(engine.metadata("nope!").is_none());
    }
}
