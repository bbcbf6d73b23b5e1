//! Request context and environment integration

use crate::ident::LocaleId;

/// Per-request locale preferences consulted by the resolver.
///
/// The three preference slots are raw strings on purpose: callers feed them
/// from untrusted input (cookies, headers, user profiles) and the resolver
/// validates them itself.
pub trait RequestContext: Send + Sync {
    /// Forced locale, strongest preference.
    fn override_locale(&self) -> Option<String> {
        None
    }

    /// Locale chosen earlier in the session.
    fn session_locale(&self) -> Option<String> {
        None
    }

    /// Locale advertised by the client.
    fn client_locale(&self) -> Option<String> {
        None
    }

    /// Configured default for this deployment.
    fn primary_locale(&self) -> Option<String>;

    /// Locales the deployment declares support for, strongest first.
    fn supported_locales(&self) -> Vec<String>;
}

/// Fixed-value context, useful for CLI invocations and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    pub override_locale: Option<String>,
    pub session_locale: Option<String>,
    pub client_locale: Option<String>,
    pub primary_locale: Option<String>,
    pub supported_locales: Vec<String>,
}

impl RequestContext for StaticContext {
    fn override_locale(&self) -> Option<String> {
        self.override_locale.clone()
    }

    fn session_locale(&self) -> Option<String> {
        self.session_locale.clone()
    }

    fn client_locale(&self) -> Option<String> {
        self.client_locale.clone()
    }

    fn primary_locale(&self) -> Option<String> {
        self.primary_locale.clone()
    }

    fn supported_locales(&self) -> Vec<String> {
        self.supported_locales.clone()
    }
}

/// Applied whenever a session locale changes, so the surrounding process
/// can follow along.
pub trait EnvironmentAdapter: Send + Sync {
    fn apply(&self, locale: &LocaleId);
}

/// Adapter that changes nothing.
pub struct NullEnvironment;

impl EnvironmentAdapter for NullEnvironment {
    fn apply(&self, _locale: &LocaleId) {}
}

/// Adapter that exports the locale through `LANG` and `LC_ALL`.
pub struct SystemEnvironment;

impl EnvironmentAdapter for SystemEnvironment {
    fn apply(&self, locale: &LocaleId) {
        unsafe {
            std::env::set_var("LANG", locale.to_string());
            std::env::set_var("LC_ALL", locale.to_string());
        }
    }
}

/// Best-effort detection of the operating system locale. Platform strings
/// like `en-US.UTF-8` are normalized into the identifier grammar; anything
/// unusable yields `None`.
pub fn system_locale() -> Option<LocaleId> {
    let raw = sys_locale::get_locale()?;
    let raw = raw.replace('-', "_");
    let raw = raw.split('.').next().unwrap_or(&raw);

    if let Ok(locale) = raw.parse() {
        return Some(locale);
    }
    // fall back to the bare language subtag
    raw.get(..2).and_then(|lang| lang.parse().ok())
}
