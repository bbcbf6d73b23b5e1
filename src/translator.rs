//! Key lookup, plural selection and parameter substitution
//!
//! A miss never panics and never returns an error on its own: hooks and the
//! optional handler observe it, and without a handler the caller gets a
//! deterministic `[[key]]` marker with the key HTML-escaped.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::bundle::{Assembler, Bundle, Entry};
use crate::error::BundleError;
use crate::ident::LocaleId;
use crate::plural;

/// Produces replacement text for a missing key.
pub type MissingKeyHandler =
    Arc<dyn Fn(&str, &[(&str, String)], &LocaleId) -> String + Send + Sync>;

/// Observes a missing key without influencing the result.
pub type MissHook = Arc<dyn Fn(&str, &LocaleId) + Send + Sync>;

const MISSING_OPEN: &str = "[[";
const MISSING_CLOSE: &str = "]]";

pub(crate) struct Translator {
    assembler: Assembler,
    missing_handler: RwLock<Option<MissingKeyHandler>>,
    miss_hooks: RwLock<Vec<MissHook>>,
}

impl Translator {
    pub fn new(assembler: Assembler) -> Self {
        Translator {
            assembler,
            missing_handler: RwLock::new(None),
            miss_hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    pub fn set_missing_key_handler(&self, handler: Option<MissingKeyHandler>) {
        *self
            .missing_handler
            .write()
            .unwrap_or_else(|e| e.into_inner()) = handler;
    }

    pub fn add_miss_hook(&self, hook: MissHook) {
        self.miss_hooks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(hook);
    }

    /// Translates `key` for `locale`. The key is trimmed first; an empty key
    /// translates to the empty string without touching any bundle.
    pub fn translate(
        &self,
        locale: &LocaleId,
        key: &str,
        count: Option<i64>,
        params: &[(&str, String)],
    ) -> Result<String, BundleError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(String::new());
        }

        let bundle = self.assembler.bundle(locale, true)?;
        match lookup(&bundle, locale, key, count) {
            Some(text) => Ok(substitute(&text, params)),
            None => Ok(self.miss(locale, key, params)),
        }
    }

    fn miss(&self, locale: &LocaleId, key: &str, params: &[(&str, String)]) -> String {
        debug!(locale = %locale, key, "translation miss");

        let hooks: Vec<MissHook> = self
            .miss_hooks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for hook in hooks {
            hook(key, locale);
        }

        let handler = self
            .missing_handler
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match handler {
            Some(handler) => handler(key, params, locale),
            None => format!("{}{}{}", MISSING_OPEN, escape_html(key), MISSING_CLOSE),
        }
    }
}

fn lookup(bundle: &Bundle, locale: &LocaleId, key: &str, count: Option<i64>) -> Option<String> {
    match bundle.get(key)? {
        Entry::Text(text) => Some(text.clone()),
        Entry::Plural(forms) => {
            let index = match count {
                Some(count) => plural::form_index(locale.language(), count),
                None => 0,
            };
            // rules for richer languages can point past a short form list
            Some(forms[index.min(forms.len() - 1)].clone())
        }
    }
}

/// Replaces `{name}` placeholders with the matching parameter value.
/// Placeholders without a parameter stay verbatim, as do unbalanced braces.
fn substitute(template: &str, params: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail[1..].find('}') {
            Some(close) => {
                let name = &tail[1..close + 1];
                match params.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..close + 2]),
                }
                rest = &tail[close + 2..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
