//! Translation bundle assembly
//!
//! A bundle is the merged key/value view of every registered source and
//! loader for one locale. File sources merge in ascending priority order, so
//! a higher priority source overwrites keys from a lower one. Loaders run
//! after all file sources, also in ascending priority order, and therefore
//! always outrank files.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::BundleError;
use crate::ident::LocaleId;
use crate::locator;

/// A single translation entry.
///
/// Plural entries keep their forms in rule order; the plural rule for the
/// bundle's language maps a count to an index into the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Text(String),
    Plural(Vec<String>),
}

/// Immutable merged view of all entries for one locale.
#[derive(Debug, Default)]
pub struct Bundle {
    entries: BTreeMap<String, Entry>,
}

impl Bundle {
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Programmatic entry source. Receives the locale being assembled and the
/// entries merged so far, and may insert or overwrite freely.
pub type Loader = Arc<dyn Fn(&LocaleId, &mut BTreeMap<String, Entry>) + Send + Sync>;

struct Source {
    path: PathBuf,
    priority: i32,
}

/// Assembles and caches bundles from the registered sources and loaders.
pub(crate) struct Assembler {
    sources: RwLock<Vec<Source>>,
    loaders: RwLock<BTreeMap<i32, Vec<Loader>>>,
    cache: RwLock<HashMap<LocaleId, Arc<Bundle>>>,
    scan_memo: RwLock<HashMap<(PathBuf, LocaleId), Arc<Vec<PathBuf>>>>,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            sources: RwLock::new(Vec::new()),
            loaders: RwLock::new(BTreeMap::new()),
            cache: RwLock::new(HashMap::new()),
            scan_memo: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a source directory at the given priority. Re-registering
    /// the same directory updates its priority; any registration change
    /// drops every cached bundle.
    pub fn register_source(&self, dir: &Path, priority: i32) {
        let path = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = sources.iter_mut().find(|s| s.path == path) {
            if existing.priority == priority {
                return;
            }
            existing.priority = priority;
        } else {
            sources.push(Source { path, priority });
        }
        drop(sources);

        debug!(dir = %dir.display(), priority, "registered translation source");
        self.invalidate();
    }

    /// Registers a loader at the given priority and drops every cached
    /// bundle. Registering the same loader twice at one priority is a no-op.
    pub fn register_loader(&self, loader: Loader, priority: i32) {
        let mut loaders = self.loaders.write().unwrap_or_else(|e| e.into_inner());
        let bucket = loaders.entry(priority).or_default();
        if bucket.iter().any(|l| Arc::ptr_eq(l, &loader)) {
            return;
        }
        bucket.push(loader);
        drop(loaders);

        debug!(priority, "registered translation loader");
        self.invalidate();
    }

    /// Drops every cached bundle and file scan.
    pub fn invalidate(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.scan_memo
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Returns the bundle for `locale`, assembling it if needed. With
    /// `use_cache` false the cache is neither consulted nor filled.
    pub fn bundle(&self, locale: &LocaleId, use_cache: bool) -> Result<Arc<Bundle>, BundleError> {
        if use_cache {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(bundle) = cache.get(locale) {
                return Ok(Arc::clone(bundle));
            }
        }

        // Assembly happens outside the lock. Concurrent misses may each
        // assemble; the last writer wins, which is harmless for an
        // idempotent merge.
        let bundle = Arc::new(self.assemble(locale, use_cache)?);

        if use_cache {
            self.cache
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(locale.clone(), Arc::clone(&bundle));
        }
        Ok(bundle)
    }

    /// Locale directories present in any registered source, ordered by
    /// source priority and deduplicated.
    pub fn available_locales(&self) -> Vec<LocaleId> {
        let mut ordered: Vec<(i32, PathBuf)> = {
            let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
            sources.iter().map(|s| (s.priority, s.path.clone())).collect()
        };
        ordered.sort_by_key(|(priority, _)| *priority);

        let mut locales = Vec::new();
        for (_, path) in ordered {
            for locale in locator::list_locale_dirs(&path) {
                if !locales.contains(&locale) {
                    locales.push(locale);
                }
            }
        }
        locales
    }

    fn assemble(&self, locale: &LocaleId, use_cache: bool) -> Result<Bundle, BundleError> {
        let mut ordered: Vec<(i32, PathBuf)> = {
            let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
            sources.iter().map(|s| (s.priority, s.path.clone())).collect()
        };
        // Stable sort keeps the registration order of equal priorities.
        ordered.sort_by_key(|(priority, _)| *priority);

        let mut entries = BTreeMap::new();
        for (_, dir) in &ordered {
            for file in self.resource_files(dir, locale, use_cache).iter() {
                merge_file(file, &mut entries)?;
            }
        }

        let buckets: Vec<Vec<Loader>> = {
            let loaders = self.loaders.read().unwrap_or_else(|e| e.into_inner());
            loaders.values().cloned().collect()
        };
        for bucket in buckets {
            for loader in bucket {
                loader(locale, &mut entries);
            }
        }

        debug!(locale = %locale, entries = entries.len(), "assembled bundle");
        Ok(Bundle { entries })
    }

    fn resource_files(&self, dir: &Path, locale: &LocaleId, use_cache: bool) -> Arc<Vec<PathBuf>> {
        let key = (dir.to_path_buf(), locale.clone());
        if use_cache {
            let memo = self.scan_memo.read().unwrap_or_else(|e| e.into_inner());
            if let Some(files) = memo.get(&key) {
                return Arc::clone(files);
            }
        }

        let files = Arc::new(locator::list_resource_files(dir, locale));
        if use_cache {
            self.scan_memo
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, Arc::clone(&files));
        }
        files
    }
}

fn merge_file(path: &Path, entries: &mut BTreeMap<String, Entry>) -> Result<(), BundleError> {
    let content = fs::read_to_string(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: ron::Value = ron::from_str(&content).map_err(|source| BundleError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    flatten_value(value, entries, String::new(), path);
    Ok(())
}

/// Flattens a nested RON map into dot-separated keys. Strings become text
/// entries, sequences of strings become plural form lists, anything else is
/// skipped with a warning.
fn flatten_value(value: ron::Value, entries: &mut BTreeMap<String, Entry>, key: String, path: &Path) {
    match value {
        ron::Value::Map(map) => {
            for (k, v) in map.into_iter() {
                if let ron::Value::String(field) = k {
                    let child = if key.is_empty() {
                        field
                    } else {
                        format!("{}.{}", key, field)
                    };
                    flatten_value(v, entries, child, path);
                } else {
                    warn!(file = %path.display(), "skipping non-string key in resource map");
                }
            }
        }
        ron::Value::String(text) => {
            entries.insert(key, Entry::Text(text));
        }
        ron::Value::Seq(items) => {
            let mut forms = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    ron::Value::String(form) => forms.push(form),
                    _ => {
                        warn!(file = %path.display(), key = %key, "skipping plural list with non-string form");
                        return;
                    }
                }
            }
            if forms.is_empty() {
                warn!(file = %path.display(), key = %key, "skipping empty plural list");
                return;
            }
            entries.insert(key, Entry::Plural(forms));
        }
        _ => {
            warn!(file = %path.display(), key = %key, "skipping unsupported value type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_resource(root: &Path, locale: &str, name: &str, content: &str) {
        let dir = root.join(locale);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn locale(raw: &str) -> LocaleId {
        LocaleId::new(raw).unwrap()
    }

    #[test]
    fn test_flattens_nested_maps_to_dot_keys() {
        let tmp = tempdir().unwrap();
        write_resource(
            tmp.path(),
            "en",
            "core.ron",
            r#"{ "menu": { "file": { "open": "Open" } }, "ok": "OK" }"#,
        );

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        let bundle = assembler.bundle(&locale("en"), true).unwrap();

        assert_eq!(
            bundle.get("menu.file.open"),
            Some(&Entry::Text("Open".into()))
        );
        assert_eq!(bundle.get("ok"), Some(&Entry::Text("OK".into())));
    }

    #[test]
    fn test_sequences_become_plural_forms() {
        let tmp = tempdir().unwrap();
        write_resource(
            tmp.path(),
            "en",
            "core.ron",
            r#"{ "apples": ["{count} apple", "{count} apples"] }"#,
        );

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        let bundle = assembler.bundle(&locale("en"), true).unwrap();

        assert_eq!(
            bundle.get("apples"),
            Some(&Entry::Plural(vec![
                "{count} apple".into(),
                "{count} apples".into()
            ]))
        );
    }

    #[test]
    fn test_higher_priority_source_overwrites() {
        let low = tempdir().unwrap();
        let high = tempdir().unwrap();
        write_resource(low.path(), "en", "a.ron", r#"{ "k": "low", "only": "low" }"#);
        write_resource(high.path(), "en", "a.ron", r#"{ "k": "high" }"#);

        let assembler = Assembler::new();
        assembler.register_source(high.path(), 10);
        assembler.register_source(low.path(), 1);
        let bundle = assembler.bundle(&locale("en"), true).unwrap();

        assert_eq!(bundle.get("k"), Some(&Entry::Text("high".into())));
        assert_eq!(bundle.get("only"), Some(&Entry::Text("low".into())));
    }

    #[test]
    fn test_loaders_outrank_files_and_order_by_priority() {
        let tmp = tempdir().unwrap();
        write_resource(tmp.path(), "en", "a.ron", r#"{ "k": "file" }"#);

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 100);
        let first: Loader = Arc::new(|_, entries| {
            entries.insert("k".into(), Entry::Text("first".into()));
        });
        let second: Loader = Arc::new(|_, entries| {
            entries.insert("k".into(), Entry::Text("second".into()));
        });
        assembler.register_loader(second, 5);
        assembler.register_loader(first, 1);

        let bundle = assembler.bundle(&locale("en"), true).unwrap();
        assert_eq!(bundle.get("k"), Some(&Entry::Text("second".into())));
    }

    #[test]
    fn test_registration_invalidates_cache() {
        let tmp = tempdir().unwrap();
        write_resource(tmp.path(), "en", "a.ron", r#"{ "k": "v" }"#);

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        assert_eq!(assembler.bundle(&locale("en"), true).unwrap().len(), 1);

        let extra = tempdir().unwrap();
        write_resource(extra.path(), "en", "b.ron", r#"{ "k2": "v2" }"#);
        assembler.register_source(extra.path(), 1);

        assert_eq!(assembler.bundle(&locale("en"), true).unwrap().len(), 2);
    }

    #[test]
    fn test_use_cache_false_sees_fresh_files() {
        let tmp = tempdir().unwrap();
        write_resource(tmp.path(), "en", "a.ron", r#"{ "k": "old" }"#);

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        assert_eq!(
            assembler.bundle(&locale("en"), true).unwrap().get("k"),
            Some(&Entry::Text("old".into()))
        );

        write_resource(tmp.path(), "en", "a.ron", r#"{ "k": "new" }"#);
        // cached view is stale, bypass sees the new content
        assert_eq!(
            assembler.bundle(&locale("en"), true).unwrap().get("k"),
            Some(&Entry::Text("old".into()))
        );
        assert_eq!(
            assembler.bundle(&locale("en"), false).unwrap().get("k"),
            Some(&Entry::Text("new".into()))
        );
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let tmp = tempdir().unwrap();
        write_resource(tmp.path(), "en", "a.ron", r#"{ "k": "v", "p": ["one", "many"] }"#);

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        let first = assembler.bundle(&locale("en"), false).unwrap();
        let second = assembler.bundle(&locale("en"), false).unwrap();

        let keys: Vec<&str> = first.keys().collect();
        assert_eq!(keys, second.keys().collect::<Vec<&str>>());
        assert_eq!(first.get("k"), second.get("k"));
        assert_eq!(first.get("p"), second.get("p"));
    }

    #[test]
    fn test_missing_locale_dir_yields_empty_bundle() {
        let tmp = tempdir().unwrap();
        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        assert!(assembler.bundle(&locale("de"), true).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let tmp = tempdir().unwrap();
        write_resource(tmp.path(), "en", "bad.ron", "{ not valid ron");

        let assembler = Assembler::new();
        assembler.register_source(tmp.path(), 0);
        assert!(matches!(
            assembler.bundle(&locale("en"), true),
            Err(BundleError::Parse { .. })
        ));
    }

    #[test]
    fn test_available_locales_ordered_and_deduped() {
        let low = tempdir().unwrap();
        let high = tempdir().unwrap();
        for name in ["en", "de"] {
            fs::create_dir_all(low.path().join(name)).unwrap();
        }
        for name in ["en", "fr"] {
            fs::create_dir_all(high.path().join(name)).unwrap();
        }

        let assembler = Assembler::new();
        assembler.register_source(high.path(), 10);
        assembler.register_source(low.path(), 1);

        let names: Vec<String> = assembler
            .available_locales()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(names, ["de", "en", "fr"]);
    }
}
