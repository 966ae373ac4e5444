//! Registration-time localization.
//!
//! A [`LocalizationFunction`] maps a dotted key (`ban.options.user.description`)
//! to translations of that string. It is consulted only when slash-like
//! descriptors are converted into registration payloads; explicit
//! localization maps on a command always win over the function's output.
//!
//! Keys follow the platform library's convention:
//!
//! ```text
//! <cmd>.name                              <cmd>.description
//! <cmd>.options.<opt>.name                <cmd>.options.<opt>.description
//! <cmd>.options.<opt>.choices.<choice>.name
//! <cmd>.<sub>.name                        <cmd>.<sub>.options.<opt>.name
//! <cmd>.<group>.name                      <cmd>.<group>.<sub>.description
//! ```
//!
//! # Bundles on disk
//!
//! [`BundleLocalization::from_bundles`] reads one JSON file per locale named
//! `<base_name>_<locale>.json`. Nested objects are flattened to dotted keys:
//!
//! ```json
//! { "ban": { "name": "bannen", "options": { "user": { "description": "Wer" } } } }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{LocalizationError, LocalizationResult};
use relay_core::{Locale, LocalizationMap};

/// Translates registration strings by key.
pub trait LocalizationFunction: fmt::Debug + Send + Sync {
    /// Returns every known translation of `key`.
    fn localize(&self, key: &str) -> LocalizationMap;
}

/// Shared localization function.
pub type SharedLocalization = Arc<dyn LocalizationFunction>;

/// Returns the default, empty localization function.
pub fn empty() -> SharedLocalization {
    Arc::new(EmptyLocalization)
}

/// A localization function that knows no translations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLocalization;

impl LocalizationFunction for EmptyLocalization {
    fn localize(&self, _key: &str) -> LocalizationMap {
        LocalizationMap::new()
    }
}

/// A localization function backed by per-locale key/value bundles.
#[derive(Debug, Clone, Default)]
pub struct BundleLocalization {
    bundles: Vec<(Locale, HashMap<String, String>)>,
}

impl BundleLocalization {
    /// Creates a function with no bundles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an in-memory bundle for `locale`.
    pub fn with_bundle<K, V>(
        mut self,
        locale: impl Into<Locale>,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.bundles.push((locale.into(), entries));
        self
    }

    /// Loads `<dir>/<base_name>_<locale>.json` for every locale.
    pub fn from_bundles(
        dir: impl AsRef<Path>,
        base_name: &str,
        locales: &[Locale],
    ) -> LocalizationResult<Self> {
        let mut function = Self::new();

        for locale in locales {
            let path = dir.as_ref().join(format!("{base_name}_{locale}.json"));
            let text = std::fs::read_to_string(&path).map_err(|source| LocalizationError::Io {
                path: path.clone(),
                source,
            })?;
            let value: Value =
                serde_json::from_str(&text).map_err(|source| LocalizationError::Json {
                    path: path.clone(),
                    source,
                })?;
            let Value::Object(root) = value else {
                return Err(LocalizationError::NotAnObject { path });
            };

            let mut entries = HashMap::new();
            for (key, value) in root {
                flatten(key, value, &mut entries);
            }

            debug!(locale = %locale, path = %path.display(), entries = entries.len(), "Loaded localization bundle");
            function.bundles.push((locale.clone(), entries));
        }

        Ok(function)
    }

    /// Returns the loaded locales in load order.
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.bundles.iter().map(|(locale, _)| locale)
    }
}

impl LocalizationFunction for BundleLocalization {
    fn localize(&self, key: &str) -> LocalizationMap {
        self.bundles
            .iter()
            .filter_map(|(locale, entries)| {
                entries
                    .get(key)
                    .map(|value| (locale.clone(), value.clone()))
            })
            .collect()
    }
}

fn flatten(prefix: String, value: Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten(format!("{prefix}.{key}"), value, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix, s);
        }
        Value::Number(n) => {
            out.insert(prefix, n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix, b.to_string());
        }
        Value::Null | Value::Array(_) => {}
    }
}

/// Merges the function's translations of `key` with explicit overrides.
pub(crate) fn resolve(
    function: &dyn LocalizationFunction,
    key: &str,
    explicit: &LocalizationMap,
) -> LocalizationMap {
    let mut map = function.localize(key);
    map.extend(explicit.iter().map(|(l, v)| (l.clone(), v.clone())));
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_localization() {
        assert!(EmptyLocalization.localize("ping.name").is_empty());
    }

    #[test]
    fn test_in_memory_bundles() {
        let function = BundleLocalization::new()
            .with_bundle("de", [("ping.description", "Pingt den Bot")])
            .with_bundle("fr", [("ping.description", "Envoie un ping")]);

        let map = function.localize("ping.description");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("de").map(String::as_str), Some("Pingt den Bot"));
        assert!(function.localize("ping.name").is_empty());
    }

    #[test]
    fn test_explicit_map_wins() {
        let function = BundleLocalization::new()
            .with_bundle("de", [("ping.name", "ping-de")])
            .with_bundle("fr", [("ping.name", "ping-fr")]);
        let explicit = LocalizationMap::from([(Locale::from("de"), "anpingen".to_string())]);

        let map = resolve(&function, "ping.name", &explicit);
        assert_eq!(map.get("de").map(String::as_str), Some("anpingen"));
        assert_eq!(map.get("fr").map(String::as_str), Some("ping-fr"));
    }

    #[test]
    fn test_load_bundles_from_disk() {
        let dir = std::env::temp_dir().join(format!("relay-l10n-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("commands_de.json"),
            r#"{"ban": {"name": "bannen", "options": {"user": {"description": "Wer"}}}}"#,
        )
        .unwrap();

        let function =
            BundleLocalization::from_bundles(&dir, "commands", &[Locale::from("de")]).unwrap();
        assert_eq!(
            function.localize("ban.options.user.description").get("de").map(String::as_str),
            Some("Wer")
        );
        assert_eq!(function.locales().count(), 1);

        let missing = BundleLocalization::from_bundles(&dir, "commands", &[Locale::from("ja")]);
        assert!(matches!(missing, Err(LocalizationError::Io { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
