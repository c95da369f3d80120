//! Localization: locale tag -> translator -> one of N phrase variants.
//!
//! Tables are read-only once built and shared between dispatches behind an `Arc`.
//! Locale lookup is exact (`en-US` does not fall back to `en`); deployments register
//! every tag they serve, typically via [`LocaleTable::alias`].

use crate::error::{SkillError, SkillResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Translation key -> ordered phrase variants (never empty).
pub type PhraseTable = HashMap<String, Vec<String>>;

/// Locale tag -> phrase table.
#[derive(Debug, Default, Clone)]
pub struct LocaleTable {
    locales: HashMap<String, Arc<PhraseTable>>,
}

impl LocaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a locale from `(key, variants)` pairs. Keys with no variants are skipped.
    pub fn with_locale(mut self, tag: &str, entries: &[(&str, &[&str])]) -> Self {
        let table: PhraseTable = entries
            .iter()
            .filter(|(_, variants)| !variants.is_empty())
            .map(|(key, variants)| {
                (
                    key.to_string(),
                    variants.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        self.locales.insert(tag.to_string(), Arc::new(table));
        self
    }

    /// Serve `alias` with the same table as `tag`. No-op if `tag` is unknown.
    pub fn alias(mut self, alias: &str, tag: &str) -> Self {
        if let Some(table) = self.locales.get(tag).cloned() {
            self.locales.insert(alias.to_string(), table);
        }
        self
    }

    pub fn get(&self, tag: &str) -> Option<Arc<PhraseTable>> {
        self.locales.get(tag).cloned()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

/// Picks a variant index. Injectable so tests can make selection deterministic.
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. Called only with `len >= 2`.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform selection from the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Uniform selection from a seeded generator; reproducible across runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// Resolves locale tags against a shared table.
#[derive(Clone)]
pub struct Localizer {
    table: Arc<LocaleTable>,
    random: Arc<dyn RandomSource>,
}

impl Localizer {
    pub fn new(table: LocaleTable) -> Self {
        Self::with_random(table, Arc::new(ThreadRandom))
    }

    pub fn with_random(table: LocaleTable, random: Arc<dyn RandomSource>) -> Self {
        Self {
            table: Arc::new(table),
            random,
        }
    }

    /// Never fails: an unknown locale yields a translator whose lookups return
    /// [`SkillError::UnknownLocale`].
    pub fn resolve(&self, locale: &str) -> Translator {
        Translator {
            locale: locale.to_string(),
            phrases: self.table.get(locale),
            random: Arc::clone(&self.random),
        }
    }
}

impl std::fmt::Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localizer")
            .field("locales", &self.table.tags().collect::<Vec<_>>())
            .finish()
    }
}

/// Key -> phrase for one locale. Variant choice is made per call, not per session.
#[derive(Clone)]
pub struct Translator {
    locale: String,
    phrases: Option<Arc<PhraseTable>>,
    random: Arc<dyn RandomSource>,
}

impl Translator {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn t(&self, key: &str) -> SkillResult<String> {
        self.t_with(key, &[])
    }

    /// Look up `key` and replace `{{name}}` placeholders from `params`.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> SkillResult<String> {
        let phrases = self
            .phrases
            .as_ref()
            .ok_or_else(|| SkillError::UnknownLocale(self.locale.clone()))?;
        let variants = phrases
            .get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SkillError::UnknownKey {
                locale: self.locale.clone(),
                key: key.to_string(),
            })?;
        let chosen = match variants.len() {
            1 => &variants[0],
            n => &variants[self.random.pick(n).min(n - 1)],
        };
        Ok(interpolate(chosen, params))
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &self.locale)
            .field("loaded", &self.phrases.is_some())
            .finish()
    }
}

fn interpolate(phrase: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(phrase.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{{{}}}}}", name), value)
    })
}
