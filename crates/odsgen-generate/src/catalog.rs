use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use odsgen_core::TableSchema;

use crate::errors::GenerationError;
use crate::faker_rs::{FakeKind, FakeRsAdapter, LocaleKey};
use crate::model::Clock;

/// Per-run configuration the synthesizers draw from: named value lists,
/// faker locale and clock.
///
/// Built explicitly for one generation call and dropped with it; nothing
/// here is process-wide.
#[derive(Debug, Clone)]
pub struct GenerationCatalog {
    lists: BTreeMap<String, Vec<String>>,
    locale: LocaleKey,
    clock: Clock,
}

impl GenerationCatalog {
    pub fn new(locale: LocaleKey, clock: Clock) -> Self {
        Self {
            lists: BTreeMap::new(),
            locale,
            clock,
        }
    }

    /// Catalog seeded with the value lists a schema declares.
    pub fn for_schema(schema: &TableSchema, locale: LocaleKey, clock: Clock) -> Self {
        Self {
            lists: schema.lists.clone(),
            locale,
            clock,
        }
    }

    /// Replace or add a value list.
    pub fn with_list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn pick<R: Rng + ?Sized>(&self, list: &str, rng: &mut R) -> Result<&str, GenerationError> {
        let values = self
            .lists
            .get(list)
            .ok_or_else(|| GenerationError::Catalog(format!("unknown list '{list}'")))?;
        values
            .choose(rng)
            .map(String::as_str)
            .ok_or_else(|| GenerationError::Catalog(format!("list '{list}' is empty")))
    }

    pub fn fake<R: Rng + ?Sized>(&self, kind: FakeKind, rng: &mut R) -> String {
        FakeRsAdapter::generate(kind, self.locale, rng)
    }

    pub fn text<R: Rng + ?Sized>(&self, max_chars: usize, rng: &mut R) -> String {
        FakeRsAdapter::text(max_chars, self.locale, rng)
    }
}
