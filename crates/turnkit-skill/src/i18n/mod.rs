//! Phrase tables for every locale the skill serves.
//!
//! Each language has one table; regional tags are registered as aliases because
//! locale lookup is exact.

mod de;
mod en;
mod es;

use turnkit_core::LocaleTable;

/// The runtime's negative-response cue, spoken in every locale.
pub use turnkit_core::fallback::DEFAULT_ERROR_SOUND as ERROR_SOUND;

const EN_REGIONS: &[&str] = &["en-US", "en-GB", "en-IN", "en-CA", "en-AU"];
const DE_REGIONS: &[&str] = &["de-DE"];
const ES_REGIONS: &[&str] = &["es-ES", "es-MX", "es-US"];

pub fn locale_table() -> LocaleTable {
    let table = LocaleTable::new()
        .with_locale("en", en::PHRASES)
        .with_locale("de", de::PHRASES)
        .with_locale("es", es::PHRASES);
    [("en", EN_REGIONS), ("de", DE_REGIONS), ("es", ES_REGIONS)]
        .iter()
        .fold(table, |table, (tag, regions)| {
            regions.iter().fold(table, |t, region| t.alias(region, tag))
        })
}
