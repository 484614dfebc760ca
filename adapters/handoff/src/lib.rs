#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hands the completed tally to the screens that consume it.
//!
//! A tally reaches a lesson screen either as in-memory navigation state or
//! through a key-value store. Writers only ever use [`CANONICAL_KEY`]; readers
//! also accept the keys older screens wrote.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use percent_maze_core::Tally;
use tracing::{debug, warn};

/// Key every completed session writes its tally under.
pub const CANONICAL_KEY: &str = "collection_tally";

/// Keys written by earlier screens, read in order when the canonical key is absent.
pub const LEGACY_KEYS: [&str; 4] = [
    "animalData",
    "gameState",
    "animalCollectionData",
    "priceComparisonData",
];

/// Where a resolved tally came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TallySource {
    /// Passed directly from the previous screen.
    Navigation,
    /// Read from the store under the given key.
    Stored(&'static str),
    /// Nothing usable was found; the zeroed default applies.
    Default,
}

/// Serializes `tally` under [`CANONICAL_KEY`].
pub fn persist_tally<S>(store: &mut S, tally: &Tally) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let value = serde_json::to_string(tally)?;
    store.set(CANONICAL_KEY, value)?;
    debug!(total = tally.total(), key = CANONICAL_KEY, "tally persisted");
    Ok(())
}

/// Reads the first well-formed tally from the canonical key, then the legacy keys.
///
/// Malformed values are logged and skipped.
pub fn load_persisted<S>(store: &S) -> Option<(Tally, &'static str)>
where
    S: KeyValueStore + ?Sized,
{
    std::iter::once(CANONICAL_KEY)
        .chain(LEGACY_KEYS)
        .find_map(|key| {
            let raw = store.get(key)?;
            match serde_json::from_str::<Tally>(&raw) {
                Ok(tally) => Some((tally, key)),
                Err(error) => {
                    warn!(key, %error, "ignoring malformed stored tally");
                    None
                }
            }
        })
}

/// Picks the tally a lesson screen should display.
///
/// Navigation state wins, then the store, then the zeroed default.
pub fn resolve_tally<S>(navigation: Option<Tally>, store: &S) -> (Tally, TallySource)
where
    S: KeyValueStore + ?Sized,
{
    if let Some(tally) = navigation {
        return (tally, TallySource::Navigation);
    }
    match load_persisted(store) {
        Some((tally, key)) => (tally, TallySource::Stored(key)),
        None => (Tally::default(), TallySource::Default),
    }
}
