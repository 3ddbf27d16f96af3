//! In-memory state store backed by [`JsonFileStorage`].
//!
//! Every mutation holds the document lock across "mutate, then persist", so two
//! concurrent calls never interleave inside one write. Durability is best effort:
//! when the write fails the in-memory change is kept and `Persistence` is returned.

use chrono::Utc;
use parking_lot::Mutex;

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::document::{FavoriteLocation, HistoryEntry, PersistedDocument, QueryParameters, Stats};
use crate::error::{Result, WeatherError};
use crate::models::validate_coordinates;
use crate::storage::JsonFileStorage;

pub struct StateStore {
    storage: JsonFileStorage,
    document: Mutex<PersistedDocument>,
    history_cap: usize,
}

impl StateStore {
    /// Loads the document from `storage` (or starts fresh). History beyond
    /// `history_cap` entries is trimmed oldest-first.
    pub fn open(storage: JsonFileStorage, history_cap: usize) -> Self {
        let mut document = storage.load();
        let history_cap = history_cap.max(1);
        evict_oldest(&mut document.history, history_cap);
        Self {
            storage,
            document: Mutex::new(document),
            history_cap,
        }
    }

    /// Saves a new favorite. Names are unique; a repeat name is rejected without writing.
    pub fn add_favorite(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<FavoriteLocation> {
        validate_coordinates(latitude, longitude)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidArgument(
                "favorite name must not be empty".to_string(),
            ));
        }

        let mut doc = self.document.lock();
        if doc.favorites.iter().any(|f| f.name == name) {
            return Err(WeatherError::DuplicateFavorite(name.to_string()));
        }

        let favorite = FavoriteLocation {
            name: name.to_string(),
            latitude,
            longitude,
            saved_at: Utc::now(),
        };
        doc.favorites.push(favorite.clone());
        self.persist(&doc)?;
        Ok(favorite)
    }

    /// Favorites in insertion order
    pub fn list_favorites(&self) -> Vec<FavoriteLocation> {
        self.document.lock().favorites.clone()
    }

    /// Appends a lookup to history and bumps the matching counter
    pub fn record_history(&self, parameters: QueryParameters) -> Result<HistoryEntry> {
        let query_type = parameters.query_type();
        let entry = HistoryEntry::new(parameters, Utc::now());

        let mut doc = self.document.lock();
        doc.history.push(entry.clone());
        evict_oldest(&mut doc.history, self.history_cap);
        doc.stats.record(query_type);
        self.persist(&doc)?;
        Ok(entry)
    }

    /// The most recent `limit` entries (default 10), newest first
    pub fn list_history(&self, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if limit <= 0 {
            return Err(WeatherError::InvalidArgument(format!(
                "limit must be a positive integer, got {limit}"
            )));
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let doc = self.document.lock();
        Ok(doc.history.iter().rev().take(limit).cloned().collect())
    }

    /// Empties history; favorites and stats are left alone
    pub fn clear_history(&self) -> Result<()> {
        let mut doc = self.document.lock();
        doc.history.clear();
        self.persist(&doc)
    }

    pub fn stats(&self) -> Stats {
        self.document.lock().stats.clone()
    }

    fn persist(&self, doc: &PersistedDocument) -> Result<()> {
        self.storage.save(doc).map_err(|e| {
            tracing::error!(
                path = %self.storage.path().display(),
                "Memory change kept in this session only: {}",
                e
            );
            e
        })
    }
}

fn evict_oldest(history: &mut Vec<HistoryEntry>, cap: usize) {
    if history.len() > cap {
        let excess = history.len() - cap;
        tracing::debug!(evicted = excess, "History over capacity, dropping oldest entries");
        history.drain(..excess);
    }
}
