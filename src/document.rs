//! The persisted memory document: favorites, search history and usage stats.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The single unit of durable state. Every section is always present; sections
/// missing from an older file are filled with defaults on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDocument {
    pub favorites: Vec<FavoriteLocation>,
    /// Oldest first, newest last
    pub history: Vec<HistoryEntry>,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Alert,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertQuery {
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// Arguments of a lookup about to be recorded in history
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParameters {
    Alert(AlertQuery),
    Forecast(ForecastQuery),
}

impl QueryParameters {
    pub fn query_type(&self) -> QueryType {
        match self {
            QueryParameters::Alert(_) => QueryType::Alert,
            QueryParameters::Forecast(_) => QueryType::Forecast,
        }
    }
}

/// One past lookup. Stored as `{"query_type": "...", "parameters": {...}, "timestamp": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query_type", rename_all = "snake_case")]
pub enum HistoryEntry {
    Alert {
        parameters: AlertQuery,
        timestamp: DateTime<Utc>,
    },
    Forecast {
        parameters: ForecastQuery,
        timestamp: DateTime<Utc>,
    },
}

impl HistoryEntry {
    pub fn new(parameters: QueryParameters, timestamp: DateTime<Utc>) -> Self {
        match parameters {
            QueryParameters::Alert(parameters) => HistoryEntry::Alert {
                parameters,
                timestamp,
            },
            QueryParameters::Forecast(parameters) => HistoryEntry::Forecast {
                parameters,
                timestamp,
            },
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::Alert { timestamp, .. } | HistoryEntry::Forecast { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

/// Usage counters. `total_searches` is always derived from the per-type counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatsRecord", into = "StatsRecord")]
pub struct Stats {
    alerts_checked: u64,
    forecasts_checked: u64,
    created_at: DateTime<Utc>,
}

impl Stats {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            alerts_checked: 0,
            forecasts_checked: 0,
            created_at,
        }
    }

    pub fn total_searches(&self) -> u64 {
        self.alerts_checked.saturating_add(self.forecasts_checked)
    }

    pub fn alerts_checked(&self) -> u64 {
        self.alerts_checked
    }

    pub fn forecasts_checked(&self) -> u64 {
        self.forecasts_checked
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn record(&mut self, query_type: QueryType) {
        let counter = match query_type {
            QueryType::Alert => &mut self.alerts_checked,
            QueryType::Forecast => &mut self.forecasts_checked,
        };
        *counter = counter.saturating_add(1);
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// On-disk shape of [`Stats`]. The stored total is informational only.
#[derive(Serialize, Deserialize)]
struct StatsRecord {
    #[serde(default)]
    total_searches: u64,
    #[serde(default)]
    alerts_checked: u64,
    #[serde(default)]
    forecasts_checked: u64,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<StatsRecord> for Stats {
    fn from(record: StatsRecord) -> Self {
        Self {
            alerts_checked: record.alerts_checked,
            forecasts_checked: record.forecasts_checked,
            created_at: record.created_at,
        }
    }
}

impl From<Stats> for StatsRecord {
    fn from(stats: Stats) -> Self {
        Self {
            total_searches: stats.total_searches(),
            alerts_checked: stats.alerts_checked,
            forecasts_checked: stats.forecasts_checked,
            created_at: stats.created_at,
        }
    }
}

// ============================================================================
// Legacy Layout
// ============================================================================

/// Memory file written by the earlier Python server: `searches` instead of
/// `history`, `added` instead of `saved_at`, local timestamps without offset,
/// and no stats section.
#[derive(Debug, Deserialize)]
pub struct LegacyDocument {
    #[serde(default)]
    searches: Vec<LegacySearch>,
    #[serde(default)]
    favorites: Vec<LegacyFavorite>,
}

#[derive(Debug, Deserialize)]
struct LegacyFavorite {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(deserialize_with = "legacy_timestamp")]
    added: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LegacySearch {
    Alerts {
        state: String,
        #[serde(deserialize_with = "legacy_timestamp")]
        timestamp: DateTime<Utc>,
    },
    Forecast {
        #[serde(default)]
        location: Option<String>,
        latitude: f64,
        longitude: f64,
        #[serde(deserialize_with = "legacy_timestamp")]
        timestamp: DateTime<Utc>,
    },
}

impl LegacyDocument {
    /// A legacy file has `searches` and no `history`
    pub fn matches(value: &serde_json::Value) -> bool {
        value.get("searches").is_some() && value.get("history").is_none()
    }
}

impl From<LegacyDocument> for PersistedDocument {
    fn from(legacy: LegacyDocument) -> Self {
        let favorites: Vec<FavoriteLocation> = legacy
            .favorites
            .into_iter()
            .map(|f| FavoriteLocation {
                name: f.name,
                latitude: f.latitude,
                longitude: f.longitude,
                saved_at: f.added,
            })
            .collect();

        let history: Vec<HistoryEntry> = legacy
            .searches
            .into_iter()
            .map(|search| match search {
                LegacySearch::Alerts { state, timestamp } => HistoryEntry::new(
                    QueryParameters::Alert(AlertQuery {
                        state: state.trim().to_ascii_uppercase(),
                    }),
                    timestamp,
                ),
                LegacySearch::Forecast {
                    location,
                    latitude,
                    longitude,
                    timestamp,
                } => HistoryEntry::new(
                    QueryParameters::Forecast(ForecastQuery {
                        latitude,
                        longitude,
                        // "Unknown" was the old server's placeholder for no name
                        location_name: location.filter(|l| !l.is_empty() && l != "Unknown"),
                    }),
                    timestamp,
                ),
            })
            .collect();

        let created_at = history
            .iter()
            .map(HistoryEntry::timestamp)
            .chain(favorites.iter().map(|f| f.saved_at))
            .min()
            .unwrap_or_else(Utc::now);
        let mut stats = Stats::new(created_at);
        for entry in &history {
            stats.record(match entry {
                HistoryEntry::Alert { .. } => QueryType::Alert,
                HistoryEntry::Forecast { .. } => QueryType::Forecast,
            });
        }

        Self {
            favorites,
            history,
            stats,
        }
    }
}

/// Accepts RFC 3339, or a naive ISO timestamp taken as server-local time
fn legacy_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = raw
        .parse::<NaiveDateTime>()
        .map_err(serde::de::Error::custom)?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc()))
}
