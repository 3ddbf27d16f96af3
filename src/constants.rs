/// User agent string for HTTP requests
pub const USER_AGENT: &str = "mcp-weather-memory-server/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Upstream request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default location of the persisted memory document
pub const DEFAULT_MEMORY_FILE: &str = "weather_memory.json";

/// Number of history entries returned when the caller gives no limit
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Upper bound on stored history entries; oldest entries are evicted first
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Number of forecast periods returned per lookup
pub const FORECAST_PERIODS: usize = 5;

/// Prefix for every user-facing response
pub const RESPONSE_TAG: &str = "[Weather MCP Server]";

pub const INFO_RESOURCE_URI: &str = "weather://info";
pub const STATS_RESOURCE_URI: &str = "weather://stats";

pub const QUICK_WEATHER_PROMPT: &str = "quick_weather_prompt";

/// State and territory codes accepted by the NWS alerts endpoint
pub const US_AREA_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP",
];
