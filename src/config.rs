use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_MEMORY_FILE, MAX_HISTORY_ENTRIES, NWS_API_BASE, REQUEST_TIMEOUT_SECS,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-weather-memory-server")]
#[command(about = "MCP weather server that remembers favorite locations and search history")]
#[command(version)]
pub struct Config {
    /// Path of the JSON memory file (created on first save)
    #[arg(long, env = "WEATHER_MEMORY_FILE", default_value = DEFAULT_MEMORY_FILE)]
    pub memory_file: PathBuf,

    /// Weather API base URL
    #[arg(long, env = "WEATHER_API_BASE", default_value = NWS_API_BASE)]
    pub api_base: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "WEATHER_REQUEST_TIMEOUT_SECS", default_value_t = REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Maximum number of history entries kept on disk
    #[arg(
        long,
        env = "WEATHER_HISTORY_CAP",
        default_value_t = MAX_HISTORY_ENTRIES,
        value_parser = parse_history_cap
    )]
    pub history_cap: usize,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_history_cap(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("history cap must be at least 1".to_string()),
        Ok(cap) => Ok(cap),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "mcp-weather-memory-server",
            "--memory-file",
            "/tmp/weather.json",
            "--api-base",
            "http://localhost:8080",
            "--request-timeout-secs",
            "5",
            "--history-cap",
            "25",
        ])
        .unwrap();

        assert_eq!(config.memory_file, PathBuf::from("/tmp/weather.json"));
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.history_cap, 25);
    }

    #[test]
    fn test_zero_history_cap_rejected() {
        let result = Config::try_parse_from(["mcp-weather-memory-server", "--history-cap", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_history_cap() {
        assert_eq!(parse_history_cap("100"), Ok(100));
        assert!(parse_history_cap("0").is_err());
        assert!(parse_history_cap("many").is_err());
    }
}
