use crate::constants::RESPONSE_TAG;
use crate::document::{FavoriteLocation, HistoryEntry, Stats};
use crate::models::{Alert, DailyForecast};

/// Formats weather alerts into a human-readable string
pub fn format_alerts(state: &str, alerts: &[Alert]) -> String {
    let mut output = format!("{} Alerts for {}\n", RESPONSE_TAG, state);
    for (i, alert) in alerts.iter().enumerate() {
        if i > 0 {
            output.push_str("\n---\n");
        }
        output.push_str(&format!(
            "\nEvent: {}\nArea: {}\nSeverity: {}\n",
            alert.event, alert.area_desc, alert.severity
        ));
        if let Some(headline) = &alert.headline {
            output.push_str(&format!("Headline: {}\n", headline));
        }
        output.push_str(&format!(
            "Description: {}\n",
            alert.description.as_deref().unwrap_or("No description")
        ));
    }
    output
}

pub fn format_no_alerts(state: &str) -> String {
    format!("{} No active alerts for {}", RESPONSE_TAG, state)
}

/// Formats NWS forecast periods into a human-readable string
pub fn format_forecast(location: &str, periods: &[DailyForecast]) -> String {
    let mut output = format!("{} Forecast for {}\n", RESPONSE_TAG, location);
    for period in periods {
        output.push_str(&format!(
            "\n{}:\nTemperature: {}\u{00b0}{}\nWind: {} {}\nConditions: {}\nForecast: {}\n",
            period.name,
            period.temperature,
            period.temperature_unit,
            period.wind_speed,
            period.wind_direction,
            period.short_forecast,
            period.detailed_forecast
        ));
    }
    output
}

/// Display name for a forecast location: the given name, or the coordinates
pub fn location_label(location_name: Option<&str>, latitude: f64, longitude: f64) -> String {
    match location_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("{:.4}, {:.4}", latitude, longitude),
    }
}

pub fn format_favorite_saved(favorite: &FavoriteLocation) -> String {
    format!("{} Saved '{}' to favorites", RESPONSE_TAG, favorite.name)
}

pub fn format_favorites(favorites: &[FavoriteLocation]) -> String {
    if favorites.is_empty() {
        return format!("{} No favorite locations saved yet", RESPONSE_TAG);
    }

    let mut lines = vec![format!("{} Your Favorite Locations:\n", RESPONSE_TAG)];
    lines.extend(favorite_lines(favorites));
    lines.join("\n")
}

fn favorite_lines(favorites: &[FavoriteLocation]) -> impl Iterator<Item = String> + '_ {
    favorites
        .iter()
        .map(|f| format!("\u{2022} {} ({}, {})", f.name, f.latitude, f.longitude))
}

/// Formats history entries, which are expected newest first
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return format!("{} No search history yet", RESPONSE_TAG);
    }

    let mut lines = vec![format!("{} Recent Searches:\n", RESPONSE_TAG)];
    for entry in entries {
        let when = entry.timestamp().format("%Y-%m-%d %H:%M");
        let what = match entry {
            HistoryEntry::Alert { parameters, .. } => format!("Alerts for {}", parameters.state),
            HistoryEntry::Forecast { parameters, .. } => format!(
                "Forecast for {}",
                location_label(
                    parameters.location_name.as_deref(),
                    parameters.latitude,
                    parameters.longitude
                )
            ),
        };
        lines.push(format!("\u{2022} {}: {}", when, what));
    }
    lines.join("\n")
}

pub fn format_stats(stats: &Stats, favorites: usize) -> String {
    format!(
        "Usage Statistics\n================\nTotal searches: {}\nAlerts checked: {}\nForecasts checked: {}\nFavorite locations: {}\nTracking since: {}\n",
        stats.total_searches(),
        stats.alerts_checked(),
        stats.forecasts_checked(),
        favorites,
        stats.created_at().format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn server_info() -> String {
    format!(
        "Weather MCP Server v{}\n\
         =======================\n\
         Data Source: National Weather Service API\n\
         Coverage: United States only\n\n\
         Available Tools:\n\
         - get_alerts: Weather alerts by state\n\
         - get_forecast: 5-period forecast by coordinates\n\
         - save_favorite: Save favorite locations\n\
         - get_favorites: View saved locations\n\
         - get_history: View search history\n\
         - clear_history: Clear search history (keeps favorites)\n\n\
         This server remembers your favorite locations and search history.\n",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn quick_weather_prompt(favorites: &[FavoriteLocation]) -> String {
    let listing = if favorites.is_empty() {
        "(no favorites saved yet)".to_string()
    } else {
        favorite_lines(favorites).collect::<Vec<_>>().join("\n")
    };
    format!(
        "I'd like to check the weather. Here are my favorite locations:\n{}\n\nWhich location would you like to check?",
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AlertQuery, ForecastQuery, QueryParameters, QueryType};
    use chrono::{TimeZone, Utc};

    fn favorite(name: &str) -> FavoriteLocation {
        FavoriteLocation {
            name: name.to_string(),
            latitude: 40.7128,
            longitude: -74.006,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_alerts_lists_each_alert() {
        let alerts = vec![
            Alert {
                event: "Heat Advisory".into(),
                headline: Some("Hot".into()),
                description: None,
                severity: "Moderate".into(),
                area_desc: "Inland Empire".into(),
            },
            Alert {
                event: "Red Flag Warning".into(),
                headline: None,
                description: Some("Critical fire weather".into()),
                severity: "Severe".into(),
                area_desc: "Santa Ana Mountains".into(),
            },
        ];
        let text = format_alerts("CA", &alerts);
        assert!(text.starts_with("[Weather MCP Server] Alerts for CA"));
        assert!(text.contains("Event: Heat Advisory"));
        assert!(text.contains("Description: No description"));
        assert!(text.contains("Severity: Severe"));
        assert_eq!(text.matches("---").count(), 1);
    }

    #[test]
    fn test_location_label_falls_back_to_coordinates() {
        assert_eq!(location_label(Some("Home"), 1.0, 2.0), "Home");
        assert_eq!(location_label(Some("  "), 40.7128, -74.006), "40.7128, -74.0060");
        assert_eq!(location_label(None, 1.0, 2.0), "1.0000, 2.0000");
    }

    #[test]
    fn test_format_favorites() {
        assert!(format_favorites(&[]).contains("No favorite locations saved yet"));
        let text = format_favorites(&[favorite("Home")]);
        assert!(text.contains("\u{2022} Home (40.7128, -74.006)"));
    }

    #[test]
    fn test_format_history_lines() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 1, 9, 30, 0).unwrap();
        let entries = vec![
            HistoryEntry::new(
                QueryParameters::Forecast(ForecastQuery {
                    latitude: 47.6062,
                    longitude: -122.3321,
                    location_name: Some("Seattle".into()),
                }),
                ts,
            ),
            HistoryEntry::new(QueryParameters::Alert(AlertQuery { state: "TX".into() }), ts),
        ];
        let text = format_history(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "\u{2022} 2025-10-01 09:30: Forecast for Seattle");
        assert_eq!(lines[3], "\u{2022} 2025-10-01 09:30: Alerts for TX");
        assert!(format_history(&[]).contains("No search history yet"));
    }

    #[test]
    fn test_format_stats() {
        let mut stats = Stats::default();
        stats.record(QueryType::Alert);
        stats.record(QueryType::Forecast);
        let text = format_stats(&stats, 3);
        assert!(text.contains("Total searches: 2"));
        assert!(text.contains("Alerts checked: 1"));
        assert!(text.contains("Favorite locations: 3"));
    }

    #[test]
    fn test_quick_weather_prompt_lists_favorites() {
        let text = quick_weather_prompt(&[favorite("Home"), favorite("Work")]);
        assert!(text.contains("\u{2022} Home"));
        assert!(text.contains("\u{2022} Work"));
        assert!(quick_weather_prompt(&[]).contains("no favorites saved yet"));
    }
}
