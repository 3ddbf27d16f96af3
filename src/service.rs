use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{
        AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
        Implementation, ListPromptsResult, ListResourcesResult, PaginatedRequestParam, Prompt,
        PromptMessage, PromptMessageRole, ProtocolVersion, RawResource, ReadResourceRequestParam,
        ReadResourceResult, Resource, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer,
};
use serde_json::json;

use crate::constants::{INFO_RESOURCE_URI, QUICK_WEATHER_PROMPT, RESPONSE_TAG, STATS_RESOURCE_URI};
use crate::document::{AlertQuery, ForecastQuery, QueryParameters};
use crate::error::WeatherError;
use crate::formatters::{
    format_alerts, format_favorite_saved, format_favorites, format_forecast, format_history,
    format_no_alerts, format_stats, location_label, quick_weather_prompt, server_info,
};
use crate::models::{
    normalize_state_code, validate_coordinates, AlertsOutcome, GetAlertsRequest,
    GetForecastRequest, GetHistoryRequest, SaveFavoriteRequest,
};
use crate::store::StateStore;
use crate::weather::WeatherClient;

/// MCP server exposing weather lookups and the persisted user memory
#[derive(Clone)]
pub struct WeatherServer {
    store: Arc<StateStore>,
    weather: Arc<WeatherClient>,
    tool_router: ToolRouter<Self>,
}

impl WeatherServer {
    pub fn new(store: Arc<StateStore>, weather: WeatherClient) -> Self {
        Self {
            store,
            weather: Arc::new(weather),
            tool_router: Self::tool_router(),
        }
    }

    /// Records a lookup in history. A failed write is logged; the lookup still proceeds.
    fn remember(&self, parameters: QueryParameters) {
        if let Err(e) = self.store.record_history(parameters) {
            tracing::warn!("Search not written to memory file: {}", e);
        }
    }

    fn resource_text(&self, uri: &str) -> Result<String, McpError> {
        match uri {
            INFO_RESOURCE_URI => Ok(server_info()),
            STATS_RESOURCE_URI => Ok(format_stats(
                &self.store.stats(),
                self.store.list_favorites().len(),
            )),
            _ => Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            )),
        }
    }

    fn resource(uri: &str, name: &str, description: &str) -> Resource {
        let mut raw = RawResource::new(uri, name.to_string());
        raw.description = Some(description.to_string());
        raw.mime_type = Some("text/plain".to_string());
        raw.no_annotation()
    }
}

/// Text for a mutation that was applied in memory but could not be written to disk
fn session_only(message: &str, err: &WeatherError) -> CallToolResult {
    CallToolResult::success(vec![Content::text(format!(
        "{} (kept for this session only; memory file could not be written: {})",
        message, err
    ))])
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "mcp-weather-memory".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "A weather information service powered by the National Weather Service API. \
                Provides weather alerts and forecasts for US locations, and remembers \
                favorite locations and search history."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![
            Self::resource(INFO_RESOURCE_URI, "info", "Information about this weather server"),
            Self::resource(STATS_RESOURCE_URI, "stats", "Usage statistics"),
        ]))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = self.resource_text(&uri)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(vec![Prompt::new(
            QUICK_WEATHER_PROMPT,
            Some("Template for quick weather checks"),
            None,
        )]))
    }

    async fn get_prompt(
        &self,
        GetPromptRequestParam { name, .. }: GetPromptRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if name != QUICK_WEATHER_PROMPT {
            return Err(McpError::invalid_params(
                format!("Unknown prompt: {}", name),
                None,
            ));
        }
        Ok(GetPromptResult {
            description: Some("Template for quick weather checks".to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                quick_weather_prompt(&self.store.list_favorites()),
            )],
        })
    }
}

#[tool_router]
impl WeatherServer {
    /// Gets active weather alerts for a US state
    #[tool(description = "Get active weather alerts for a US state. Provide a two-letter state code (e.g., 'CA' for California, 'NY' for New York).")]
    async fn get_alerts(
        &self,
        Parameters(request): Parameters<GetAlertsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting alerts for state: {}", request.state);

        let state = normalize_state_code(&request.state)?;
        self.remember(QueryParameters::Alert(AlertQuery {
            state: state.clone(),
        }));

        let formatted = match self.weather.get_alerts(&state).await? {
            AlertsOutcome::Active(alerts) => format_alerts(&state, &alerts),
            AlertsOutcome::NoActiveAlerts => format_no_alerts(&state),
        };

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Gets the weather forecast for a US location
    #[tool(description = "Get the weather forecast for a US location. Provide latitude and longitude (e.g., latitude: 40.7128, longitude: -74.0060 for New York) and optionally a location name to show in history.")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<GetForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting forecast for coordinates: {}, {}",
            request.latitude,
            request.longitude
        );

        validate_coordinates(request.latitude, request.longitude)?;
        let location_name = request
            .location_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let label = location_label(location_name.as_deref(), request.latitude, request.longitude);

        self.remember(QueryParameters::Forecast(ForecastQuery {
            latitude: request.latitude,
            longitude: request.longitude,
            location_name,
        }));

        let periods = self
            .weather
            .get_forecast(request.latitude, request.longitude)
            .await?;

        Ok(CallToolResult::success(vec![Content::text(
            format_forecast(&label, &periods),
        )]))
    }

    /// Saves a named location
    #[tool(description = "Save a favorite location for quick access. Provide a name, latitude and longitude.")]
    async fn save_favorite(
        &self,
        Parameters(request): Parameters<SaveFavoriteRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Saving favorite: {}", request.name);

        match self
            .store
            .add_favorite(&request.name, request.latitude, request.longitude)
        {
            Ok(favorite) => Ok(CallToolResult::success(vec![Content::text(
                format_favorite_saved(&favorite),
            )])),
            Err(WeatherError::DuplicateFavorite(name)) => {
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "{} Location '{}' already saved as favorite",
                    RESPONSE_TAG, name
                ))]))
            }
            Err(e @ WeatherError::Persistence(_)) => Ok(session_only(
                &format!("{} Saved '{}' to favorites", RESPONSE_TAG, request.name.trim()),
                &e,
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[tool(description = "Get all saved favorite locations")]
    async fn get_favorites(&self) -> Result<CallToolResult, McpError> {
        let favorites = self.store.list_favorites();
        Ok(CallToolResult::success(vec![Content::text(
            format_favorites(&favorites),
        )]))
    }

    #[tool(description = "Get recent search history, newest first. Optionally provide a limit (default 10).")]
    async fn get_history(
        &self,
        Parameters(request): Parameters<GetHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting search history (limit: {:?})", request.limit);

        let entries = self.store.list_history(request.limit)?;
        Ok(CallToolResult::success(vec![Content::text(
            format_history(&entries),
        )]))
    }

    #[tool(description = "Clear all search history (keeps favorites and usage statistics)")]
    async fn clear_history(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Clearing search history");

        let message = format!("{} Search history cleared", RESPONSE_TAG);
        match self.store.clear_history() {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(message)])),
            Err(e @ WeatherError::Persistence(_)) => Ok(session_only(&message, &e)),
            Err(e) => Err(e.into()),
        }
    }
}
