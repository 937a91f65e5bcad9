use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use slackmate_core::config::WeatherConfig;
use slackmate_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

use crate::{require_f64, require_str, Tool, ToolContext, ToolSchema};

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub temperature: f64,
    /// WMO weather interpretation code.
    pub weather_code: i64,
    pub humidity: f64,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather>;
}

/// Open-Meteo forecast API. No key required.
pub struct OpenMeteoClient {
    client: Client,
    api_base: String,
}

impl OpenMeteoClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(&config.api_base)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: ForecastCurrent,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    temperature_2m: f64,
    weathercode: i64,
    relativehumidity_2m: f64,
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather> {
        let url = format!("{}/forecast", self.api_base);
        debug!(latitude, longitude, "Fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "current",
                    "temperature_2m,weathercode,relativehumidity_2m".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Tool(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Tool(format!(
                "Weather API returned HTTP {}",
                response.status()
            )));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| Error::Tool(format!("Failed to parse weather response: {}", e)))?;

        Ok(CurrentWeather {
            temperature: body.current.temperature_2m,
            weather_code: body.current.weathercode,
            humidity: body.current.relativehumidity_2m,
        })
    }
}

// ============ getWeather ============

pub struct GetWeatherTool;

#[async_trait]
impl Tool for GetWeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "getWeather",
            description: "Get the current weather at a location",
            parameters: json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" },
                    "city": { "type": "string" }
                },
                "required": ["latitude", "longitude", "city"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        require_f64(params, "latitude")?;
        require_f64(params, "longitude")?;
        require_str(params, "city")?;
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let latitude = require_f64(&params, "latitude")?;
        let longitude = require_f64(&params, "longitude")?;
        let city = require_str(&params, "city")?;

        ctx.status
            .set_status(&format!("is getting weather for {}...", city))
            .await;

        let weather = ctx.weather.current(latitude, longitude).await?;
        Ok(json!({
            "temperature": weather.temperature,
            "weatherCode": weather.weather_code,
            "humidity": weather.humidity,
            "city": city,
        }))
    }
}
