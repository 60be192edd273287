//! Auxiliary weather context with a TTL cache.
//!
//! Fetches current conditions from Open-Meteo and caches them for the
//! configured refresh window so one observation serves a whole batch of
//! readings. Failures are resolved to `None` here — the record builder
//! never sees a fetch error, only a present-or-null auxiliary section.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::config::SealConfig;
use crate::error::SealError;

/// Open-Meteo forecast endpoint.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,pressure_msl,cloud_cover,wind_speed_10m,\
wind_direction_10m,weather_code";

struct CachedObservation {
    fetched_at: Instant,
    payload: Value,
}

/// Weather fetcher with an in-process TTL cache.
pub struct WeatherService {
    client: Client,
    latitude: f64,
    longitude: f64,
    refresh: Duration,
    cached: RwLock<Option<CachedObservation>>,
}

impl WeatherService {
    /// Create a weather service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &SealConfig) -> Result<Self, SealError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("veriseal/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SealError::Config {
                message: format!("failed to create weather client: {e}"),
            })?;

        Ok(Self {
            client,
            latitude: config.weather_latitude,
            longitude: config.weather_longitude,
            refresh: config.weather_refresh,
            cached: RwLock::new(None),
        })
    }

    /// Current conditions as a payload section, or `None` when the fetch
    /// fails. A fresh cached observation is served without a network
    /// call.
    #[instrument(skip(self))]
    pub async fn current(&self) -> Option<Value> {
        if let Ok(guard) = self.cached.read() {
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.refresh {
                    debug!("serving cached weather observation");
                    return Some(cached.payload.clone());
                }
            }
        }

        match self.fetch().await {
            Ok(payload) => {
                if let Ok(mut guard) = self.cached.write() {
                    *guard = Some(CachedObservation {
                        fetched_at: Instant::now(),
                        payload: payload.clone(),
                    });
                }
                Some(payload)
            },
            Err(e) => {
                warn!(error = %e, "weather fetch failed, recording null context");
                None
            },
        }
    }

    async fn fetch(&self) -> Result<Value, SealError> {
        let response = self
            .client
            .get(OPEN_METEO_URL)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SealError::Store {
                message: format!("weather request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SealError::Store {
                message: format!("weather HTTP error: {}", response.status()),
            });
        }

        let body: Value = response.json().await.map_err(|e| SealError::Store {
            message: format!("weather response malformed: {e}"),
        })?;

        Ok(observation_section(&body))
    }
}

/// Map an Open-Meteo `current` block into the payload's weather section.
fn observation_section(body: &Value) -> Value {
    let current = body.get("current").cloned().unwrap_or(Value::Null);
    let field = |name: &str| current.get(name).cloned().unwrap_or(Value::Null);

    json!({
        "temperature": field("temperature_2m"),
        "humidity": field("relative_humidity_2m"),
        "apparentTemperature": field("apparent_temperature"),
        "precipitation": field("precipitation"),
        "pressureMsl": field("pressure_msl"),
        "cloudCover": field("cloud_cover"),
        "windSpeed": field("wind_speed_10m"),
        "windDirection": field("wind_direction_10m"),
        "weatherCode": field("weather_code"),
        "observedAt": field("time"),
    })
}
