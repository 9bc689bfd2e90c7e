use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::error;

use crate::{
    client::WeatherApi,
    model::{CurrentWeather, ForecastResponse},
};

pub const WEATHER_ERROR: &str = "Failed to fetch weather data";
pub const FORECAST_ERROR: &str = "Failed to fetch forecast";

/// Current conditions for whichever city the search hands over.
#[derive(Debug)]
pub struct HomeView {
    api: Arc<dyn WeatherApi>,
    weather: Option<CurrentWeather>,
    forecast: Option<ForecastResponse>,
    loading: bool,
    error: Option<String>,
}

impl HomeView {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            weather: None,
            forecast: None,
            loading: false,
            error: None,
        }
    }

    pub async fn show_city(&mut self, name: &str) {
        self.loading = true;
        self.error = None;

        match self.api.current_weather(name).await {
            Ok(weather) => self.weather = Some(weather),
            Err(err) => {
                error!(error = %err, city = name, "current weather failed");
                self.error = Some(WEATHER_ERROR.to_string());
            }
        }

        self.loading = false;
    }

    pub async fn load_forecast(&mut self, name: &str) {
        self.loading = true;
        self.error = None;

        match self.api.forecast(name).await {
            Ok(forecast) => self.forecast = Some(forecast),
            Err(err) => {
                error!(error = %err, city = name, "forecast failed");
                self.forecast = None;
                self.error = Some(FORECAST_ERROR.to_string());
            }
        }

        self.loading = false;
    }

    pub fn weather(&self) -> Option<&CurrentWeather> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastResponse> {
        self.forecast.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.1}°C")
}

pub fn format_visibility(metres: i64) -> String {
    format!("{:.1} km", metres as f64 / 1000.0)
}

/// Render a unix timestamp in the location's own offset.
pub fn format_local_time(unix: i64, offset_secs: i64) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp(unix, 0) else {
        return "--".to_string();
    };
    match i32::try_from(offset_secs).ok().and_then(FixedOffset::east_opt) {
        Some(offset) => utc.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string(),
        None => utc.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}
