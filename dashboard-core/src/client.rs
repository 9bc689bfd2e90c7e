use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{
    City, CurrentWeather, ForecastResponse, InsightResponse, WeatherAnalytics, WeatherRecord,
};

pub mod http;

pub use http::HttpWeatherClient;

pub const DEFAULT_HISTORY_LIMIT: u32 = 100;
pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;

/// Failure of a single backend call.
///
/// Carries a human-readable message and nothing else. Transport errors,
/// non-success statuses and undecodable bodies all map to this; the detail
/// is only logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Typed access to the weather backend.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Current conditions. Falls back to the demo endpoint once if the
    /// primary endpoint fails.
    async fn current_weather(&self, city: &str) -> ApiResult<CurrentWeather>;

    async fn forecast(&self, city: &str) -> ApiResult<ForecastResponse>;

    async fn historical_weather(&self, city_id: i64, limit: u32) -> ApiResult<Vec<WeatherRecord>>;

    async fn weather_analytics(&self, city_id: i64, days: u32) -> ApiResult<WeatherAnalytics>;

    async fn latest_weather(&self, city_id: i64) -> ApiResult<WeatherRecord>;

    async fn all_cities(&self) -> ApiResult<Vec<City>>;

    async fn search_cities(&self, query: &str) -> ApiResult<Vec<City>>;

    async fn ai_insight(
        &self,
        city_id: i64,
        city_name: &str,
        query: &str,
    ) -> ApiResult<InsightResponse>;

    async fn daily_summary(&self, city_id: i64, city_name: &str) -> ApiResult<InsightResponse>;

    async fn clothing_recommendation(
        &self,
        city_id: i64,
        city_name: &str,
    ) -> ApiResult<InsightResponse>;
}
