use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::{
    City, CurrentWeather, ForecastResponse, InsightRequest, InsightResponse, WeatherAnalytics,
    WeatherRecord,
};

use super::{ApiError, ApiResult, WeatherApi};

/// `WeatherApi` over HTTP. Holds only the base URL and a connection pool.
#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    base_url: String,
    http: Client,
}

impl HttpWeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        debug!(path, "GET");
        self.http.get(format!("{}{}", self.base_url, path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        debug!(path, "POST");
        self.http.post(format!("{}{}", self.base_url, path))
    }

    /// Send one request and decode the JSON body. Any failure collapses into
    /// `ApiError` carrying `failure`; the cause only reaches the log.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: &'static str,
    ) -> ApiResult<T> {
        let res = request.send().await.map_err(|err| {
            warn!(error = %err, "{failure}: transport error");
            ApiError::new(failure)
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            warn!(%status, error = %err, "{failure}: unreadable body");
            ApiError::new(failure)
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "{failure}");
            return Err(ApiError::new(failure));
        }

        serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, body = %truncate_body(&body), "{failure}: invalid JSON");
            ApiError::new(failure)
        })
    }
}

#[async_trait]
impl WeatherApi for HttpWeatherClient {
    async fn current_weather(&self, city: &str) -> ApiResult<CurrentWeather> {
        let primary = self
            .execute(
                self.get("/weather/current").query(&[("city", city)]),
                "Primary current weather request failed",
            )
            .await;

        match primary {
            Ok(weather) => Ok(weather),
            Err(_) => {
                warn!(city, "real API failed, using demo data");
                self.execute(
                    self.get("/demo/weather/current").query(&[("city", city)]),
                    "Failed to fetch weather data",
                )
                .await
            }
        }
    }

    async fn forecast(&self, city: &str) -> ApiResult<ForecastResponse> {
        self.execute(
            self.get("/weather/forecast").query(&[("city", city)]),
            "Failed to fetch forecast",
        )
        .await
    }

    async fn historical_weather(&self, city_id: i64, limit: u32) -> ApiResult<Vec<WeatherRecord>> {
        self.execute(
            self.get(&format!("/weather/historical/{city_id}"))
                .query(&[("limit", limit)]),
            "Failed to fetch historical weather",
        )
        .await
    }

    async fn weather_analytics(&self, city_id: i64, days: u32) -> ApiResult<WeatherAnalytics> {
        self.execute(
            self.get(&format!("/weather/analytics/{city_id}"))
                .query(&[("days", days)]),
            "Failed to fetch weather analytics",
        )
        .await
    }

    async fn latest_weather(&self, city_id: i64) -> ApiResult<WeatherRecord> {
        self.execute(
            self.get(&format!("/weather/latest/{city_id}")),
            "Failed to fetch latest weather",
        )
        .await
    }

    async fn all_cities(&self) -> ApiResult<Vec<City>> {
        self.execute(self.get("/cities/"), "Failed to fetch cities")
            .await
    }

    async fn search_cities(&self, query: &str) -> ApiResult<Vec<City>> {
        self.execute(
            self.get("/cities/search").query(&[("q", query)]),
            "Failed to search cities",
        )
        .await
    }

    async fn ai_insight(
        &self,
        city_id: i64,
        city_name: &str,
        query: &str,
    ) -> ApiResult<InsightResponse> {
        let body = InsightRequest {
            city_id,
            city_name: city_name.to_string(),
            query: query.to_string(),
        };

        self.execute(
            self.post("/insights/ai").json(&body),
            "Failed to get AI insight",
        )
        .await
    }

    async fn daily_summary(&self, city_id: i64, city_name: &str) -> ApiResult<InsightResponse> {
        self.execute(
            self.get(&format!("/insights/summary/{city_id}"))
                .query(&[("city_name", city_name)]),
            "Failed to get daily summary",
        )
        .await
    }

    async fn clothing_recommendation(
        &self,
        city_id: i64,
        city_name: &str,
    ) -> ApiResult<InsightResponse> {
        self.execute(
            self.get(&format!("/insights/clothing/{city_id}"))
                .query(&[("city_name", city_name)]),
            "Failed to get clothing recommendation",
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
