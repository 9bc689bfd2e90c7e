//! In-memory `WeatherApi` for unit tests.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    client::{ApiError, ApiResult, WeatherApi},
    model::*,
};

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<String>,
    cities: Option<Vec<City>>,
    search_results: HashMap<String, Vec<City>>,
    search_delays: HashMap<String, Duration>,
    failing_searches: Vec<String>,
    weather: HashMap<String, CurrentWeather>,
    forecast: Option<ForecastResponse>,
    records: Vec<WeatherRecord>,
    analytics: Option<WeatherAnalytics>,
    insights_fail: bool,
}

/// Scriptable fake. Unset responses fail with a generic `ApiError`.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    fn record(&self, call: String) {
        self.with(|i| i.calls.push(call));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|i| i.calls.clone())
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn set_cities(&self, cities: Vec<City>) {
        self.with(|i| i.cities = Some(cities));
    }

    pub fn set_search(&self, query: &str, results: Vec<City>) {
        self.with(|i| i.search_results.insert(query.to_string(), results));
    }

    pub fn set_search_delay(&self, query: &str, delay: Duration) {
        self.with(|i| i.search_delays.insert(query.to_string(), delay));
    }

    pub fn fail_search(&self, query: &str) {
        self.with(|i| i.failing_searches.push(query.to_string()));
    }

    pub fn set_weather(&self, weather: CurrentWeather) {
        self.with(|i| i.weather.insert(weather.name.clone(), weather));
    }

    pub fn set_forecast(&self, forecast: ForecastResponse) {
        self.with(|i| i.forecast = Some(forecast));
    }

    pub fn set_records(&self, records: Vec<WeatherRecord>) {
        self.with(|i| i.records = records);
    }

    pub fn set_analytics(&self, analytics: Option<WeatherAnalytics>) {
        self.with(|i| i.analytics = analytics);
    }

    pub fn fail_insights(&self) {
        self.with(|i| i.insights_fail = true);
    }

    fn insight(
        &self,
        city_id: i64,
        city_name: &str,
        query: &str,
        text: &str,
    ) -> ApiResult<InsightResponse> {
        if self.with(|i| i.insights_fail) {
            return Err(ApiError::new("Failed to get AI insight"));
        }
        Ok(InsightResponse {
            city_id,
            city_name: city_name.to_string(),
            query: query.to_string(),
            insight: text.to_string(),
        })
    }
}

#[async_trait]
impl WeatherApi for FakeApi {
    async fn current_weather(&self, city: &str) -> ApiResult<CurrentWeather> {
        self.record(format!("current:{city}"));
        self.with(|i| i.weather.get(city).cloned())
            .ok_or_else(|| ApiError::new("Failed to fetch weather data"))
    }

    async fn forecast(&self, city: &str) -> ApiResult<ForecastResponse> {
        self.record(format!("forecast:{city}"));
        self.with(|i| i.forecast.clone())
            .ok_or_else(|| ApiError::new("Failed to fetch forecast"))
    }

    async fn historical_weather(&self, city_id: i64, limit: u32) -> ApiResult<Vec<WeatherRecord>> {
        self.record(format!("historical:{city_id}:{limit}"));
        Ok(self.with(|i| i.records.clone()))
    }

    async fn weather_analytics(&self, city_id: i64, days: u32) -> ApiResult<WeatherAnalytics> {
        self.record(format!("analytics:{city_id}:{days}"));
        self.with(|i| i.analytics.clone())
            .ok_or_else(|| ApiError::new("Failed to fetch weather analytics"))
    }

    async fn latest_weather(&self, city_id: i64) -> ApiResult<WeatherRecord> {
        self.record(format!("latest:{city_id}"));
        self.with(|i| i.records.first().cloned())
            .ok_or_else(|| ApiError::new("Failed to fetch latest weather"))
    }

    async fn all_cities(&self) -> ApiResult<Vec<City>> {
        self.record("cities".to_string());
        self.with(|i| i.cities.clone())
            .ok_or_else(|| ApiError::new("Failed to fetch cities"))
    }

    async fn search_cities(&self, query: &str) -> ApiResult<Vec<City>> {
        self.record(format!("search:{query}"));
        let delay = self.with(|i| i.search_delays.get(query).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.with(|i| i.failing_searches.iter().any(|q| q == query)) {
            return Err(ApiError::new("Failed to search cities"));
        }
        Ok(self.with(|i| i.search_results.get(query).cloned().unwrap_or_default()))
    }

    async fn ai_insight(
        &self,
        city_id: i64,
        city_name: &str,
        query: &str,
    ) -> ApiResult<InsightResponse> {
        self.record(format!("ai:{city_id}:{query}"));
        self.insight(city_id, city_name, query, "custom answer")
    }

    async fn daily_summary(&self, city_id: i64, city_name: &str) -> ApiResult<InsightResponse> {
        self.record(format!("summary:{city_id}"));
        self.insight(city_id, city_name, "", "summary answer")
    }

    async fn clothing_recommendation(
        &self,
        city_id: i64,
        city_name: &str,
    ) -> ApiResult<InsightResponse> {
        self.record(format!("clothing:{city_id}"));
        self.insight(city_id, city_name, "", "clothing answer")
    }
}

pub fn city(id: i64, name: &str) -> City {
    City {
        id,
        city_id: id * 1000,
        name: name.to_string(),
        country: "XX".to_string(),
        latitude: 0.0,
        longitude: 0.0,
        timezone: 0,
        created_at: None,
    }
}

pub fn current_weather(id: i64, name: &str) -> CurrentWeather {
    CurrentWeather {
        coord: Coordinates { lat: 1.0, lon: 2.0 },
        weather: vec![WeatherCondition {
            id: 800,
            main: "Clear".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
        }],
        main: MainWeatherData {
            temp: 15.5,
            feels_like: 14.2,
            temp_min: 13.0,
            temp_max: 17.0,
            pressure: 1013,
            humidity: 72,
            sea_level: None,
            grnd_level: None,
        },
        visibility: 10000,
        wind: Wind { speed: 3.5, deg: 230, gust: None },
        clouds: Clouds { all: 0 },
        rain: None,
        snow: None,
        dt: 1_700_000_000,
        sys: Sys { country: "GB".to_string(), sunrise: 1_699_990_000, sunset: 1_700_030_000 },
        timezone: 0,
        id,
        name: name.to_string(),
    }
}

pub fn forecast(name: &str, temps: &[f64]) -> ForecastResponse {
    let base = current_weather(1, name);
    let list = temps
        .iter()
        .zip(0..)
        .map(|(&temp, step)| ForecastItem {
            dt: base.dt + step * 10_800,
            main: MainWeatherData { temp, ..base.main.clone() },
            weather: base.weather.clone(),
            clouds: base.clouds.clone(),
            wind: base.wind.clone(),
            visibility: base.visibility,
            pop: 0.2,
            dt_txt: format!("2023-11-14 {:02}:00:00", (step * 3) % 24),
            rain: None,
            snow: None,
        })
        .collect();

    ForecastResponse {
        list,
        city: ForecastCity {
            id: 2643743,
            name: name.to_string(),
            coord: base.coord,
            country: "GB".to_string(),
            population: None,
            timezone: 0,
            sunrise: base.sys.sunrise,
            sunset: base.sys.sunset,
        },
    }
}

pub fn record(temperature: f64, recorded_at: &str) -> WeatherRecord {
    WeatherRecord {
        id: None,
        city_id: 1,
        city_name: "London".to_string(),
        country: "GB".to_string(),
        latitude: 51.5,
        longitude: -0.12,
        temperature,
        feels_like: temperature - 1.0,
        temp_min: temperature - 2.0,
        temp_max: temperature + 2.0,
        pressure: 1013,
        humidity: 70,
        wind_speed: 3.0,
        wind_direction: 200,
        cloudiness: 10,
        visibility: 10000,
        weather_main: "Clouds".to_string(),
        weather_description: "few clouds".to_string(),
        weather_icon: "02d".to_string(),
        recorded_at: recorded_at.to_string(),
        created_at: None,
    }
}

pub fn analytics(total_records: u32) -> WeatherAnalytics {
    WeatherAnalytics {
        city_name: "London".to_string(),
        country: "GB".to_string(),
        period_start: "2024-01-01T00:00:00".to_string(),
        period_end: "2024-01-08T00:00:00".to_string(),
        avg_temperature: 11.2,
        max_temperature: 14.0,
        min_temperature: 8.5,
        avg_humidity: 76.0,
        avg_wind_speed: 4.2,
        most_common_condition: "Clouds".to_string(),
        total_records,
    }
}
