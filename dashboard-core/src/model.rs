use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainWeatherData {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnd_level: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: i64,
}

/// Rain or snow volume in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Current conditions for one location, as returned by `/weather/current`
/// and its demo counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub coord: Coordinates,
    pub weather: Vec<WeatherCondition>,
    pub main: MainWeatherData,
    pub visibility: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
    /// Unix seconds.
    pub dt: i64,
    pub sys: Sys,
    /// Offset from UTC in seconds.
    pub timezone: i64,
    pub id: i64,
    pub name: String,
}

impl CurrentWeather {
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    /// City summary derived from this snapshot. The backend keys its
    /// historical data by the upstream id, so `id` and `city_id` coincide.
    pub fn to_city(&self) -> City {
        City {
            id: self.id,
            city_id: self.id,
            name: self.name.clone(),
            country: self.sys.country.clone(),
            latitude: self.coord.lat,
            longitude: self.coord.lon,
            timezone: self.timezone,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: MainWeatherData,
    pub weather: Vec<WeatherCondition>,
    pub clouds: Clouds,
    pub wind: Wind,
    pub visibility: i64,
    /// Probability of precipitation, 0..=1.
    pub pop: f64,
    pub dt_txt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub id: i64,
    pub name: String,
    pub coord: Coordinates,
    pub country: String,
    #[serde(default)]
    pub population: Option<i64>,
    pub timezone: i64,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastItem>,
    pub city: ForecastCity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub city_id: i64,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One stored observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub city_id: i64,
    pub city_name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub wind_direction: i64,
    pub cloudiness: i64,
    pub visibility: i64,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub recorded_at: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl WeatherRecord {
    pub fn recorded_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.recorded_at)
    }
}

/// Aggregates over a time window, computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAnalytics {
    pub city_name: String,
    pub country: String,
    pub period_start: String,
    pub period_end: String,
    pub avg_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub avg_humidity: f64,
    pub avg_wind_speed: f64,
    pub most_common_condition: String,
    pub total_records: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub city_id: i64,
    pub city_name: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResponse {
    pub city_id: i64,
    pub city_name: String,
    #[serde(default)]
    pub query: String,
    pub insight: String,
}

/// Parse a backend timestamp. Accepts RFC 3339 and naive ISO-8601 (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|ndt| ndt.and_utc())
}
