use std::{fmt, sync::Arc};

use tracing::error;

use crate::{
    client::{DEFAULT_HISTORY_LIMIT, WeatherApi},
    model::{City, WeatherAnalytics, WeatherRecord},
};

/// At or below this many records the summary is flagged as unreliable.
pub const LOW_DATA_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    ThreeDays,
    #[default]
    Week,
    TwoWeeks,
    Month,
}

impl TimeWindow {
    pub const fn all() -> &'static [TimeWindow] {
        &[
            TimeWindow::Day,
            TimeWindow::ThreeDays,
            TimeWindow::Week,
            TimeWindow::TwoWeeks,
            TimeWindow::Month,
        ]
    }

    pub fn days(self) -> u32 {
        match self {
            TimeWindow::Day => 1,
            TimeWindow::ThreeDays => 3,
            TimeWindow::Week => 7,
            TimeWindow::TwoWeeks => 14,
            TimeWindow::Month => 30,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::all().iter().copied().find(|w| w.days() == days)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::Day => "Last 24 hours",
            TimeWindow::ThreeDays => "Last 3 days",
            TimeWindow::Week => "Last 7 days",
            TimeWindow::TwoWeeks => "Last 14 days",
            TimeWindow::Month => "Last 30 days",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One x-position across all trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub pressure: i64,
}

impl From<&WeatherRecord> for ChartPoint {
    fn from(record: &WeatherRecord) -> Self {
        let time = match record.recorded_at_utc() {
            Some(at) => at.format("%b %-d, %H").to_string(),
            None => record.recorded_at.clone(),
        };
        Self {
            time,
            temperature: record.temperature,
            feels_like: record.feels_like,
            humidity: record.humidity,
            wind_speed: record.wind_speed,
            pressure: record.pressure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoCitySelected,
    NoRecords,
}

/// Historical trends and backend aggregates for one city.
#[derive(Debug)]
pub struct AnalyticsView {
    api: Arc<dyn WeatherApi>,
    history_limit: u32,
    window: TimeWindow,
    city: Option<City>,
    records: Vec<WeatherRecord>,
    analytics: Option<WeatherAnalytics>,
    loading: bool,
}

impl AnalyticsView {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            history_limit: DEFAULT_HISTORY_LIMIT,
            window: TimeWindow::default(),
            city: None,
            records: Vec::new(),
            analytics: None,
            loading: false,
        }
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Resolve `name` through the current-weather endpoint and load its data.
    pub async fn select_city(&mut self, name: &str) {
        self.loading = true;

        match self.api.current_weather(name).await {
            Ok(weather) => {
                self.city = Some(weather.to_city());
                self.load().await;
            }
            Err(err) => {
                error!(error = %err, city = name, "Failed to load city");
                self.clear();
                self.loading = false;
            }
        }
    }

    /// Change the window and, with a city selected, refetch both series.
    pub async fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
        if self.city.is_some() {
            self.load().await;
        }
    }

    /// Fetch records and aggregates for the selected city, replacing whatever
    /// was shown before.
    pub async fn load(&mut self) {
        let Some(city_id) = self.city.as_ref().map(|c| c.city_id) else {
            return;
        };
        self.loading = true;

        let fetched = tokio::try_join!(
            self.api.historical_weather(city_id, self.history_limit),
            self.api.weather_analytics(city_id, self.window.days()),
        );

        match fetched {
            Ok((records, analytics)) => {
                self.records = records;
                self.analytics = Some(analytics);
            }
            Err(err) => {
                error!(error = %err, city_id, "Failed to load analytics");
                self.clear();
            }
        }

        self.loading = false;
    }

    /// Chart input in ascending time order.
    ///
    /// The backend returns newest first, so the records are reversed; a stable
    /// sort on the parsed timestamp then fixes up any other ordering.
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        let mut ordered: Vec<&WeatherRecord> = self.records.iter().rev().collect();
        ordered.sort_by_key(|r| r.recorded_at_utc());
        ordered.into_iter().map(ChartPoint::from).collect()
    }

    /// Record count to warn about when the aggregates rest on too little data.
    pub fn low_data_advisory(&self) -> Option<u32> {
        self.analytics
            .as_ref()
            .map(|a| a.total_records)
            .filter(|&n| n <= LOW_DATA_THRESHOLD)
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.loading {
            return None;
        }
        match &self.city {
            None => Some(EmptyState::NoCitySelected),
            Some(_) if self.records.is_empty() => Some(EmptyState::NoRecords),
            Some(_) => None,
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn city(&self) -> Option<&City> {
        self.city.as_ref()
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn analytics(&self) -> Option<&WeatherAnalytics> {
        self.analytics.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn clear(&mut self) {
        self.records.clear();
        self.analytics = None;
    }
}
