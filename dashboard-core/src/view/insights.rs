use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use crate::{
    client::WeatherApi,
    model::{City, InsightResponse},
};

pub const SUGGESTED_QUERIES: [&str; 5] = [
    "What will the weather be like this weekend?",
    "Is it a good day for outdoor activities?",
    "Should I bring an umbrella today?",
    "How does today compare to yesterday?",
    "What are the weather trends this week?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsightMode {
    #[default]
    Summary,
    Clothing,
    Custom,
}

/// User-facing message for a failed insight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsightAlert {
    #[error("Failed to get AI insight. Make sure you have configured your OpenAI API key.")]
    Custom,
    #[error("Failed to get daily summary. Make sure you have configured your OpenAI API key.")]
    Summary,
    #[error(
        "Failed to get clothing recommendation. Make sure you have configured your OpenAI API key."
    )]
    Clothing,
}

impl From<InsightMode> for InsightAlert {
    fn from(mode: InsightMode) -> Self {
        match mode {
            InsightMode::Summary => InsightAlert::Summary,
            InsightMode::Clothing => InsightAlert::Clothing,
            InsightMode::Custom => InsightAlert::Custom,
        }
    }
}

/// AI insights for a chosen city, with a session history (newest first).
#[derive(Debug)]
pub struct InsightsView {
    api: Arc<dyn WeatherApi>,
    cities: Vec<City>,
    selected: Option<City>,
    mode: InsightMode,
    history: Vec<InsightResponse>,
    loading: bool,
}

impl InsightsView {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            cities: Vec::new(),
            selected: None,
            mode: InsightMode::default(),
            history: Vec::new(),
            loading: false,
        }
    }

    /// Populate the city picker and preselect its first entry.
    pub async fn load_cities(&mut self) {
        match self.api.all_cities().await {
            Ok(cities) => {
                self.selected = cities.first().cloned();
                self.cities = cities;
            }
            Err(err) => warn!(error = %err, "Failed to load cities"),
        }
    }

    /// Select by local id. Unknown ids leave the selection unchanged.
    pub fn select_city(&mut self, id: i64) -> bool {
        match self.cities.iter().find(|c| c.id == id) {
            Some(city) => {
                self.selected = Some(city.clone());
                true
            }
            None => false,
        }
    }

    /// Select by case-insensitive name.
    pub fn select_city_named(&mut self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        let id = self
            .cities
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .map(|c| c.id);
        id.is_some_and(|id| self.select_city(id))
    }

    pub fn set_mode(&mut self, mode: InsightMode) {
        self.mode = mode;
    }

    /// Free-form question. Does nothing without a city or with a blank query.
    pub async fn ask(&mut self, query: &str) -> Result<Option<&InsightResponse>, InsightAlert> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        self.request(InsightMode::Custom, query).await
    }

    pub async fn daily_summary(&mut self) -> Result<Option<&InsightResponse>, InsightAlert> {
        self.request(InsightMode::Summary, "").await
    }

    pub async fn clothing_advice(&mut self) -> Result<Option<&InsightResponse>, InsightAlert> {
        self.request(InsightMode::Clothing, "").await
    }

    async fn request(
        &mut self,
        mode: InsightMode,
        query: &str,
    ) -> Result<Option<&InsightResponse>, InsightAlert> {
        let Some(city) = self.selected.clone() else {
            return Ok(None);
        };
        self.mode = mode;
        self.loading = true;

        let outcome = match mode {
            InsightMode::Custom => self.api.ai_insight(city.city_id, &city.name, query).await,
            InsightMode::Summary => self.api.daily_summary(city.city_id, &city.name).await,
            InsightMode::Clothing => {
                self.api
                    .clothing_recommendation(city.city_id, &city.name)
                    .await
            }
        };
        self.loading = false;

        match outcome {
            Ok(insight) => {
                self.history.insert(0, insight);
                Ok(self.history.first())
            }
            Err(err) => {
                error!(error = %err, ?mode, city = %city.name, "insight request failed");
                Err(mode.into())
            }
        }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn selected(&self) -> Option<&City> {
        self.selected.as_ref()
    }

    pub fn mode(&self) -> InsightMode {
        self.mode
    }

    pub fn history(&self) -> &[InsightResponse] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, city};

    fn api_with_cities() -> FakeApi {
        let api = FakeApi::new();
        api.set_cities(vec![city(1, "London"), city(2, "Paris")]);
        api
    }

    #[tokio::test]
    async fn first_city_is_preselected() {
        let api = api_with_cities();
        let mut view = InsightsView::new(Arc::new(api));

        view.load_cities().await;

        assert_eq!(view.selected().unwrap().name, "London");
        assert_eq!(view.cities().len(), 2);
    }

    #[tokio::test]
    async fn history_is_most_recent_first() {
        let api = api_with_cities();
        let mut view = InsightsView::new(Arc::new(api.clone()));
        view.load_cities().await;

        view.daily_summary().await.unwrap();
        assert!(view.select_city(2));
        view.clothing_advice().await.unwrap();
        view.ask("Should I bring an umbrella today?").await.unwrap();

        let texts: Vec<_> = view.history().iter().map(|i| i.insight.as_str()).collect();
        assert_eq!(texts, ["custom answer", "clothing answer", "summary answer"]);
        assert_eq!(view.history()[0].city_name, "Paris");
        assert_eq!(view.mode(), InsightMode::Custom);
        assert_eq!(
            api.calls_starting_with("ai"),
            vec!["ai:2000:Should I bring an umbrella today?"]
        );
    }

    #[tokio::test]
    async fn blank_query_issues_no_request() {
        let api = api_with_cities();
        let mut view = InsightsView::new(Arc::new(api.clone()));
        view.load_cities().await;

        let res = view.ask("   ").await.unwrap();

        assert!(res.is_none());
        assert!(api.calls_starting_with("ai").is_empty());
    }

    #[tokio::test]
    async fn nothing_happens_without_a_city() {
        let api = FakeApi::new();
        let mut view = InsightsView::new(Arc::new(api.clone()));
        view.load_cities().await;

        assert!(view.daily_summary().await.unwrap().is_none());
        assert_eq!(api.calls(), vec!["cities"]);
        assert!(view.cities().is_empty());
    }

    #[tokio::test]
    async fn failure_returns_configuration_alert() {
        let api = api_with_cities();
        api.fail_insights();
        let mut view = InsightsView::new(Arc::new(api));
        view.load_cities().await;

        let alert = view.clothing_advice().await.unwrap_err();

        assert_eq!(alert, InsightAlert::Clothing);
        assert!(alert.to_string().contains("OpenAI API key"));
        assert!(view.history().is_empty());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn unknown_city_keeps_selection() {
        let api = api_with_cities();
        let mut view = InsightsView::new(Arc::new(api));
        view.load_cities().await;

        assert!(!view.select_city(99));
        assert!(view.select_city_named(" paris "));
        assert_eq!(view.selected().unwrap().id, 2);
    }

    #[tokio::test]
    async fn city_names_match_case_insensitively_beyond_ascii() {
        let api = FakeApi::new();
        api.set_cities(vec![city(1, "London"), city(3, "São Paulo"), city(4, "Zürich")]);
        let mut view = InsightsView::new(Arc::new(api));
        view.load_cities().await;

        assert!(view.select_city_named("SÃO PAULO"));
        assert_eq!(view.selected().unwrap().id, 3);
        assert!(view.select_city_named("zürich"));
        assert_eq!(view.selected().unwrap().id, 4);
    }
}
