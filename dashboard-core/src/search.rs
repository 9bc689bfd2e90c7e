//! Incremental city search.
//!
//! Every query change cancels the pending debounce timer and, for queries of
//! at least [`MIN_QUERY_CHARS`] characters, schedules a fresh one. A search
//! request is only issued once the timer fires, and its results are applied
//! only if no newer query arrived in the meantime.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{client::WeatherApi, model::City};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_QUERY_CHARS: usize = 2;
pub const POPULAR_CITY_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Empty query, no shortcuts to offer.
    Idle,
    /// Empty query, popular cities are shown.
    Suggestions,
    /// Query too short to search.
    Typing,
    Debouncing,
    Searching,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stage {
    #[default]
    Pending,
    InFlight,
    Done,
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    generation: u64,
    stage: Stage,
    results: Vec<City>,
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub type OnSelect = Box<dyn FnMut(String) + Send>;

pub struct CitySearch {
    api: Arc<dyn WeatherApi>,
    debounce: Duration,
    on_select: OnSelect,
    state: Arc<Mutex<SearchState>>,
    popular: Vec<City>,
    popular_requested: bool,
    timer: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for CitySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CitySearch")
            .field("api", &self.api)
            .field("debounce", &self.debounce)
            .field("state", &self.state)
            .field("popular", &self.popular)
            .finish_non_exhaustive()
    }
}

impl CitySearch {
    /// `on_select` receives the display name of whichever city the user picks.
    pub fn new(api: Arc<dyn WeatherApi>, on_select: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            api,
            debounce: DEFAULT_DEBOUNCE,
            on_select: Box::new(on_select),
            state: Arc::default(),
            popular: Vec::new(),
            popular_requested: false,
            timer: None,
            task: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Fetch the city list once and keep the first few entries as shortcuts.
    /// A failure leaves the shortcut list empty.
    pub async fn load_popular(&mut self) {
        if self.popular_requested {
            return;
        }
        self.popular_requested = true;

        match self.api.all_cities().await {
            Ok(cities) => {
                self.popular = cities.into_iter().take(POPULAR_CITY_COUNT).collect();
            }
            Err(err) => warn!(error = %err, "Failed to load cities"),
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let generation = {
            let mut state = lock(&self.state);
            if state.query == query {
                return;
            }
            state.query.clone_from(&query);
            state.generation += 1;
            state.stage = Stage::Pending;
            state.results.clear();
            state.generation
        };

        self.cancel_timer();

        if query.chars().count() < MIN_QUERY_CHARS {
            return;
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(run_search(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            query,
            generation,
            self.debounce,
            token.clone(),
        ));

        self.timer = Some(token);
        self.task = Some(task);
    }

    /// Hand `city` to the parent and reset to an empty query.
    pub fn select(&mut self, city: &City) {
        (self.on_select)(city.name.clone());
        self.reset();
    }

    /// Select one of the offered shortcuts. Returns `false` if `index` is out
    /// of range or the query is not empty.
    pub fn select_popular(&mut self, index: usize) -> bool {
        let Some(city) = self.shortcuts().get(index).cloned() else {
            return false;
        };
        self.select(&city);
        true
    }

    /// Wait for the most recently scheduled search, if any, to finish.
    pub async fn settle(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    error!(error = %err, "city search task failed");
                }
            }
        }
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn results(&self) -> Vec<City> {
        lock(&self.state).results.clone()
    }

    pub fn popular(&self) -> &[City] {
        &self.popular
    }

    /// Popular cities to offer, only while the query is empty.
    pub fn shortcuts(&self) -> &[City] {
        if lock(&self.state).query.is_empty() {
            &self.popular
        } else {
            &[]
        }
    }

    pub fn phase(&self) -> SearchPhase {
        let state = lock(&self.state);
        match state.query.chars().count() {
            0 if self.popular.is_empty() => SearchPhase::Idle,
            0 => SearchPhase::Suggestions,
            n if n < MIN_QUERY_CHARS => SearchPhase::Typing,
            _ => match state.stage {
                Stage::Pending => SearchPhase::Debouncing,
                Stage::InFlight => SearchPhase::Searching,
                Stage::Done => SearchPhase::Results,
            },
        }
    }

    fn reset(&mut self) {
        self.cancel_timer();
        let mut state = lock(&self.state);
        state.query.clear();
        state.generation += 1;
        state.stage = Stage::Pending;
        state.results.clear();
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

impl Drop for CitySearch {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_search(
    api: Arc<dyn WeatherApi>,
    state: Arc<Mutex<SearchState>>,
    query: String,
    generation: u64,
    debounce: Duration,
    token: CancellationToken,
) {
    tokio::select! {
        biased;
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(debounce) => {}
    }

    {
        let mut state = lock(&state);
        if state.generation != generation {
            return;
        }
        state.stage = Stage::InFlight;
    }

    debug!(%query, "searching cities");
    let outcome = api.search_cities(&query).await;

    let mut state = lock(&state);
    if state.generation != generation {
        debug!(%query, "discarding stale search results");
        return;
    }

    match outcome {
        Ok(cities) => state.results = cities,
        Err(err) => {
            error!(error = %err, %query, "Failed to search cities");
            state.results.clear();
        }
    }
    state.stage = Stage::Done;
}
