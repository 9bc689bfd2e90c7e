use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_core::{
    City, CitySearch, Config, HttpWeatherClient, WeatherApi,
    search::MIN_QUERY_CHARS,
    view::{AnalyticsView, HomeView, InsightAlert, InsightsView, SUGGESTED_QUERIES, TimeWindow},
};
use inquire::{
    CustomUserError, Select, Text,
    autocompletion::{Autocomplete, Replacement},
};
use tokio::sync::mpsc;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Weather dashboard client")]
pub struct Cli {
    /// Backend base URL; overrides WEATHER_API_URL and the config file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend URL interactively and save it.
    Configure,

    /// Show current conditions for a city.
    Current {
        city: String,
    },

    /// Show the multi-period forecast for a city.
    Forecast {
        city: String,
    },

    /// Search for a city and show its current conditions.
    Search {
        /// Partial city name; prompts when absent. An empty query offers popular cities.
        query: Option<String>,
    },

    /// List all cities known to the backend.
    Cities,

    /// Show the latest stored record for a city id.
    Latest {
        city_id: i64,
    },

    /// Historical trends and aggregates for a city.
    Analytics {
        city: String,

        /// Time window in days: 1, 3, 7, 14 or 30.
        #[arg(long, default_value_t = 7, value_parser = parse_window)]
        days: u32,
    },

    /// AI-generated insights.
    Insights {
        /// City name; defaults to the first city the backend lists.
        #[arg(long)]
        city: Option<String>,

        #[command(subcommand)]
        mode: InsightCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum InsightCommand {
    /// Summary of today's conditions.
    Summary,
    /// What to wear.
    Clothing,
    /// Free-form question; prompts when absent.
    Ask {
        query: Option<String>,
    },
}

fn parse_window(raw: &str) -> Result<u32, String> {
    let days: u32 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    TimeWindow::from_days(days)
        .map(TimeWindow::days)
        .ok_or_else(|| "supported windows: 1, 3, 7, 14, 30".to_string())
}

struct CityChoice(City);

impl fmt::Display for CityChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.0.name, self.0.country)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let base_url = config.api_url_from_env(self.api_url.as_deref());
        tracing::debug!(%base_url, "using backend");
        let api: Arc<dyn WeatherApi> = Arc::new(HttpWeatherClient::new(base_url));

        match self.command {
            Command::Configure => configure(config)?,
            Command::Current { city } => show_current(Arc::clone(&api), &city).await,
            Command::Forecast { city } => {
                let mut home = HomeView::new(api);
                home.load_forecast(&city).await;
                match (home.forecast(), home.error()) {
                    (Some(forecast), _) => output::print_forecast(forecast),
                    (None, Some(err)) => println!("{err}"),
                    (None, None) => {}
                }
            }
            Command::Search { query } => search(api, query).await?,
            Command::Cities => match api.all_cities().await {
                Ok(cities) => output::print_cities(&cities),
                Err(err) => println!("{err}"),
            },
            Command::Latest { city_id } => match api.latest_weather(city_id).await {
                Ok(record) => output::print_record(&record),
                Err(err) => println!("{err}"),
            },
            Command::Analytics { city, days } => {
                let mut view =
                    AnalyticsView::new(api).with_history_limit(config.history_limit());
                if let Some(window) = TimeWindow::from_days(days) {
                    view.set_window(window).await;
                }
                view.select_city(&city).await;
                output::print_analytics(&view);
            }
            Command::Insights { city, mode } => insights(api, city, mode).await?,
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config
        .api_url
        .clone()
        .unwrap_or_else(|| dashboard_core::config::DEFAULT_API_URL.to_string());

    let url = Text::new("Backend URL:")
        .with_default(&current)
        .prompt()
        .context("Failed to read backend URL")?;

    config.set_api_url(&url)?;
    config.save()?;

    println!("Saved backend URL to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show_current(api: Arc<dyn WeatherApi>, city: &str) {
    let mut home = HomeView::new(api);
    home.show_city(city).await;
    match (home.weather(), home.error()) {
        (Some(weather), _) => output::print_current(weather),
        (None, Some(err)) => println!("{err}"),
        (None, None) => {}
    }
}

async fn search(api: Arc<dyn WeatherApi>, query: Option<String>) -> anyhow::Result<()> {
    let (tx, mut picked) = mpsc::unbounded_channel();
    let mut search = CitySearch::new(Arc::clone(&api), move |name| {
        let _ = tx.send(name);
    });
    search.load_popular().await;

    let query = match query {
        Some(query) => query,
        None => Text::new("Search for a city:")
            .with_help_message("Leave empty to pick from popular cities")
            .prompt()
            .context("Failed to read search query")?,
    };

    search.set_query(query.trim());
    search.settle().await;

    let candidates = if search.query().is_empty() {
        search.shortcuts().to_vec()
    } else {
        search.results()
    };

    if candidates.is_empty() {
        if !search.query().is_empty() && search.query().chars().count() < MIN_QUERY_CHARS {
            println!("Type at least {MIN_QUERY_CHARS} characters to search.");
        } else {
            println!("No cities found.");
        }
        return Ok(());
    }

    let choices = candidates.into_iter().map(CityChoice).collect();
    let choice = Select::new("Pick a city:", choices)
        .prompt()
        .context("Failed to read city choice")?;
    search.select(&choice.0);

    if let Ok(name) = picked.try_recv() {
        show_current(api, &name).await;
    }

    Ok(())
}

async fn insights(
    api: Arc<dyn WeatherApi>,
    city: Option<String>,
    mode: InsightCommand,
) -> anyhow::Result<()> {
    let mut view = InsightsView::new(api);
    view.load_cities().await;

    if let Some(name) = city {
        if !view.select_city_named(&name) {
            println!("Unknown city '{name}'.");
            return Ok(());
        }
    }

    let Some(selected) = view.selected() else {
        println!("No cities available.");
        return Ok(());
    };
    println!("City: {}, {}", selected.name, selected.country);

    let outcome: Result<bool, InsightAlert> = match mode {
        InsightCommand::Summary => view.daily_summary().await.map(|r| r.is_some()),
        InsightCommand::Clothing => view.clothing_advice().await.map(|r| r.is_some()),
        InsightCommand::Ask { query } => {
            let query = match query {
                Some(query) => query,
                None => Text::new("Ask anything about the weather:")
                    .with_placeholder("e.g., What should I wear today?")
                    .with_autocomplete(Suggestions)
                    .prompt()
                    .context("Failed to read question")?,
            };
            view.ask(&query).await.map(|r| r.is_some())
        }
    };

    match outcome {
        Ok(true) => output::print_insights(view.history()),
        Ok(false) => println!("Nothing to ask."),
        Err(alert) => eprintln!("{alert}"),
    }

    Ok(())
}

/// Offers the canned questions as completions.
#[derive(Debug, Clone, Copy)]
struct Suggestions;

impl Autocomplete for Suggestions {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let needle = input.to_lowercase();
        Ok(SUGGESTED_QUERIES
            .iter()
            .filter(|q| q.to_lowercase().contains(&needle))
            .map(|q| q.to_string())
            .collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parser_accepts_known_windows() {
        assert_eq!(parse_window("14"), Ok(14));
        assert!(parse_window("5").is_err());
        assert!(parse_window("week").is_err());
    }

    #[test]
    fn cli_parses_insight_subcommands() {
        let cli = Cli::try_parse_from([
            "weather-dash",
            "--api-url",
            "http://x",
            "insights",
            "--city",
            "Paris",
            "ask",
            "Umbrella?",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        match cli.command {
            Command::Insights { city, mode: InsightCommand::Ask { query } } => {
                assert_eq!(city.as_deref(), Some("Paris"));
                assert_eq!(query.as_deref(), Some("Umbrella?"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
