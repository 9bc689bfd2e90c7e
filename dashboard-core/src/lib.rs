//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration of the backend location
//! - A typed client for the weather backend, with the demo fallback for current conditions
//! - The debounced city search component
//! - View models for the home, analytics and insights screens
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod model;
pub mod search;
pub mod view;

#[cfg(test)]
mod testing;

pub use client::{ApiError, HttpWeatherClient, WeatherApi};
pub use config::Config;
pub use model::{City, CurrentWeather, InsightResponse, WeatherAnalytics, WeatherRecord};
pub use search::{CitySearch, SearchPhase};
