//! Screen-level state for the dashboard.
//!
//! Each view owns its data and loading flags and fetches everything it
//! shows; nothing is shared or cached between views.

pub mod analytics;
pub mod home;
pub mod insights;

pub use analytics::{AnalyticsView, ChartPoint, EmptyState, TimeWindow};
pub use home::HomeView;
pub use insights::{InsightAlert, InsightMode, InsightsView, SUGGESTED_QUERIES};
