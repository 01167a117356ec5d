#![warn(clippy::all, missing_docs)]

//! Core logic for the dayboard personal dashboard.
//!
//! This crate hosts the data models, configuration handling, service
//! clients, session persistence and the orchestration layer that merges
//! independent asynchronous results into a single view-model for the
//! terminal UI and any future frontends.

pub mod client;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod session;

pub use clock::{Background, ClockReading, PartOfDay, SystemTimeSource, TimeSource};
pub use config::AppConfig;
pub use dashboard::{Dashboard, DashboardServices, DashboardState, Session};
pub use models::{
    Coordinate, DateInfo, LocalConditions, NamedayInfo, PlaceInfo, Quote, TimezoneInfo,
    WeatherInfo,
};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
