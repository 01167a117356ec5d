//! Dashboard orchestration: independent sources merged into one view-model.

mod orchestrator;
mod services;
mod state;

pub use orchestrator::{Dashboard, SPLASH_DURATION};
pub use services::DashboardServices;
pub use state::{DashboardState, Session};
