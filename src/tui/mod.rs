//! Terminal dashboard for browsing cluster resources.
//!
//! A single [`Dispatcher`] owns all state. Background producers in
//! [`event`] feed it ticks and translated input; [`App`] owns the terminal.

mod app;
mod dispatcher;
mod event;
mod input;
mod overlay;
mod status;
mod style;
pub mod table;
#[cfg(test)]
mod testing;
pub mod views;

pub use app::{App, DashboardConfig, TerminalGuard, run_loop};
pub use dispatcher::{DashboardState, Dispatcher, Flow, NavFrame};
pub use event::{Event, EventHandler};
pub use input::{Command, translate};
pub use overlay::{CLEAR_OPTION, Overlay, OverlayAxis};
pub use status::{StatusInfo, StatusLine};

/// Errors that stop the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The requested root view cannot be built.
    #[error("cannot build dashboard: {0}")]
    Construction(String),
    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Render(#[source] std::io::Error),
}
