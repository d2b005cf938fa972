//! Main dashboard application: terminal lifecycle and the draw loop.

use std::io::{self, Stdout};
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{info, warn};

use crate::source::{Filter, KubectlConfig, ResourceKind, ResourceSource};

use super::DashboardError;
use super::dispatcher::{Dispatcher, Flow};
use super::event::{Event, EventHandler};
use super::input::Command;

/// Set while the terminal is in raw mode; the panic hook checks it.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Startup parameters for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Root view.
    pub kind: ResourceKind,
    /// Initial filter of the root view.
    pub filter: Filter,
    /// Refresh interval.
    pub interval: Duration,
    /// Upper bound for one fetch.
    pub fetch_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            kind: ResourceKind::Nodes,
            filter: Filter::default(),
            interval: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

impl DashboardConfig {
    /// kubectl invocation bounded by this dashboard's fetch timeout.
    pub fn kubectl(&self, program: PathBuf, context: Option<String>) -> KubectlConfig {
        KubectlConfig {
            program,
            global_args: Vec::new(),
            timeout: self.fetch_timeout,
        }
        .with_context(context)
    }
}

/// Raw mode, alternate screen and mouse capture for as long as it lives.
///
/// Restores the terminal on drop and from a panic hook, so every exit path
/// leaves a usable shell behind.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);

        let setup = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
            .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())));
        let mut terminal = match setup {
            Ok(t) => t,
            Err(e) => {
                restore_terminal();
                return Err(e);
            }
        };

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            prev(info);
        }));

        if let Err(e) = terminal.hide_cursor() {
            warn!(error = %e, "failed to hide cursor");
        }
        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Safe to call more than once; only the first call after acquisition acts.
fn restore_terminal() {
    if TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

/// Draws, then applies events until the dispatcher asks to exit or the
/// event sequence ends. Returns the number of frames drawn.
pub fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    dispatcher: &mut Dispatcher,
    events: impl IntoIterator<Item = Event>,
) -> Result<usize, DashboardError> {
    let size = terminal.size().map_err(DashboardError::Render)?;
    dispatcher.handle(Event::Command(Command::Resize(size.width, size.height)));
    dispatcher.start();

    let mut draws = 0;
    terminal
        .draw(|frame| dispatcher.draw(frame))
        .map_err(DashboardError::Render)?;
    draws += 1;

    for event in events {
        match dispatcher.handle(event) {
            Flow::Exit => break,
            Flow::Redraw => {
                terminal
                    .draw(|frame| dispatcher.draw(frame))
                    .map_err(DashboardError::Render)?;
                draws += 1;
            }
        }
    }
    Ok(draws)
}

pub struct App {
    dispatcher: Dispatcher,
    interval: Duration,
}

impl App {
    /// Builds the root view. Fails before any terminal state is touched.
    pub fn new(
        config: DashboardConfig,
        source: Box<dyn ResourceSource>,
    ) -> Result<Self, DashboardError> {
        let dispatcher = Dispatcher::new(source, config.kind, config.filter, 0, 0)?;
        Ok(Self {
            dispatcher,
            interval: config.interval,
        })
    }

    /// Runs until quit or a termination signal.
    pub fn run(mut self) -> Result<(), DashboardError> {
        let mut guard = TerminalGuard::acquire().map_err(DashboardError::Render)?;
        let events = EventHandler::new(self.interval)
            .with_terminal_input()
            .map_err(DashboardError::Render)?;

        let signal_tx = events.sender();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = signal_tx.send(Event::Command(Command::Terminate));
        }) {
            warn!(error = %e, "failed to install signal handler");
        }

        let pumped = std::iter::from_fn(|| events.next().ok());
        let draws = run_loop(guard.terminal_mut(), &mut self.dispatcher, pumped)?;
        info!(draws, "dashboard stopped");
        Ok(())
    }
}
