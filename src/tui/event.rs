//! Event handling for the dashboard.
//!
//! Input and refresh ticks are produced on background threads and funneled
//! into one channel; the dispatcher thread is the only consumer. At most one
//! tick waits in the channel at a time, so a fetch slower than the interval
//! never queues ticks ahead of later input.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use tracing::{debug, warn};

use super::input::{Command, translate};

/// How long the input pump blocks in one poll before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Application events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Refresh interval elapsed.
    Tick,
    Command(Command),
}

/// Owns the producer threads and the receiving end of the channel.
///
/// Dropping the handler stops and joins every thread it started.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
    shutdown: Arc<AtomicBool>,
    /// Set while a tick is queued and not yet received.
    tick_pending: Arc<AtomicBool>,
    /// Dropped on shutdown to wake the timer out of `recv_timeout`.
    stop_tx: Option<Sender<()>>,
    threads: Vec<JoinHandle<()>>,
}

impl EventHandler {
    /// Starts the refresh timer only. Input producers are attached separately.
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let tick_tx = tx.clone();
        let tick_pending = Arc::new(AtomicBool::new(false));
        let pending = Arc::clone(&tick_pending);
        let timer = thread::Builder::new()
            .name("refresh".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if pending.swap(true, Ordering::AcqRel) {
                                continue;
                            }
                            if tick_tx.send(Event::Tick).is_err() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("refresh loop stopped");
            });

        let mut threads = Vec::new();
        match timer {
            Ok(handle) => threads.push(handle),
            Err(e) => warn!(error = %e, "failed to start refresh loop"),
        }

        Self {
            rx,
            tx,
            shutdown: Arc::new(AtomicBool::new(false)),
            tick_pending,
            stop_tx: Some(stop_tx),
            threads,
        }
    }

    /// Starts the terminal input pump.
    pub fn with_terminal_input(mut self) -> io::Result<Self> {
        let tx = self.tx.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let handle = thread::Builder::new()
            .name("input".to_string())
            .spawn(move || pump_input(&tx, &shutdown, read_terminal))?;
        self.threads.push(handle);
        Ok(self)
    }

    /// Sender for extra producers such as the signal handler.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Receives the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        let event = self.rx.recv()?;
        if event == Event::Tick {
            self.tick_pending.store(false, Ordering::Release);
        }
        Ok(event)
    }
}

/// One poll of the terminal: `Ok(None)` when nothing arrived in time.
fn read_terminal(timeout: Duration) -> io::Result<Option<CrosstermEvent>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Forwards translated input until shutdown. A failing terminal ends the
/// dashboard with `Terminate`, since no key could ever arrive again.
fn pump_input<F>(tx: &Sender<Event>, shutdown: &AtomicBool, mut read: F)
where
    F: FnMut(Duration) -> io::Result<Option<CrosstermEvent>>,
{
    while !shutdown.load(Ordering::Relaxed) {
        let evt = match read(INPUT_POLL) {
            Ok(Some(evt)) => evt,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "terminal input failed, stopping");
                let _ = tx.send(Event::Command(Command::Terminate));
                break;
            }
        };
        if let Some(cmd) = translate(&evt)
            && tx.send(Event::Command(cmd)).is_err()
        {
            break;
        }
    }
    debug!("input pump stopped");
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.stop_tx.take();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn ticks_arrive_on_interval() {
        let events = EventHandler::new(Duration::from_millis(20));
        assert_eq!(events.next(), Ok(Event::Tick));
        assert_eq!(events.next(), Ok(Event::Tick));
    }

    #[test]
    fn extra_producers_share_the_channel() {
        let events = EventHandler::new(Duration::from_secs(60));
        let tx = events.sender();
        thread::spawn(move || {
            let _ = tx.send(Event::Command(Command::Terminate));
        });
        assert_eq!(events.next(), Ok(Event::Command(Command::Terminate)));
    }

    #[test]
    fn ticks_coalesce_while_consumer_is_busy() {
        let events = EventHandler::new(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(200));
        let _ = events.sender().send(Event::Command(Command::Quit));

        // Forty intervals passed, yet only one tick is ahead of the quit.
        assert_eq!(events.next(), Ok(Event::Tick));
        assert_eq!(events.next(), Ok(Event::Command(Command::Quit)));
        // Receiving the tick re-arms the timer.
        assert_eq!(events.next(), Ok(Event::Tick));
    }

    #[test]
    fn input_failure_terminates() {
        let (tx, rx) = mpsc::channel();
        let shutdown = AtomicBool::new(false);
        let mut polls = 0;
        pump_input(&tx, &shutdown, |_| {
            polls += 1;
            match polls {
                1 => Ok(None),
                2 => Ok(Some(CrosstermEvent::Resize(80, 24))),
                _ => Err(io::Error::other("tty gone")),
            }
        });
        assert_eq!(rx.try_recv(), Ok(Event::Command(Command::Resize(80, 24))));
        assert_eq!(rx.try_recv(), Ok(Event::Command(Command::Terminate)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drop_joins_timer_promptly() {
        let events = EventHandler::new(Duration::from_secs(60));
        let started = Instant::now();
        drop(events);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
