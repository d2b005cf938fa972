//! The single owner and mutator of dashboard state.
//!
//! Ticks and commands arrive one at a time through [`Dispatcher::handle`];
//! fetches, state changes and drawing all happen on the caller's thread.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::source::{Filter, FilterAxis, ResourceKind, ResourceSource, SortOrder};

use super::DashboardError;
use super::event::Event;
use super::input::Command;
use super::overlay::{Overlay, OverlayAxis};
use super::status::{StatusInfo, StatusLine};
use super::views::{PodColumns, PodDetailView, ResourceView, ViewKind, build_list};

/// What the run loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Exit,
}

/// Saved list view, restored on Back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavFrame {
    pub resource: ResourceKind,
    pub filter: Filter,
    pub sort: SortOrder,
    pub identity: Option<String>,
}

pub struct DashboardState {
    pub view: Box<dyn ResourceView>,
    pub stack: Vec<NavFrame>,
    pub overlay: Overlay,
    pub status: StatusLine,
    pub width: u16,
    pub height: u16,
    pub last_error: Option<String>,
    pub running: bool,
}

pub struct Dispatcher {
    source: Box<dyn ResourceSource>,
    state: DashboardState,
}

impl Dispatcher {
    /// Builds the root view for `kind`. Only list kinds can be a root.
    pub fn new(
        source: Box<dyn ResourceSource>,
        kind: ResourceKind,
        filter: Filter,
        width: u16,
        height: u16,
    ) -> Result<Self, DashboardError> {
        let view = build_list(kind, filter, kind.default_sort())?;
        let mut dispatcher = Self {
            source,
            state: DashboardState {
                view,
                stack: Vec::new(),
                overlay: Overlay::new(),
                status: StatusLine::default(),
                width,
                height,
                last_error: None,
                running: true,
            },
        };
        dispatcher.layout();
        Ok(dispatcher)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Runs the first fetch. Called once before the first draw.
    pub fn start(&mut self) {
        info!(
            view = %self.state.view.title(),
            source = self.source.name(),
            "dashboard started"
        );
        self.refetch(true);
    }

    /// Applies exactly one event.
    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Tick => {
                self.refetch(false);
                Flow::Redraw
            }
            Event::Command(cmd) => self.command(cmd),
        }
    }

    fn command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Quit | Command::Terminate => {
                info!(command = ?cmd, "shutting down");
                self.state.running = false;
                return Flow::Exit;
            }
            Command::Resize(w, h) => {
                self.state.width = w;
                self.state.height = h;
                self.layout();
                return Flow::Redraw;
            }
            _ => {}
        }

        if self.state.overlay.is_visible() && self.overlay_command(cmd) {
            return Flow::Redraw;
        }

        let view = &mut self.state.view;
        match cmd {
            Command::NavigateUp => view.select_prev(),
            Command::NavigateDown => view.select_next(),
            Command::ScrollTop => view.select_top(),
            Command::ScrollBottom => view.select_bottom(),
            Command::HalfPageUp => view.select_half_page_up(),
            Command::HalfPageDown => view.select_half_page_down(),
            Command::PageUp => view.select_page_up(),
            Command::PageDown => view.select_page_down(),
            Command::Confirm => self.confirm(),
            Command::Back => self.back(),
            Command::TabForward | Command::TabBackward => {
                if view.kind() == ViewKind::Detail {
                    if cmd == Command::TabForward {
                        view.tab_next();
                    } else {
                        view.tab_prev();
                    }
                    self.refetch(false);
                }
            }
            Command::TogglePause => {
                view.toggle_pause();
                debug!(paused = view.pause(), "pause toggled");
                self.refetch(false);
            }
            Command::OpenSortMenu => self.open_overlay(OverlayAxis::Sort),
            Command::OpenFilterMenu(axis) => self.open_overlay(OverlayAxis::Filter(axis)),
            Command::Refresh => self.refetch(true),
            Command::Quit | Command::Terminate | Command::Resize(..) => {}
        }
        Flow::Redraw
    }

    /// Routes a command to the visible overlay. Returns false if the overlay
    /// does not consume it.
    fn overlay_command(&mut self, cmd: Command) -> bool {
        let overlay = &mut self.state.overlay;
        match cmd {
            Command::NavigateUp => overlay.select_prev(),
            Command::NavigateDown => overlay.select_next(),
            Command::ScrollTop => overlay.select_top(),
            Command::ScrollBottom => overlay.select_bottom(),
            Command::PageUp | Command::HalfPageUp => overlay.select_page_up(),
            Command::PageDown | Command::HalfPageDown => overlay.select_page_down(),
            Command::Back => overlay.hide(),
            Command::Confirm => {
                let view = &mut self.state.view;
                let (sort, filter) = overlay.selected(view.sortorder(), view.filter());
                overlay.hide();
                info!(sort = sort.name(), filter = %filter, "view settings changed");
                view.set_sort_and_filter(sort, filter);
                self.refetch(true);
            }
            _ => return false,
        }
        true
    }

    fn open_overlay(&mut self, axis: OverlayAxis) {
        let view = &self.state.view;
        let candidates = match axis {
            OverlayAxis::Sort => Vec::new(),
            OverlayAxis::Filter(a) => view.observed_values(a),
        };
        let shown = self.state.overlay.show(
            view.resource(),
            axis,
            candidates,
            self.state.width,
            self.state.height,
        );
        if !shown {
            debug!(?axis, "nothing to pick");
            return;
        }
        let current = match axis {
            OverlayAxis::Sort => Some(view.sortorder().name().to_string()),
            OverlayAxis::Filter(a) => view.filter().get(a).map(str::to_string),
        };
        if let Some(current) = current {
            self.state.overlay.highlight(&current);
        }
    }

    fn confirm(&mut self) {
        let view = &self.state.view;
        let Some(row) = view.selected_values().cloned() else {
            return;
        };
        let frame = NavFrame {
            resource: view.resource(),
            filter: view.filter().clone(),
            sort: view.sortorder(),
            identity: Some(row.identity.clone()),
        };

        let next: Box<dyn ResourceView> = match view.resource() {
            ResourceKind::Nodes => {
                let filter = view.filter().with(FilterAxis::Node, Some(&row.identity));
                match build_list(ResourceKind::Pods, filter, ResourceKind::Pods.default_sort()) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "cannot open pod list");
                        return;
                    }
                }
            }
            ResourceKind::Pods => {
                let (Some(namespace), Some(name)) = (
                    row.fields.get(PodColumns::NAMESPACE),
                    row.fields.get(PodColumns::NAME),
                ) else {
                    return;
                };
                Box::new(PodDetailView::new(
                    namespace,
                    name,
                    view.filter().clone(),
                    view.sortorder(),
                ))
            }
            ResourceKind::Events | ResourceKind::PodDetail => return,
        };

        info!(from = %view.title(), to = %next.title(), "drill down");
        self.state.stack.push(frame);
        self.install(next);
    }

    fn back(&mut self) {
        let Some(frame) = self.state.stack.pop() else {
            return;
        };
        let mut view = match build_list(frame.resource, frame.filter.clone(), frame.sort) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "cannot restore view");
                self.state.stack.push(frame);
                return;
            }
        };
        if let Some(identity) = frame.identity.as_deref() {
            view.track(identity);
        }
        info!(from = %self.state.view.title(), to = %view.title(), "back");
        self.install(view);
    }

    fn install(&mut self, view: Box<dyn ResourceView>) {
        self.state.view = view;
        self.layout();
        self.refetch(true);
    }

    fn layout(&mut self) {
        let (w, h) = (self.state.width, self.state.height);
        let body = h.saturating_sub(1);
        self.state.view.set_rect(Rect::new(0, 0, w, body));
        self.state
            .status
            .set_rect(Rect::new(0, body, w, h.min(1)));
        if self.state.overlay.is_visible() {
            self.state.overlay.relayout(w, h);
        }
    }

    /// Fetches into the active view. Without `force` a paused view is skipped.
    fn refetch(&mut self, force: bool) {
        let view = &mut self.state.view;
        if !force && view.pause() {
            return;
        }
        let started = Instant::now();
        let result = if force {
            view.fetch(self.source.as_ref())
        } else {
            view.update(self.source.as_ref())
        };
        match result {
            Ok(()) => {
                debug!(
                    view = %view.title(),
                    rows = view.table().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fetched"
                );
                self.state.last_error = None;
            }
            Err(e) => {
                warn!(view = %view.title(), error = %e, "fetch failed");
                self.state.last_error = Some(e.to_string());
            }
        }
    }

    /// Draws view, overlay, then status line.
    pub fn draw(&self, frame: &mut Frame) {
        let state = &self.state;
        state.view.draw(frame);
        state.overlay.draw(frame);

        let title = state.view.title();
        let sort = match state.view.kind() {
            ViewKind::Detail => None,
            ViewKind::TopList | ViewKind::ScopedList => Some(state.view.sortorder()),
        };
        let info = StatusInfo {
            title: &title,
            sort,
            filter: state.view.filter(),
            paused: state.view.pause(),
            source: self.source.name(),
            position: state.view.position(),
            error: state.last_error.as_deref(),
        };
        state.status.draw(frame, &info);
    }
}
