//! Resource views: what the dashboard can show.
//!
//! Every view owns a [`TableModel`] (or several, for the tabbed detail view)
//! and delegates navigation to it. The dispatcher only talks to views
//! through [`ResourceView`].

mod events;
mod list;
mod nodes;
mod pod_detail;
mod pods;

pub use events::{EventColumns, EventsView};
pub use list::{ListLayout, ListView};
pub use nodes::{NodeColumns, NodesView};
pub use pod_detail::{DetailTab, PodDetailView};
pub use pods::{PodColumns, PodsView};

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::source::{FetchError, Filter, FilterAxis, ResourceKind, ResourceSource, SortOrder};
use crate::tui::DashboardError;
use crate::tui::table::{Row, TableModel};

/// Position of a view in the drill-down hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    TopList,
    ScopedList,
    Detail,
}

/// Common capability set of every view.
pub trait ResourceView {
    fn kind(&self) -> ViewKind;

    fn resource(&self) -> ResourceKind;

    /// Header text for the status line.
    fn title(&self) -> String;

    /// Fetches fresh data regardless of the pause flag.
    ///
    /// On error the current rows are kept.
    fn fetch(&mut self, source: &dyn ResourceSource) -> Result<(), FetchError>;

    /// Periodic refresh: a no-op while paused.
    fn update(&mut self, source: &dyn ResourceSource) -> Result<(), FetchError> {
        if self.pause() {
            return Ok(());
        }
        self.fetch(source)
    }

    fn set_rect(&mut self, rect: Rect);

    fn draw(&self, frame: &mut Frame);

    /// Table navigation acts on.
    fn table(&self) -> &TableModel;

    fn table_mut(&mut self) -> &mut TableModel;

    fn toggle_pause(&mut self);

    fn pause(&self) -> bool;

    fn filter(&self) -> &Filter;

    fn sortorder(&self) -> SortOrder;

    fn set_sort_and_filter(&mut self, sort: SortOrder, filter: Filter);

    /// Distinct values of `axis` in the current rows.
    fn observed_values(&self, axis: FilterAxis) -> Vec<String>;

    fn tab_next(&mut self) {}

    fn tab_prev(&mut self) {}

    fn selected_values(&self) -> Option<&Row> {
        self.table().selected_row()
    }

    /// (selected, total) with a 1-based selected index, (0, 0) when empty.
    fn position(&self) -> (usize, usize) {
        let t = self.table();
        if t.is_empty() {
            (0, 0)
        } else {
            (t.selected() + 1, t.len())
        }
    }

    fn track(&mut self, identity: &str) {
        self.table_mut().track(identity);
    }

    fn select_next(&mut self) {
        self.table_mut().scroll_down(1);
    }

    fn select_prev(&mut self) {
        self.table_mut().scroll_up(1);
    }

    fn select_top(&mut self) {
        self.table_mut().scroll_to_top();
    }

    fn select_bottom(&mut self) {
        self.table_mut().scroll_to_bottom();
    }

    fn select_half_page_down(&mut self) {
        self.table_mut().half_page_down();
    }

    fn select_half_page_up(&mut self) {
        self.table_mut().half_page_up();
    }

    fn select_page_down(&mut self) {
        self.table_mut().page_down();
    }

    fn select_page_up(&mut self) {
        self.table_mut().page_up();
    }
}

/// Builds the list view for `resource`.
///
/// Pod details need a pod identity and are built with [`PodDetailView::new`].
pub fn build_list(
    resource: ResourceKind,
    filter: Filter,
    sort: SortOrder,
) -> Result<Box<dyn ResourceView>, DashboardError> {
    match resource {
        ResourceKind::Nodes => Ok(Box::new(NodesView::new(filter, sort))),
        ResourceKind::Pods => Ok(Box::new(PodsView::new(filter, sort))),
        ResourceKind::Events => Ok(Box::new(EventsView::new(filter, sort))),
        ResourceKind::PodDetail => Err(DashboardError::Construction(
            "pod detail is not a list view".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::testing::FakeSource;

    #[test]
    fn build_list_picks_view_kind() {
        let v = build_list(ResourceKind::Nodes, Filter::default(), SortOrder::Name).unwrap();
        assert_eq!(v.kind(), ViewKind::TopList);
        let v = build_list(ResourceKind::Events, Filter::default(), SortOrder::Age).unwrap();
        assert_eq!(v.kind(), ViewKind::TopList);
        let v = build_list(ResourceKind::Pods, Filter::default(), SortOrder::Namespace).unwrap();
        assert_eq!(v.kind(), ViewKind::ScopedList);
        assert!(build_list(ResourceKind::PodDetail, Filter::default(), SortOrder::Name).is_err());
    }

    #[test]
    fn paused_update_does_not_fetch() {
        let source = FakeSource::with_nodes(&["a", "b"]);
        let mut v = build_list(ResourceKind::Nodes, Filter::default(), SortOrder::Name).unwrap();
        v.update(&source).unwrap();
        assert_eq!(source.calls(), 1);

        v.toggle_pause();
        v.update(&source).unwrap();
        v.update(&source).unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(v.table().len(), 2);

        v.toggle_pause();
        assert_eq!(v.table().len(), 2);
        v.update(&source).unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn failed_fetch_keeps_rows() {
        let source = FakeSource::with_nodes(&["a", "b", "c"]);
        let mut v = build_list(ResourceKind::Nodes, Filter::default(), SortOrder::Name).unwrap();
        v.fetch(&source).unwrap();
        source.fail_next();
        assert!(v.fetch(&source).is_err());
        assert_eq!(v.table().len(), 3);
    }
}
