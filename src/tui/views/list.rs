//! Generic list view shared by the nodes, pods and events tables.

use std::marker::PhantomData;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::fmt::now_epoch;
use crate::source::{FetchError, Filter, FilterAxis, ResourceKind, ResourceSource, SortOrder};
use crate::tui::table::{Column, Row, TableModel};

use super::{ResourceView, ViewKind};

/// Per-resource part of a list view: columns and record-to-row mapping.
pub trait ListLayout {
    const RESOURCE: ResourceKind;
    const KIND: ViewKind;

    fn columns() -> Vec<Column>;

    /// Column holding the values of a filter axis.
    fn axis_column(axis: FilterAxis) -> Option<usize>;

    /// Column highlighted for a sort order.
    fn sort_column(sort: SortOrder) -> Option<usize>;

    /// Fetches records and renders them as rows relative to `now`.
    fn fetch(
        source: &dyn ResourceSource,
        filter: &Filter,
        sort: SortOrder,
        now: i64,
    ) -> Result<Vec<Row>, FetchError>;
}

pub struct ListView<L: ListLayout> {
    table: TableModel,
    filter: Filter,
    sort: SortOrder,
    paused: bool,
    rect: Rect,
    _layout: PhantomData<L>,
}

impl<L: ListLayout> ListView<L> {
    /// New unpaused view. A sort the resource does not offer falls back to its default.
    pub fn new(filter: Filter, sort: SortOrder) -> Self {
        let sort = if L::RESOURCE.sort_orders().contains(&sort) {
            sort
        } else {
            L::RESOURCE.default_sort()
        };
        let mut table = TableModel::new(L::columns());
        table.set_sort_column(L::sort_column(sort));
        Self {
            table,
            filter,
            sort,
            paused: false,
            rect: Rect::default(),
            _layout: PhantomData,
        }
    }
}

impl<L: ListLayout> ResourceView for ListView<L> {
    fn kind(&self) -> ViewKind {
        L::KIND
    }

    fn resource(&self) -> ResourceKind {
        L::RESOURCE
    }

    fn title(&self) -> String {
        L::RESOURCE.name().to_string()
    }

    fn fetch(&mut self, source: &dyn ResourceSource) -> Result<(), FetchError> {
        let rows = L::fetch(source, &self.filter, self.sort, now_epoch())?;
        self.table.set_rows(rows);
        Ok(())
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        self.table.resize(rect.width, rect.height);
    }

    fn draw(&self, frame: &mut Frame) {
        self.table.draw(frame, self.rect);
    }

    fn table(&self) -> &TableModel {
        &self.table
    }

    fn table_mut(&mut self) -> &mut TableModel {
        &mut self.table
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn pause(&self) -> bool {
        self.paused
    }

    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn sortorder(&self) -> SortOrder {
        self.sort
    }

    fn set_sort_and_filter(&mut self, sort: SortOrder, filter: Filter) {
        self.sort = sort;
        self.filter = filter;
        self.table.set_sort_column(L::sort_column(sort));
    }

    fn observed_values(&self, axis: FilterAxis) -> Vec<String> {
        if !L::RESOURCE.filter_axes().contains(&axis) {
            return Vec::new();
        }
        L::axis_column(axis)
            .map(|col| self.table.column_values(col))
            .unwrap_or_default()
    }
}
