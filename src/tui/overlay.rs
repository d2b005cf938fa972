//! Modal picker for the sort order or one filter axis.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear};

use crate::source::{Filter, FilterAxis, ResourceKind, SortOrder};
use crate::tui::style::Styles;
use crate::tui::table::{Column, Row, TableModel};

/// Option that clears the filter axis being edited.
pub const CLEAR_OPTION: &str = "*";

/// What the overlay edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAxis {
    Sort,
    Filter(FilterAxis),
}

impl OverlayAxis {
    fn title(&self) -> &'static str {
        match self {
            OverlayAxis::Sort => "SORT BY",
            OverlayAxis::Filter(FilterAxis::Node) => "NODE",
            OverlayAxis::Filter(FilterAxis::Namespace) => "NAMESPACE",
            OverlayAxis::Filter(FilterAxis::Status) => "STATUS",
        }
    }
}

pub struct Overlay {
    visible: bool,
    axis: OverlayAxis,
    table: TableModel,
    rect: Rect,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            axis: OverlayAxis::Sort,
            table: TableModel::new(vec![Column::overflow(OverlayAxis::Sort.title(), 1)]),
            rect: Rect::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn axis(&self) -> OverlayAxis {
        self.axis
    }

    /// Option labels in display order.
    pub fn options(&self) -> Vec<&str> {
        self.table
            .rows()
            .iter()
            .map(|r| r.identity.as_str())
            .collect()
    }

    /// Opens the picker centered in a `width` x `height` screen.
    ///
    /// Sort options come from the kind. Filter options are [`CLEAR_OPTION`]
    /// followed by `candidates` (sorted, de-duplicated). Returns `false` and
    /// stays hidden when the kind lacks the axis or nothing was observed.
    pub fn show(
        &mut self,
        kind: ResourceKind,
        axis: OverlayAxis,
        mut candidates: Vec<String>,
        width: u16,
        height: u16,
    ) -> bool {
        let options: Vec<String> = match axis {
            OverlayAxis::Sort => kind
                .sort_orders()
                .iter()
                .map(|s| s.name().to_string())
                .collect(),
            OverlayAxis::Filter(a) => {
                if !kind.filter_axes().contains(&a) {
                    return false;
                }
                candidates.retain(|c| !c.is_empty());
                candidates.sort();
                candidates.dedup();
                if candidates.is_empty() {
                    return false;
                }
                std::iter::once(CLEAR_OPTION.to_string())
                    .chain(candidates)
                    .collect()
            }
        };
        if options.is_empty() {
            return false;
        }

        self.axis = axis;
        self.table = TableModel::new(vec![Column::overflow(axis.title(), 1)]);
        self.table.set_rows(
            options
                .into_iter()
                .map(|o| Row::new(o.clone(), vec![o]))
                .collect(),
        );
        self.relayout(width, height);
        self.visible = true;
        true
    }

    /// Re-centers in a resized screen, keeping options and highlight.
    pub fn relayout(&mut self, width: u16, height: u16) {
        let longest = self
            .table
            .rows()
            .iter()
            .map(|r| r.identity.chars().count())
            .chain(std::iter::once(self.axis.title().len()))
            .max()
            .unwrap_or(0) as u16;
        // Borders plus header row.
        let w = longest.saturating_add(4).clamp(1, width.max(1));
        let h = (self.table.len() as u16)
            .saturating_add(3)
            .clamp(1, height.max(1));
        self.rect = Rect::new(width.saturating_sub(w) / 2, height.saturating_sub(h) / 2, w, h);
        let inner = Block::default().borders(Borders::ALL).inner(self.rect);
        self.table.resize(inner.width, inner.height);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Moves the highlight to `option` if it is offered.
    pub fn highlight(&mut self, option: &str) {
        self.table.track(option);
    }

    /// Highlighted option, if any.
    pub fn current(&self) -> Option<&str> {
        self.table.selected_row().map(|r| r.identity.as_str())
    }

    /// Applies the highlighted option to its axis only.
    pub fn selected(&self, base_sort: SortOrder, base_filter: &Filter) -> (SortOrder, Filter) {
        let Some(option) = self.current() else {
            return (base_sort, base_filter.clone());
        };
        match self.axis {
            OverlayAxis::Sort => (
                SortOrder::from_name(option).unwrap_or(base_sort),
                base_filter.clone(),
            ),
            OverlayAxis::Filter(axis) if option == CLEAR_OPTION => {
                (base_sort, base_filter.with(axis, None))
            }
            OverlayAxis::Filter(axis) => {
                let target = Filter::default().with(axis, Some(option));
                (base_sort, Filter::merge(base_filter, &target))
            }
        }
    }

    pub fn select_next(&mut self) {
        self.table.scroll_down(1);
    }

    pub fn select_prev(&mut self) {
        self.table.scroll_up(1);
    }

    pub fn select_top(&mut self) {
        self.table.scroll_to_top();
    }

    pub fn select_bottom(&mut self) {
        self.table.scroll_to_bottom();
    }

    pub fn select_page_down(&mut self) {
        self.table.page_down();
    }

    pub fn select_page_up(&mut self) {
        self.table.page_up();
    }

    pub fn draw(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }
        let area = self.rect.intersection(frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::overlay_border())
            .style(Styles::default());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.table.draw(frame, inner);
    }
}
