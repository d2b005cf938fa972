//! Generic table state: rows, selection, scroll offset, column layout.
//!
//! Selection follows the row identity across [`TableModel::set_rows`] calls
//! and falls back to clamping the index when the identity disappears.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Row as TuiRow, Table};

use crate::tui::style::Styles;

/// Gap rendered between two visible columns.
const COLUMN_SPACING: u16 = 1;

/// Width rule of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Always exactly this wide. `Fixed(0)` hides the column.
    Fixed(u16),
    /// Takes the space left by the fixed columns, never less than `min`.
    Overflow { min: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub width: ColumnWidth,
}

impl Column {
    pub const fn fixed(title: &'static str, width: u16) -> Self {
        Self {
            title,
            width: ColumnWidth::Fixed(width),
        }
    }

    pub const fn overflow(title: &'static str, min: u16) -> Self {
        Self {
            title,
            width: ColumnWidth::Overflow { min },
        }
    }
}

/// Visual class of a row, mapped to a style at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowClass {
    #[default]
    Normal,
    Warning,
    Critical,
    Dimmed,
}

impl RowClass {
    fn style(self) -> Style {
        match self {
            RowClass::Normal => Styles::default(),
            RowClass::Warning => Styles::warning(),
            RowClass::Critical => Styles::critical(),
            RowClass::Dimmed => Styles::dim(),
        }
    }
}

/// One table row: a stable identity plus the rendered fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub identity: String,
    pub fields: Vec<String>,
    pub class: RowClass,
}

impl Row {
    pub fn new(identity: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            identity: identity.into(),
            fields,
            class: RowClass::Normal,
        }
    }

    pub fn with_class(mut self, class: RowClass) -> Self {
        self.class = class;
        self
    }
}

/// State for a scrollable table.
#[derive(Debug, Clone)]
pub struct TableModel {
    columns: Vec<Column>,
    /// Computed by [`TableModel::resize`], one per column.
    widths: Vec<u16>,
    rows: Vec<Row>,
    /// Selected row index.
    selected: usize,
    /// First visible row.
    scroll_offset: usize,
    /// Visible data rows (area height minus the header row).
    viewport_height: usize,
    /// Identity that follows the selected row across refreshes.
    tracked_id: Option<String>,
    /// Column highlighted in the header as the active sort key.
    sort_column: Option<usize>,
}

impl TableModel {
    pub fn new(columns: Vec<Column>) -> Self {
        let widths = columns
            .iter()
            .map(|c| match c.width {
                ColumnWidth::Fixed(w) => w,
                ColumnWidth::Overflow { min } => min,
            })
            .collect();
        Self {
            columns,
            widths,
            rows: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            viewport_height: 0,
            tracked_id: None,
            sort_column: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub fn tracked_id(&self) -> Option<&str> {
        self.tracked_id.as_deref()
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn set_sort_column(&mut self, column: Option<usize>) {
        self.sort_column = column;
    }

    /// Replaces the rows, keeping the selection on the tracked identity.
    ///
    /// If the tracked identity is gone, `selected` is clamped into range.
    /// Either way the tracked identity is refreshed from the selected row.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.resolve_selection();
    }

    /// Follows `identity` from now on, selecting it if it is present.
    pub fn track(&mut self, identity: impl Into<String>) {
        self.tracked_id = Some(identity.into());
        self.resolve_selection();
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.select(self.selected.saturating_sub(n));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.select(self.selected.saturating_add(n));
    }

    pub fn scroll_to_top(&mut self) {
        self.select(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.select(self.rows.len().saturating_sub(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(self.half_page());
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.half_page());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }

    /// Recomputes column widths and the viewport for a new area.
    ///
    /// The overflow column gets `width - fixed_total` but never less than
    /// its minimum. `fixed_total` counts the fixed widths plus one
    /// `COLUMN_SPACING` cell between every pair of visible columns, so
    /// fixed 100 with width 150 leaves 49 cells, not 50. Hidden `Fixed(0)`
    /// columns take no gap.
    pub fn resize(&mut self, width: u16, height: u16) {
        let visible = self
            .columns
            .iter()
            .filter(|c| c.width != ColumnWidth::Fixed(0))
            .count() as u16;
        let gaps = visible.saturating_sub(1).saturating_mul(COLUMN_SPACING);
        let fixed_total = self
            .columns
            .iter()
            .filter_map(|c| match c.width {
                ColumnWidth::Fixed(w) => Some(w),
                ColumnWidth::Overflow { .. } => None,
            })
            .fold(gaps, u16::saturating_add);

        self.widths = self
            .columns
            .iter()
            .map(|c| match c.width {
                ColumnWidth::Fixed(w) => w,
                ColumnWidth::Overflow { min } => width.saturating_sub(fixed_total).max(min),
            })
            .collect();
        self.viewport_height = height.saturating_sub(1) as usize;
        self.ensure_visible();
    }

    /// Sorted, de-duplicated non-empty values of one column across all rows.
    pub fn column_values(&self, column: usize) -> Vec<String> {
        let mut values: Vec<String> = self
            .rows
            .iter()
            .filter_map(|r| r.fields.get(column))
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Draws the visible slice with a header row.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let visible: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.widths.get(i).copied().unwrap_or(0) > 0)
            .collect();

        let header = TuiRow::new(visible.iter().map(|&i| {
            let style = if self.sort_column == Some(i) {
                Styles::sorted_header()
            } else {
                Styles::table_header()
            };
            Span::styled(self.columns[i].title, style)
        }))
        .style(Styles::table_header())
        .height(1);

        let end = self
            .scroll_offset
            .saturating_add(self.viewport_height)
            .min(self.rows.len());
        let start = self.scroll_offset.min(end);
        let rows: Vec<TuiRow> = self.rows[start..end]
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let style = if start + offset == self.selected {
                    Styles::selected()
                } else {
                    row.class.style()
                };
                let cells = visible
                    .iter()
                    .map(|&i| row.fields.get(i).cloned().unwrap_or_default());
                TuiRow::new(cells).style(style).height(1)
            })
            .collect();

        let constraints: Vec<Constraint> = visible
            .iter()
            .map(|&i| Constraint::Length(self.widths[i]))
            .collect();

        let table = Table::new(rows, constraints)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .style(Styles::default());
        frame.render_widget(table, area);
    }

    fn half_page(&self) -> usize {
        (self.viewport_height / 2).max(1)
    }

    /// Manual navigation: moves to `index` (clamped) and re-tracks.
    fn select(&mut self, index: usize) {
        if self.rows.is_empty() {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        self.selected = index.min(self.rows.len() - 1);
        self.tracked_id = Some(self.rows[self.selected].identity.clone());
        self.ensure_visible();
    }

    fn resolve_selection(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }

        let tracked = self
            .tracked_id
            .as_deref()
            .and_then(|tid| self.rows.iter().position(|r| r.identity == tid));
        match tracked {
            Some(pos) => self.selected = pos,
            None => self.selected = self.selected.min(len - 1),
        }

        self.tracked_id = Some(self.rows[self.selected].identity.clone());
        self.ensure_visible();
    }

    /// Moves `scroll_offset` only as far as needed to show `selected`.
    fn ensure_visible(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = self.selected + 1 - self.viewport_height;
        }
    }
}
