//! One-row status line: what is shown, how, and whether the last fetch failed.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::fmt::truncate;
use crate::source::{Filter, SortOrder};
use crate::tui::style::Styles;

/// Snapshot of the dashboard state the status line renders.
#[derive(Debug, Clone, Copy)]
pub struct StatusInfo<'a> {
    pub title: &'a str,
    pub sort: Option<SortOrder>,
    pub filter: &'a Filter,
    pub paused: bool,
    pub source: &'a str,
    /// (selected, total), 1-based selected.
    pub position: (usize, usize),
    pub error: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct StatusLine {
    rect: Rect,
}

impl StatusLine {
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn spans(info: &StatusInfo<'_>) -> Vec<Span<'static>> {
        let mut spans = vec![
            Span::styled(format!(" {} ", info.title), Styles::status_key()),
            Span::styled(format!("[{}/{}] ", info.position.0, info.position.1), Styles::status()),
        ];
        if let Some(sort) = info.sort {
            spans.push(Span::styled("sort:", Styles::status_key()));
            spans.push(Span::styled(format!("{} ", sort.name()), Styles::status()));
        }
        spans.push(Span::styled("filter:", Styles::status_key()));
        spans.push(Span::styled(format!("{} ", info.filter), Styles::status()));
        spans.push(Span::styled("source:", Styles::status_key()));
        spans.push(Span::styled(format!("{} ", info.source), Styles::status()));
        if info.paused {
            spans.push(Span::styled(" PAUSED ", Styles::warning()));
        }
        if let Some(err) = info.error {
            spans.push(Span::styled(format!(" {} ", truncate(err, 80)), Styles::critical()));
        }
        spans
    }

    pub fn draw(&self, frame: &mut Frame, info: &StatusInfo<'_>) {
        let line = Line::from(Self::spans(info));
        frame.render_widget(Paragraph::new(line).style(Styles::status()), self.rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(info: &StatusInfo<'_>) -> String {
        StatusLine::spans(info)
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn shows_sort_filter_and_source() {
        let filter = Filter::default().with(crate::source::FilterAxis::Node, Some("worker-1"));
        let info = StatusInfo {
            title: "PODS",
            sort: Some(SortOrder::Restarts),
            filter: &filter,
            paused: false,
            source: "demo",
            position: (3, 10),
            error: None,
        };
        let t = text(&info);
        assert!(t.contains("PODS"));
        assert!(t.contains("[3/10]"));
        assert!(t.contains("sort:restarts"));
        assert!(t.contains("filter:node=worker-1"));
        assert!(t.contains("source:demo"));
        assert!(!t.contains("PAUSED"));
    }

    #[test]
    fn shows_paused_and_error() {
        let filter = Filter::default();
        let info = StatusInfo {
            title: "NODES",
            sort: None,
            filter: &filter,
            paused: true,
            source: "kubectl",
            position: (0, 0),
            error: Some("timed out after 5s"),
        };
        let t = text(&info);
        assert!(t.contains("PAUSED"));
        assert!(t.contains("timed out after 5s"));
        assert!(!t.contains("sort:"));
        assert!(t.contains("filter:-"));
    }
}
