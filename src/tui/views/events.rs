//! Cluster events list. A top-level view without drill-down.

use crate::fmt::{FmtStyle, format_age};
use crate::source::{
    EventRecord, FetchError, Filter, FilterAxis, ResourceKind, ResourceSource, SortOrder,
};
use crate::tui::table::{Column, Row, RowClass};

use super::{ListLayout, ListView, ViewKind};

pub type EventsView = ListView<EventColumns>;

pub struct EventColumns;

const AGE: usize = 0;
const TYPE: usize = 2;
const NAMESPACE: usize = 3;
const NAME: usize = 4;
const NODE: usize = 7;

impl ListLayout for EventColumns {
    const RESOURCE: ResourceKind = ResourceKind::Events;
    const KIND: ViewKind = ViewKind::TopList;

    fn columns() -> Vec<Column> {
        vec![
            Column::fixed("AGE", 7),
            Column::fixed("COUNT", 5),
            Column::fixed("TYPE", 7),
            Column::fixed("NAMESPACE", 16),
            Column::fixed("OBJECT", 32),
            Column::overflow("MESSAGE", 24),
            Column::fixed("REASON", 18),
            Column::fixed("NODE", 16),
        ]
    }

    fn axis_column(axis: FilterAxis) -> Option<usize> {
        Some(match axis {
            FilterAxis::Status => TYPE,
            FilterAxis::Namespace => NAMESPACE,
            FilterAxis::Node => NODE,
        })
    }

    fn sort_column(sort: SortOrder) -> Option<usize> {
        match sort {
            SortOrder::Age => Some(AGE),
            SortOrder::Status => Some(TYPE),
            SortOrder::Namespace => Some(NAMESPACE),
            SortOrder::Name => Some(NAME),
            SortOrder::Cpu | SortOrder::Memory | SortOrder::Restarts => None,
        }
    }

    fn fetch(
        source: &dyn ResourceSource,
        filter: &Filter,
        sort: SortOrder,
        now: i64,
    ) -> Result<Vec<Row>, FetchError> {
        let events = source.events(filter, sort)?;
        Ok(events.iter().map(|e| event_row(e, now)).collect())
    }
}

pub(crate) fn event_row(e: &EventRecord, now: i64) -> Row {
    let class = if e.event_type == "Warning" {
        RowClass::Warning
    } else {
        RowClass::Normal
    };
    let object = if e.kind.is_empty() {
        e.name.clone()
    } else {
        format!("{}/{}", e.kind.to_ascii_lowercase(), e.name)
    };
    Row::new(
        e.uid.clone(),
        vec![
            format_age(e.timestamp, now, FmtStyle::Compact),
            e.count.to_string(),
            e.event_type.clone(),
            e.namespace.clone(),
            object,
            e.message.clone(),
            e.reason.clone(),
            e.node.clone(),
        ],
    )
    .with_class(class)
}
