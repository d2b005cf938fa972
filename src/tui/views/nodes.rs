//! Nodes list: the default top-level view.

use crate::fmt::{FmtStyle, format_age, format_millicores, format_opt_bytes, format_percent};
use crate::source::{
    FetchError, Filter, FilterAxis, NodeRecord, ResourceKind, ResourceSource, SortOrder,
};
use crate::tui::table::{Column, Row, RowClass};

use super::{ListLayout, ListView, ViewKind};

pub type NodesView = ListView<NodeColumns>;

pub struct NodeColumns;

const NAME: usize = 0;
const STATUS: usize = 1;
const CPU: usize = 3;
const MEMORY: usize = 5;
const AGE: usize = 9;

impl ListLayout for NodeColumns {
    const RESOURCE: ResourceKind = ResourceKind::Nodes;
    const KIND: ViewKind = ViewKind::TopList;

    fn columns() -> Vec<Column> {
        vec![
            Column::overflow("NAME", 16),
            Column::fixed("STATUS", 9),
            Column::fixed("ROLES", 14),
            Column::fixed("CPU", 6),
            Column::fixed("CPU%", 5),
            Column::fixed("MEMORY", 7),
            Column::fixed("MEM%", 5),
            Column::fixed("PODS", 5),
            Column::fixed("VERSION", 10),
            Column::fixed("AGE", 7),
        ]
    }

    fn axis_column(axis: FilterAxis) -> Option<usize> {
        match axis {
            FilterAxis::Status => Some(STATUS),
            FilterAxis::Node | FilterAxis::Namespace => None,
        }
    }

    fn sort_column(sort: SortOrder) -> Option<usize> {
        match sort {
            SortOrder::Name => Some(NAME),
            SortOrder::Status => Some(STATUS),
            SortOrder::Cpu => Some(CPU),
            SortOrder::Memory => Some(MEMORY),
            SortOrder::Age => Some(AGE),
            SortOrder::Namespace | SortOrder::Restarts => None,
        }
    }

    fn fetch(
        source: &dyn ResourceSource,
        filter: &Filter,
        sort: SortOrder,
        now: i64,
    ) -> Result<Vec<Row>, FetchError> {
        let nodes = source.nodes(filter, sort)?;
        Ok(nodes.iter().map(|n| node_row(n, now)).collect())
    }
}

fn node_row(n: &NodeRecord, now: i64) -> Row {
    let class = if n.status == "Ready" {
        RowClass::Normal
    } else {
        RowClass::Critical
    };
    Row::new(
        n.name.clone(),
        vec![
            n.name.clone(),
            n.status.clone(),
            n.roles.clone(),
            format_millicores(n.cpu_usage_millis),
            format_percent(n.cpu_usage_millis, n.cpu_capacity_millis),
            format_opt_bytes(n.memory_usage_bytes),
            format_percent(n.memory_usage_bytes, n.memory_capacity_bytes),
            n.pods.to_string(),
            n.version.clone(),
            format_age(n.created, now, FmtStyle::Compact),
        ],
    )
    .with_class(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DemoSource;
    use crate::tui::views::ResourceView;

    #[test]
    fn rows_are_keyed_by_node_name() {
        let mut view = NodesView::new(Filter::default(), SortOrder::Name);
        view.fetch(&DemoSource::new()).unwrap();
        let ids: Vec<&str> = view.table().rows().iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["control-plane-1", "worker-1", "worker-2"]);
        assert_eq!(view.observed_values(FilterAxis::Status), vec!["Ready"]);
        assert!(view.observed_values(FilterAxis::Namespace).is_empty());
    }

    #[test]
    fn not_ready_node_is_critical() {
        let row = node_row(
            &NodeRecord {
                name: "n1".to_string(),
                status: "NotReady".to_string(),
                cpu_usage_millis: Some(500),
                cpu_capacity_millis: Some(2000),
                ..Default::default()
            },
            0,
        );
        assert_eq!(row.class, RowClass::Critical);
        assert_eq!(row.fields[CPU], "500m");
        assert_eq!(row.fields[CPU + 1], "25%");
        assert_eq!(row.fields[AGE], "-");
    }

    #[test]
    fn unsupported_sort_falls_back_to_default() {
        let view = NodesView::new(Filter::default(), SortOrder::Restarts);
        assert_eq!(view.sortorder(), SortOrder::Name);
    }
}
