//! Pods list, optionally scoped to one node.

use crate::fmt::{FmtStyle, format_age, format_millicores, format_opt_bytes};
use crate::source::{
    FetchError, Filter, FilterAxis, PodRecord, ResourceKind, ResourceSource, SortOrder,
};
use crate::tui::table::{Column, Row, RowClass};

use super::{ListLayout, ListView, ViewKind};

pub type PodsView = ListView<PodColumns>;

pub struct PodColumns;

impl PodColumns {
    pub const NAMESPACE: usize = 0;
    pub const NAME: usize = 1;
    const STATUS: usize = 3;
    const RESTARTS: usize = 4;
    const CPU: usize = 5;
    const MEMORY: usize = 6;
    const NODE: usize = 8;
    const AGE: usize = 9;
}

impl ListLayout for PodColumns {
    const RESOURCE: ResourceKind = ResourceKind::Pods;
    const KIND: ViewKind = ViewKind::ScopedList;

    fn columns() -> Vec<Column> {
        vec![
            Column::fixed("NAMESPACE", 16),
            Column::overflow("NAME", 24),
            Column::fixed("READY", 5),
            Column::fixed("STATUS", 17),
            Column::fixed("RESTARTS", 8),
            Column::fixed("CPU", 6),
            Column::fixed("MEMORY", 7),
            Column::fixed("IP", 15),
            Column::fixed("NODE", 16),
            Column::fixed("AGE", 7),
        ]
    }

    fn axis_column(axis: FilterAxis) -> Option<usize> {
        match axis {
            FilterAxis::Namespace => Some(Self::NAMESPACE),
            FilterAxis::Node => Some(Self::NODE),
            FilterAxis::Status => Some(Self::STATUS),
        }
    }

    fn sort_column(sort: SortOrder) -> Option<usize> {
        Some(match sort {
            SortOrder::Namespace => Self::NAMESPACE,
            SortOrder::Name => Self::NAME,
            SortOrder::Status => Self::STATUS,
            SortOrder::Restarts => Self::RESTARTS,
            SortOrder::Cpu => Self::CPU,
            SortOrder::Memory => Self::MEMORY,
            SortOrder::Age => Self::AGE,
        })
    }

    fn fetch(
        source: &dyn ResourceSource,
        filter: &Filter,
        sort: SortOrder,
        now: i64,
    ) -> Result<Vec<Row>, FetchError> {
        let pods = source.pods(filter, sort)?;
        Ok(pods.iter().map(|p| pod_row(p, now)).collect())
    }
}

/// Row identity of a pod: `namespace/name`.
pub(crate) fn pod_identity(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

fn pod_class(status: &str) -> RowClass {
    match status {
        "Running" => RowClass::Normal,
        "Succeeded" | "Completed" => RowClass::Dimmed,
        "Pending" | "ContainerCreating" | "PodInitializing" | "Terminating" => RowClass::Warning,
        _ => RowClass::Critical,
    }
}

fn pod_row(p: &PodRecord, now: i64) -> Row {
    Row::new(
        pod_identity(&p.namespace, &p.name),
        vec![
            p.namespace.clone(),
            p.name.clone(),
            format!("{}/{}", p.ready, p.containers),
            p.status.clone(),
            p.restarts.to_string(),
            format_millicores(p.cpu_usage_millis),
            format_opt_bytes(p.memory_usage_bytes),
            p.ip.clone(),
            p.node.clone(),
            format_age(p.created, now, FmtStyle::Compact),
        ],
    )
    .with_class(pod_class(&p.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DemoSource;
    use crate::tui::views::ResourceView;

    #[test]
    fn scoped_view_lists_only_that_node() {
        let filter = Filter::default().with(FilterAxis::Node, Some("worker-2"));
        let mut view = PodsView::new(filter, SortOrder::Namespace);
        view.fetch(&DemoSource::new()).unwrap();
        assert!(!view.table().is_empty());
        assert_eq!(view.observed_values(FilterAxis::Node), vec!["worker-2"]);
        assert_eq!(view.kind(), ViewKind::ScopedList);
    }

    #[test]
    fn identity_combines_namespace_and_name() {
        let row = pod_row(
            &PodRecord {
                name: "api".to_string(),
                namespace: "default".to_string(),
                status: "CrashLoopBackOff".to_string(),
                ready: 1,
                containers: 2,
                ..Default::default()
            },
            0,
        );
        assert_eq!(row.identity, "default/api");
        assert_eq!(row.fields[PodColumns::NAMESPACE], "default");
        assert_eq!(row.fields[PodColumns::NAME], "api");
        assert_eq!(row.fields[2], "1/2");
        assert_eq!(row.class, RowClass::Critical);
    }

    #[test]
    fn observed_namespaces_are_unique() {
        let mut view = PodsView::new(Filter::default(), SortOrder::Namespace);
        view.fetch(&DemoSource::new()).unwrap();
        assert_eq!(
            view.observed_values(FilterAxis::Namespace),
            vec!["default", "kube-system", "monitoring"]
        );
    }
}
