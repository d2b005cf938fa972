//! Fetch contract for cluster data sources.
//!
//! The dashboard only ever talks to a data source through the
//! [`ResourceSource`] trait, so the same views work against a live cluster
//! (`kubectl`) or the deterministic demo cluster used by tests and `--source demo`.

mod demo;
mod kubectl;
pub mod types;

pub use demo::DemoSource;
pub use kubectl::{KubectlConfig, KubectlSource};
pub use types::*;

use std::cmp::Ordering;
use std::time::Duration;

/// Errors a fetch can fail with. All of them are transient for the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The data source command ran but reported failure.
    #[error("command failed: {0}")]
    Command(String),
    /// The data source did not answer within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction for cluster data sources.
///
/// Implementations must be safely callable repeatedly; they are the only
/// source of truth for row data. Filtering and ordering are part of the
/// contract: returned records already honor `filter` and `sort`.
pub trait ResourceSource {
    /// Lists nodes.
    fn nodes(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<NodeRecord>, FetchError>;

    /// Lists pods. `filter.node` scopes the result to one node.
    fn pods(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<PodRecord>, FetchError>;

    /// Lists events.
    fn events(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<EventRecord>, FetchError>;

    /// Fetches one pod together with its containers and events.
    fn pod_detail(&self, namespace: &str, name: &str) -> Result<PodDetail, FetchError>;

    /// Short name shown in the status line.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Shared filter/sort helpers
// ---------------------------------------------------------------------------

pub(crate) fn select_nodes(
    mut nodes: Vec<NodeRecord>,
    filter: &Filter,
    sort: SortOrder,
) -> Vec<NodeRecord> {
    nodes.retain(|n| filter.accepts(FilterAxis::Status, &n.status));
    nodes.sort_by(|a, b| {
        let primary = match sort {
            SortOrder::Cpu => b.cpu_usage_millis.cmp(&a.cpu_usage_millis),
            SortOrder::Memory => b.memory_usage_bytes.cmp(&a.memory_usage_bytes),
            SortOrder::Status => a.status.cmp(&b.status),
            SortOrder::Age => a.created.cmp(&b.created),
            SortOrder::Name | SortOrder::Namespace | SortOrder::Restarts => Ordering::Equal,
        };
        primary.then_with(|| a.name.cmp(&b.name))
    });
    nodes
}

pub(crate) fn select_pods(
    mut pods: Vec<PodRecord>,
    filter: &Filter,
    sort: SortOrder,
) -> Vec<PodRecord> {
    pods.retain(|p| {
        filter.accepts(FilterAxis::Node, &p.node)
            && filter.accepts(FilterAxis::Namespace, &p.namespace)
            && filter.accepts(FilterAxis::Status, &p.status)
    });
    pods.sort_by(|a, b| {
        let primary = match sort {
            SortOrder::Namespace => a.namespace.cmp(&b.namespace),
            SortOrder::Cpu => b.cpu_usage_millis.cmp(&a.cpu_usage_millis),
            SortOrder::Memory => b.memory_usage_bytes.cmp(&a.memory_usage_bytes),
            SortOrder::Status => a.status.cmp(&b.status),
            SortOrder::Restarts => b.restarts.cmp(&a.restarts),
            SortOrder::Age => a.created.cmp(&b.created),
            SortOrder::Name => Ordering::Equal,
        };
        primary
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.namespace.cmp(&b.namespace))
    });
    pods
}

pub(crate) fn select_events(
    mut events: Vec<EventRecord>,
    filter: &Filter,
    sort: SortOrder,
) -> Vec<EventRecord> {
    events.retain(|e| {
        filter.accepts(FilterAxis::Node, &e.node)
            && filter.accepts(FilterAxis::Namespace, &e.namespace)
            && filter.accepts(FilterAxis::Status, &e.event_type)
    });
    events.sort_by(|a, b| {
        let primary = match sort {
            SortOrder::Namespace => a.namespace.cmp(&b.namespace),
            SortOrder::Name => a.name.cmp(&b.name),
            SortOrder::Status => a.event_type.cmp(&b.event_type),
            // Most recent first.
            SortOrder::Age | SortOrder::Cpu | SortOrder::Memory | SortOrder::Restarts => {
                b.timestamp.cmp(&a.timestamp)
            }
        };
        primary.then_with(|| a.uid.cmp(&b.uid))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(ns: &str, name: &str, node: &str, status: &str, restarts: u32) -> PodRecord {
        PodRecord {
            name: name.to_string(),
            namespace: ns.to_string(),
            node: node.to_string(),
            status: status.to_string(),
            restarts,
            ..Default::default()
        }
    }

    #[test]
    fn pods_filtered_by_every_axis() {
        let pods = vec![
            pod("default", "a", "n1", "Running", 0),
            pod("default", "b", "n2", "Running", 0),
            pod("kube-system", "c", "n1", "Pending", 0),
        ];
        let filter = Filter {
            node: Some("n1".to_string()),
            ..Default::default()
        };
        let out = select_pods(pods.clone(), &filter, SortOrder::Name);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);

        let filter = filter.with(FilterAxis::Status, Some("Pending"));
        let out = select_pods(pods, &filter, SortOrder::Name);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "c");
    }

    #[test]
    fn pods_sorted_by_restarts_descending() {
        let pods = vec![
            pod("default", "a", "n1", "Running", 1),
            pod("default", "b", "n1", "Running", 7),
            pod("default", "c", "n1", "Running", 3),
        ];
        let out = select_pods(pods, &Filter::default(), SortOrder::Restarts);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn pods_namespace_sort_breaks_ties_by_name() {
        let pods = vec![
            pod("kube-system", "z", "n1", "Running", 0),
            pod("default", "y", "n1", "Running", 0),
            pod("default", "x", "n1", "Running", 0),
        ];
        let out = select_pods(pods, &Filter::default(), SortOrder::Namespace);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn nodes_cpu_sort_puts_unknown_last() {
        let nodes = vec![
            NodeRecord {
                name: "a".to_string(),
                cpu_usage_millis: None,
                ..Default::default()
            },
            NodeRecord {
                name: "b".to_string(),
                cpu_usage_millis: Some(200),
                ..Default::default()
            },
            NodeRecord {
                name: "c".to_string(),
                cpu_usage_millis: Some(900),
                ..Default::default()
            },
        ];
        let out = select_nodes(nodes, &Filter::default(), SortOrder::Cpu);
        let names: Vec<&str> = out.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn events_most_recent_first() {
        let events = vec![
            EventRecord {
                uid: "1".to_string(),
                timestamp: 10,
                ..Default::default()
            },
            EventRecord {
                uid: "2".to_string(),
                timestamp: 30,
                ..Default::default()
            },
        ];
        let out = select_events(events, &Filter::default(), SortOrder::Age);
        assert_eq!(out[0].uid, "2");
    }
}
