//! Scripted data source for dashboard tests.

use std::cell::Cell;
use std::time::Duration;

use crate::source::{
    EventRecord, FetchError, Filter, NodeRecord, PodDetail, PodRecord, ResourceSource, SortOrder,
    select_nodes, select_pods,
};

/// Serves fixed nodes with two pods per node, counting every call.
#[derive(Default)]
pub struct FakeSource {
    nodes: Vec<String>,
    calls: Cell<usize>,
    fail_next: Cell<bool>,
    delay: Duration,
}

impl FakeSource {
    pub fn with_nodes(nodes: &[&str]) -> Self {
        Self {
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Makes every fetch block for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Makes the next fetch fail with a timeout.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn enter(&self) -> Result<(), FetchError> {
        self.calls.set(self.calls.get() + 1);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail_next.replace(false) {
            return Err(FetchError::Timeout(Duration::from_secs(5)));
        }
        Ok(())
    }

    fn all_pods(&self) -> Vec<PodRecord> {
        self.nodes
            .iter()
            .flat_map(|node| {
                ["web", "db"].into_iter().map(move |app| PodRecord {
                    name: format!("{}-{}", app, node),
                    namespace: if app == "web" { "default" } else { "data" }.to_string(),
                    node: node.clone(),
                    status: "Running".to_string(),
                    ..Default::default()
                })
            })
            .collect()
    }
}

impl ResourceSource for FakeSource {
    fn nodes(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<NodeRecord>, FetchError> {
        self.enter()?;
        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeRecord {
                name: n.clone(),
                status: "Ready".to_string(),
                pods: 2,
                ..Default::default()
            })
            .collect();
        Ok(select_nodes(nodes, filter, sort))
    }

    fn pods(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<PodRecord>, FetchError> {
        self.enter()?;
        Ok(select_pods(self.all_pods(), filter, sort))
    }

    fn events(&self, _filter: &Filter, _sort: SortOrder) -> Result<Vec<EventRecord>, FetchError> {
        self.enter()?;
        Ok(vec![EventRecord {
            uid: "e1".to_string(),
            event_type: "Normal".to_string(),
            ..Default::default()
        }])
    }

    fn pod_detail(&self, namespace: &str, name: &str) -> Result<PodDetail, FetchError> {
        self.enter()?;
        let pod = self
            .all_pods()
            .into_iter()
            .find(|p| p.namespace == namespace && p.name == name)
            .ok_or_else(|| FetchError::NotFound(name.to_string()))?;
        Ok(PodDetail {
            pod,
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}
