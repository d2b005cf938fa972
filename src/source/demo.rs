//! Deterministic in-memory cluster.
//!
//! Used by `--source demo` and by tests. Usage figures drift a little on every
//! fetch so refreshes are visible, but the set of objects never changes.

use std::cell::Cell;

use super::{
    ContainerRecord, EventRecord, FetchError, Filter, NodeRecord, PodDetail, PodRecord,
    ResourceSource, SortOrder, select_events, select_nodes, select_pods,
};

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

/// Creation time of the demo cluster, epoch seconds.
const EPOCH: i64 = 1_767_225_600;

/// (namespace, name, node, status, containers, restarts)
const PODS: &[(&str, &str, &str, &str, usize, u32)] = &[
    ("kube-system", "coredns-5d78c9869d-4kq2x", "control-plane-1", "Running", 1, 0),
    ("kube-system", "etcd-control-plane-1", "control-plane-1", "Running", 1, 0),
    ("kube-system", "kube-apiserver-control-plane-1", "control-plane-1", "Running", 1, 1),
    ("kube-system", "kube-proxy-8jz7d", "worker-1", "Running", 1, 0),
    ("kube-system", "kube-proxy-r2m5w", "worker-2", "Running", 1, 0),
    ("default", "api-7f9c6b5d8-2xkpl", "worker-1", "Running", 2, 3),
    ("default", "api-7f9c6b5d8-9wq4t", "worker-2", "Running", 2, 0),
    ("default", "worker-6c8d9f7b4-lm2qz", "worker-1", "CrashLoopBackOff", 1, 14),
    ("default", "migrate-28471230-vb7kx", "worker-2", "Succeeded", 1, 0),
    ("monitoring", "prometheus-0", "worker-2", "Running", 2, 0),
    ("monitoring", "grafana-5b7d8c6f9-qz8rt", "worker-1", "Running", 1, 0),
    ("monitoring", "alertmanager-0", "worker-2", "Pending", 1, 0),
];

/// (name, roles, status, cpu capacity millis, memory capacity GiB)
const NODES: &[(&str, &str, &str, u64, u64)] = &[
    ("control-plane-1", "control-plane", "Ready", 4000, 8),
    ("worker-1", "<none>", "Ready", 8000, 32),
    ("worker-2", "<none>", "Ready", 8000, 32),
];

/// A small fixed cluster whose usage figures change per fetch.
#[derive(Debug, Default)]
pub struct DemoSource {
    generation: Cell<u64>,
}

impl DemoSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> u64 {
        let g = self.generation.get().wrapping_add(1);
        self.generation.set(g);
        g
    }

    fn all_pods(&self, generation: u64) -> Vec<PodRecord> {
        PODS.iter()
            .enumerate()
            .map(|(i, &(ns, name, node, status, containers, restarts))| {
                let running = status == "Running";
                let seed = i as u64 + 1;
                PodRecord {
                    name: name.to_string(),
                    namespace: ns.to_string(),
                    node: node.to_string(),
                    status: status.to_string(),
                    ready: if running { containers } else { 0 },
                    containers,
                    restarts,
                    ip: format!("10.244.{}.{}", i / 4, 10 + i),
                    created: EPOCH + (i as i64) * 3_600,
                    cpu_usage_millis: running.then(|| drift(seed * 37, generation, 5, 400)),
                    memory_usage_bytes: running
                        .then(|| drift(seed * 53, generation, 32, 900) * MIB),
                }
            })
            .collect()
    }

    fn all_nodes(&self, generation: u64) -> Vec<NodeRecord> {
        let pods = self.all_pods(generation);
        NODES
            .iter()
            .enumerate()
            .map(|(i, &(name, roles, status, cpu_cap, mem_gib))| {
                let on_node: Vec<&PodRecord> = pods.iter().filter(|p| p.node == name).collect();
                let cpu: u64 = on_node.iter().filter_map(|p| p.cpu_usage_millis).sum();
                let mem: u64 = on_node.iter().filter_map(|p| p.memory_usage_bytes).sum();
                NodeRecord {
                    name: name.to_string(),
                    status: status.to_string(),
                    roles: roles.to_string(),
                    version: "v1.31.2".to_string(),
                    created: EPOCH - 86_400 * (3 - i as i64),
                    cpu_usage_millis: Some(cpu + 150),
                    cpu_capacity_millis: Some(cpu_cap),
                    memory_usage_bytes: Some(mem + GIB),
                    memory_capacity_bytes: Some(mem_gib * GIB),
                    pods: on_node.len(),
                }
            })
            .collect()
    }

    fn all_events(&self, generation: u64) -> Vec<EventRecord> {
        let stamp = EPOCH + 30 * 86_400 + generation as i64;
        vec![
            EventRecord {
                uid: "ev-0001".to_string(),
                timestamp: stamp - 12,
                count: 14 + generation as u32,
                event_type: "Warning".to_string(),
                namespace: "default".to_string(),
                name: "worker-6c8d9f7b4-lm2qz".to_string(),
                kind: "Pod".to_string(),
                reason: "BackOff".to_string(),
                message: "Back-off restarting failed container worker".to_string(),
                source: "kubelet".to_string(),
                node: "worker-1".to_string(),
            },
            EventRecord {
                uid: "ev-0002".to_string(),
                timestamp: stamp - 95,
                count: 1,
                event_type: "Warning".to_string(),
                namespace: "monitoring".to_string(),
                name: "alertmanager-0".to_string(),
                kind: "Pod".to_string(),
                reason: "FailedScheduling".to_string(),
                message: "0/3 nodes are available: 3 Insufficient memory.".to_string(),
                source: "default-scheduler".to_string(),
                node: String::new(),
            },
            EventRecord {
                uid: "ev-0003".to_string(),
                timestamp: stamp - 600,
                count: 1,
                event_type: "Normal".to_string(),
                namespace: "default".to_string(),
                name: "migrate-28471230-vb7kx".to_string(),
                kind: "Pod".to_string(),
                reason: "Completed".to_string(),
                message: "Job completed".to_string(),
                source: "job-controller".to_string(),
                node: "worker-2".to_string(),
            },
            EventRecord {
                uid: "ev-0004".to_string(),
                timestamp: stamp - 1_800,
                count: 3,
                event_type: "Normal".to_string(),
                namespace: "default".to_string(),
                name: "api-7f9c6b5d8-2xkpl".to_string(),
                kind: "Pod".to_string(),
                reason: "Pulled".to_string(),
                message: "Container image \"registry.local/api:1.8.2\" already present on machine"
                    .to_string(),
                source: "kubelet".to_string(),
                node: "worker-1".to_string(),
            },
        ]
    }
}

/// Deterministic value in `[lo, hi)` that moves with `generation`.
fn drift(seed: u64, generation: u64, lo: u64, hi: u64) -> u64 {
    let span = hi.saturating_sub(lo).max(1);
    let mixed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(generation.wrapping_mul(1_442_695_040_888_963_407));
    lo + (mixed >> 33) % span
}

impl ResourceSource for DemoSource {
    fn nodes(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<NodeRecord>, FetchError> {
        let g = self.tick();
        Ok(select_nodes(self.all_nodes(g), filter, sort))
    }

    fn pods(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<PodRecord>, FetchError> {
        let g = self.tick();
        Ok(select_pods(self.all_pods(g), filter, sort))
    }

    fn events(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<EventRecord>, FetchError> {
        let g = self.tick();
        Ok(select_events(self.all_events(g), filter, sort))
    }

    fn pod_detail(&self, namespace: &str, name: &str) -> Result<PodDetail, FetchError> {
        let g = self.tick();
        let pod = self
            .all_pods(g)
            .into_iter()
            .find(|p| p.namespace == namespace && p.name == name)
            .ok_or_else(|| FetchError::NotFound(format!("pod {}/{}", namespace, name)))?;

        let containers = (0..pod.containers)
            .map(|i| {
                let base = pod.name.split('-').next().unwrap_or("app");
                let name = if i == 0 {
                    base.to_string()
                } else {
                    format!("{}-sidecar", base)
                };
                ContainerRecord {
                    image: format!("registry.local/{}:1.8.2", name),
                    name,
                    ready: i < pod.ready,
                    state: if pod.status == "Running" {
                        "running".to_string()
                    } else {
                        "waiting".to_string()
                    },
                    restarts: if i == 0 { pod.restarts } else { 0 },
                    cpu_usage_millis: pod.cpu_usage_millis.map(|c| c / pod.containers as u64),
                    memory_usage_bytes: pod.memory_usage_bytes.map(|m| m / pod.containers as u64),
                }
            })
            .collect();

        let events = self
            .all_events(g)
            .into_iter()
            .filter(|e| e.namespace == namespace && e.name == name)
            .collect();

        let app = pod.name.split('-').next().unwrap_or_default().to_string();
        Ok(PodDetail {
            labels: vec![("app".to_string(), app)],
            qos_class: "Burstable".to_string(),
            service_account: "default".to_string(),
            containers,
            events,
            pod,
        })
    }

    fn name(&self) -> &str {
        "demo"
    }
}
