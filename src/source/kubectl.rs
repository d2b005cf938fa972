//! Live cluster source backed by the `kubectl` binary.
//!
//! Every call runs `kubectl ... -o json` (or `kubectl top ... --no-headers`
//! for usage figures). One fetch may take several invocations; together they
//! are bounded by [`KubectlConfig::timeout`]. Usage figures are optional:
//! clusters without metrics-server still list objects.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::DateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use wait_timeout::ChildExt;

use super::{
    ContainerRecord, EventRecord, FetchError, Filter, NodeRecord, PodDetail, PodRecord,
    ResourceSource, SortOrder, select_events, select_nodes, select_pods,
};

/// How to invoke `kubectl`.
#[derive(Debug, Clone)]
pub struct KubectlConfig {
    /// Program to run, `kubectl` by default.
    pub program: PathBuf,
    /// Global arguments placed before every subcommand (e.g. `--context`).
    pub global_args: Vec<String>,
    /// Upper bound for one fetch, shared by all of its invocations.
    pub timeout: Duration,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("kubectl"),
            global_args: Vec::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl KubectlConfig {
    /// Adds `--context <ctx>` to every invocation.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        if let Some(ctx) = context {
            self.global_args.push("--context".to_string());
            self.global_args.push(ctx);
        }
        self
    }
}

/// [`ResourceSource`] that shells out to `kubectl`.
pub struct KubectlSource {
    config: KubectlConfig,
}

impl KubectlSource {
    pub fn new(config: KubectlConfig) -> Self {
        Self { config }
    }

    /// Deadline shared by every invocation of one fetch.
    fn deadline(&self) -> Instant {
        Instant::now() + self.config.timeout
    }

    /// Runs one invocation and returns its stdout. The child gets whatever
    /// is left until `deadline`.
    fn run(&self, args: &[&str], deadline: Instant) -> Result<String, FetchError> {
        let started = Instant::now();
        let budget = deadline.saturating_duration_since(started);
        if budget.is_zero() {
            return Err(FetchError::Timeout(self.config.timeout));
        }

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.global_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn()?;

        // Drain both pipes while waiting, a full pipe would stall the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(budget)? {
            Some(status) => status,
            None => {
                let group_killed = kill_tree(&mut child);
                let _ = child.wait();
                if group_killed {
                    // Nothing holds the pipes any more.
                    for handle in [stdout, stderr].into_iter().flatten() {
                        let _ = handle.join();
                    }
                }
                debug!(args = %args.join(" "), "kubectl timed out");
                return Err(FetchError::Timeout(self.config.timeout));
            }
        };

        let out = stdout
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let err = stderr
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        debug!(
            args = %args.join(" "),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = out.len(),
            "kubectl finished"
        );

        if !status.success() {
            let msg = err.trim();
            return Err(FetchError::Command(if msg.is_empty() {
                format!("kubectl exited with {}", status)
            } else {
                msg.lines().next().unwrap_or(msg).to_string()
            }));
        }
        Ok(out)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        args: &[&str],
        deadline: Instant,
    ) -> Result<T, FetchError> {
        let out = self.run(args, deadline)?;
        serde_json::from_str(&out).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Usage figures are best effort: a failing `kubectl top` yields nothing.
    fn top(&self, args: &[&str], deadline: Instant) -> Vec<Vec<String>> {
        match self.run(args, deadline) {
            Ok(out) => out
                .lines()
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .collect(),
            Err(e) => {
                debug!(error = %e, "usage metrics unavailable");
                Vec::new()
            }
        }
    }

    fn list_pods(&self, filter: &Filter, deadline: Instant) -> Result<Vec<PodRecord>, FetchError> {
        let selector = filter
            .node
            .as_deref()
            .map(|node| format!("spec.nodeName={}", node));
        let mut args = vec!["get", "pods"];
        push_namespace(&mut args, filter.namespace.as_deref());
        if let Some(selector) = selector.as_deref() {
            args.push("--field-selector");
            args.push(selector);
        }
        args.extend(["-o", "json"]);
        let list: List<Pod> = self.get_json(&args, deadline)?;

        let mut top_args = vec!["top", "pods", "--no-headers"];
        push_namespace(&mut top_args, filter.namespace.as_deref());
        let usage = pod_usage(&self.top(&top_args, deadline), filter.namespace.as_deref());

        Ok(list
            .items
            .iter()
            .map(|p| {
                let mut record = pod_record(p);
                if let Some(&(cpu, mem)) = usage.get(&(record.namespace.clone(), record.name.clone()))
                {
                    record.cpu_usage_millis = cpu;
                    record.memory_usage_bytes = mem;
                }
                record
            })
            .collect())
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = reader.read_to_string(&mut buf);
        buf
    })
}

/// Kills the child and everything it started. Returns true when the whole
/// process group was signalled, so no process keeps the pipes open.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> bool {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    match i32::try_from(child.id()) {
        Ok(pid) if killpg(Pid::from_raw(pid), Signal::SIGKILL).is_ok() => true,
        _ => {
            let _ = child.kill();
            false
        }
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> bool {
    let _ = child.kill();
    false
}

fn push_namespace<'a>(args: &mut Vec<&'a str>, namespace: Option<&'a str>) {
    match namespace {
        Some(ns) => args.extend(["-n", ns]),
        None => args.push("-A"),
    }
}

impl ResourceSource for KubectlSource {
    fn nodes(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<NodeRecord>, FetchError> {
        let deadline = self.deadline();
        let list: List<Node> = self.get_json(&["get", "nodes", "-o", "json"], deadline)?;
        let pods: List<Pod> = self.get_json(&["get", "pods", "-A", "-o", "json"], deadline)?;
        let usage = self.top(&["top", "nodes", "--no-headers"], deadline);

        let mut per_node: HashMap<&str, usize> = HashMap::new();
        for p in &pods.items {
            *per_node.entry(p.spec.node_name.as_str()).or_default() += 1;
        }

        let nodes = list
            .items
            .iter()
            .map(|n| {
                let mut record = node_record(n);
                record.pods = per_node.get(n.metadata.name.as_str()).copied().unwrap_or(0);
                if let Some(cols) = usage.iter().find(|c| c.first() == Some(&record.name)) {
                    record.cpu_usage_millis = cols.get(1).and_then(|q| parse_cpu(q));
                    record.memory_usage_bytes = cols.get(3).and_then(|q| parse_memory(q));
                }
                record
            })
            .collect();
        Ok(select_nodes(nodes, filter, sort))
    }

    fn pods(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<PodRecord>, FetchError> {
        let pods = self.list_pods(filter, self.deadline())?;
        Ok(select_pods(pods, filter, sort))
    }

    fn events(&self, filter: &Filter, sort: SortOrder) -> Result<Vec<EventRecord>, FetchError> {
        let mut args = vec!["get", "events"];
        push_namespace(&mut args, filter.namespace.as_deref());
        args.extend(["-o", "json"]);
        let list: List<Event> = self.get_json(&args, self.deadline())?;
        let events = list.items.iter().map(event_record).collect();
        Ok(select_events(events, filter, sort))
    }

    fn pod_detail(&self, namespace: &str, name: &str) -> Result<PodDetail, FetchError> {
        let deadline = self.deadline();
        let pod: Pod = self
            .get_json(&["get", "pod", name, "-n", namespace, "-o", "json"], deadline)
            .map_err(|e| match e {
                FetchError::Command(msg) if msg.contains("NotFound") => FetchError::NotFound(msg),
                other => other,
            })?;
        let selector = format!("involvedObject.name={}", name);
        let events: List<Event> = self.get_json(
            &[
                "get",
                "events",
                "-n",
                namespace,
                "--field-selector",
                &selector,
                "-o",
                "json",
            ],
            deadline,
        )?;
        let usage = self.top(
            &["top", "pod", name, "-n", namespace, "--containers", "--no-headers"],
            deadline,
        );
        Ok(pod_detail(&pod, &events.items, &usage))
    }

    fn name(&self) -> &str {
        "kubectl"
    }
}

// ---------------------------------------------------------------------------
// kubectl JSON shapes (only the fields the views read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct List<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Metadata {
    name: String,
    namespace: String,
    uid: String,
    creation_timestamp: Option<String>,
    deletion_timestamp: Option<String>,
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Node {
    metadata: Metadata,
    status: NodeStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NodeStatus {
    conditions: Vec<Condition>,
    capacity: BTreeMap<String, String>,
    node_info: NodeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Condition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NodeInfo {
    kubelet_version: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pod {
    metadata: Metadata,
    spec: PodSpec,
    status: PodStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PodSpec {
    node_name: String,
    service_account_name: String,
    containers: Vec<ContainerSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerSpec {
    name: String,
    image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PodStatus {
    phase: String,
    reason: Option<String>,
    #[serde(rename = "podIP")]
    pod_ip: String,
    qos_class: String,
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ContainerStatus {
    name: String,
    ready: bool,
    restart_count: u32,
    /// Exactly one of `running`, `waiting`, `terminated`.
    state: BTreeMap<String, ContainerState>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerState {
    reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Event {
    metadata: Metadata,
    involved_object: ObjectReference,
    reason: String,
    message: String,
    #[serde(rename = "type")]
    kind: String,
    count: Option<u32>,
    last_timestamp: Option<String>,
    event_time: Option<String>,
    source: EventSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectReference {
    kind: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventSource {
    component: String,
    host: String,
}

// ---------------------------------------------------------------------------
// Mapping to records
// ---------------------------------------------------------------------------

fn parse_time(ts: Option<&str>) -> i64 {
    ts.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.timestamp())
        .unwrap_or(0)
}

fn node_record(n: &Node) -> NodeRecord {
    let ready = n
        .status
        .conditions
        .iter()
        .find(|c| c.kind == "Ready")
        .map(|c| if c.status == "True" { "Ready" } else { "NotReady" })
        .unwrap_or("Unknown");
    let roles: Vec<&str> = n
        .metadata
        .labels
        .keys()
        .filter_map(|k| k.strip_prefix("node-role.kubernetes.io/"))
        .collect();
    NodeRecord {
        name: n.metadata.name.clone(),
        status: ready.to_string(),
        roles: if roles.is_empty() {
            "<none>".to_string()
        } else {
            roles.join(",")
        },
        version: n.status.node_info.kubelet_version.clone(),
        created: parse_time(n.metadata.creation_timestamp.as_deref()),
        cpu_usage_millis: None,
        cpu_capacity_millis: n.status.capacity.get("cpu").and_then(|q| parse_cpu(q)),
        memory_usage_bytes: None,
        memory_capacity_bytes: n.status.capacity.get("memory").and_then(|q| parse_memory(q)),
        pods: 0,
    }
}

/// Mirrors the STATUS column of `kubectl get pods`.
fn pod_status(p: &Pod) -> String {
    if p.metadata.deletion_timestamp.is_some() {
        return "Terminating".to_string();
    }
    let waiting = p.status.container_statuses.iter().find_map(|c| {
        c.state
            .get("waiting")
            .or_else(|| c.state.get("terminated").filter(|_| !c.ready))
            .and_then(|s| s.reason.clone())
    });
    waiting
        .or_else(|| p.status.reason.clone())
        .unwrap_or_else(|| p.status.phase.clone())
}

fn pod_record(p: &Pod) -> PodRecord {
    PodRecord {
        name: p.metadata.name.clone(),
        namespace: p.metadata.namespace.clone(),
        node: p.spec.node_name.clone(),
        status: pod_status(p),
        ready: p.status.container_statuses.iter().filter(|c| c.ready).count(),
        containers: p.spec.containers.len(),
        restarts: p.status.container_statuses.iter().map(|c| c.restart_count).sum(),
        ip: p.status.pod_ip.clone(),
        created: parse_time(p.metadata.creation_timestamp.as_deref()),
        cpu_usage_millis: None,
        memory_usage_bytes: None,
    }
}

fn event_record(e: &Event) -> EventRecord {
    let ts = e.last_timestamp.as_deref().or(e.event_time.as_deref());
    EventRecord {
        uid: e.metadata.uid.clone(),
        timestamp: parse_time(ts),
        count: e.count.unwrap_or(1),
        event_type: e.kind.clone(),
        namespace: e.metadata.namespace.clone(),
        name: e.involved_object.name.clone(),
        kind: e.involved_object.kind.clone(),
        reason: e.reason.clone(),
        message: e.message.clone(),
        source: e.source.component.clone(),
        node: e.source.host.clone(),
    }
}

/// Parses `kubectl top pods` rows. With `-A` the first column is the namespace.
fn pod_usage(
    rows: &[Vec<String>],
    namespace: Option<&str>,
) -> HashMap<(String, String), (Option<u64>, Option<u64>)> {
    rows.iter()
        .filter_map(|cols| {
            let (ns, rest) = match namespace {
                Some(ns) => (ns.to_string(), cols.as_slice()),
                None => (cols.first()?.clone(), cols.get(1..)?),
            };
            let name = rest.first()?.clone();
            let cpu = rest.get(1).and_then(|q| parse_cpu(q));
            let mem = rest.get(2).and_then(|q| parse_memory(q));
            Some(((ns, name), (cpu, mem)))
        })
        .collect()
}

fn pod_detail(p: &Pod, events: &[Event], usage: &[Vec<String>]) -> PodDetail {
    let containers = p
        .spec
        .containers
        .iter()
        .map(|spec| {
            let status = p.status.container_statuses.iter().find(|c| c.name == spec.name);
            // `top pod --containers`: POD CONTAINER CPU MEMORY
            let top = usage.iter().find(|c| c.get(1) == Some(&spec.name));
            ContainerRecord {
                name: spec.name.clone(),
                image: spec.image.clone(),
                ready: status.is_some_and(|s| s.ready),
                state: status
                    .and_then(|s| s.state.keys().next().cloned())
                    .unwrap_or_else(|| "unknown".to_string()),
                restarts: status.map(|s| s.restart_count).unwrap_or(0),
                cpu_usage_millis: top.and_then(|c| c.get(2)).and_then(|q| parse_cpu(q)),
                memory_usage_bytes: top.and_then(|c| c.get(3)).and_then(|q| parse_memory(q)),
            }
        })
        .collect::<Vec<_>>();

    let mut pod = pod_record(p);
    if !containers.is_empty() && containers.iter().any(|c| c.cpu_usage_millis.is_some()) {
        pod.cpu_usage_millis = Some(containers.iter().filter_map(|c| c.cpu_usage_millis).sum());
        pod.memory_usage_bytes =
            Some(containers.iter().filter_map(|c| c.memory_usage_bytes).sum());
    }

    let mut events: Vec<EventRecord> = events.iter().map(event_record).collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    PodDetail {
        pod,
        labels: p
            .metadata
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        qos_class: p.status.qos_class.clone(),
        service_account: p.spec.service_account_name.clone(),
        containers,
        events,
    }
}

/// Parses a CPU quantity (`"250m"`, `"2"`, `"0.5"`, `"1500000n"`) into millicores.
fn parse_cpu(q: &str) -> Option<u64> {
    let q = q.trim();
    if let Some(n) = q.strip_suffix('n') {
        return n.parse::<u64>().ok().map(|v| v / 1_000_000);
    }
    if let Some(u) = q.strip_suffix('u') {
        return u.parse::<u64>().ok().map(|v| v / 1_000);
    }
    if let Some(m) = q.strip_suffix('m') {
        return m.parse::<u64>().ok();
    }
    q.parse::<f64>().ok().map(|cores| (cores * 1000.0).round() as u64)
}

/// Parses a memory quantity (`"128Mi"`, `"1Gi"`, `"500M"`, `"1024"`) into bytes.
fn parse_memory(q: &str) -> Option<u64> {
    const SUFFIXES: &[(&str, u64)] = &[
        ("Ki", 1 << 10),
        ("Mi", 1 << 20),
        ("Gi", 1 << 30),
        ("Ti", 1 << 40),
        ("k", 1_000),
        ("K", 1_000),
        ("M", 1_000_000),
        ("G", 1_000_000_000),
        ("T", 1_000_000_000_000),
    ];
    let q = q.trim();
    for (suffix, mult) in SUFFIXES {
        if let Some(num) = q.strip_suffix(suffix) {
            return num.parse::<f64>().ok().map(|v| (v * *mult as f64) as u64);
        }
    }
    q.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PODS_JSON: &str = r#"{
      "items": [
        {
          "metadata": {"name": "api-1", "namespace": "default", "uid": "u1",
                       "creationTimestamp": "2026-01-01T00:00:00Z", "labels": {"app": "api"}},
          "spec": {"nodeName": "worker-1", "serviceAccountName": "api",
                   "containers": [{"name": "api", "image": "api:1"}, {"name": "proxy", "image": "envoy:1"}]},
          "status": {"phase": "Running", "podIP": "10.0.0.5", "qosClass": "Burstable",
                     "containerStatuses": [
                       {"name": "api", "ready": true, "restartCount": 2, "state": {"running": {}}},
                       {"name": "proxy", "ready": false, "restartCount": 5,
                        "state": {"waiting": {"reason": "CrashLoopBackOff"}}}
                     ]}
        },
        {
          "metadata": {"name": "job-1", "namespace": "batch", "uid": "u2"},
          "spec": {"nodeName": "worker-2", "containers": [{"name": "job", "image": "job:1"}]},
          "status": {"phase": "Succeeded"}
        }
      ]
    }"#;

    const NODES_JSON: &str = r#"{
      "items": [
        {
          "metadata": {"name": "cp-1", "creationTimestamp": "2026-01-01T00:00:00Z",
                       "labels": {"node-role.kubernetes.io/control-plane": ""}},
          "status": {"conditions": [{"type": "MemoryPressure", "status": "False"},
                                    {"type": "Ready", "status": "True"}],
                     "capacity": {"cpu": "4", "memory": "8Gi"},
                     "nodeInfo": {"kubeletVersion": "v1.31.2"}}
        },
        {
          "metadata": {"name": "w-1"},
          "status": {"conditions": [{"type": "Ready", "status": "False"}]}
        }
      ]
    }"#;

    const EVENTS_JSON: &str = r#"{
      "items": [
        {
          "metadata": {"uid": "e1", "namespace": "default"},
          "involvedObject": {"kind": "Pod", "name": "api-1"},
          "reason": "BackOff", "message": "Back-off restarting", "type": "Warning",
          "count": 4, "lastTimestamp": "2026-01-01T00:10:00Z",
          "source": {"component": "kubelet", "host": "worker-1"}
        },
        {
          "metadata": {"uid": "e2", "namespace": "default"},
          "involvedObject": {"kind": "Pod", "name": "api-1"},
          "reason": "Scheduled", "type": "Normal",
          "eventTime": "2026-01-01T00:00:00.000000Z"
        }
      ]
    }"#;

    #[test]
    fn pods_json_maps_to_records() {
        let list: List<Pod> = serde_json::from_str(PODS_JSON).unwrap();
        let records: Vec<PodRecord> = list.items.iter().map(pod_record).collect();
        assert_eq!(records.len(), 2);

        let api = &records[0];
        assert_eq!(api.node, "worker-1");
        assert_eq!(api.status, "CrashLoopBackOff");
        assert_eq!((api.ready, api.containers), (1, 2));
        assert_eq!(api.restarts, 7);
        assert_eq!(api.ip, "10.0.0.5");
        assert_eq!(api.created, 1_767_225_600);

        assert_eq!(records[1].status, "Succeeded");
        assert_eq!(records[1].created, 0);
    }

    #[test]
    fn nodes_json_maps_ready_condition_and_roles() {
        let list: List<Node> = serde_json::from_str(NODES_JSON).unwrap();
        let records: Vec<NodeRecord> = list.items.iter().map(node_record).collect();
        assert_eq!(records[0].status, "Ready");
        assert_eq!(records[0].roles, "control-plane");
        assert_eq!(records[0].cpu_capacity_millis, Some(4000));
        assert_eq!(records[0].memory_capacity_bytes, Some(8 << 30));
        assert_eq!(records[1].status, "NotReady");
        assert_eq!(records[1].roles, "<none>");
    }

    #[test]
    fn events_fall_back_to_event_time() {
        let list: List<Event> = serde_json::from_str(EVENTS_JSON).unwrap();
        let records: Vec<EventRecord> = list.items.iter().map(event_record).collect();
        assert_eq!(records[0].count, 4);
        assert_eq!(records[0].node, "worker-1");
        assert_eq!(records[1].count, 1);
        assert_eq!(records[1].timestamp, 1_767_225_600);
    }

    #[test]
    fn detail_merges_container_usage() {
        let list: List<Pod> = serde_json::from_str(PODS_JSON).unwrap();
        let events: List<Event> = serde_json::from_str(EVENTS_JSON).unwrap();
        let usage = vec![
            vec!["api-1".to_string(), "api".to_string(), "120m".to_string(), "64Mi".to_string()],
            vec!["api-1".to_string(), "proxy".to_string(), "5m".to_string(), "16Mi".to_string()],
        ];
        let detail = pod_detail(&list.items[0], &events.items, &usage);
        assert_eq!(detail.containers.len(), 2);
        assert_eq!(detail.containers[1].state, "waiting");
        assert_eq!(detail.pod.cpu_usage_millis, Some(125));
        assert_eq!(detail.pod.memory_usage_bytes, Some(80 << 20));
        assert_eq!(detail.qos_class, "Burstable");
        assert_eq!(detail.events[0].reason, "BackOff");
    }

    #[test]
    fn top_pods_all_namespaces_has_namespace_column() {
        let rows = vec![vec![
            "default".to_string(),
            "api-1".to_string(),
            "3m".to_string(),
            "20Mi".to_string(),
        ]];
        let usage = pod_usage(&rows, None);
        assert_eq!(
            usage.get(&("default".to_string(), "api-1".to_string())),
            Some(&(Some(3), Some(20 << 20)))
        );

        let rows = vec![vec!["api-1".to_string(), "3m".to_string(), "20Mi".to_string()]];
        let usage = pod_usage(&rows, Some("default"));
        assert!(usage.contains_key(&("default".to_string(), "api-1".to_string())));
    }

    #[test]
    fn quantities() {
        assert_eq!(parse_cpu("250m"), Some(250));
        assert_eq!(parse_cpu("2"), Some(2000));
        assert_eq!(parse_cpu("0.5"), Some(500));
        assert_eq!(parse_cpu("1500000n"), Some(1));
        assert_eq!(parse_cpu("abc"), None);
        assert_eq!(parse_memory("128Mi"), Some(128 << 20));
        assert_eq!(parse_memory("1Gi"), Some(1 << 30));
        assert_eq!(parse_memory("500M"), Some(500_000_000));
        assert_eq!(parse_memory("1024"), Some(1024));
    }

    #[cfg(unix)]
    fn shell_source(script: &str, timeout: Duration) -> KubectlSource {
        // `sh -c <script> sh <kubectl args...>`: the script ignores the kubectl args.
        KubectlSource::new(KubectlConfig {
            program: PathBuf::from("sh"),
            global_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            timeout,
        })
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let source = shell_source("sleep 5", Duration::from_millis(100));
        let started = Instant::now();
        let err = source.run(&["get", "nodes"], source.deadline()).unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_stderr() {
        let source = shell_source("echo 'error: no context' >&2; exit 1", Duration::from_secs(5));
        let err = source.run(&["get", "nodes"], source.deadline()).unwrap_err();
        match err {
            FetchError::Command(msg) => assert_eq!(msg, "error: no context"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn events_fetched_through_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, EVENTS_JSON).unwrap();
        let script = format!("cat '{}'", path.display());
        let source = shell_source(&script, Duration::from_secs(5));

        let events = source
            .events(&Filter::default(), SortOrder::Age)
            .unwrap();
        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["e1", "e2"]);
    }

    #[cfg(unix)]
    #[test]
    fn missing_pod_maps_to_not_found() {
        let script = "echo 'Error from server (NotFound): pods \"gone\" not found' >&2; exit 1";
        let source = shell_source(script, Duration::from_secs(5));
        let err = source.pod_detail("default", "gone").unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_background_children() {
        // The backgrounded sleep inherits both pipes.
        let source = shell_source("sleep 5 & sleep 5", Duration::from_millis(200));
        let started = Instant::now();
        let err = source.run(&["get", "nodes"], source.deadline()).unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn invocations_of_one_fetch_share_the_timeout() {
        // Each call alone fits the timeout, the second one no longer does.
        let source = shell_source("sleep 1; echo '{\"items\": []}'", Duration::from_millis(1500));
        let started = Instant::now();
        let err = source
            .nodes(&Filter::default(), SortOrder::Name)
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_millis(2500));
    }

    #[test]
    fn expired_deadline_spawns_nothing() {
        let source = KubectlSource::new(KubectlConfig {
            program: PathBuf::from("/nonexistent/kubectl"),
            ..Default::default()
        });
        let err = source.run(&["get", "nodes"], Instant::now()).unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }
}
