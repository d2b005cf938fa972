//! Value types exchanged with a [`ResourceSource`](super::ResourceSource).

use std::fmt;
use std::str::FromStr;

/// One independently settable filter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAxis {
    /// Scope axis: restricts pods and events to one node.
    Node,
    Namespace,
    Status,
}

impl FilterAxis {
    pub fn all() -> &'static [FilterAxis] {
        &[FilterAxis::Node, FilterAxis::Namespace, FilterAxis::Status]
    }

    /// Returns the display name of the axis.
    pub fn name(&self) -> &'static str {
        match self {
            FilterAxis::Node => "node",
            FilterAxis::Namespace => "namespace",
            FilterAxis::Status => "status",
        }
    }
}

/// Named string axes narrowing which records a fetch returns.
///
/// `None` means the axis is unset and matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub node: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
}

impl Filter {
    /// Returns the value of one axis.
    pub fn get(&self, axis: FilterAxis) -> Option<&str> {
        match axis {
            FilterAxis::Node => self.node.as_deref(),
            FilterAxis::Namespace => self.namespace.as_deref(),
            FilterAxis::Status => self.status.as_deref(),
        }
    }

    /// Returns a copy with exactly one axis replaced.
    ///
    /// An empty string clears the axis.
    pub fn with(&self, axis: FilterAxis, value: Option<&str>) -> Filter {
        let value = value.filter(|v| !v.is_empty()).map(str::to_string);
        let mut out = self.clone();
        match axis {
            FilterAxis::Node => out.node = value,
            FilterAxis::Namespace => out.namespace = value,
            FilterAxis::Status => out.status = value,
        }
        out
    }

    /// Every axis set on `target` overrides that axis of `base`; the rest is untouched.
    pub fn merge(base: &Filter, target: &Filter) -> Filter {
        Filter {
            node: target.node.clone().or_else(|| base.node.clone()),
            namespace: target.namespace.clone().or_else(|| base.namespace.clone()),
            status: target.status.clone().or_else(|| base.status.clone()),
        }
    }

    /// True when `value` passes the given axis.
    pub fn accepts(&self, axis: FilterAxis, value: &str) -> bool {
        self.get(axis).is_none_or(|want| want == value)
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.namespace.is_none() && self.status.is_none()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = FilterAxis::all()
            .iter()
            .filter_map(|axis| self.get(*axis).map(|v| format!("{}={}", axis.name(), v)))
            .collect();
        if parts.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Single active ordering key for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Name,
    Namespace,
    Cpu,
    Memory,
    Status,
    Restarts,
    Age,
}

impl SortOrder {
    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::Name => "name",
            SortOrder::Namespace => "namespace",
            SortOrder::Cpu => "cpu",
            SortOrder::Memory => "memory",
            SortOrder::Status => "status",
            SortOrder::Restarts => "restarts",
            SortOrder::Age => "age",
        }
    }

    /// Parses the display name back; used by the sort overlay.
    pub fn from_name(name: &str) -> Option<SortOrder> {
        [
            SortOrder::Name,
            SortOrder::Namespace,
            SortOrder::Cpu,
            SortOrder::Memory,
            SortOrder::Status,
            SortOrder::Restarts,
            SortOrder::Age,
        ]
        .into_iter()
        .find(|s| s.name() == name)
    }
}

/// Resource kind a list view shows. Selected at startup for the root view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Nodes,
    Pods,
    Events,
    PodDetail,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Nodes => "NODES",
            ResourceKind::Pods => "PODS",
            ResourceKind::Events => "EVENTS",
            ResourceKind::PodDetail => "POD",
        }
    }

    /// Sort keys offered for this kind, default first.
    pub fn sort_orders(&self) -> &'static [SortOrder] {
        match self {
            ResourceKind::Nodes => &[
                SortOrder::Name,
                SortOrder::Cpu,
                SortOrder::Memory,
                SortOrder::Status,
                SortOrder::Age,
            ],
            ResourceKind::Pods => &[
                SortOrder::Namespace,
                SortOrder::Name,
                SortOrder::Cpu,
                SortOrder::Memory,
                SortOrder::Status,
                SortOrder::Restarts,
                SortOrder::Age,
            ],
            ResourceKind::Events => &[
                SortOrder::Age,
                SortOrder::Namespace,
                SortOrder::Name,
                SortOrder::Status,
            ],
            ResourceKind::PodDetail => &[],
        }
    }

    pub fn default_sort(&self) -> SortOrder {
        self.sort_orders()
            .first()
            .copied()
            .unwrap_or(SortOrder::Name)
    }

    /// Filter axes the overlay may edit for this kind.
    pub fn filter_axes(&self) -> &'static [FilterAxis] {
        match self {
            ResourceKind::Nodes => &[FilterAxis::Status],
            ResourceKind::Pods => &[FilterAxis::Namespace, FilterAxis::Node, FilterAxis::Status],
            ResourceKind::Events => &[FilterAxis::Namespace, FilterAxis::Node, FilterAxis::Status],
            ResourceKind::PodDetail => &[],
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nodes" | "node" | "no" => Ok(ResourceKind::Nodes),
            "pods" | "pod" | "po" => Ok(ResourceKind::Pods),
            "events" | "event" | "ev" => Ok(ResourceKind::Events),
            other => Err(format!("unsupported resource kind '{}'", other)),
        }
    }
}

/// One cluster node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub status: String,
    pub roles: String,
    pub version: String,
    /// Creation time, epoch seconds.
    pub created: i64,
    pub cpu_usage_millis: Option<u64>,
    pub cpu_capacity_millis: Option<u64>,
    pub memory_usage_bytes: Option<u64>,
    pub memory_capacity_bytes: Option<u64>,
    pub pods: usize,
}

/// One pod.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub node: String,
    pub status: String,
    /// Ready containers.
    pub ready: usize,
    /// Total containers.
    pub containers: usize,
    pub restarts: u32,
    pub ip: String,
    /// Creation time, epoch seconds.
    pub created: i64,
    pub cpu_usage_millis: Option<u64>,
    pub memory_usage_bytes: Option<u64>,
}

/// One cluster event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub uid: String,
    /// Last seen, epoch seconds.
    pub timestamp: i64,
    pub count: u32,
    /// `Normal` or `Warning`; the status-like axis for events.
    pub event_type: String,
    pub namespace: String,
    /// Name of the involved object.
    pub name: String,
    pub kind: String,
    pub reason: String,
    pub message: String,
    pub source: String,
    pub node: String,
}

/// One container of a pod.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub ready: bool,
    pub state: String,
    pub restarts: u32,
    pub cpu_usage_millis: Option<u64>,
    pub memory_usage_bytes: Option<u64>,
}

/// Everything the pod detail view shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodDetail {
    pub pod: PodRecord,
    pub labels: Vec<(String, String)>,
    pub qos_class: String,
    pub service_account: String,
    pub containers: Vec<ContainerRecord>,
    pub events: Vec<EventRecord>,
}
