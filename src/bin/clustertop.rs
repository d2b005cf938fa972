//! clustertop - interactive terminal dashboard for cluster resources.
//!
//! Usage:
//!   clustertop                    # nodes, refreshed every 2 seconds
//!   clustertop pods -n default    # pods of one namespace
//!   clustertop events -i 5        # cluster events, every 5 seconds
//!   clustertop --source demo      # built-in demo cluster, no kubectl needed

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use clustertop::source::{
    DemoSource, Filter, FilterAxis, KubectlSource, ResourceKind, ResourceSource,
};
use clustertop::tui::{App, DashboardConfig, DashboardError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceKind {
    /// Query the cluster through kubectl.
    Kubectl,
    /// Deterministic in-memory cluster.
    Demo,
}

/// Interactive terminal dashboard for cluster resources.
#[derive(Parser)]
#[command(name = "clustertop", version, about = "Cluster resource dashboard")]
struct Args {
    /// Root view: nodes, pods or events.
    #[arg(value_name = "KIND", default_value = "nodes")]
    kind: String,

    /// Only show this namespace.
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Only show this node.
    #[arg(long)]
    node: Option<String>,

    /// Only show this status (pod phase, node condition or event type).
    #[arg(long)]
    status: Option<String>,

    /// Refresh interval in seconds.
    #[arg(short = 'i', long, default_value_t = 2, env = "CLUSTERTOP_INTERVAL")]
    interval: u64,

    /// Where data comes from.
    #[arg(long, value_enum, default_value_t = SourceKind::Kubectl, env = "CLUSTERTOP_SOURCE")]
    source: SourceKind,

    /// kubectl binary.
    #[arg(long, default_value = "kubectl", env = "CLUSTERTOP_KUBECTL")]
    kubectl: PathBuf,

    /// kubeconfig context to use.
    #[arg(long, env = "CLUSTERTOP_CONTEXT")]
    context: Option<String>,

    /// Upper bound for one kubectl call, in seconds.
    #[arg(long, default_value_t = 5)]
    fetch_timeout: u64,

    /// Write logs to this file. The dashboard owns the terminal, so without
    /// it nothing is logged.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initializes the tracing subscriber writing to `path`.
/// Default level is INFO; `RUST_LOG` directives are honored too.
fn init_logging(path: &Path, verbose: u8) -> std::io::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("clustertop={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(ref path) = args.log_file
        && let Err(e) = init_logging(path, args.verbose)
    {
        eprintln!("Error opening log file '{}': {}", path.display(), e);
        std::process::exit(1);
    }

    if args.interval == 0 {
        eprintln!("Error: --interval must be at least 1 second");
        std::process::exit(1);
    }

    let kind = match args
        .kind
        .parse::<ResourceKind>()
        .map_err(DashboardError::Construction)
    {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filter = Filter::default()
        .with(FilterAxis::Namespace, args.namespace.as_deref())
        .with(FilterAxis::Node, args.node.as_deref())
        .with(FilterAxis::Status, args.status.as_deref());

    let config = DashboardConfig {
        kind,
        filter,
        interval: Duration::from_secs(args.interval),
        fetch_timeout: Duration::from_secs(args.fetch_timeout.max(1)),
    };

    let source: Box<dyn ResourceSource> = match args.source {
        SourceKind::Demo => Box::new(DemoSource::new()),
        SourceKind::Kubectl => {
            let kubectl = config.kubectl(args.kubectl.clone(), args.context.clone());
            Box::new(KubectlSource::new(kubectl))
        }
    };

    info!(
        kind = config.kind.name(),
        filter = %config.filter,
        interval = args.interval,
        source = source.name(),
        "starting clustertop"
    );

    let app = match App::new(config, source) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run() {
        eprintln!("Error running dashboard: {}", e);
        std::process::exit(1);
    }
}
