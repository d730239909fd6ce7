use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use kobs_core::{AttributeValue, Logs};
use kobs_kubehub::{default_client, ClientFactory, DefaultClientFactory, KubeDiscoveryClient};
use kobs_receiver::{LogsConsumer, ObjectsReceiver};

#[derive(Parser, Debug)]
#[command(name = "kobsctl", version, about = "Kubernetes object-observation engine (demo)")]
struct Cli {
    /// Path to a YAML ObservationPlan (spec.md §6's configuration schema).
    plan: PathBuf,

    /// Output format for delivered logs.
    #[arg(short = 'o', long = "output", value_enum, default_value_t = Output::Human)]
    output: Output,

    /// Bounded timeout for draining in-flight workers on shutdown.
    #[arg(long = "shutdown-timeout-secs", default_value_t = 5)]
    shutdown_timeout_secs: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

fn init_tracing() {
    let env = std::env::var("KOBS_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// A `LogsConsumer` that renders every delivered envelope via `tracing`,
/// optionally also printing it as JSON (`--output json`) — the same
/// `Output::Human`/`Output::Json` split `orkactl`'s `discover`/`ls`
/// subcommands already use.
struct TracingLogsConsumer {
    output: Output,
}

#[async_trait]
impl LogsConsumer for TracingLogsConsumer {
    async fn consume_logs(&self, logs: Logs) -> Result<()> {
        for resource_logs in &logs.resource_logs {
            let kind = resource_logs.attributes.get("k8s.object.kind").and_then(AttributeValue::as_str).unwrap_or("?");
            for scope_logs in &resource_logs.scope_logs {
                for record in &scope_logs.log_records {
                    let name = record.attributes.get("k8s.object.name").and_then(AttributeValue::as_str).unwrap_or("?");
                    let namespace = record.attributes.get("k8s.namespace.name").and_then(AttributeValue::as_str);
                    info!(kind, name, namespace, "observed object");
                }
            }
        }
        if self.output == Output::Json {
            println!("{}", serde_json::to_string_pretty(&logs_to_json(&logs))?);
        }
        Ok(())
    }
}

/// Renders a `Logs` envelope as JSON. Not owned by the core (spec.md §6:
/// "no file formats ... are owned by the core") — this is ambient CLI
/// wiring built on the core's lossless `AttributeValue -> serde_json::Value`
/// conversion.
fn logs_to_json(logs: &Logs) -> serde_json::Value {
    let resource_logs = logs
        .resource_logs
        .iter()
        .map(|rl| {
            serde_json::json!({
                "attributes": attributes_to_json(&rl.attributes),
                "scope_logs": rl.scope_logs.iter().map(|sl| {
                    serde_json::json!({
                        "log_records": sl.log_records.iter().map(|r| {
                            serde_json::json!({
                                "attributes": attributes_to_json(&r.attributes),
                                "body": serde_json::Value::from(&r.body),
                            })
                        }).collect::<Vec<_>>(),
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({ "resource_logs": resource_logs })
}

fn attributes_to_json(attrs: &BTreeMap<String, AttributeValue>) -> serde_json::Value {
    serde_json::Value::Object(attrs.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v))).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.plan).with_context(|| format!("reading plan file {}", cli.plan.display()))?;
    let plan: kobs_config::ObservationPlan = serde_yaml::from_str(&raw).context("parsing ObservationPlan YAML")?;

    let client = default_client().await.context("acquiring kube client")?;
    let discovery = KubeDiscoveryClient::new(client);
    let resolved = kobs_config::validate(&plan, &discovery).await.context("validating ObservationPlan")?;
    info!(entries = resolved.entries.len(), "plan validated");

    let factory: Arc<dyn ClientFactory> = Arc::new(DefaultClientFactory);
    let consumer = Arc::new(TracingLogsConsumer { output: cli.output });
    let receiver = ObjectsReceiver::construct(factory, resolved, consumer).await.context("constructing receiver")?;

    let root = CancellationToken::new();
    receiver.start(root.clone()).await.context("starting receiver")?;
    info!("receiver started, waiting for Ctrl-C");

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    warn!("shutdown signal received, stopping workers");
    root.cancel();
    receiver.shutdown_and_wait(Duration::from_secs(cli.shutdown_timeout_secs)).await.context("shutting down receiver")?;

    Ok(())
}
