//! `vocallabs` CLI entry-point.
//!
//! Available sub-commands:
//! - `describe`: print the node descriptor as JSON.
//! - `validate`: check parameters locally and print the request that would be sent.
//! - `run`: execute one operation against the VocalLabs API.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use nodes::{ExecutableNode, ExecutionContext};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vocallabs::gateway::TOKEN_PATH;
use vocallabs::operations::Action;
use vocallabs::{GatewayConfig, Params, Resource, VocallabsNode};

#[derive(Parser)]
#[command(name = "vocallabs", about = "Drive the VocalLabs voice-calling API", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the node descriptor.
    Describe {
        /// Only this resource.
        #[arg(long)]
        resource: Option<String>,
    },
    /// Validate parameters without contacting the API.
    Validate(Selection),
    /// Execute an operation.
    Run {
        #[command(flatten)]
        selection: Selection,

        #[arg(long, env = "VOCALLABS_BASE_URL", default_value = vocallabs::config::DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, env = "VOCALLABS_CLIENT_ID")]
        client_id: String,

        #[arg(long, env = "VOCALLABS_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        /// Per-request timeout; 0 disables it.
        #[arg(long, env = "VOCALLABS_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[derive(Args)]
struct Selection {
    #[arg(long)]
    resource: String,

    /// Defaults to the resource's default operation.
    #[arg(long)]
    operation: Option<String>,

    /// Parameters as a JSON object.
    #[arg(long, conflicts_with = "params_file")]
    params: Option<String>,

    /// Path to a file holding the parameters JSON object.
    #[arg(long)]
    params_file: Option<PathBuf>,
}

impl Selection {
    /// Node configuration: the parameters plus `resource`/`operation`.
    fn config(&self) -> anyhow::Result<Value> {
        let raw = match (&self.params, &self.params_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("cannot read params file {}", path.display()))?,
            (None, None) => "{}".to_string(),
        };
        let parsed = serde_json::from_str::<Value>(&raw).context("invalid params JSON")?;
        let mut config = match parsed {
            Value::Object(map) => map,
            other => bail!("params must be a JSON object, got {other}"),
        };

        let resource: Resource = self.resource.parse()?;
        let operation = self
            .operation
            .clone()
            .unwrap_or_else(|| resource.default_operation().to_string());
        config.insert("resource".into(), json!(resource.as_str()));
        config.insert("operation".into(), json!(operation));
        Ok(Value::Object(config))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Describe { resource } => {
            let node = vocallabs::describe();
            let out = match resource {
                Some(name) => {
                    let resource: Resource = name.parse()?;
                    serde_json::to_value(node.resource(resource.as_str()))?
                }
                None => serde_json::to_value(&node)?,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate(selection) => {
            let config = selection.config()?;
            let (resource, operation) = vocallabs::node::selection(&config)?;
            match vocallabs::prepare(resource, &operation, &Params::from_value(config)) {
                Ok(prepared) => {
                    let request = match &prepared.action {
                        Action::Request(req) => json!({
                            "method": req.method.as_str(),
                            "path": req.path,
                            "query": req
                                .query
                                .iter()
                                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                                .collect::<Map<String, Value>>(),
                            "body": req.body,
                        }),
                        Action::ExchangeToken => json!({ "method": "POST", "path": TOKEN_PATH }),
                    };
                    println!("{}", serde_json::to_string_pretty(&json!({ "valid": true, "request": request }))?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("invalid: {} (http code {})", err.message, err.http_code);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Run {
            selection,
            base_url,
            client_id,
            client_secret,
            timeout_secs,
        } => {
            let config = selection.config()?;
            let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
            let gateway_config = GatewayConfig::default()
                .with_base_url(base_url)
                .with_timeout(timeout);
            debug!(?gateway_config, "gateway configured");

            let node = VocallabsNode::new(gateway_config)?;
            let ctx = ExecutionContext::standalone("vocallabs", config)
                .with_secret("clientId", client_id)
                .with_secret("clientSecret", client_secret);
            info!(execution_id = %ctx.execution_id, "running operation");

            match node.execute(Value::Null, &ctx).await {
                Ok(out) => {
                    println!("{}", serde_json::to_string_pretty(&out)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!(
                        "failed: {} (http code {}{})",
                        err.message(),
                        err.http_code().unwrap_or("unknown"),
                        if err.is_retryable() { ", retryable" } else { "" }
                    );
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
