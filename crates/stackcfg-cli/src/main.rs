//! stackcfg - deployment configuration tool
//!
//! Without a subcommand, resolves the installer configuration document from
//! the deployed stacks and prints it. `stackcfg plan` prints the component
//! construction plan instead.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use stackcfg_core::config::{resolve_region, ConfigFile, DeploymentConfig, FileConfigSource};
use stackcfg_core::registry::CloudFormationRegistry;
use stackcfg_core::secrets::SecretsManagerStore;
use stackcfg_core::{
    aws, CancellationToken, ComponentGraphBuilder, ConfigDocument, ConfigResolver, ConsoleLogger, LogLevel,
    ResolveRequest, SharedLogger, TrustAnchor,
};

/// stackcfg - deployment configuration tool
#[derive(Parser, Debug)]
#[command(name = "stackcfg")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to a YAML configuration file (defaults to the user config)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STACKCFG_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    generate: GenerateArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the component construction plan as JSON
    Plan(PlanArgs),
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Certificate to pin instead of the bundled trust anchor
    #[arg(long, value_name = "PATH")]
    ca_file: Option<PathBuf>,

    /// Deployment instance suffix appended to every stack name
    #[arg(long)]
    stack_suffix: Option<String>,

    /// Region the stacks live in
    #[arg(long)]
    region: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Abort resolution after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args, Debug, Default)]
struct PlanArgs {
    /// Deployment instance suffix appended to every stack name
    #[arg(long)]
    stack_suffix: Option<String>,

    /// Include the load balancer for real-time calling traffic
    #[arg(long)]
    enable_calling_ingress: bool,

    /// Run the node autoscaler on the cluster
    #[arg(long)]
    enable_autoscaler: bool,

    /// Leave out the installer bootstrap
    #[arg(long)]
    no_auto_deploy: bool,

    /// Cluster runtime version
    #[arg(long)]
    cluster_version: Option<String>,

    /// Application license (required unless --no-auto-deploy)
    #[arg(long, value_name = "PATH")]
    license_path: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Format {
    #[default]
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let logger = build_logger(&cli.log_level)?;
    let file = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Plan(args)) => plan(&args, file, logger),
        None => generate(cli.generate, file, logger).await,
    }
}

fn build_logger(level: &str) -> Result<SharedLogger> {
    let level: LogLevel = level.parse().map_err(anyhow::Error::msg)?;
    Ok(Arc::new(ConsoleLogger::new().with_level(level)))
}

fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    let config = match path {
        Some(path) => FileConfigSource::new(path).load_required()?,
        None => FileConfigSource::user().load()?,
    };
    Ok(config)
}

async fn generate(args: GenerateArgs, file: ConfigFile, logger: SharedLogger) -> Result<String> {
    let region = resolve_region(args.region.as_deref(), file.resolver.region.as_deref());
    let mut settings = file.resolver_settings(region.clone());
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_timeout(Duration::from_secs(secs));
    }

    let request = ResolveRequest {
        instance_suffix: args
            .stack_suffix
            .unwrap_or_else(|| file.deployment.stack_suffix.clone()),
        trust_anchor: load_trust_anchor(args.ca_file.or_else(|| file.deployment.ca_path.clone()))?,
    };

    let sdk = aws::load_sdk_config(&region).await;
    let resolver = ConfigResolver::new(
        Arc::new(CloudFormationRegistry::new(&sdk)),
        Arc::new(SecretsManagerStore::new(&sdk)),
        settings,
    )
    .with_logger(logger);

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel_with_reason("interrupted");
        }
    });

    let document = resolver.resolve_with_cancel(&request, &token).await?;
    render(&document, args.format)
}

fn load_trust_anchor(path: Option<PathBuf>) -> Result<Option<TrustAnchor>> {
    path.map(|path| {
        TrustAnchor::from_file(&path).with_context(|| format!("failed to read CA file {}", path.display()))
    })
    .transpose()
}

fn render(document: &ConfigDocument, format: Format) -> Result<String> {
    let output = match format {
        Format::Json => document.to_json()?,
        Format::Yaml => document.to_yaml()?,
    };
    Ok(output)
}

fn plan(args: &PlanArgs, file: ConfigFile, logger: SharedLogger) -> Result<String> {
    let mut deployment = file.deployment;
    apply_plan_overrides(&mut deployment, args);

    let plan = ComponentGraphBuilder::new(&deployment).with_logger(logger).build()?;
    Ok(serde_json::to_string_pretty(&plan.summary())?)
}

fn apply_plan_overrides(deployment: &mut DeploymentConfig, args: &PlanArgs) {
    if let Some(suffix) = &args.stack_suffix {
        deployment.stack_suffix = suffix.clone();
    }
    if args.enable_calling_ingress {
        deployment.enable_calling_ingress = true;
    }
    if args.enable_autoscaler {
        deployment.enable_autoscaler = true;
    }
    if args.no_auto_deploy {
        deployment.auto_deploy = false;
    }
    if let Some(version) = &args.cluster_version {
        deployment.cluster_version = version.clone();
    }
    if let Some(path) = &args.license_path {
        deployment.license_path = Some(path.clone());
    }
}
