use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mvirt_docker::config::{self, Config};
use mvirt_docker::docker::DockerCli;
use mvirt_docker::{Agent, FactQuery, Renderer, ResourceKind};

#[derive(Parser)]
#[command(name = "mvirt-docker", version)]
#[command(about = "Reconcile Docker containers, images, volumes and networks")]
struct Cli {
    /// Docker-compatible binary to run
    #[arg(long, default_value = "docker")]
    docker: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the commands a manifest would run, without running them
    Plan {
        /// JSON manifest of resources
        #[arg(short = 'f', long)]
        manifest: PathBuf,
    },

    /// Converge the host to a manifest
    Apply {
        /// JSON manifest of resources
        #[arg(short = 'f', long)]
        manifest: PathBuf,

        /// Log the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print normalized facts as JSON lines
    Facts {
        /// container, image, volume, network or system
        kind: String,

        /// Name or ID to inspect; lists all objects when omitted
        identity: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mvirt_docker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config {
        docker_binary: cli.docker,
        ..Config::default()
    };

    match cli.command {
        Commands::Plan { manifest } => {
            let specs = config::load_manifest(&manifest)
                .await
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
            let agent = build_agent(&config);

            for spec in &specs {
                let outcome = agent.plan(spec).await?;
                for action in &outcome.plan.actions {
                    println!("# {action}");
                }
                for command in &outcome.commands {
                    println!("{command}");
                }
            }
        }
        Commands::Apply { manifest, dry_run } => {
            config.dry_run = dry_run;
            let specs = config::load_manifest(&manifest)
                .await
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
            let agent = build_agent(&config);

            let outcomes = agent.apply_all(&specs).await?;
            let changed = outcomes.iter().filter(|o| o.changed()).count();
            info!(resources = outcomes.len(), changed, "Apply finished");
        }
        Commands::Facts { kind, identity } => {
            let query = match (kind.as_str(), identity) {
                ("system", _) => FactQuery::SystemInfo,
                (kind, Some(identity)) => FactQuery::Inspect {
                    kind: kind.parse::<ResourceKind>()?,
                    identity,
                },
                (kind, None) => FactQuery::List {
                    kind: kind.parse::<ResourceKind>()?,
                },
            };

            let records = DockerCli::new(&config.docker_binary)
                .query(&query)
                .await
                .context("Failed to fetch facts")?;
            for record in records {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }

    Ok(())
}

fn build_agent(config: &Config) -> Agent<DockerCli, DockerCli> {
    let cli = DockerCli::new(&config.docker_binary);
    Agent::new(
        cli.clone(),
        cli,
        Renderer::new(&config.docker_binary),
    )
    .with_dry_run(config.dry_run)
}
