//! Docker CLI collaborator.
//!
//! Shells out to the docker binary for both fact queries and rendered
//! commands.

use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::agent::{CommandExecutor, FactSource};
use crate::error::{Error, Result};
use crate::facts::{FactQuery, ObservedRecord, parse_response};
use crate::render::{DEFAULT_DOCKER_BINARY, RenderedCommand};

/// Lower-cased marker in docker's error when an inspected object does not
/// exist. Casing differs per object kind and daemon version
/// (`No such container`, `no such volume`).
const NOT_FOUND_MARKER: &str = "no such";

fn is_not_found(stderr: &str) -> bool {
    stderr.to_ascii_lowercase().contains(NOT_FOUND_MARKER)
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Fetch and normalize the records a query returns.
    pub async fn query(&self, query: &FactQuery) -> Result<Vec<ObservedRecord>> {
        let lines = self.fetch_facts(query).await?;
        parse_response(lines)
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        Ok(Command::new(program).args(args).output().await?)
    }
}

fn failure(command: String, output: &Output) -> Error {
    Error::CommandFailed {
        command,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[async_trait]
impl FactSource for DockerCli {
    async fn fetch_facts(&self, query: &FactQuery) -> Result<Vec<String>> {
        let cmd = RenderedCommand::new(&self.binary, query.args());
        debug!(command = %cmd, "Fetching facts");

        let output = self.run(&cmd.program, &cmd.args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if matches!(query, FactQuery::Inspect { .. }) && is_not_found(&stderr) {
                return Ok(Vec::new());
            }
            return Err(failure(cmd.invocation(), &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

#[async_trait]
impl CommandExecutor for DockerCli {
    async fn execute(&self, command: &RenderedCommand) -> Result<()> {
        for link in command.links() {
            let line = link.invocation();
            debug!(command = %line, "Running");

            let output = self.run(&link.program, &link.args).await?;
            if !output.status.success() {
                return Err(failure(line, &output));
            }
        }
        Ok(())
    }
}
