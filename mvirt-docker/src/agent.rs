//! Reconciliation agent - runs one normalize → decide → render → execute
//! pass per resource against a host.
//!
//! Fact fetching and command execution are collaborators behind the
//! [`FactSource`] and [`CommandExecutor`] traits; the agent itself keeps
//! no state between passes, so every pass starts from fresh facts.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::action::Plan;
use crate::error::Result;
use crate::facts::{FactQuery, ObservedRecord, parse_response};
use crate::reconciler::Reconcile;
use crate::render::{RenderedCommand, Renderer};
use crate::resource::ResourceSpec;

/// Supplies raw inspection output.
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Run `query` and return its output lines, one JSON record per line.
    ///
    /// A query for an object that does not exist returns no lines.
    async fn fetch_facts(&self, query: &FactQuery) -> Result<Vec<String>>;
}

/// Runs rendered commands on the target host.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` and every chained follow-up in order, stopping at
    /// the first failure.
    async fn execute(&self, command: &RenderedCommand) -> Result<()>;
}

/// Result of one pass over one resource.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub plan: Plan,
    pub commands: Vec<RenderedCommand>,
    /// Whether the commands were run (false for plans and dry runs).
    pub executed: bool,
}

impl Outcome {
    /// True when commands were run that changed the host.
    pub fn changed(&self) -> bool {
        self.executed && !self.commands.is_empty()
    }

    /// Reasons reported by no-op actions.
    pub fn noop_reasons(&self) -> Vec<&str> {
        self.plan.actions.iter().filter_map(|a| a.reason()).collect()
    }
}

/// Drives reconciliation passes.
pub struct Agent<F, E> {
    facts: F,
    executor: E,
    renderer: Renderer,
    dry_run: bool,
}

impl<F: FactSource, E: CommandExecutor> Agent<F, E> {
    pub fn new(facts: F, executor: E, renderer: Renderer) -> Self {
        Self {
            facts,
            executor,
            renderer,
            dry_run: false,
        }
    }

    /// Plan and render, but never execute.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Fetch and normalize the current state of the resource `spec` names.
    ///
    /// Returns `None` when the resource does not exist, and without
    /// probing for kinds whose decision does not depend on it.
    pub async fn observe(&self, spec: &ResourceSpec) -> Result<Option<ObservedRecord>> {
        if !spec.needs_facts() {
            return Ok(None);
        }

        let query = FactQuery::inspect(spec.kind(), spec.identity());
        let lines = self.facts.fetch_facts(&query).await?;
        let record = parse_response(lines)?.into_iter().next();

        debug!(
            kind = %spec.kind(),
            name = %spec.identity(),
            exists = record.is_some(),
            "Observed resource"
        );
        Ok(record)
    }

    /// Decide and render the actions for `spec` without running them.
    pub async fn plan(&self, spec: &ResourceSpec) -> Result<Outcome> {
        spec.validate()?;
        let observed = self.observe(spec).await?;
        let plan = spec.reconcile(observed.as_ref())?;
        // Render everything up front so a bad pair never leaves a half-applied plan.
        let commands = plan.render(&self.renderer)?;

        Ok(Outcome {
            plan,
            commands,
            executed: false,
        })
    }

    /// Run a full pass for `spec`.
    pub async fn apply(&self, spec: &ResourceSpec) -> Result<Outcome> {
        info!(kind = %spec.kind(), name = %spec.identity(), "Reconciling");

        let mut outcome = self.plan(spec).await?;

        for reason in outcome.noop_reasons() {
            info!(kind = %spec.kind(), name = %spec.identity(), reason, "No change");
        }

        if self.dry_run {
            for command in &outcome.commands {
                info!(command = %command, "Dry run, not executing");
            }
            return Ok(outcome);
        }

        for command in &outcome.commands {
            info!(command = %command, "Executing");
            self.executor.execute(command).await?;
        }
        outcome.executed = true;

        Ok(outcome)
    }

    /// Apply every spec in order, stopping at the first error.
    pub async fn apply_all(&self, specs: &[ResourceSpec]) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(specs.len());
        for spec in specs {
            outcomes.push(self.apply(spec).await?);
        }
        Ok(outcomes)
    }
}
