//! Abstract actions emitted by the reconcilers.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::render::{RenderedCommand, Renderer};
use crate::resource::{ResourceKind, ResourceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Remove,
    Start,
    Stop,
    Pull,
    NoOp,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Remove => "remove",
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Pull => "pull",
            ActionKind::NoOp => "noop",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision against one resource, carrying the spec needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Create(ResourceSpec),
    Remove(ResourceSpec),
    Start(ResourceSpec),
    Stop(ResourceSpec),
    Pull(ResourceSpec),
    /// Desired state already holds.
    NoOp {
        resource: ResourceSpec,
        reason: String,
    },
}

impl Action {
    pub fn noop(resource: ResourceSpec, reason: impl Into<String>) -> Self {
        Action::NoOp {
            resource,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Create(_) => ActionKind::Create,
            Action::Remove(_) => ActionKind::Remove,
            Action::Start(_) => ActionKind::Start,
            Action::Stop(_) => ActionKind::Stop,
            Action::Pull(_) => ActionKind::Pull,
            Action::NoOp { .. } => ActionKind::NoOp,
        }
    }

    pub fn resource(&self) -> &ResourceSpec {
        match self {
            Action::Create(r)
            | Action::Remove(r)
            | Action::Start(r)
            | Action::Stop(r)
            | Action::Pull(r) => r,
            Action::NoOp { resource, .. } => resource,
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.resource().kind()
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::NoOp { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Action::NoOp { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = self.resource();
        write!(f, "{} {} {}", self.kind(), resource.kind(), resource.identity())?;
        if let Some(reason) = self.reason() {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Ordered actions for one resource. Execution must follow this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub resource: ResourceKind,
    pub identity: String,
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(spec: &ResourceSpec) -> Self {
        Self {
            resource: spec.kind(),
            identity: spec.identity().to_string(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(Action::kind).collect()
    }

    /// True when the plan would change something on the host.
    pub fn changes(&self) -> bool {
        self.actions.iter().any(|a| !a.is_noop())
    }

    /// Renders every actionable step, skipping no-ops.
    pub fn render(&self, renderer: &Renderer) -> Result<Vec<RenderedCommand>> {
        self.actions
            .iter()
            .filter(|a| !a.is_noop())
            .map(|a| renderer.render(a))
            .collect()
    }
}
