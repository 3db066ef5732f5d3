//! Command rendering.
//!
//! Turns an [`Action`] into the exact docker CLI invocation. Rendering
//! is pure: the same action always yields the same argument list, and
//! repeated fields keep the order they were given in.

use std::fmt;

use serde::Serialize;

use crate::action::{Action, ActionKind};
use crate::error::{Error, Result};
use crate::resource::{ContainerSpec, NetworkSpec, ResourceSpec, VolumeSpec};

pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// One invocation of the external tool, optionally followed by another
/// that belongs to the same logical step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<RenderedCommand>>,
}

impl RenderedCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            then: None,
        }
    }

    /// Append `next` to the end of this command's chain.
    pub fn chain(mut self, next: RenderedCommand) -> Self {
        self.then = Some(Box::new(match self.then.take() {
            Some(existing) => existing.chain(next),
            None => next,
        }));
        self
    }

    /// This invocation followed by every chained one, in execution order.
    pub fn links(&self) -> impl Iterator<Item = &RenderedCommand> {
        std::iter::successors(Some(self), |cmd| cmd.then.as_deref())
    }

    /// This invocation alone as a shell line, without chained follow-ups.
    pub fn invocation(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .links()
            .map(RenderedCommand::invocation)
            .collect::<Vec<_>>()
            .join(" ; ");
        f.write_str(&line)
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | ',' | '+' | '%')
        });
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Renders actions into invocations of a docker-compatible CLI.
#[derive(Debug, Clone)]
pub struct Renderer {
    binary: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl Renderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn command<I, S>(&self, args: I) -> RenderedCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RenderedCommand::new(&self.binary, args)
    }

    /// Render one action.
    ///
    /// Every (action, resource) pair is listed; pairs without a docker
    /// command are an internal error.
    pub fn render(&self, action: &Action) -> Result<RenderedCommand> {
        use ActionKind::*;
        use ResourceSpec as R;

        match (action.kind(), action.resource()) {
            (Create, R::Container(c)) => self.create_container(c),
            (Remove, R::Container(c)) => {
                Ok(self.command(["container", "rm", "-f", c.name.as_str()]))
            }
            (Start, R::Container(c)) => Ok(self.start_container(c)),
            (Stop, R::Container(c)) => Ok(self.command(["container", "stop", c.name.as_str()])),
            (Pull | NoOp, R::Container(_)) => Err(unsupported(action)),

            (Pull, R::Image(i)) => Ok(self.command(["image", "pull", i.reference.as_str()])),
            (Remove, R::Image(i)) => Ok(self.command(["image", "rm", i.reference.as_str()])),
            (Create | Start | Stop | NoOp, R::Image(_)) => Err(unsupported(action)),

            (Create, R::Volume(v)) => Ok(self.create_volume(v)),
            (Remove, R::Volume(v)) => Ok(self.command(["volume", "rm", v.name.as_str()])),
            (Start | Stop | Pull | NoOp, R::Volume(_)) => Err(unsupported(action)),

            (Create, R::Network(n)) => Ok(self.create_network(n)),
            (Remove, R::Network(n)) => Ok(self.command(["network", "rm", n.name.as_str()])),
            (Start | Stop | Pull | NoOp, R::Network(_)) => Err(unsupported(action)),
        }
    }

    fn start_container(&self, spec: &ContainerSpec) -> RenderedCommand {
        self.command(["container", "start", spec.name.as_str()])
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<RenderedCommand> {
        if spec.image.is_empty() {
            return Err(Error::config(format!(
                "container '{}' is missing required field 'image'",
                spec.name
            )));
        }

        let mut args = vec![
            "container".to_string(),
            "create".to_string(),
            "--name".to_string(),
            spec.name.clone(),
        ];
        push_repeated(&mut args, "--network", &spec.networks);
        push_repeated(&mut args, "-p", &spec.ports);
        push_repeated(&mut args, "-v", &spec.volumes);
        push_repeated(&mut args, "-e", &spec.env_vars);
        if spec.pull_always {
            args.push("--pull".into());
            args.push("always".into());
        }
        args.push(spec.image.clone());

        let create = self.command(args);
        Ok(if spec.start {
            create.chain(self.start_container(spec))
        } else {
            create
        })
    }

    fn create_volume(&self, spec: &VolumeSpec) -> RenderedCommand {
        let mut args = vec!["volume".to_string(), "create".to_string(), spec.name.clone()];
        push_optional(&mut args, "-d", &spec.driver);
        push_repeated(&mut args, "--label", &spec.labels);
        self.command(args)
    }

    fn create_network(&self, spec: &NetworkSpec) -> RenderedCommand {
        let mut args = vec![
            "network".to_string(),
            "create".to_string(),
            spec.name.clone(),
        ];
        push_optional(&mut args, "-d", &spec.driver);
        push_optional(&mut args, "--gateway", &spec.gateway);
        push_optional(&mut args, "--ip-range", &spec.ip_range);
        push_optional(&mut args, "--ipam-driver", &spec.ipam_driver);
        push_optional(&mut args, "--subnet", &spec.subnet);
        push_optional(&mut args, "--scope", &spec.scope);
        push_flag(&mut args, "--ingress", spec.ingress);
        push_flag(&mut args, "--attachable", spec.attachable);
        push_repeated(&mut args, "--opt", &spec.opts);
        push_repeated(&mut args, "--ipam-opt", &spec.ipam_opts);
        push_repeated(&mut args, "--label", &spec.labels);
        self.command(args)
    }
}

fn unsupported(action: &Action) -> Error {
    Error::UnsupportedOperation {
        resource: action.resource_kind(),
        action: action.kind(),
    }
}

fn push_repeated(args: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values {
        args.push(flag.to_string());
        args.push(value.clone());
    }
}

fn push_optional(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}
