//! mvirt-docker: declarative reconciler for Docker resources.
//!
//! Given the desired state of a container, image, volume or network and
//! what docker currently reports about it, computes the minimal ordered
//! commands that converge the host, and renders them as docker CLI
//! invocations.
//!
//! ## Architecture
//!
//! - **Facts** ([`facts`]): normalizes docker inspection records to snake_case keys
//! - **Reconcilers** ([`reconciler`]): per-kind decision logic producing [`action::Plan`]s
//! - **Renderer** ([`render`]): maps actions to exact CLI argument lists
//! - **Agent** ([`agent`]): runs passes against a [`agent::FactSource`] and
//!   [`agent::CommandExecutor`]; [`docker::DockerCli`] implements both

pub mod action;
pub mod agent;
pub mod config;
pub mod docker;
pub mod error;
pub mod facts;
pub mod reconciler;
pub mod render;
pub mod resource;

pub use action::{Action, ActionKind, Plan};
pub use agent::{Agent, CommandExecutor, FactSource, Outcome};
pub use error::{Error, Result};
pub use facts::{FactQuery, ObservedRecord};
pub use reconciler::Reconcile;
pub use render::{RenderedCommand, Renderer};
pub use resource::{ContainerSpec, ImageSpec, NetworkSpec, ResourceKind, ResourceSpec, VolumeSpec};
