//! Desired-state resource specifications.
//!
//! One explicit parameter struct per resource kind. Every list field
//! defaults to a fresh empty `Vec`; `present` and (for containers)
//! `start` default to `true`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The kinds of Docker objects this crate manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Container,
    Image,
    Volume,
    Network,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Container,
        ResourceKind::Image,
        ResourceKind::Volume,
        ResourceKind::Network,
    ];

    /// Object name as used by the docker CLI management commands.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Image => "image",
            ResourceKind::Volume => "volume",
            ResourceKind::Network => "network",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::config(format!("unknown resource kind '{s}'")))
    }
}

fn default_true() -> bool {
    true
}

/// Desired state of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerSpec {
    /// Container name, used as its identity.
    #[serde(alias = "container")]
    pub name: String,
    /// Image and tag, e.g. `nginx:alpine`. Required whenever a create is needed.
    pub image: String,
    pub ports: Vec<String>,
    pub networks: Vec<String>,
    pub volumes: Vec<String>,
    pub env_vars: Vec<String>,
    /// Always pull the image on create.
    pub pull_always: bool,
    #[serde(default = "default_true")]
    pub present: bool,
    /// Remove an existing container with the same name and create a new one.
    pub force: bool,
    /// Whether the container should be running.
    #[serde(default = "default_true")]
    pub start: bool,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            ports: Vec::new(),
            networks: Vec::new(),
            volumes: Vec::new(),
            env_vars: Vec::new(),
            pull_always: false,
            present: true,
            force: false,
            start: true,
        }
    }
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// Desired state of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSpec {
    /// Image reference, e.g. `nginx:alpine`.
    #[serde(alias = "image")]
    pub reference: String,
    #[serde(default = "default_true")]
    pub present: bool,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            reference: String::new(),
            present: true,
        }
    }
}

impl ImageSpec {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }
}

/// Desired state of a named volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeSpec {
    #[serde(alias = "volume")]
    pub name: String,
    pub driver: String,
    pub labels: Vec<String>,
    #[serde(default = "default_true")]
    pub present: bool,
}

impl Default for VolumeSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            driver: String::new(),
            labels: Vec::new(),
            present: true,
        }
    }
}

impl VolumeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Desired state of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSpec {
    #[serde(alias = "network")]
    pub name: String,
    pub driver: String,
    pub gateway: String,
    pub ip_range: String,
    pub ipam_driver: String,
    pub subnet: String,
    pub scope: String,
    pub ingress: bool,
    pub attachable: bool,
    pub opts: Vec<String>,
    pub ipam_opts: Vec<String>,
    pub labels: Vec<String>,
    #[serde(default = "default_true")]
    pub present: bool,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            driver: String::new(),
            gateway: String::new(),
            ip_range: String::new(),
            ipam_driver: String::new(),
            subnet: String::new(),
            scope: String::new(),
            ingress: false,
            attachable: false,
            opts: Vec::new(),
            ipam_opts: Vec::new(),
            labels: Vec::new(),
            present: true,
        }
    }
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Desired state of any managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResourceSpec {
    Container(ContainerSpec),
    Image(ImageSpec),
    Volume(VolumeSpec),
    Network(NetworkSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Container(_) => ResourceKind::Container,
            ResourceSpec::Image(_) => ResourceKind::Image,
            ResourceSpec::Volume(_) => ResourceKind::Volume,
            ResourceSpec::Network(_) => ResourceKind::Network,
        }
    }

    /// Name or reference identifying the resource to docker.
    pub fn identity(&self) -> &str {
        match self {
            ResourceSpec::Container(c) => &c.name,
            ResourceSpec::Image(i) => &i.reference,
            ResourceSpec::Volume(v) => &v.name,
            ResourceSpec::Network(n) => &n.name,
        }
    }

    pub fn present(&self) -> bool {
        match self {
            ResourceSpec::Container(c) => c.present,
            ResourceSpec::Image(i) => i.present,
            ResourceSpec::Volume(v) => v.present,
            ResourceSpec::Network(n) => n.present,
        }
    }

    /// Checks fields every action on this resource needs.
    ///
    /// Action-specific requirements (a container image for create) are
    /// checked by the reconciler once it knows a create is needed.
    pub fn validate(&self) -> Result<()> {
        let identity = self.identity();
        if identity.trim().is_empty() {
            let field = match self.kind() {
                ResourceKind::Image => "reference",
                _ => "name",
            };
            return Err(Error::config(format!(
                "{} spec is missing required field '{field}'",
                self.kind()
            )));
        }
        if identity.starts_with('-') {
            return Err(Error::config(format!(
                "{} identity '{identity}' must not start with '-'",
                self.kind()
            )));
        }
        if identity.chars().any(char::is_whitespace) {
            return Err(Error::config(format!(
                "{} identity '{identity}' must not contain whitespace",
                self.kind()
            )));
        }
        Ok(())
    }
}

impl From<ContainerSpec> for ResourceSpec {
    fn from(spec: ContainerSpec) -> Self {
        ResourceSpec::Container(spec)
    }
}

impl From<ImageSpec> for ResourceSpec {
    fn from(spec: ImageSpec) -> Self {
        ResourceSpec::Image(spec)
    }
}

impl From<VolumeSpec> for ResourceSpec {
    fn from(spec: VolumeSpec) -> Self {
        ResourceSpec::Volume(spec)
    }
}

impl From<NetworkSpec> for ResourceSpec {
    fn from(spec: NetworkSpec) -> Self {
        ResourceSpec::Network(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_defaults() {
        let spec = ContainerSpec::new("nginx");
        assert!(spec.present);
        assert!(spec.start);
        assert!(!spec.force);
        assert!(!spec.pull_always);
        assert!(spec.ports.is_empty());
    }

    #[test]
    fn defaults_are_not_shared_between_specs() {
        let mut first = ContainerSpec::new("a");
        first.ports.push("80:80".to_string());
        first.env_vars.push("A=1".to_string());

        let second = ContainerSpec::new("b");
        assert!(second.ports.is_empty());
        assert!(second.env_vars.is_empty());

        let mut net = NetworkSpec::new("n1");
        net.labels.push("x=y".to_string());
        assert!(NetworkSpec::new("n2").labels.is_empty());
    }

    #[test]
    fn manifest_entry_deserializes_with_defaults() {
        let spec: ResourceSpec = serde_json::from_str(
            r#"{"type": "container", "container": "nginx", "image": "nginx:alpine", "ports": ["80:80"]}"#,
        )
        .unwrap();

        match spec {
            ResourceSpec::Container(c) => {
                assert_eq!(c.name, "nginx");
                assert_eq!(c.ports, vec!["80:80"]);
                assert!(c.present);
                assert!(c.start);
                assert!(c.volumes.is_empty());
            }
            other => panic!("unexpected spec: {other:?}"),
        }
    }

    #[test]
    fn unknown_manifest_fields_are_rejected() {
        let result: std::result::Result<ResourceSpec, _> =
            serde_json::from_str(r#"{"type": "volume", "name": "data", "drvier": "local"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_requires_identity() {
        let err = ResourceSpec::from(ImageSpec::new("")).validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("reference"));

        let err = ResourceSpec::from(VolumeSpec::new("my volume"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        for flag_like in ["--all", "-f"] {
            let err = ResourceSpec::from(ContainerSpec::new(flag_like))
                .validate()
                .unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
            assert!(err.to_string().contains("must not start with '-'"));
        }
        assert!(
            ResourceSpec::from(ImageSpec::new("--help"))
                .validate()
                .is_err()
        );

        assert!(
            ResourceSpec::from(NetworkSpec::new("proxy"))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn resource_kind_parses_from_str() {
        assert_eq!("volume".parse::<ResourceKind>().unwrap(), ResourceKind::Volume);
        assert!("pod".parse::<ResourceKind>().is_err());
    }
}
