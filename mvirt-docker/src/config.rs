//! Runtime configuration and manifest loading.
//!
//! A manifest is a JSON array of resource objects tagged by `type`:
//!
//! ```json
//! [
//!   {"type": "network", "name": "proxy"},
//!   {"type": "container", "name": "nginx", "image": "nginx:alpine",
//!    "ports": ["80:80"], "networks": ["proxy"]}
//! ]
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::render::DEFAULT_DOCKER_BINARY;
use crate::resource::ResourceSpec;

/// Settings shared by every pass.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or name of the docker-compatible binary.
    pub docker_binary: String,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker_binary: DEFAULT_DOCKER_BINARY.to_string(),
            dry_run: false,
        }
    }
}

/// Parse manifest text into resource specs, validating each one.
pub fn parse_manifest(text: &str) -> Result<Vec<ResourceSpec>> {
    let specs: Vec<ResourceSpec> = serde_json::from_str(text)
        .map_err(|e| Error::config(format!("invalid manifest: {e}")))?;
    for spec in &specs {
        spec.validate()?;
    }
    Ok(specs)
}

/// Read and parse a manifest file.
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ResourceSpec>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    parse_manifest(&text).map_err(|e| match e {
        Error::Configuration(msg) => Error::Configuration(format!("{}: {msg}", path.display())),
        other => other,
    })
}
