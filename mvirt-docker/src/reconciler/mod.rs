//! Reconcilers for the different resource kinds.
//!
//! Each reconciler compares the desired spec with the observed record
//! (or its absence) and decides which actions bring docker in line.
//! Decisions are pure: no I/O happens here.

pub mod container;
pub mod image;
pub mod network;
pub mod volume;

use crate::action::Plan;
use crate::error::Result;
use crate::facts::ObservedRecord;
use crate::resource::ResourceSpec;

/// Decision logic for one resource kind.
pub trait Reconcile {
    /// Whether the decision depends on the resource's current state.
    ///
    /// Kinds that return `false` rely on the underlying docker command
    /// being idempotent and are never probed.
    fn needs_facts(&self) -> bool;

    /// Compute the ordered actions converging `observed` to this spec.
    ///
    /// `observed` is `None` when the resource does not exist.
    fn reconcile(&self, observed: Option<&ObservedRecord>) -> Result<Plan>;
}

impl Reconcile for ResourceSpec {
    fn needs_facts(&self) -> bool {
        match self {
            ResourceSpec::Container(spec) => spec.needs_facts(),
            ResourceSpec::Image(spec) => spec.needs_facts(),
            ResourceSpec::Volume(spec) => spec.needs_facts(),
            ResourceSpec::Network(spec) => spec.needs_facts(),
        }
    }

    fn reconcile(&self, observed: Option<&ObservedRecord>) -> Result<Plan> {
        self.validate()?;
        match self {
            ResourceSpec::Container(spec) => spec.reconcile(observed),
            ResourceSpec::Image(spec) => spec.reconcile(observed),
            ResourceSpec::Volume(spec) => spec.reconcile(observed),
            ResourceSpec::Network(spec) => spec.reconcile(observed),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use serde_json::Value;

    use crate::facts::{ObservedRecord, parse_response};

    /// Build a normalized record from a raw docker JSON value.
    pub fn observed(raw: Value) -> ObservedRecord {
        let line = raw.to_string();
        parse_response([line]).unwrap().remove(0)
    }

    pub fn container_record(name: &str, status: &str) -> ObservedRecord {
        observed(serde_json::json!({
            "Id": format!("{name}-id"),
            "Name": format!("/{name}"),
            "State": {"Status": status, "Running": status == "running"},
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::resource::{ContainerSpec, ImageSpec, NetworkSpec, VolumeSpec};

    #[test]
    fn needs_facts_per_kind() {
        assert!(ResourceSpec::from(ContainerSpec::new("c")).needs_facts());
        assert!(ResourceSpec::from(VolumeSpec::new("v")).needs_facts());
        assert!(!ResourceSpec::from(ImageSpec::new("i")).needs_facts());
        assert!(!ResourceSpec::from(NetworkSpec::new("n")).needs_facts());
    }

    #[test]
    fn dispatch_validates_first() {
        let err = ResourceSpec::from(NetworkSpec::new(""))
            .reconcile(None)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
