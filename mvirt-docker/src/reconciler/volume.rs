//! Volume reconciler.

use tracing::debug;

use super::Reconcile;
use crate::action::{Action, Plan};
use crate::error::Result;
use crate::facts::ObservedRecord;
use crate::resource::{ResourceSpec, VolumeSpec};

impl Reconcile for VolumeSpec {
    fn needs_facts(&self) -> bool {
        true
    }

    fn reconcile(&self, observed: Option<&ObservedRecord>) -> Result<Plan> {
        let resource = ResourceSpec::Volume(self.clone());
        let mut plan = Plan::new(&resource);

        let action = match (self.present, observed.is_some()) {
            (true, true) => Action::noop(resource, "already exists"),
            (true, false) => Action::Create(resource),
            (false, false) => Action::noop(resource, "does not exist"),
            (false, true) => Action::Remove(resource),
        };
        plan.push(action);

        debug!(name = %self.name, actions = ?plan.kinds(), "Volume plan");
        Ok(plan)
    }
}
