//! Container reconciler.
//!
//! Guards, in order:
//! 1. `force` and the container exists: remove it.
//! 2. `present` and (absent or `force`): create it; the create embeds
//!    the start when `start` is set.
//! 3. Otherwise, against the container as it was observed before this
//!    pass: start it, stop it or remove it to match `start`/`present`.

use tracing::debug;

use super::Reconcile;
use crate::action::{Action, Plan};
use crate::error::{Error, Result};
use crate::facts::ObservedRecord;
use crate::resource::{ContainerSpec, ResourceSpec};

impl Reconcile for ContainerSpec {
    fn needs_facts(&self) -> bool {
        true
    }

    fn reconcile(&self, observed: Option<&ObservedRecord>) -> Result<Plan> {
        let resource = ResourceSpec::Container(self.clone());
        let mut plan = Plan::new(&resource);

        let exists = observed.is_some();
        let replace = self.force && exists;
        let create = self.present && (!exists || self.force);

        if create && self.image.is_empty() {
            return Err(Error::config(format!(
                "container '{}' needs to be created but is missing required field 'image'",
                self.name
            )));
        }

        if replace {
            plan.push(Action::Remove(resource.clone()));
        }
        if create {
            plan.push(Action::Create(resource.clone()));
        }

        // A container replaced above is gone; its old run-state is moot.
        if let Some(current) = observed.filter(|_| !replace) {
            let running = current.is_running();
            debug!(
                name = %self.name,
                state = current.run_state().unwrap_or("unknown"),
                "Container exists"
            );
            if !self.present {
                plan.push(Action::Remove(resource.clone()));
            } else if self.start && !running {
                plan.push(Action::Start(resource.clone()));
            } else if !self.start && running {
                plan.push(Action::Stop(resource.clone()));
            }
        }

        if plan.actions.is_empty() {
            let reason = if exists {
                "already in desired state"
            } else {
                "does not exist"
            };
            plan.push(Action::noop(resource, reason));
        }

        debug!(name = %self.name, actions = ?plan.kinds(), "Container plan");
        Ok(plan)
    }
}
