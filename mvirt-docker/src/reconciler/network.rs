//! Network reconciler - create or remove, without probing.

use tracing::debug;

use super::Reconcile;
use crate::action::{Action, Plan};
use crate::error::Result;
use crate::facts::ObservedRecord;
use crate::resource::{NetworkSpec, ResourceSpec};

impl Reconcile for NetworkSpec {
    fn needs_facts(&self) -> bool {
        false
    }

    fn reconcile(&self, _observed: Option<&ObservedRecord>) -> Result<Plan> {
        let resource = ResourceSpec::Network(self.clone());
        let mut plan = Plan::new(&resource);

        plan.push(if self.present {
            Action::Create(resource)
        } else {
            Action::Remove(resource)
        });

        debug!(name = %self.name, actions = ?plan.kinds(), "Network plan");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::render::Renderer;

    #[test]
    fn present_creates_with_spec_fields() {
        let spec = NetworkSpec {
            driver: "bridge".into(),
            subnet: "172.20.0.0/16".into(),
            attachable: true,
            ..NetworkSpec::new("proxy")
        };
        let plan = spec.reconcile(None).unwrap();
        assert_eq!(plan.kinds(), vec![ActionKind::Create]);

        let commands = plan.render(&Renderer::default()).unwrap();
        assert_eq!(
            commands[0].args,
            vec!["network", "create", "proxy", "-d", "bridge", "--subnet", "172.20.0.0/16", "--attachable"]
        );
    }

    #[test]
    fn absent_removes() {
        let spec = NetworkSpec {
            present: false,
            ..NetworkSpec::new("proxy")
        };
        let commands = spec
            .reconcile(None)
            .unwrap()
            .render(&Renderer::default())
            .unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args, vec!["network", "rm", "proxy"]);
    }
}
