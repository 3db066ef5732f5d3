//! Image reconciler - a pure toggle between pull and remove.

use tracing::debug;

use super::Reconcile;
use crate::action::{Action, Plan};
use crate::error::Result;
use crate::facts::ObservedRecord;
use crate::resource::{ImageSpec, ResourceSpec};

impl Reconcile for ImageSpec {
    fn needs_facts(&self) -> bool {
        false
    }

    fn reconcile(&self, _observed: Option<&ObservedRecord>) -> Result<Plan> {
        let resource = ResourceSpec::Image(self.clone());
        let mut plan = Plan::new(&resource);

        // `docker image pull` and `docker image rm` converge on their own.
        plan.push(if self.present {
            Action::Pull(resource)
        } else {
            Action::Remove(resource)
        });

        debug!(reference = %self.reference, actions = ?plan.kinds(), "Image plan");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::reconciler::test_util::observed;

    #[test]
    fn present_pulls_regardless_of_state() {
        let spec = ImageSpec::new("nginx:alpine");
        let existing = observed(serde_json::json!({"Id": "sha256:abc", "RepoTags": ["nginx:alpine"]}));

        assert_eq!(spec.reconcile(None).unwrap().kinds(), vec![ActionKind::Pull]);
        assert_eq!(
            spec.reconcile(Some(&existing)).unwrap().kinds(),
            vec![ActionKind::Pull]
        );
    }

    #[test]
    fn absent_removes() {
        let spec = ImageSpec {
            present: false,
            ..ImageSpec::new("nginx:alpine")
        };
        assert_eq!(spec.reconcile(None).unwrap().kinds(), vec![ActionKind::Remove]);
    }
}
