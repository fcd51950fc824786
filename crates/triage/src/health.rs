//! Health gate: decides whether a pod needs deep triage at all.

use crate::model::{ConditionStatus, Instance, Phase, READY_CONDITION};

/// Check if a pod is actually healthy.
///
/// A pod is healthy only if:
/// 1. Phase is `Running`
/// 2. Every `Ready` condition is `True`
/// 3. Every container has a restart count of zero
///
/// A container that is running now but has restarted still fails the gate;
/// the restart count is the signal that survives a transient recovery.
pub fn is_healthy(instance: &Instance) -> bool {
    if instance.phase != Phase::Running {
        return false;
    }

    let ready = instance
        .conditions
        .iter()
        .filter(|c| c.condition_type == READY_CONDITION)
        .all(|c| c.status == ConditionStatus::True);
    if !ready {
        return false;
    }

    instance.components.iter().all(|c| c.restart_count == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentState, ComponentStatus, Condition};

    fn running_pod() -> Instance {
        Instance {
            name: "web-0".to_string(),
            namespace: "default".to_string(),
            phase: Phase::Running,
            components: vec![ComponentStatus {
                name: "app".to_string(),
                restart_count: 0,
                state: ComponentState::Running,
                ready: true,
                last_termination: None,
            }],
            conditions: vec![
                Condition {
                    condition_type: "Initialized".to_string(),
                    status: ConditionStatus::True,
                },
                Condition {
                    condition_type: READY_CONDITION.to_string(),
                    status: ConditionStatus::True,
                },
            ],
        }
    }

    #[test]
    fn test_healthy_pod_passes() {
        assert!(is_healthy(&running_pod()));
    }

    #[test]
    fn test_non_running_phase_fails() {
        for phase in [
            Phase::Pending,
            Phase::Succeeded,
            Phase::Failed,
            Phase::Unknown,
        ] {
            let mut pod = running_pod();
            pod.phase = phase;
            assert!(!is_healthy(&pod), "{phase} should not be healthy");
        }
    }

    #[test]
    fn test_restarted_container_fails_even_when_ready() {
        let mut pod = running_pod();
        pod.components[0].restart_count = 1;
        assert!(!is_healthy(&pod));
    }

    #[test]
    fn test_ready_condition_not_true_fails() {
        for status in [ConditionStatus::False, ConditionStatus::Unknown] {
            let mut pod = running_pod();
            pod.conditions[1].status = status;
            assert!(!is_healthy(&pod));
        }
    }

    #[test]
    fn test_other_false_conditions_are_ignored() {
        let mut pod = running_pod();
        pod.conditions[0].status = ConditionStatus::False;
        assert!(is_healthy(&pod));
    }

    #[test]
    fn test_zero_containers_is_vacuously_healthy() {
        let mut pod = running_pod();
        pod.components.clear();
        assert!(is_healthy(&pod));

        pod.conditions[1].status = ConditionStatus::False;
        assert!(!is_healthy(&pod));
    }
}
