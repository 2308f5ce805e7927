use crate::models::TriggerNotification;

use super::connection_registry::ConnectionRegistry;

/// Pushes one message per triggered alert to its owner.
///
/// Returns how many alerts were processed, delivered or not: an offline user
/// still had an alert fire.
pub fn dispatch(registry: &ConnectionRegistry, candidates: &[TriggerNotification]) -> usize {
    let mut delivered = 0usize;

    for n in candidates {
        if registry.send_to(n.user_id, n.message()) {
            delivered += 1;
        }
    }

    if !candidates.is_empty() {
        tracing::debug!(
            "dispatched {} alert(s), {} delivered live",
            candidates.len(),
            delivered
        );
    }

    candidates.len()
}
