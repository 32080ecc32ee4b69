//! Prediction-versus-live reconciliation.

use {
    crate::config::{constants::RELIABILITY_TOLERANCE_MIN, DelayMinutes},
    serde::{Deserialize, Serialize},
};

/// Agreement verdict between a predicted and a live-observed delay.
/// Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub predicted_delay_minutes: f64,
    pub observed_delay_minutes: f64,
    pub absolute_difference: f64,
    pub is_reliable: bool,
}

/// A prediction is reliable when it lands within
/// [`RELIABILITY_TOLERANCE_MIN`] minutes of the observed delay; exactly on
/// the tolerance counts as reliable.
pub fn reconcile(predicted: DelayMinutes, observed: DelayMinutes) -> ReconciliationResult {
    let absolute_difference = (predicted - observed).abs();
    ReconciliationResult {
        predicted_delay_minutes: predicted.value(),
        observed_delay_minutes: observed.value(),
        absolute_difference,
        is_reliable: absolute_difference <= RELIABILITY_TOLERANCE_MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(p: f64, o: f64) -> ReconciliationResult {
        reconcile(DelayMinutes::new(p), DelayMinutes::new(o))
    }

    #[test]
    fn within_tolerance_is_reliable() {
        let r = verdict(17.1, 20.0);
        assert!(r.is_reliable);
        assert!((r.absolute_difference - 2.9).abs() < 1e-9);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        assert!(verdict(10.0, 25.0).is_reliable); // exactly 15.0
        assert!(!verdict(10.0, 25.01).is_reliable); // 15.01
    }

    #[test]
    fn large_divergence_is_unreliable() {
        let r = verdict(17.1, 60.0);
        assert!(!r.is_reliable);
        assert!((r.absolute_difference - 42.9).abs() < 1e-9);
    }

    #[test]
    fn direction_of_error_does_not_matter() {
        assert_eq!(
            verdict(30.0, 20.0).absolute_difference,
            verdict(20.0, 30.0).absolute_difference
        );
    }
}
