//! Overall-health classification thresholds.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Overall health of the system as classified by a [`HealthPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallHealth {
    Critical,
    Degraded,
    Healthy,
}

impl OverallHealth {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Degraded => "DEGRADED",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ratio thresholds over "operational" components (healthy and able to
/// execute). Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthPolicy {
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: f64,
    #[serde(default = "default_degraded_threshold")]
    pub degraded_threshold: f64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            healthy_threshold: default_healthy_threshold(),
            degraded_threshold: default_degraded_threshold(),
        }
    }
}

const fn default_healthy_threshold() -> f64 {
    0.8
}

const fn default_degraded_threshold() -> f64 {
    0.5
}

impl HealthPolicy {
    /// Build a validated policy.
    ///
    /// # Errors
    ///
    /// See [`HealthPolicy::validate`].
    pub fn new(healthy_threshold: f64, degraded_threshold: f64) -> Result<Self, PolicyError> {
        let policy = Self {
            healthy_threshold,
            degraded_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check both thresholds lie in `[0, 1]` and `degraded <= healthy`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (name, value) in [
            ("healthy_threshold", self.healthy_threshold),
            ("degraded_threshold", self.degraded_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::OutOfRange { name, value });
            }
        }
        if self.degraded_threshold > self.healthy_threshold {
            return Err(PolicyError::Inverted {
                healthy: self.healthy_threshold,
                degraded: self.degraded_threshold,
            });
        }
        Ok(())
    }

    /// Fraction of operational components; an empty graph counts as fully
    /// operational.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(operational: usize, total: usize) -> f64 {
        if total == 0 {
            1.0
        } else {
            operational as f64 / total as f64
        }
    }

    /// Classify `operational` out of `total` components.
    #[must_use]
    pub fn classify(&self, operational: usize, total: usize) -> OverallHealth {
        let ratio = Self::ratio(operational, total);
        if ratio >= self.healthy_threshold {
            OverallHealth::Healthy
        } else if ratio >= self.degraded_threshold {
            OverallHealth::Degraded
        } else {
            OverallHealth::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let policy = HealthPolicy::default();
        assert!((policy.healthy_threshold - 0.8).abs() < f64::EPSILON);
        assert!((policy.degraded_threshold - 0.5).abs() < f64::EPSILON);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn seven_component_boundaries() {
        let policy = HealthPolicy::default();
        assert_eq!(policy.classify(7, 7), OverallHealth::Healthy);
        assert_eq!(policy.classify(6, 7), OverallHealth::Healthy);
        assert_eq!(policy.classify(5, 7), OverallHealth::Degraded);
        assert_eq!(policy.classify(4, 7), OverallHealth::Degraded);
        assert_eq!(policy.classify(3, 7), OverallHealth::Critical);
        assert_eq!(policy.classify(0, 7), OverallHealth::Critical);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let policy = HealthPolicy::default();
        assert_eq!(policy.classify(4, 5), OverallHealth::Healthy);
        assert_eq!(policy.classify(1, 2), OverallHealth::Degraded);
    }

    #[test]
    fn empty_graph_is_healthy() {
        assert_eq!(HealthPolicy::default().classify(0, 0), OverallHealth::Healthy);
    }

    #[test]
    fn custom_policy_changes_classification() {
        let strict = HealthPolicy::new(1.0, 0.9).expect("valid policy");
        assert_eq!(strict.classify(6, 7), OverallHealth::Critical);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = HealthPolicy::new(1.5, 0.5).expect_err("out of range");
        assert!(matches!(
            err,
            PolicyError::OutOfRange {
                name: "healthy_threshold",
                ..
            }
        ));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = HealthPolicy::new(0.4, 0.6).expect_err("inverted");
        assert!(matches!(err, PolicyError::Inverted { .. }));
    }

    #[test]
    fn partial_policy_fills_defaults() {
        let policy: HealthPolicy =
            serde_json::from_str(r#"{"healthy_threshold": 0.9}"#).expect("parse");
        assert!((policy.healthy_threshold - 0.9).abs() < f64::EPSILON);
        assert!((policy.degraded_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_policy_field_is_rejected() {
        let result = serde_json::from_str::<HealthPolicy>(r#"{"healthy": 0.99}"#);
        assert!(result.is_err());
    }

    #[test]
    fn overall_health_orders_by_severity() {
        assert!(OverallHealth::Critical < OverallHealth::Degraded);
        assert!(OverallHealth::Degraded < OverallHealth::Healthy);
    }
}
