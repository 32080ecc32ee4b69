//! Clamped value types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A delay expressed in minutes, clamped to be non-negative.
///
/// Early arrival is recorded as "on time" (0.0), never as a negative delay;
/// the clamp lives here so neither the store nor the predictor can leak a
/// negative value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DelayMinutes(f64);

impl DelayMinutes {
    pub const ZERO: Self = Self(0.0);

    pub fn new(val: f64) -> Self {
        if val < 0.0 { Self(0.0) } else { Self(val) }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Rounds to two decimal places, the precision surfaced to callers.
    pub fn rounded(&self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }
}

impl Add for DelayMinutes {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for DelayMinutes {
    type Output = f64;
    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl std::fmt::Display for DelayMinutes {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.2} min", self.0)
    }
}
