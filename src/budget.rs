//! Budget arithmetic: the attention economy that rations derivation effort.
//!
//! A [`Budget`] is a `(priority, durability, quality)` triple, each in `[0,1]`.
//! `priority` gates whether an event is worth processing now; `durability` is how
//! much of the budget survives propagation; `quality` is a long-run usefulness
//! estimate independent of the current task. `total()` is their mean.

use serde::{Deserialize, Serialize};

/// Attention budget attached to a belief or event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub priority: f64,
    pub durability: f64,
    pub quality: f64,
}

impl Budget {
    /// Construct a budget, clamping each component into `[0,1]`.
    pub fn new(priority: f64, durability: f64, quality: f64) -> Self {
        Self {
            priority: priority.clamp(0.0, 1.0),
            durability: durability.clamp(0.0, 1.0),
            quality: quality.clamp(0.0, 1.0),
        }
    }

    /// A full-strength budget, used for directly asserted beliefs.
    pub fn full() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// The mean of the three components.
    pub fn total(&self) -> f64 {
        (self.priority + self.durability + self.quality) / 3.0
    }

    /// Scale every component by `factor`, clamping the result.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.priority * factor,
            self.durability * factor,
            self.quality * factor,
        )
    }

    /// Per-component mean with another budget.
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(
            (self.priority + other.priority) / 2.0,
            (self.durability + other.durability) / 2.0,
            (self.quality + other.quality) / 2.0,
        )
    }

    /// `true` if every component differs from `other`'s by at most `0.05`.
    pub fn equivalent(&self, other: &Self) -> bool {
        const TOLERANCE: f64 = 0.05;
        (self.priority - other.priority).abs() <= TOLERANCE
            && (self.durability - other.durability).abs() <= TOLERANCE
            && (self.quality - other.quality).abs() <= TOLERANCE
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_components() {
        let b = Budget::new(1.5, -0.3, 0.5);
        assert_eq!(b.priority, 1.0);
        assert_eq!(b.durability, 0.0);
        assert_eq!(b.quality, 0.5);
    }

    #[test]
    fn total_is_mean() {
        let b = Budget::new(0.3, 0.6, 0.9);
        assert!((b.total() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn scale_clamps_overflow() {
        let b = Budget::new(0.8, 0.8, 0.8).scale(2.0);
        assert_eq!(b.priority, 1.0);
    }

    #[test]
    fn merge_is_componentwise_mean() {
        let a = Budget::new(0.2, 0.4, 0.6);
        let b = Budget::new(0.8, 0.6, 0.4);
        let m = a.merge(&b);
        assert!((m.priority - 0.5).abs() < 1e-9);
        assert!((m.durability - 0.5).abs() < 1e-9);
        assert!((m.quality - 0.5).abs() < 1e-9);
    }

    #[test]
    fn equivalent_within_tolerance() {
        let a = Budget::new(0.5, 0.5, 0.5);
        let b = Budget::new(0.53, 0.48, 0.54);
        assert!(a.equivalent(&b));
        let c = Budget::new(0.7, 0.5, 0.5);
        assert!(!a.equivalent(&c));
    }
}
