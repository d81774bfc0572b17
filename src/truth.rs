//! Truth-value arithmetic: combine and compare belief frequencies and confidences.
//!
//! A [`TruthValue`] is a `(frequency, confidence)` pair. Frequency is how often the
//! statement has held true among the evidence seen so far; confidence is how much
//! more evidence would change that estimate (0 = totally uncommitted, approaching
//! 1 = effectively settled, never fully 1 since more evidence can always arrive).

use serde::{Deserialize, Serialize};

/// Evidence constant used by [`TruthValue::induction`]. Larger values make
/// induction more conservative (lower confidence for the same evidence).
const INDUCTION_EVIDENCE_K: f64 = 1.0;

/// A truth value: `(frequency, confidence)`, both always in valid range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    frequency: f64,
    confidence: f64,
}

impl TruthValue {
    /// Construct a truth value, clamping both components into their valid ranges.
    ///
    /// Frequency clamps to `[0,1]`; confidence clamps to `[0, 1)` since a
    /// confidence of exactly 1 would mean no further evidence could ever matter.
    pub fn new(frequency: f64, confidence: f64) -> Self {
        Self {
            frequency: frequency.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0 - f64::EPSILON),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// The point estimate `c·(f−0.5)+0.5` derived from this truth value.
    pub fn expectation(&self) -> f64 {
        self.confidence * (self.frequency - 0.5) + 0.5
    }

    /// `(1, 0.99)` — the conventional "certain" truth value for axioms.
    pub fn certain() -> Self {
        Self::new(1.0, 0.99)
    }

    /// `(0.5, 0)` — totally uncommitted truth value.
    pub fn unknown() -> Self {
        Self::new(0.5, 0.0)
    }

    /// Deductive/transitive combination: `Inheritance(S,M)` + `Inheritance(M,P)`
    /// → `Inheritance(S,P)`. `f = aF·bF`; `c = aF·bF·aC·bC`.
    pub fn transitive(a: Self, b: Self) -> Self {
        let f = a.frequency * b.frequency;
        let c = a.frequency * b.frequency * a.confidence * b.confidence;
        Self::new(f, c)
    }

    /// Alias for [`Self::transitive`] — deduction uses the same formula.
    pub fn deduced(a: Self, b: Self) -> Self {
        Self::transitive(a, b)
    }

    /// Inductive combination: from `Inheritance(A,P)` and `Inheritance(B,P)`,
    /// estimate `Similarity(A,B)`. `w = aF·bC`; `f = aF`; `c = w/(w+k)`.
    pub fn induction(a: Self, b: Self) -> Self {
        let w = a.frequency * b.confidence;
        let f = a.frequency;
        let c = w / (w + INDUCTION_EVIDENCE_K);
        Self::new(f, c)
    }

    /// Analogical combination: `Similarity(A,B)` + `Inheritance(A,P)` →
    /// `Inheritance(B,P)`. `f = simF·premF`; `c = simF·simC·premC`.
    pub fn analogy(similarity: Self, premise: Self) -> Self {
        let f = similarity.frequency * premise.frequency;
        let c = similarity.frequency * similarity.confidence * premise.confidence;
        Self::new(f, c)
    }

    /// Evidence-weighted revision of two beliefs about the same statement.
    ///
    /// `w_i = c_i/(1-c_i)`; `f = (w1·f1 + w2·f2)/(w1+w2)`; `c = (w1+w2)/(w1+w2+1)`.
    /// Commutative by construction (the formula is symmetric in `a`/`b`).
    pub fn revision(a: Self, b: Self) -> Self {
        let w1 = a.confidence / (1.0 - a.confidence).max(f64::EPSILON);
        let w2 = b.confidence / (1.0 - b.confidence).max(f64::EPSILON);
        if w1 + w2 <= f64::EPSILON {
            // Both inputs carry no evidence weight; averaging frequencies is the
            // only sensible fallback, and the result stays maximally uncommitted.
            return Self::new((a.frequency + b.frequency) / 2.0, 0.0);
        }
        let f = (w1 * a.frequency + w2 * b.frequency) / (w1 + w2);
        let c = (w1 + w2) / (w1 + w2 + 1.0);
        Self::new(f, c)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn new_clamps_out_of_range_inputs() {
        let t = TruthValue::new(1.5, -0.2);
        assert_eq!(t.frequency(), 1.0);
        assert_eq!(t.confidence(), 0.0);

        let t2 = TruthValue::new(-1.0, 2.0);
        assert_eq!(t2.frequency(), 0.0);
        assert!(t2.confidence() < 1.0);
    }

    #[test]
    fn certain_and_unknown() {
        assert!(close(TruthValue::certain().frequency(), 1.0));
        assert!(close(TruthValue::certain().confidence(), 0.99));
        assert!(close(TruthValue::unknown().frequency(), 0.5));
        assert!(close(TruthValue::unknown().confidence(), 0.0));
    }

    #[test]
    fn expectation_formula() {
        let t = TruthValue::new(0.8, 0.9);
        assert!(close(t.expectation(), 0.9 * (0.8 - 0.5) + 0.5));
    }

    #[test]
    fn transitive_matches_s1_scenario() {
        // spec S1: Inheritance(a,b) %0.9;0.9% + Inheritance(b,c) %0.9;0.9%
        // -> Inheritance(a,c) with f ~= 0.81, c ~= 0.656
        let a = TruthValue::new(0.9, 0.9);
        let b = TruthValue::new(0.9, 0.9);
        let result = TruthValue::transitive(a, b);
        assert!((result.frequency() - 0.81).abs() < 0.01);
        assert!((result.confidence() - 0.6561).abs() < 0.01);
    }

    #[test]
    fn revision_is_commutative() {
        let a = TruthValue::new(0.8, 0.7);
        let b = TruthValue::new(0.6, 0.5);
        let ab = TruthValue::revision(a, b);
        let ba = TruthValue::revision(b, a);
        assert!(close(ab.frequency(), ba.frequency()));
        assert!(close(ab.confidence(), ba.confidence()));
    }

    #[test]
    fn revision_increases_confidence_under_agreement() {
        let a = TruthValue::new(0.8, 0.7);
        let b = TruthValue::new(0.8, 0.5);
        let r = TruthValue::revision(a, b);
        assert!(r.confidence() > a.confidence());
        assert!(r.confidence() > b.confidence());
        assert!(close(r.frequency(), 0.8));
    }

    #[test]
    fn modus_ponens_matches_s2_scenario() {
        // spec S2: Implication(p,q) %1;0.9% + p %1;0.9% -> q f=1, c ~= 0.81
        let impl_truth = TruthValue::new(1.0, 0.9);
        let premise = TruthValue::new(1.0, 0.9);
        let result = TruthValue::deduced(premise, impl_truth);
        assert!((result.frequency() - 1.0).abs() < 1e-9);
        assert!((result.confidence() - 0.81).abs() < 0.01);
    }

    #[test]
    fn all_combinators_stay_in_range() {
        let values = [
            TruthValue::new(0.0, 0.0),
            TruthValue::new(1.0, 0.0),
            TruthValue::new(0.5, 0.5),
            TruthValue::new(1.0, 0.999),
        ];
        for &a in &values {
            for &b in &values {
                for t in [
                    TruthValue::transitive(a, b),
                    TruthValue::induction(a, b),
                    TruthValue::analogy(a, b),
                    TruthValue::deduced(a, b),
                    TruthValue::revision(a, b),
                ] {
                    assert!((0.0..=1.0).contains(&t.frequency()));
                    assert!((0.0..1.0).contains(&t.confidence()));
                }
            }
        }
    }
}
