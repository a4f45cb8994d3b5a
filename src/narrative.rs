//! Narrative parameters for a disinformation run
//!
//! A narrative is fixed for the lifetime of a run and shared by reference with
//! every transition computation.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Raw narrative parameters as supplied by configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NarrativeParams {
    /// Base contagion rate β₀
    pub baseline_transmission: f64,
    /// Emotional amplification Emo
    pub emotional_intensity: f64,
    /// Identity relevance Idw
    pub identity_weight: f64,
    /// Fraction of the population seeded at t = 0 (p₀)
    pub initial_seeding: f64,
}

impl Default for NarrativeParams {
    fn default() -> Self {
        Self {
            baseline_transmission: 0.45,
            emotional_intensity: 0.70,
            identity_weight: 0.75,
            initial_seeding: 0.06,
        }
    }
}

/// Validated, immutable narrative
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Narrative {
    baseline_transmission: f64,
    emotional_intensity: f64,
    identity_weight: f64,
    initial_seeding: f64,
}

impl Narrative {
    pub fn new(params: NarrativeParams) -> Result<Self> {
        for (field, value) in [
            ("baseline_transmission", params.baseline_transmission),
            ("emotional_intensity", params.emotional_intensity),
            ("identity_weight", params.identity_weight),
            ("initial_seeding", params.initial_seeding),
        ] {
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidNarrativeParameter { field, value });
            }
        }

        Ok(Self {
            baseline_transmission: params.baseline_transmission,
            emotional_intensity: params.emotional_intensity,
            identity_weight: params.identity_weight,
            initial_seeding: params.initial_seeding,
        })
    }

    pub fn baseline_transmission(&self) -> f64 {
        self.baseline_transmission
    }

    pub fn emotional_intensity(&self) -> f64 {
        self.emotional_intensity
    }

    pub fn identity_weight(&self) -> f64 {
        self.identity_weight
    }

    pub fn initial_seeding(&self) -> f64 {
        self.initial_seeding
    }

    /// β_eff = β₀ × (1 + Emo)
    pub fn effective_transmission(&self) -> f64 {
        self.baseline_transmission * (1.0 + self.emotional_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_transmission() {
        let narrative = Narrative::new(NarrativeParams::default()).unwrap();
        assert!((narrative.effective_transmission() - 0.765).abs() < 1e-12);
    }

    #[test]
    fn test_effective_transmission_can_exceed_one() {
        let narrative = Narrative::new(NarrativeParams {
            baseline_transmission: 1.0,
            emotional_intensity: 1.0,
            identity_weight: 0.0,
            initial_seeding: 0.0,
        })
        .unwrap();
        assert_eq!(narrative.effective_transmission(), 2.0);
    }

    #[test]
    fn test_rejects_out_of_range_field() {
        let params = NarrativeParams {
            emotional_intensity: 1.01,
            ..Default::default()
        };
        match Narrative::new(params) {
            Err(SimError::InvalidNarrativeParameter { field, value }) => {
                assert_eq!(field, "emotional_intensity");
                assert_eq!(value, 1.01);
            }
            other => panic!("expected InvalidNarrativeParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_nan() {
        let params = NarrativeParams {
            initial_seeding: f64::NAN,
            ..Default::default()
        };
        assert!(Narrative::new(params).is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let params = NarrativeParams {
            baseline_transmission: 0.0,
            emotional_intensity: 1.0,
            identity_weight: 0.0,
            initial_seeding: 1.0,
        };
        assert!(Narrative::new(params).is_ok());
    }
}
