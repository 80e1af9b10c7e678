//! Fitness function and population statistics.

use crate::config::SpeciesParams;
use serde::{Deserialize, Serialize};

/// Decreasing logistic curve, `1 / (1 + e^x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + x.exp())
}

/// Double-logistic fitness of an animal with the given age and weight.
///
/// Zero for non-positive weight, otherwise the product of an age term that
/// falls past `a_half` and a weight term that rises past `w_half`. The result
/// always lies in `[0, 1]`.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 || weight.is_nan() {
        return 0.0;
    }

    let age_term = sigmoid(params.phi_age * (age as f64 - params.a_half));
    let weight_term = sigmoid(-params.phi_weight * (weight - params.w_half));
    (age_term * weight_term).clamp(0.0, 1.0)
}

/// Summary of one species' attributes at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub count: usize,
    pub mean_age: f64,
    pub mean_weight: f64,
    pub mean_fitness: f64,
    pub max_weight: f64,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one animal into the running means
    pub fn update(&mut self, age: u32, weight: f64, fitness: f64) {
        let n = self.count as f64;
        let new_n = n + 1.0;

        self.mean_age = (self.mean_age * n + age as f64) / new_n;
        self.mean_weight = (self.mean_weight * n + weight) / new_n;
        self.mean_fitness = (self.mean_fitness * n + fitness) / new_n;
        if self.count == 0 || weight > self.max_weight {
            self.max_weight = weight;
        }

        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(50.0) < 1e-20);
        assert!((sigmoid(-50.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_herbivore_fitness_formula() {
        let params = SpeciesParams::herbivore();
        let expected = (1.0 / (1.0 + (0.6f64 * (5.0 - 40.0)).exp()))
            * (1.0 / (1.0 + (-0.1f64 * (20.0 - 10.0)).exp()));
        assert!((fitness(5, 20.0, &params) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_carnivore_fitness_formula() {
        let params = SpeciesParams::carnivore();
        let expected = (1.0 / (1.0 + (0.3f64 * (10.0 - 40.0)).exp()))
            * (1.0 / (1.0 + (-0.4f64 * (30.0 - 4.0)).exp()));
        assert!((fitness(10, 30.0, &params) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_fitness_zero_weight() {
        let params = SpeciesParams::herbivore();
        assert_eq!(fitness(3, 0.0, &params), 0.0);
        assert_eq!(fitness(3, -4.0, &params), 0.0);
    }

    #[test]
    fn test_population_stats_update() {
        let mut stats = PopulationStats::new();
        stats.update(2, 10.0, 0.4);
        stats.update(4, 30.0, 0.8);

        assert_eq!(stats.count, 2);
        assert!((stats.mean_age - 3.0).abs() < 1e-12);
        assert!((stats.mean_weight - 20.0).abs() < 1e-12);
        assert!((stats.mean_fitness - 0.6).abs() < 1e-12);
        assert_eq!(stats.max_weight, 30.0);
    }

    proptest! {
        #[test]
        fn prop_fitness_is_bounded(age in 0u32..500, weight in 0.0f64..1.0e6) {
            for params in [SpeciesParams::herbivore(), SpeciesParams::carnivore()] {
                let phi = fitness(age, weight, &params);
                prop_assert!((0.0..=1.0).contains(&phi));
                if weight == 0.0 {
                    prop_assert_eq!(phi, 0.0);
                }
            }
        }
    }
}
