//! Aggregate snapshots of the island handed to plotting and reporting code.

use crate::animal::Animal;
use biosim_core::{PopulationStats, Species};
use serde::{Deserialize, Serialize};

/// Per-cell animal counts, one row-major grid per species
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub herbivores: Vec<Vec<usize>>,
    pub carnivores: Vec<Vec<usize>>,
}

impl Distribution {
    pub fn get(&self, species: Species) -> &[Vec<usize>] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }
}

/// Animal attribute that can be histogrammed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Weight,
    Fitness,
    Age,
}

/// Attribute values of every animal of one species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSamples {
    pub weight: Vec<f64>,
    pub fitness: Vec<f64>,
    pub age: Vec<u32>,
}

impl SpeciesSamples {
    pub fn push(&mut self, animal: &Animal) {
        self.weight.push(animal.weight());
        self.fitness.push(animal.fitness());
        self.age.push(animal.age());
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    pub fn values(&self, attribute: Attribute) -> Vec<f64> {
        match attribute {
            Attribute::Weight => self.weight.clone(),
            Attribute::Fitness => self.fitness.clone(),
            Attribute::Age => self.age.iter().map(|&age| age as f64).collect(),
        }
    }

    /// Histogram one attribute
    pub fn bin_counts(&self, attribute: Attribute, spec: &HistogramSpec) -> Vec<usize> {
        spec.bin_counts(self.values(attribute))
    }
}

/// Attribute samples for both species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSamples {
    pub herbivores: SpeciesSamples,
    pub carnivores: SpeciesSamples,
}

impl AttributeSamples {
    pub fn get(&self, species: Species) -> &SpeciesSamples {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub fn get_mut(&mut self, species: Species) -> &mut SpeciesSamples {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }
}

/// Histogram range `[0, max)` split into bins of width `delta`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub max: f64,
    pub delta: f64,
}

impl HistogramSpec {
    pub const MAX_BINS: usize = 1 << 20;

    pub fn new(max: f64, delta: f64) -> Self {
        Self { max, delta }
    }

    /// Number of bins, or 0 when `max` or `delta` is not a positive finite
    /// number or the range would need more than [`HistogramSpec::MAX_BINS`]
    pub fn num_bins(&self) -> usize {
        let valid = |x: f64| x.is_finite() && x > 0.0;
        if !valid(self.max) || !valid(self.delta) {
            return 0;
        }
        let bins = (self.max / self.delta).ceil();
        if !bins.is_finite() || bins > Self::MAX_BINS as f64 {
            return 0;
        }
        bins as usize
    }

    /// Count samples per bin. Samples at or above `max` go in the last bin;
    /// negative and NaN samples are skipped.
    pub fn bin_counts(&self, samples: impl IntoIterator<Item = f64>) -> Vec<usize> {
        let num_bins = self.num_bins();
        let mut counts = vec![0; num_bins];
        if num_bins == 0 {
            return counts;
        }

        for value in samples {
            if value.is_nan() || value < 0.0 {
                continue;
            }
            let bin = ((value / self.delta) as usize).min(num_bins - 1);
            counts[bin] += 1;
        }
        counts
    }
}

/// Births, deaths and moves during one simulated year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEvents {
    pub births: usize,
    pub deaths: usize,
    pub eaten: usize,
    pub migrations: usize,
}

/// State of the island at the end of one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub year: u32,
    pub herbivores: PopulationStats,
    pub carnivores: PopulationStats,
    pub events: YearEvents,
}

impl YearStats {
    pub fn total_animals(&self) -> usize {
        self.herbivores.count + self.carnivores.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::SpeciesParams;

    #[test]
    fn test_histogram_bins() {
        let spec = HistogramSpec::new(10.0, 2.0);
        assert_eq!(spec.num_bins(), 5);

        let counts = spec.bin_counts([0.0, 1.9, 2.0, 5.5, 9.99, 10.0, 42.0, -1.0, f64::NAN]);
        assert_eq!(counts, vec![2, 1, 1, 0, 3]);
    }

    #[test]
    fn test_histogram_partial_last_bin() {
        let spec = HistogramSpec::new(1.0, 0.3);
        assert_eq!(spec.num_bins(), 4);
        assert_eq!(spec.bin_counts([0.95]), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_degenerate_histogram() {
        let spec = HistogramSpec::new(10.0, 0.0);
        assert!(spec.bin_counts([1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_unbounded_histogram_is_empty() {
        for spec in [
            HistogramSpec::new(f64::INFINITY, 1.0),
            HistogramSpec::new(10.0, f64::NAN),
            HistogramSpec::new(10.0, 1.0e-300),
            HistogramSpec::new(1.0e300, 1.0),
        ] {
            assert_eq!(spec.num_bins(), 0, "{spec:?}");
            assert!(spec.bin_counts([1.0, 5.0]).is_empty());
        }
        assert_eq!(
            HistogramSpec::new(HistogramSpec::MAX_BINS as f64, 1.0).num_bins(),
            HistogramSpec::MAX_BINS
        );
    }

    #[test]
    fn test_species_samples() {
        let params = SpeciesParams::herbivore();
        let mut samples = SpeciesSamples::default();
        samples.push(&Animal::new(Species::Herbivore, 3, 12.0, &params));
        samples.push(&Animal::new(Species::Herbivore, 7, 30.0, &params));

        assert_eq!(samples.len(), 2);
        assert_eq!(samples.values(Attribute::Age), vec![3.0, 7.0]);
        assert_eq!(
            samples.bin_counts(Attribute::Weight, &HistogramSpec::new(40.0, 10.0)),
            vec![0, 1, 0, 1]
        );
    }
}
