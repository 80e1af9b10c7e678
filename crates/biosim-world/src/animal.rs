//! Animal state and lifecycle rules.

use biosim_core::{fitness, Species, SpeciesParams};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// True with probability `p`. Values of `p` outside `[0, 1]` saturate.
fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// An animal on the island.
///
/// Fitness is cached and refreshed whenever age or weight change, so it is
/// always consistent with the parameters passed to the last mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    migrated: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: fitness(age, weight, params),
            migrated: false,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn has_migrated(&self) -> bool {
        self.migrated
    }

    /// Recompute fitness from the current age and weight
    pub fn refresh_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = fitness(self.age, self.weight, params);
    }

    /// Graze from a food source holding `available_food`. Eats at most the
    /// appetite `F` and returns what is left in the source.
    pub fn feed(&mut self, available_food: f64, params: &SpeciesParams) -> f64 {
        let available = available_food.max(0.0);
        let eaten = params.f.min(available);

        self.weight += params.beta * eaten;
        self.refresh_fitness(params);

        available - eaten
    }

    /// Hunt through `prey`, which must be ordered by ascending fitness.
    ///
    /// Each candidate is attacked at most once. Hunting ends once the eaten
    /// prey weight reaches the appetite `F`. Returns the prey that survived,
    /// in their original order. The predator's fitness is refreshed once
    /// after the hunt, so every kill chance uses its pre-hunt fitness.
    pub fn hunt<R: Rng + ?Sized>(
        &mut self,
        prey: Vec<Animal>,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Vec<Animal> {
        let delta_phi_max = params.delta_phi_max.unwrap_or(f64::INFINITY);
        let mut eaten = 0.0;
        let mut survivors = Vec::with_capacity(prey.len());

        for candidate in prey {
            if eaten >= params.f {
                survivors.push(candidate);
                continue;
            }

            let probability = self.kill_probability(candidate.fitness, delta_phi_max);
            if bernoulli(rng, probability) {
                eaten += candidate.weight;
                self.weight += params.beta * candidate.weight;
            } else {
                survivors.push(candidate);
            }
        }

        if eaten > 0.0 {
            self.refresh_fitness(params);
        }

        survivors
    }

    fn kill_probability(&self, prey_fitness: f64, delta_phi_max: f64) -> f64 {
        let gap = self.fitness - prey_fitness;
        if gap <= 0.0 {
            0.0
        } else if gap > delta_phi_max {
            1.0
        } else {
            gap / delta_phi_max
        }
    }

    /// Try to give birth in a cell holding `n_same_species` animals of this
    /// species, this one included.
    ///
    /// On success the mother loses `xi` times the newborn's weight and her
    /// fitness is refreshed immediately.
    pub fn birth<R: Rng + ?Sized>(
        &mut self,
        n_same_species: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        if n_same_species < 2 || self.weight <= params.birth_weight_threshold() {
            return None;
        }

        let probability =
            (params.gamma * self.fitness * (n_same_species - 1) as f64).min(1.0);
        if !bernoulli(rng, probability) {
            return None;
        }

        let distribution = Normal::new(params.w_birth, params.sigma_birth).ok()?;
        let newborn_weight = distribution.sample(rng);
        let cost = params.xi * newborn_weight;
        if newborn_weight <= 0.0 || cost > self.weight {
            return None;
        }

        self.weight -= cost;
        self.refresh_fitness(params);

        Some(Animal::new(self.species, 0, newborn_weight, params))
    }

    /// Whether the animal dies this year
    pub fn death<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        bernoulli(rng, params.omega * (1.0 - self.fitness))
    }

    /// Whether the animal wants to leave its cell. Always false once it has
    /// migrated this year.
    pub fn migration<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.migrated {
            return false;
        }
        bernoulli(rng, params.mu * self.fitness)
    }

    pub fn mark_migrated(&mut self) {
        self.migrated = true;
    }

    /// Yearly aging: one year older, `eta` of the weight lost, migration
    /// allowed again.
    pub fn aging(&mut self, params: &SpeciesParams) {
        self.age = self.age.saturating_add(1);
        self.weight -= params.eta * self.weight;
        self.refresh_fitness(params);
        self.migrated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::sigmoid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-9;

    fn herbivore(age: u32, weight: f64) -> Animal {
        Animal::new(Species::Herbivore, age, weight, &SpeciesParams::herbivore())
    }

    fn carnivore(age: u32, weight: f64, params: &SpeciesParams) -> Animal {
        Animal::new(Species::Carnivore, age, weight, params)
    }

    #[test]
    fn test_animal_creation() {
        let animal = herbivore(5, 20.0);
        let expected = sigmoid(0.6 * (5.0 - 40.0)) * sigmoid(-0.1 * (20.0 - 10.0));

        assert_eq!(animal.species(), Species::Herbivore);
        assert_eq!(animal.age(), 5);
        assert_eq!(animal.weight(), 20.0);
        assert!((animal.fitness() - expected).abs() < EPS);
        assert!(!animal.has_migrated());
    }

    #[test]
    fn test_zero_weight_has_zero_fitness_and_dies() {
        let params = SpeciesParams::carnivore();
        let animal = carnivore(100, 0.0, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(animal.fitness(), 0.0);
        assert!(animal.death(&params, &mut rng));
    }

    #[test]
    fn test_herbivore_feeding() {
        let params = SpeciesParams::herbivore();
        let mut animal = herbivore(5, 20.0);
        let before = animal.fitness();

        let left = animal.feed(2000.0, &params);

        assert!((animal.weight() - 29.0).abs() < EPS);
        assert!((left - 1990.0).abs() < EPS);
        assert!(animal.fitness() > before);
    }

    #[test]
    fn test_herbivore_feeding_scarce_food() {
        let params = SpeciesParams::herbivore();
        let mut animal = herbivore(5, 20.0);

        let left = animal.feed(4.0, &params);
        assert_eq!(left, 0.0);
        assert!((animal.weight() - (20.0 + 0.9 * 4.0)).abs() < EPS);

        let left = animal.feed(-3.0, &params);
        assert_eq!(left, 0.0);
        assert!((animal.weight() - (20.0 + 0.9 * 4.0)).abs() < EPS);
    }

    #[test]
    fn test_carnivore_hunting() {
        let mut params = SpeciesParams::carnivore();
        params.delta_phi_max = Some(0.1);
        let mut predator = carnivore(2, 50.0, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // Old and light: far less fit than the predator, always caught
        let weak = herbivore(300, 10.0);
        // Young and heavy: fitter than the predator, never caught
        let strong = herbivore(1, 500.0);
        assert!(predator.fitness() - weak.fitness() > 0.1);
        assert!(strong.fitness() >= predator.fitness());

        let survivors = predator.hunt(vec![weak, strong.clone()], &params, &mut rng);

        assert_eq!(survivors, vec![strong]);
        assert!((predator.weight() - (50.0 + 0.75 * 10.0)).abs() < EPS);
    }

    #[test]
    fn test_hunting_stops_at_appetite() {
        let mut params = SpeciesParams::carnivore();
        params.delta_phi_max = Some(0.01);
        params.f = 25.0;
        let mut predator = carnivore(5, 40.0, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let prey: Vec<Animal> = (0..5).map(|_| herbivore(200, 15.0)).collect();
        let survivors = predator.hunt(prey, &params, &mut rng);

        // Two kills reach 30 >= 25, the remaining three are left alone
        assert_eq!(survivors.len(), 3);
        assert!((predator.weight() - (40.0 + 0.75 * 30.0)).abs() < EPS);
    }

    #[test]
    fn test_kill_probability() {
        let params = SpeciesParams::carnivore();
        let predator = carnivore(5, 40.0, &params);
        let phi = predator.fitness();
        assert!(phi > 0.9);

        // Prey at least as fit is never caught
        assert_eq!(predator.kill_probability(phi, 0.5), 0.0);
        assert_eq!(predator.kill_probability(phi + 0.1, 0.5), 0.0);

        // Gap below DeltaPhiMax scales linearly
        assert!((predator.kill_probability(phi - 0.2, 0.5) - 0.4).abs() < EPS);
        assert!((predator.kill_probability(phi - 0.05, 0.5) - 0.1).abs() < EPS);

        // Gap beyond DeltaPhiMax is a certain kill
        assert_eq!(predator.kill_probability(phi - 0.6, 0.5), 1.0);
        assert_eq!(predator.kill_probability(0.0, 0.01), 1.0);
    }

    #[test]
    fn test_predation_conserves_weight() {
        let mut params = SpeciesParams::carnivore();
        params.beta = 1.0;
        params.delta_phi_max = Some(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for round in 0..50u32 {
            let mut predator = carnivore(3, 35.0, &params);
            let mut prey: Vec<Animal> = (0..8)
                .map(|i| herbivore(round % 60 + i * 7, 5.0 + (i as f64) * 3.0))
                .collect();
            prey.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

            let before = predator.weight() + prey.iter().map(Animal::weight).sum::<f64>();
            let survivors = predator.hunt(prey, &params, &mut rng);
            let after = predator.weight() + survivors.iter().map(Animal::weight).sum::<f64>();

            assert!((before - after).abs() < 1e-9);
        }
    }

    #[test]
    fn test_birth_requirements() {
        let params = SpeciesParams::herbivore();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        // Below zeta * (w_birth + sigma_birth) = 33.25
        let mut light = herbivore(5, 30.0);
        assert!(light.birth(100, &params, &mut rng).is_none());
        assert_eq!(light.weight(), 30.0);

        // Alone in the cell
        let mut lonely = herbivore(5, 80.0);
        assert!(lonely.birth(1, &params, &mut rng).is_none());
        assert_eq!(lonely.weight(), 80.0);
    }

    #[test]
    fn test_birth_conserves_weight() {
        let mut params = SpeciesParams::herbivore();
        params.gamma = 1000.0;
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut mother = herbivore(5, 100.0);

        let child = mother
            .birth(10, &params, &mut rng)
            .expect("birth is certain with a saturated probability");

        assert_eq!(child.age(), 0);
        assert_eq!(child.species(), Species::Herbivore);
        assert!(child.weight() > 0.0);
        assert!((mother.weight() - (100.0 - params.xi * child.weight())).abs() < EPS);
        assert!(
            (mother.fitness() - fitness(5, mother.weight(), &params)).abs() < EPS,
            "mother fitness refreshed after birth"
        );
    }

    #[test]
    fn test_rejected_birth_is_free() {
        let mut params = SpeciesParams::herbivore();
        params.gamma = 1000.0;
        params.xi = 1000.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut mother = herbivore(5, 100.0);
        let fitness_before = mother.fitness();

        assert!(mother.birth(10, &params, &mut rng).is_none());
        assert_eq!(mother.weight(), 100.0);
        assert_eq!(mother.fitness(), fitness_before);
    }

    #[test]
    fn test_death_probability_extremes() {
        let mut params = SpeciesParams::herbivore();
        params.omega = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let animal = herbivore(5, 20.0);

        assert!((0..100).all(|_| !animal.death(&params, &mut rng)));

        params.omega = 1.0e6;
        assert!((0..100).all(|_| animal.death(&params, &mut rng)));
    }

    #[test]
    fn test_migration_once_per_year() {
        let mut params = SpeciesParams::herbivore();
        params.mu = 1.0e6;
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut animal = herbivore(5, 20.0);

        assert!(animal.migration(&params, &mut rng));
        animal.mark_migrated();
        assert!(!animal.migration(&params, &mut rng));

        animal.aging(&params);
        assert!(!animal.has_migrated());
        assert!(animal.migration(&params, &mut rng));

        params.mu = 0.0;
        assert!(!animal.migration(&params, &mut rng));
    }

    #[test]
    fn test_aging() {
        let params = SpeciesParams::herbivore();
        let mut animal = herbivore(2, 50.0);

        animal.aging(&params);

        assert_eq!(animal.age(), 3);
        assert!((animal.weight() - (50.0 - 50.0 * 0.05)).abs() < EPS);
        assert!((animal.fitness() - fitness(3, animal.weight(), &params)).abs() < EPS);
    }

    #[test]
    fn test_animal_serialization() {
        let animal = herbivore(4, 12.5);
        let json = serde_json::to_string(&animal).unwrap();
        let restored: Animal = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, animal);
    }
}
