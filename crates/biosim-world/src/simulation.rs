//! Simulation driver: owns the island, the random source and the yearly history.

use crate::island::Island;
use crate::stats::{AttributeSamples, Distribution, YearEvents, YearStats};
use biosim_core::{
    ParamChanges, Params, PopulationSeed, Result, SimulationConfig, Species, SpeciesCount,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

pub struct Simulation {
    island: Island,
    rng: ChaCha8Rng,
    config: SimulationConfig,
    year: u32,
    history: Vec<YearStats>,
    // Totals over the whole run, for the summary
    total_births: usize,
    total_deaths: usize,
    total_eaten: usize,
}

impl Simulation {
    /// Build the island described by `config`: parameter overrides first,
    /// then the initial population.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut island = Island::with_params(&config.island_map, Params::default())?;

        for (species, changes) in &config.animal_params {
            island.change_animalparams(species, changes)?;
        }
        island.change_landscape_batch(&config.landscape_params)?;
        island.add_population(&config.ini_pop)?;

        let count = island.species_count();
        info!(
            event = "simulation_created",
            seed = config.seed,
            rows = island.grid().rows(),
            cols = island.grid().cols(),
            herbivores = count.herbivores,
            carnivores = count.carnivores,
            "Simulation initialised"
        );

        Ok(Self {
            island,
            rng,
            config,
            year: 0,
            history: Vec::new(),
            total_births: 0,
            total_deaths: 0,
            total_eaten: 0,
        })
    }

    /// Run the number of years configured in `num_years`
    #[instrument(skip(self), fields(num_years = self.config.num_years))]
    pub fn run(&mut self) -> SimulationResult {
        info!("Starting simulation for {} years", self.config.num_years);
        self.simulate(self.config.num_years);
        self.emit_run_summary();
        self.collect_results()
    }

    /// Simulate `num_years` more years. Zero is a no-op.
    #[instrument(skip(self), fields(start_year = self.year))]
    pub fn simulate(&mut self, num_years: u32) {
        for _ in 0..num_years {
            self.step();
        }
    }

    fn step(&mut self) {
        let events = self.island.sim_year(&mut self.rng);
        self.year += 1;

        self.total_births += events.births;
        self.total_deaths += events.deaths;
        self.total_eaten += events.eaten;

        let stats = self.year_stats(events);
        debug!(
            year = self.year,
            herbivores = stats.herbivores.count,
            carnivores = stats.carnivores.count,
            births = events.births,
            deaths = events.deaths,
            eaten = events.eaten,
            migrations = events.migrations,
            "Year complete"
        );
        self.history.push(stats);

        let interval = self.config.log_interval;
        if interval > 0 && self.year % interval == 0 {
            self.emit_population_metrics();
        }
    }

    fn year_stats(&self, events: YearEvents) -> YearStats {
        YearStats {
            year: self.year,
            herbivores: self.island.population_stats(Species::Herbivore),
            carnivores: self.island.population_stats(Species::Carnivore),
            events,
        }
    }

    fn emit_population_metrics(&self) {
        let Some(stats) = self.history.last() else {
            return;
        };

        info!(
            event = "population_metrics",
            year = self.year,
            total_population = stats.total_animals(),
            herbivores = stats.herbivores.count,
            carnivores = stats.carnivores.count,
            herbivore_mean_weight = format!("{:.2}", stats.herbivores.mean_weight),
            carnivore_mean_weight = format!("{:.2}", stats.carnivores.mean_weight),
            herbivore_mean_fitness = format!("{:.3}", stats.herbivores.mean_fitness),
            carnivore_mean_fitness = format!("{:.3}", stats.carnivores.mean_fitness),
            "Population snapshot"
        );
    }

    fn emit_run_summary(&self) {
        let count = self.island.species_count();
        info!(
            event = "run_summary",
            final_year = self.year,
            total_population = count.total(),
            herbivores = count.herbivores,
            carnivores = count.carnivores,
            total_births = self.total_births,
            total_deaths = self.total_deaths,
            total_eaten = self.total_eaten,
            "Simulation complete"
        );
    }

    fn collect_results(&self) -> SimulationResult {
        SimulationResult {
            final_year: self.year,
            final_count: self.island.species_count(),
            history: self.history.clone(),
        }
    }

    /// Years simulated so far
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn num_animals(&self) -> usize {
        self.island.animal_count()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCount {
        self.island.species_count()
    }

    pub fn distribution(&self) -> Distribution {
        self.island.distribution()
    }

    pub fn attribute_samples(&self) -> AttributeSamples {
        self.island.attribute_samples()
    }

    /// One record per simulated year, oldest first
    pub fn history(&self) -> &[YearStats] {
        &self.history
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_animal_parameters(&mut self, species: &str, changes: &ParamChanges) -> Result<()> {
        self.island.change_animalparams(species, changes)
    }

    pub fn set_landscape_parameters(&mut self, terrain: &str, changes: &ParamChanges) -> Result<()> {
        self.island.change_landscapeparams(terrain, changes)
    }

    pub fn add_population(&mut self, population: &[PopulationSeed]) -> Result<()> {
        self.island.add_population(population)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub final_year: u32,
    pub final_count: SpeciesCount,
    pub history: Vec<YearStats>,
}
