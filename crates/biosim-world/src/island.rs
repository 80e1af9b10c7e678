//! The island: grid topology plus the parameter tables and the yearly cycle.

use crate::cell::{Cell, Emigrant};
use crate::grid::Grid;
use crate::stats::{AttributeSamples, Distribution, YearEvents};
use biosim_core::{
    Error, Location, ParamChanges, Params, PopulationSeed, PopulationStats, Result, Species,
    SpeciesCount,
};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, trace};

pub struct Island {
    grid: Grid,
    params: Params,
}

impl Island {
    /// Build an island from a map using the default parameter tables
    pub fn new(map: &str) -> Result<Self> {
        Self::with_params(map, Params::default())
    }

    pub fn with_params(map: &str, params: Params) -> Result<Self> {
        let grid = Grid::parse(map, &params.landscape)?;
        debug!(rows = grid.rows(), cols = grid.cols(), "Island created");
        Ok(Self { grid, params })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn cell(&self, loc: Location) -> Option<&Cell> {
        self.grid.get(loc)
    }

    /// Place animals at 1-indexed locations. The whole batch is validated
    /// before any animal is added.
    pub fn add_population(&mut self, population: &[PopulationSeed]) -> Result<()> {
        for seed in population {
            let location = seed.location();
            let cell = self.grid.get(location).ok_or(Error::LocationOutOfRange {
                location,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })?;
            if !seed.pop.is_empty() && !cell.is_habitable() {
                return Err(Error::Uninhabitable(location));
            }
            for animal in &seed.pop {
                animal.validate()?;
            }
        }

        for seed in population {
            if let Some(cell) = self.grid.get_mut(seed.location()) {
                cell.add_population(&seed.pop, &self.params)?;
            }
        }

        debug!(
            batches = population.len(),
            total_animals = self.animal_count(),
            "Population seeded"
        );
        Ok(())
    }

    /// Simulate one year: food regrowth, feeding, breeding, migration, aging
    /// and death, each phase run over every cell before the next begins.
    pub fn sim_year<R: Rng + ?Sized>(&mut self, rng: &mut R) -> YearEvents {
        let mut events = YearEvents::default();

        for cell in self.grid.cells_mut() {
            cell.update_fodder(&self.params.landscape);
        }
        for cell in self.grid.cells_mut() {
            events.eaten += cell.grazing(&self.params, rng);
        }
        for cell in self.grid.cells_mut() {
            events.births += cell.breeding(&self.params, rng);
        }
        events.migrations = self.migration(rng);
        for cell in self.grid.cells_mut() {
            cell.aging(&self.params);
        }
        for cell in self.grid.cells_mut() {
            events.deaths += cell.remove_population(&self.params, rng);
        }

        trace!(?events, "Year simulated");
        events
    }

    /// Grid-wide migration pass in row-major order. Migrants are placed in
    /// their destination before the next cell is processed; their migrated
    /// flag keeps them from moving again this year.
    pub fn migration<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut moved = 0;

        for index in 0..self.grid.len() {
            let location = self.grid.index_to_loc(index);
            let neighbors = match self.grid.get(location) {
                Some(cell) if cell.animal_count() > 0 => self.grid.neighbors(location),
                _ => continue,
            };

            let emigrants = match self.grid.get_mut(location) {
                Some(cell) => cell.migration(&neighbors, &self.params, rng),
                None => continue,
            };

            for Emigrant { destination, animal } in emigrants {
                let target = if self.grid.contains(destination) {
                    destination
                } else {
                    location
                };
                if let Some(cell) = self.grid.get_mut(target) {
                    cell.immigrate(animal);
                    if target != location {
                        moved += 1;
                    }
                }
            }
        }

        moved
    }

    pub fn species_count(&self) -> SpeciesCount {
        self.grid
            .cells()
            .fold(SpeciesCount::default(), |mut count, cell| {
                count.herbivores += cell.count(Species::Herbivore);
                count.carnivores += cell.count(Species::Carnivore);
                count
            })
    }

    pub fn animal_count(&self) -> usize {
        self.grid.cells().map(Cell::animal_count).sum()
    }

    /// Per-cell counts laid out like the map
    pub fn distribution(&self) -> Distribution {
        let per_species = |species: Species| {
            self.grid
                .iter_rows()
                .map(|row| row.iter().map(|cell| cell.count(species)).collect())
                .collect()
        };

        Distribution {
            herbivores: per_species(Species::Herbivore),
            carnivores: per_species(Species::Carnivore),
        }
    }

    /// Weight, fitness and age of every animal, for histograms
    pub fn attribute_samples(&self) -> AttributeSamples {
        let mut samples = AttributeSamples::default();
        for cell in self.grid.cells() {
            for species in Species::all() {
                let target = samples.get_mut(species);
                for animal in cell.population(species) {
                    target.push(animal);
                }
            }
        }
        samples
    }

    pub fn population_stats(&self, species: Species) -> PopulationStats {
        let mut stats = PopulationStats::new();
        for animal in self.grid.cells().flat_map(|cell| cell.population(species)) {
            stats.update(animal.age(), animal.weight(), animal.fitness());
        }
        stats
    }

    /// Update the parameters of one species. Fitness of every living animal
    /// of that species is recomputed under the new parameters.
    pub fn change_animalparams(&mut self, species: &str, changes: &ParamChanges) -> Result<()> {
        let species = Cell::change_animalparams(&mut self.params, species, changes)?;

        let species_params = self.params.species(species);
        for cell in self.grid.cells_mut() {
            cell.refresh_fitness(species, species_params);
        }
        Ok(())
    }

    /// Update the food capacity of lowland or highland. Food left this year
    /// is cut down to a lowered capacity at once; a raised capacity is
    /// reached at the next yearly food reset.
    pub fn change_landscapeparams(&mut self, terrain: &str, changes: &ParamChanges) -> Result<()> {
        Cell::update_params(&mut self.params, terrain, changes)?;
        self.cap_fodder();
        Ok(())
    }

    /// Apply several terrain updates as one change, keyed by terrain name
    /// or code
    pub fn change_landscape_batch(
        &mut self,
        overrides: &BTreeMap<String, ParamChanges>,
    ) -> Result<()> {
        self.params.update_landscape(overrides)?;
        self.cap_fodder();
        Ok(())
    }

    fn cap_fodder(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.cap_fodder(&self.params.landscape);
        }
    }
}
