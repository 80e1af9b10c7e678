//! A single island cell: terrain, yearly food budget and two populations.

use crate::animal::Animal;
use biosim_core::{
    AnimalSeed, Error, LandscapeParams, Location, ParamChanges, Params, Result, Species,
    SpeciesParams, Terrain,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a cell needs to know about an adjacent cell to send migrants there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub location: Location,
    pub habitable: bool,
}

impl Neighbor {
    pub fn of(cell: &Cell) -> Self {
        Self {
            location: cell.location(),
            habitable: cell.is_habitable(),
        }
    }
}

/// An animal that has left its cell and must be placed at `destination`
#[derive(Debug, Clone, PartialEq)]
pub struct Emigrant {
    pub destination: Location,
    pub animal: Animal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    location: Location,
    terrain: Terrain,
    fodder: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(location: Location, terrain: Terrain, landscape: &LandscapeParams) -> Self {
        Self {
            location,
            terrain,
            fodder: landscape.f_max(terrain),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn is_habitable(&self) -> bool {
        self.terrain.is_habitable()
    }

    /// Food left this year
    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn population(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn count(&self, species: Species) -> usize {
        self.population(species).len()
    }

    pub fn animal_count(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    /// Place seeded animals in this cell. The whole batch is checked first;
    /// on error nothing is added.
    pub fn add_population(&mut self, pop: &[AnimalSeed], params: &Params) -> Result<()> {
        if pop.is_empty() {
            return Ok(());
        }
        if !self.is_habitable() {
            return Err(Error::Uninhabitable(self.location));
        }

        let species = pop
            .iter()
            .map(AnimalSeed::validate)
            .collect::<Result<Vec<_>>>()?;

        for (seed, species) in pop.iter().zip(species) {
            let animal = Animal::new(species, seed.age, seed.weight, params.species(species));
            self.population_mut(species).push(animal);
        }

        trace!(
            location = %self.location,
            added = pop.len(),
            herbivores = self.herbivores.len(),
            carnivores = self.carnivores.len(),
            "Population added"
        );
        Ok(())
    }

    /// Receive an animal arriving from a neighbouring cell
    pub fn immigrate(&mut self, animal: Animal) {
        self.population_mut(animal.species()).push(animal);
    }

    /// Reset the food budget to the terrain's capacity
    pub fn update_fodder(&mut self, landscape: &LandscapeParams) {
        self.fodder = landscape.f_max(self.terrain);
    }

    /// Cut the food left this year down to the terrain's capacity
    pub fn cap_fodder(&mut self, landscape: &LandscapeParams) {
        self.fodder = self.fodder.min(landscape.f_max(self.terrain));
    }

    /// Feeding phase. Herbivores graze in random order until the food runs
    /// out, then carnivores hunt the herbivores, fittest predator first.
    /// Returns the number of herbivores eaten.
    pub fn grazing<R: Rng + ?Sized>(&mut self, params: &Params, rng: &mut R) -> usize {
        self.herbivores.shuffle(rng);
        for herbivore in &mut self.herbivores {
            if self.fodder <= 0.0 {
                break;
            }
            self.fodder = herbivore.feed(self.fodder, &params.herbivore);
        }

        let herbivores_before = self.herbivores.len();
        self.carnivores
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        for carnivore in &mut self.carnivores {
            if self.herbivores.is_empty() {
                break;
            }
            let mut prey = std::mem::take(&mut self.herbivores);
            prey.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
            self.herbivores = carnivore.hunt(prey, &params.carnivore, rng);
        }

        herbivores_before - self.herbivores.len()
    }

    /// Breeding phase. Every animal gets one chance to give birth, judged
    /// against the population before any newborns arrive. Returns the
    /// number of newborns.
    pub fn breeding<R: Rng + ?Sized>(&mut self, params: &Params, rng: &mut R) -> usize {
        let mut births = 0;

        for species in Species::all() {
            let species_params = params.species(species);
            let population = self.population_mut(species);
            let n = population.len();

            let newborns: Vec<Animal> = population
                .iter_mut()
                .filter_map(|mother| mother.birth(n, species_params, rng))
                .collect();

            births += newborns.len();
            population.extend(newborns);
        }

        births
    }

    /// Migration phase for this cell.
    ///
    /// Animals are visited from the back of each population. Every animal
    /// that decides to move picks one of `neighbors` at random; if that cell
    /// is habitable the animal leaves and is returned as an [`Emigrant`],
    /// otherwise it stays put for the rest of the year.
    pub fn migration<R: Rng + ?Sized>(
        &mut self,
        neighbors: &[Neighbor],
        params: &Params,
        rng: &mut R,
    ) -> Vec<Emigrant> {
        let mut emigrants = Vec::new();
        if neighbors.is_empty() {
            return emigrants;
        }

        for species in Species::all() {
            let species_params = params.species(species);
            let population = std::mem::take(self.population_mut(species));
            let mut staying = Vec::with_capacity(population.len());

            for mut animal in population.into_iter().rev() {
                if !animal.migration(species_params, rng) {
                    staying.push(animal);
                    continue;
                }

                animal.mark_migrated();
                match neighbors.choose(rng) {
                    Some(neighbor) if neighbor.habitable => emigrants.push(Emigrant {
                        destination: neighbor.location,
                        animal,
                    }),
                    _ => staying.push(animal),
                }
            }

            staying.reverse();
            *self.population_mut(species) = staying;
        }

        emigrants
    }

    /// Aging phase
    pub fn aging(&mut self, params: &Params) {
        for animal in &mut self.herbivores {
            animal.aging(&params.herbivore);
        }
        for animal in &mut self.carnivores {
            animal.aging(&params.carnivore);
        }
    }

    /// Death phase. Returns the number of animals removed.
    pub fn remove_population<R: Rng + ?Sized>(&mut self, params: &Params, rng: &mut R) -> usize {
        let before = self.animal_count();

        for species in Species::all() {
            let species_params = params.species(species);
            self.population_mut(species)
                .retain(|animal| !animal.death(species_params, rng));
        }

        before - self.animal_count()
    }

    /// Recompute the fitness of one population after its parameters changed
    pub fn refresh_fitness(&mut self, species: Species, params: &SpeciesParams) {
        for animal in self.population_mut(species) {
            animal.refresh_fitness(params);
        }
    }

    /// Update the parameters of the species named `species`
    pub fn change_animalparams(
        params: &mut Params,
        species: &str,
        changes: &ParamChanges,
    ) -> Result<Species> {
        let species = species.parse::<Species>()?;
        params.update_species(species, changes)?;
        Ok(species)
    }

    /// Update the parameters of the terrain named `terrain`
    pub fn update_params(
        params: &mut Params,
        terrain: &str,
        changes: &ParamChanges,
    ) -> Result<Terrain> {
        let terrain = terrain.parse::<Terrain>()?;
        params.update_terrain(terrain, changes)?;
        Ok(terrain)
    }
}
