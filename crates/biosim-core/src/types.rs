//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-indexed `(row, col)` position on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`. Returns `None` when the step would leave
    /// the 1-indexed coordinate space.
    pub fn step(&self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.to_delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row == 0 || col == 0 {
            return None;
        }
        Some(Self { row, col })
    }
}

impl From<(usize, usize)> for Location {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Migration direction. Rows grow southwards, columns eastwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// `(row, col)` offset
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// The two animal species living on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn all() -> [Species; 2] {
        [Species::Herbivore, Species::Carnivore]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "herbivore" => Ok(Species::Herbivore),
            "carnivore" => Ok(Species::Carnivore),
            _ => Err(Error::UnknownSpecies(s.to_string())),
        }
    }
}

/// Landscape type of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Desert,
    Highland,
    Lowland,
}

impl Terrain {
    /// Parse a map character. Lowercase codes are accepted.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'W' => Some(Terrain::Water),
            'D' => Some(Terrain::Desert),
            'H' => Some(Terrain::Highland),
            'L' => Some(Terrain::Lowland),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Water => "water",
            Terrain::Desert => "desert",
            Terrain::Highland => "highland",
            Terrain::Lowland => "lowland",
        }
    }

    /// Whether animals may live in or migrate into this terrain
    pub fn is_habitable(&self) -> bool {
        !matches!(self, Terrain::Water)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either a full name (`"lowland"`) or a single map code (`"L"`).
impl FromStr for Terrain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return Terrain::from_code(code).ok_or_else(|| Error::UnknownTerrain(s.to_string()));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "water" => Ok(Terrain::Water),
            "desert" => Ok(Terrain::Desert),
            "highland" => Ok(Terrain::Highland),
            "lowland" => Ok(Terrain::Lowland),
            _ => Err(Error::UnknownTerrain(s.to_string())),
        }
    }
}

/// One animal in a population seed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSeed {
    pub species: String,
    pub age: u32,
    pub weight: f64,
}

impl AnimalSeed {
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species: species.name().to_string(),
            age,
            weight,
        }
    }

    /// Resolve the species name and check the weight.
    pub fn validate(&self) -> Result<Species, Error> {
        let species = self.species.parse::<Species>()?;
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(Error::InvalidAnimal(format!(
                "{} weight must be positive, got {}",
                species, self.weight
            )));
        }
        Ok(species)
    }
}

/// A batch of animals to place in one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSeed {
    pub loc: (usize, usize),
    pub pop: Vec<AnimalSeed>,
}

impl PopulationSeed {
    pub fn location(&self) -> Location {
        Location::from(self.loc)
    }
}

/// Animal counts per species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCount {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCount {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}
