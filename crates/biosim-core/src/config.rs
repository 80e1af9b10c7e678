//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::{AnimalSeed, PopulationSeed, Species, Terrain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Parameter name to new value
pub type ParamChanges = BTreeMap<String, f64>;

/// Lifecycle constants shared by every animal of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of birth weight
    pub sigma_birth: f64,
    /// Weight gained per unit of food eaten
    pub beta: f64,
    /// Fraction of weight lost each year
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration propensity
    pub mu: f64,
    /// Birth rate scale
    pub gamma: f64,
    /// Minimum weight for giving birth, in units of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Weight the mother loses per unit of newborn weight
    pub xi: f64,
    /// Death rate scale
    pub omega: f64,
    /// Appetite
    #[serde(rename = "F")]
    pub f: f64,
    /// Fitness gap at which a kill becomes certain. Carnivores only.
    #[serde(rename = "DeltaPhiMax", default, skip_serializing_if = "Option::is_none")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn for_species(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Minimum weight a mother must exceed before giving birth
    pub fn birth_weight_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "w_birth" => Some(&mut self.w_birth),
            "sigma_birth" => Some(&mut self.sigma_birth),
            "beta" => Some(&mut self.beta),
            "eta" => Some(&mut self.eta),
            "a_half" => Some(&mut self.a_half),
            "phi_age" => Some(&mut self.phi_age),
            "w_half" => Some(&mut self.w_half),
            "phi_weight" => Some(&mut self.phi_weight),
            "mu" => Some(&mut self.mu),
            "gamma" => Some(&mut self.gamma),
            "zeta" => Some(&mut self.zeta),
            "xi" => Some(&mut self.xi),
            "omega" => Some(&mut self.omega),
            "F" => Some(&mut self.f),
            "DeltaPhiMax" => self.delta_phi_max.as_mut(),
            _ => None,
        }
    }

    /// Apply `changes` to this record. Every name is checked against the
    /// known fields before anything is written, so a failed update leaves the
    /// record untouched.
    pub fn update(&mut self, scope: &str, changes: &ParamChanges) -> Result<()> {
        let mut staged = self.clone();

        for (name, &value) in changes {
            let slot = staged
                .field_mut(name)
                .ok_or_else(|| Error::UnknownParameter {
                    scope: scope.to_string(),
                    name: name.clone(),
                })?;
            check_value(name, value)?;
            if name == "DeltaPhiMax" && value == 0.0 {
                return Err(Error::InvalidParameterValue {
                    name: name.clone(),
                    value,
                    reason: "must be strictly positive".to_string(),
                });
            }
            *slot = value;
        }

        debug!(scope, changes = ?changes, "Updated species parameters");
        *self = staged;
        Ok(())
    }
}

/// Constants of one food-producing terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Food available at the start of each year
    pub f_max: f64,
}

impl TerrainParams {
    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "f_max" => Some(&mut self.f_max),
            _ => None,
        }
    }
}

/// Food capacities of the configurable terrains. Water and desert never
/// produce food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    pub lowland: TerrainParams,
    pub highland: TerrainParams,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            lowland: TerrainParams { f_max: 800.0 },
            highland: TerrainParams { f_max: 300.0 },
        }
    }
}

impl LandscapeParams {
    /// Yearly food capacity of `terrain`
    pub fn f_max(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Water | Terrain::Desert => 0.0,
            Terrain::Highland => self.highland.f_max,
            Terrain::Lowland => self.lowland.f_max,
        }
    }

    /// Apply `changes` to one terrain. The result must keep lowland strictly
    /// richer than highland.
    pub fn update(&mut self, terrain: Terrain, changes: &ParamChanges) -> Result<()> {
        self.update_batch(&[(terrain, changes)])
    }

    /// Apply changes to several terrains at once. The lowland over highland
    /// ordering is checked on the combined result only, so the order of the
    /// updates does not matter. Nothing is written on error.
    pub fn update_batch(&mut self, updates: &[(Terrain, &ParamChanges)]) -> Result<()> {
        let mut staged = self.clone();

        for &(terrain, changes) in updates {
            let target = match terrain {
                Terrain::Lowland => &mut staged.lowland,
                Terrain::Highland => &mut staged.highland,
                Terrain::Water | Terrain::Desert => {
                    return Err(Error::NonConfigurableTerrain(terrain));
                }
            };

            for (name, &value) in changes {
                let slot = target
                    .field_mut(name)
                    .ok_or_else(|| Error::UnknownParameter {
                        scope: terrain.to_string(),
                        name: name.clone(),
                    })?;
                check_value(name, value)?;
                *slot = value;
            }
        }

        if staged.lowland.f_max <= staged.highland.f_max {
            return Err(Error::InvalidParameterValue {
                name: "f_max".to_string(),
                value: staged.highland.f_max,
                reason: format!(
                    "lowland capacity ({}) must exceed highland capacity ({})",
                    staged.lowland.f_max, staged.highland.f_max
                ),
            });
        }

        for (terrain, changes) in updates {
            debug!(terrain = %terrain, changes = ?changes, "Updated landscape parameters");
        }
        *self = staged;
        Ok(())
    }
}

fn check_value(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidParameterValue {
            name: name.to_string(),
            value,
            reason: "must be finite and non-negative".to_string(),
        });
    }
    Ok(())
}

/// Every constant table in effect for one island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub landscape: LandscapeParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            landscape: LandscapeParams::default(),
        }
    }
}

impl Params {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    pub fn update_species(&mut self, species: Species, changes: &ParamChanges) -> Result<()> {
        self.species_mut(species).update(species.name(), changes)
    }

    pub fn update_terrain(&mut self, terrain: Terrain, changes: &ParamChanges) -> Result<()> {
        self.landscape.update(terrain, changes)
    }

    /// Apply landscape overrides keyed by terrain name or code as one batch
    pub fn update_landscape(&mut self, overrides: &BTreeMap<String, ParamChanges>) -> Result<()> {
        let updates = overrides
            .iter()
            .map(|(name, changes)| name.parse::<Terrain>().map(|terrain| (terrain, changes)))
            .collect::<Result<Vec<_>>>()?;
        self.landscape.update_batch(&updates)
    }
}

const DEFAULT_MAP: &str = "\
WWWWWWWWW
WLLLLLHHW
WLLLLHHHW
WLLDDLLHW
WHHDDLLLW
WWWWWWWWW";

/// Everything needed to set up and run one island
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Years to run when no explicit count is given
    pub num_years: u32,
    /// Island geography, one terrain code per cell
    pub island_map: String,
    /// Animals placed before the first year
    pub ini_pop: Vec<PopulationSeed>,
    /// Species name to parameter overrides
    pub animal_params: BTreeMap<String, ParamChanges>,
    /// Terrain name or code to parameter overrides
    pub landscape_params: BTreeMap<String, ParamChanges>,
    /// Years between population snapshots in the log (0 disables them)
    pub log_interval: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let herbivores = (0..150)
            .map(|_| AnimalSeed::new(Species::Herbivore, 5, 20.0))
            .collect();
        let carnivores = (0..20)
            .map(|_| AnimalSeed::new(Species::Carnivore, 5, 20.0))
            .collect();

        Self {
            seed: 12345,
            num_years: 100,
            island_map: DEFAULT_MAP.to_string(),
            ini_pop: vec![
                PopulationSeed {
                    loc: (3, 3),
                    pop: herbivores,
                },
                PopulationSeed {
                    loc: (3, 4),
                    pop: carnivores,
                },
            ],
            animal_params: BTreeMap::new(),
            landscape_params: BTreeMap::new(),
            log_interval: 10,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
