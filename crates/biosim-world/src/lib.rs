//! Island world simulation.
//!
//! An island is a grid of cells holding herbivores and carnivores. Each
//! simulated year runs feeding, breeding, migration, aging and death over the
//! whole grid.

pub mod animal;
pub mod cell;
pub mod grid;
pub mod island;
pub mod simulation;
pub mod stats;

pub use animal::Animal;
pub use cell::{Cell, Emigrant, Neighbor};
pub use grid::Grid;
pub use island::Island;
pub use simulation::{Simulation, SimulationResult};
pub use stats::{
    Attribute, AttributeSamples, Distribution, HistogramSpec, SpeciesSamples, YearEvents,
    YearStats,
};
