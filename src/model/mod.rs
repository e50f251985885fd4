pub mod engine;
pub mod exposure;
pub mod graph;
pub mod kernel;
pub mod params;
pub mod population;
pub mod simulation;
pub mod stage;
