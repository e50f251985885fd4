pub mod math;
pub mod model;
pub mod io;
pub mod calibration;

pub use math::dual::{Dual, ParamIndex};
pub use math::gumbel::RelaxedCategorical;
pub use model::graph::ContactGraph;
pub use model::params::{ModelConfig, SharedParameters};
pub use model::simulation::{RunOutcome, RunSettings, Seeding, Simulation, TickSummary};
pub use model::stage::Stage;
