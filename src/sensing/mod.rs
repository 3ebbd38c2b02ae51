pub mod controller;
pub mod gap_fill;
pub mod loop_worker;
pub mod simulated;

pub use controller::SensingController;
pub use gap_fill::HeartRateGapFill;
pub use loop_worker::{SensingConfig, SensingPipeline, SensingUpdate};
pub use simulated::{ActivityPhase, SimulatedSensor};
